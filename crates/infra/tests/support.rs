//! Shared fixtures for infra integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use oslink_core::LegacyReader;
use oslink_domain::{LegacyRow, OsLinkError, Result};
use parking_lot::Mutex;

/// Legacy reader that serves whatever rows the test scripted last.
pub struct ScriptedReader {
    rows: Mutex<Result<Vec<LegacyRow>>>,
    queries: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedReader {
    pub fn new(rows: Vec<LegacyRow>) -> Self {
        Self { rows: Mutex::new(Ok(rows)), queries: Mutex::new(Vec::new()), calls: AtomicUsize::new(0) }
    }

    pub fn set_rows(&self, rows: Vec<LegacyRow>) {
        *self.rows.lock() = Ok(rows);
    }

    pub fn fail_with(&self, message: &str) {
        *self.rows.lock() = Err(OsLinkError::Legacy(message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.queries.lock().last().cloned()
    }
}

#[async_trait]
impl LegacyReader for ScriptedReader {
    fn is_available(&self) -> bool {
        true
    }

    async fn query(&self, sql: &str) -> Result<Vec<LegacyRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(sql.to_string());
        self.rows.lock().clone()
    }
}

/// A SHOficina order row as the OLE DB bridge reports it.
pub fn order_row(codigo: &str, situacao: &str, pronto: &str) -> LegacyRow {
    LegacyRow::new()
        .with("CODIGO", codigo)
        .with("APARELHO", "Notebook")
        .with("MARCA", "Dell")
        .with("SERIE", "SN-1")
        .with("DEFEITO", "Não liga")
        .with("OBS_SERVICO", "Cliente aguarda orçamento")
        .with("SITUACAO", situacao)
        .with("PRONTO", pronto)
        .with("PRIOR", "2")
        .with("NOME_CLIENTE", "Maria Souza")
}

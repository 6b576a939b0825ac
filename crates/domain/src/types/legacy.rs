//! Raw records as returned by the legacy store

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One legacy row: column name to stringified value.
///
/// Null columns are simply absent. Lookups are exact on the column name the
/// legacy provider reports (upper case in SHOficina).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyRow {
    fields: HashMap<String, String>,
}

impl LegacyRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fakes.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Trimmed value of a column, `""` when absent.
    pub fn text(&self, column: &str) -> &str {
        self.fields.get(column).map_or("", |v| v.trim())
    }

    /// Trimmed value of a column, `None` when absent or blank.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        Some(self.text(column)).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for LegacyRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// Legacy column names used by the mapper and the poll query.
pub mod columns {
    pub const EQUIPMENT: &str = "APARELHO";
    pub const BRAND: &str = "MARCA";
    pub const MODEL: &str = "MODELO";
    pub const SERIAL: &str = "SERIE";
    pub const ASSET_TAG: &str = "PATRIMONIO";
    pub const ACCESSORIES: &str = "ACESSORIO";
    pub const DEFECT: &str = "DEFEITO";
    pub const SERVICE_NOTE: &str = "OBS_SERVICO";
    pub const CODE: &str = "CODIGO";
    pub const SITUATION: &str = "SITUACAO";
    pub const READY: &str = "PRONTO";
    pub const PRIORITY: &str = "PRIOR";
    pub const CLIENT_NAME: &str = "NOME_CLIENTE";
    pub const CLIENT_CODE: &str = "COD_CLIENTE";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_trims_and_defaults_to_empty() {
        let row = LegacyRow::new().with("CODIGO", "  42 ").with("SERIE", "   ");
        assert_eq!(row.text("CODIGO"), "42");
        assert_eq!(row.text("MISSING"), "");
        assert_eq!(row.non_empty("SERIE"), None);
        assert_eq!(row.non_empty("CODIGO"), Some("42"));
    }

    #[test]
    fn deserializes_from_flat_object() {
        let row: LegacyRow = serde_json::from_str(r#"{"CODIGO":"7","PRONTO":"S"}"#).unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row.text("PRONTO"), "S");
    }
}

//! `LegacyReader` that shells out to PowerShell and the OLE DB provider.

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use oslink_core::LegacyReader;
use oslink_domain::{LegacyConfig, LegacyRow, OsLinkError, Result};
use tokio::task;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use super::script::{build_query_script, parse_rows, SCRIPT_BOM};

const POWERSHELL: &str = "powershell.exe";

/// Reads the SHOficina Access database through a generated PowerShell script.
///
/// Each query writes a temporary `.ps1`, runs it with a hard timeout and
/// parses its JSON output. The child is killed and reaped on timeout.
pub struct PowerShellReader {
    db_path: PathBuf,
    password: Option<String>,
    timeout: Duration,
}

impl PowerShellReader {
    pub fn new(config: &LegacyConfig) -> Self {
        Self {
            db_path: config.db_path.clone(),
            password: config.password.clone(),
            timeout: config.query_timeout(),
        }
    }
}

#[async_trait]
impl LegacyReader for PowerShellReader {
    fn is_available(&self) -> bool {
        cfg!(windows) && self.db_path.exists()
    }

    async fn query(&self, sql: &str) -> Result<Vec<LegacyRow>> {
        let script = build_query_script(&self.db_path, self.password.as_deref(), sql);
        let timeout = self.timeout;

        let run = task::spawn_blocking(move || run_script(&script, timeout));
        // Outer guard in case the blocking pool itself is saturated.
        let output = match tokio::time::timeout(timeout + Duration::from_secs(5), run).await {
            Ok(joined) => joined.map_err(map_join_error)??,
            Err(_) => {
                return Err(OsLinkError::Legacy(format!(
                    "legacy query did not finish within {}s",
                    timeout.as_secs()
                )))
            }
        };

        let rows = parse_rows(&output)?;
        debug!(rows = rows.len(), "legacy query returned");
        Ok(rows)
    }
}

/// Write the script to a BOM-prefixed temp file and run it, returning stdout.
fn run_script(script: &str, timeout: Duration) -> Result<String> {
    let mut file = tempfile::Builder::new()
        .prefix("oslink_")
        .suffix(".ps1")
        .tempfile()
        .map_err(|e| map_io_error("temp script create", &e))?;
    file.write_all(SCRIPT_BOM.as_bytes())
        .and_then(|()| file.write_all(script.as_bytes()))
        .and_then(|()| file.flush())
        .map_err(|e| map_io_error("temp script write", &e))?;
    // Close our handle; the file is deleted when `script_path` drops.
    let script_path = file.into_temp_path();

    let mut child = Command::new(POWERSHELL)
        .args(["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-File"])
        .arg(&*script_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| map_io_error("powershell spawn", &e))?;

    // Drain pipes on helper threads so a large result set cannot fill the
    // pipe buffer and stall the child until the timeout.
    let stdout = child.stdout.take().map(drain_pipe);
    let stderr = child.stderr.take().map(drain_pipe);

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            warn!(timeout_secs = timeout.as_secs(), "legacy query timed out, killing powershell");
            let _ = child.kill();
            let _ = child.wait();
            return Err(OsLinkError::Legacy(format!(
                "legacy query timed out after {}s",
                timeout.as_secs()
            )));
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(map_io_error("powershell wait", &e));
        }
    };

    let stdout = stdout.map(collect_pipe).unwrap_or_default();
    let stderr = stderr.map(collect_pipe).unwrap_or_default();

    if !status.success() {
        let first_line = stderr.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
        return Err(OsLinkError::Legacy(format!(
            "legacy provider exited with {status}: {}",
            first_line.trim()
        )));
    }

    Ok(stdout)
}

fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect_pipe(handle: std::thread::JoinHandle<Vec<u8>>) -> String {
    handle.join().map(|bytes| String::from_utf8_lossy(&bytes).into_owned()).unwrap_or_default()
}

fn map_io_error(context: &str, err: &std::io::Error) -> OsLinkError {
    OsLinkError::Legacy(format!("{context}: {err}"))
}

fn map_join_error(err: task::JoinError) -> OsLinkError {
    if err.is_cancelled() {
        OsLinkError::Internal("legacy query task cancelled".into())
    } else {
        OsLinkError::Internal(format!("legacy query task panicked: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: PathBuf) -> LegacyConfig {
        LegacyConfig { db_path: path, password: None, query_timeout_secs: 1 }
    }

    #[test]
    fn missing_database_is_unavailable() {
        let reader = PowerShellReader::new(&config(PathBuf::from("/definitely/not/here.mdb")));
        assert!(!reader.is_available());
    }

    #[test]
    fn availability_requires_windows_host() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let reader = PowerShellReader::new(&config(file.path().to_path_buf()));
        assert_eq!(reader.is_available(), cfg!(windows));
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn query_without_powershell_is_legacy_error() {
        let reader = PowerShellReader::new(&config(PathBuf::from("db.mdb")));
        let err = reader.query("SELECT 1").await.unwrap_err();
        assert!(matches!(err, OsLinkError::Legacy(_)), "unexpected {err:?}");
    }
}

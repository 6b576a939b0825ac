//! PowerShell script generation and output parsing for the OLE DB bridge.
//!
//! The legacy store is an Access (Jet) database. The only provider available
//! on a stock Windows host is the .NET OLE DB stack, reached through a
//! generated PowerShell script that prints the result set as JSON.

use std::path::Path;

use oslink_domain::{LegacyRow, OsLinkError, Result};
use serde_json::Value;

const JET_PROVIDER: &str = "Microsoft.Jet.OLEDB.4.0";
const ACE_PROVIDER: &str = "Microsoft.ACE.OLEDB.12.0";

/// UTF-8 byte order mark. Windows PowerShell 5 reads BOM-less scripts in the
/// ANSI code page and mangles accented column values.
pub const SCRIPT_BOM: &str = "\u{FEFF}";

/// Build the full query script: open the connection (Jet first, ACE as a
/// fallback), run `sql`, print rows as compact JSON or `[]` when empty.
///
/// Path, password and SQL are embedded in single-quoted here-strings, which
/// PowerShell never interpolates.
pub fn build_query_script(db_path: &Path, password: Option<&str>, sql: &str) -> String {
    let source = here_string(&db_path.to_string_lossy());
    let password_line = password.map_or_else(
        || "$pass = $null".to_string(),
        |pass| format!("$pass = {}\n$pass = $pass.Trim()", here_string(pass)),
    );
    let sql = here_string(sql.trim());

    format!(
        r#"$ErrorActionPreference = 'Stop'
[Console]::OutputEncoding = [System.Text.Encoding]::UTF8
{password_line}
$src = {source}
$src = $src.Trim()
function Build-ConnectionString([string]$provider) {{
  $cs = "Provider=$provider;Data Source='" + $src.Replace("'", "''") + "';"
  if ($pass) {{ $cs += "Jet OLEDB:Database Password='" + $pass.Replace("'", "''") + "';" }}
  return $cs
}}
$conn = New-Object System.Data.OleDb.OleDbConnection
$conn.ConnectionString = Build-ConnectionString '{JET_PROVIDER}'
try {{ $conn.Open() }} catch {{
  $conn.ConnectionString = Build-ConnectionString '{ACE_PROVIDER}'
  $conn.Open()
}}
try {{
  $cmd = $conn.CreateCommand()
  $cmd.CommandText = {sql}
  $reader = $cmd.ExecuteReader()
  $rows = [System.Collections.Generic.List[object]]::new()
  while ($reader.Read()) {{
    $row = @{{}}
    for ($i = 0; $i -lt $reader.FieldCount; $i++) {{
      $row[$reader.GetName($i)] = if ($reader.IsDBNull($i)) {{ $null }} else {{ $reader.GetValue($i).ToString() }}
    }}
    $rows.Add([PSCustomObject]$row)
  }}
  $reader.Close()
  if ($rows.Count -eq 0) {{ Write-Output '[]' }} else {{ ConvertTo-Json -InputObject $rows.ToArray() -Depth 2 -Compress }}
}} finally {{
  $conn.Close()
}}
"#
    )
}

/// Single-quoted here-string. The terminator `'@` is only recognised at the
/// start of a line, so a value cannot close it early unless it contains a
/// line break followed by `'@`; those line breaks are flattened.
fn here_string(value: &str) -> String {
    let flattened = value.replace("\r\n", " ").replace(['\r', '\n'], " ");
    format!("@'\n{flattened}\n'@")
}

/// Parse the script's standard output into rows.
///
/// Empty output, `[]` and `null` all mean "no rows". A single object is one
/// row (older PowerShell unwraps one-element arrays). Null columns are
/// dropped, scalars are stringified.
pub fn parse_rows(output: &str) -> Result<Vec<LegacyRow>> {
    let trimmed = output.trim().trim_start_matches('\u{FEFF}');
    if trimmed.is_empty() || trimmed == "[]" || trimmed == "null" {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|err| {
        OsLinkError::Legacy(format!("legacy provider returned malformed JSON: {err}"))
    })?;

    match value {
        Value::Array(items) => items.into_iter().map(value_to_row).collect(),
        Value::Object(_) => Ok(vec![value_to_row(value)?]),
        Value::Null => Ok(Vec::new()),
        other => Err(OsLinkError::Legacy(format!("unexpected legacy provider output: {other}"))),
    }
}

fn value_to_row(value: Value) -> Result<LegacyRow> {
    let Value::Object(columns) = value else {
        return Err(OsLinkError::Legacy(format!("legacy row is not an object: {value}")));
    };

    Ok(columns
        .into_iter()
        .filter_map(|(column, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((column, text)),
            other => Some((column, other.to_string())),
        })
        .collect())
}

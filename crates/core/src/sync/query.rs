//! Legacy poll query

use chrono::NaiveDate;

/// Orders joined with their client name, entered on or after `since`.
///
/// The date literal uses the `#YYYY-MM-DD#` form the Jet/ACE engine
/// expects; the value comes from a `NaiveDate`, never from user input.
pub fn changed_orders_query(since: NaiveDate) -> String {
    format!(
        "SELECT O.*, C.NOME AS NOME_CLIENTE \
         FROM [ORDEMS] O \
         LEFT JOIN [CLIENTES] C ON C.CODIGO = O.COD_CLIENTE \
         WHERE O.[ENTRADA] >= #{}#",
        since.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_date_watermark() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let sql = changed_orders_query(date);
        assert!(sql.contains("FROM [ORDEMS] O"));
        assert!(sql.contains("LEFT JOIN [CLIENTES] C ON C.CODIGO = O.COD_CLIENTE"));
        assert!(sql.ends_with("WHERE O.[ENTRADA] >= #2024-03-09#"));
    }
}

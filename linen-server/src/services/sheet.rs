//! External Sheet Fetcher
//!
//! Published Google Sheet URLs are rewritten to their CSV export form,
//! fetched with a request timeout, and parsed into header-keyed rows. A
//! non-success status or transport error aborts the calling sync with a
//! structured failure — nothing is written from that call.

use std::collections::HashMap;
use std::time::Duration;

use crate::utils::{AppError, AppResult};

/// Rewrite a published-sheet URL to its CSV export endpoint.
/// Already-direct CSV links pass through untouched.
pub fn to_csv_export_url(url: &str) -> String {
    if url.contains("/pubhtml") {
        url.replacen("/pubhtml", "/pub?output=csv", 1)
    } else if let Some(pos) = url.find("/edit") {
        format!("{}/export?format=csv", &url[..pos])
    } else {
        url.to_string()
    }
}

/// Fetch a tabular document and parse it into header-keyed rows.
pub async fn fetch_rows(url: &str, timeout_ms: u64) -> AppResult<Vec<HashMap<String, String>>> {
    let csv_url = to_csv_export_url(url);
    tracing::info!(url = %csv_url, "Fetching CSV");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

    let resp = client
        .get(&csv_url)
        .send()
        .await
        .map_err(|e| AppError::fetch(format!("Failed to fetch CSV: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::fetch(format!(
            "Failed to fetch CSV: status {}",
            resp.status()
        )));
    }

    let text = resp
        .text()
        .await
        .map_err(|e| AppError::fetch(format!("Failed to read CSV body: {e}")))?;

    Ok(parse_rows(&text))
}

/// Parse CSV text into one `header -> cell` map per data row.
///
/// Empty lines are dropped; malformed lines are logged and skipped (a bad
/// row never aborts the parse). Cells beyond the header width are ignored.
pub fn parse_rows(text: &str) -> Vec<HashMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_string).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "CSV header parse failed");
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = idx + 1, error = %e, "CSV row parse failed, skipping");
                continue;
            }
        };
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let mut row = HashMap::new();
        for (i, field) in record.iter().enumerate() {
            if let Some(header) = headers.get(i)
                && !header.is_empty()
            {
                row.insert(header.clone(), field.to_string());
            }
        }
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pubhtml_url_rewrite() {
        assert_eq!(
            to_csv_export_url("https://docs.google.com/spreadsheets/d/e/KEY/pubhtml"),
            "https://docs.google.com/spreadsheets/d/e/KEY/pub?output=csv"
        );
    }

    #[test]
    fn test_edit_url_rewrite() {
        assert_eq!(
            to_csv_export_url("https://docs.google.com/spreadsheets/d/KEY/edit#gid=0"),
            "https://docs.google.com/spreadsheets/d/KEY/export?format=csv"
        );
    }

    #[test]
    fn test_direct_csv_url_passthrough() {
        let url = "https://docs.google.com/spreadsheets/d/e/KEY/pub?output=csv";
        assert_eq!(to_csv_export_url(url), url);
    }

    #[test]
    fn test_parse_rows_header_keyed() {
        let rows = parse_rows("booking_id,checkin_date,guests\nB-1,2026-08-15,4\nB-2,2026-08-16,2\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["booking_id"], "B-1");
        assert_eq!(rows[1]["guests"], "2");
    }

    #[test]
    fn test_parse_rows_skips_empty_lines() {
        let rows = parse_rows("a,b\n1,2\n,\n3,4\n");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_parse_rows_japanese_headers() {
        let rows = parse_rows("日付,宿泊者名,人数\n2026/8/15,田中,4\n");
        assert_eq!(rows[0]["日付"], "2026/8/15");
        assert_eq!(rows[0]["宿泊者名"], "田中");
    }

    #[test]
    fn test_parse_rows_trims_cells() {
        let rows = parse_rows("a,b\n 1 , 2 \n");
        assert_eq!(rows[0]["a"], "1");
    }
}

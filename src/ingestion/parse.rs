//! Parse functions - transform decoded CSV text into RawRow records

use crate::error::IngestError;
use crate::ingestion::types::RawRow;
use tracing::info;

/// Parse comma-delimited text with a header row into one RawRow per line.
/// Any malformed record (bad UTF-8, wrong field count) fails the whole parse.
pub fn parse_rows(csv_bytes: &[u8], url: &str) -> Result<Vec<RawRow>, IngestError> {
    let parse_error = |source: csv::Error| IngestError::Parse {
        url: url.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_bytes);

    let headers = reader.headers().map_err(parse_error)?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(parse_error)?;
        let row = headers
            .iter()
            .zip(record.iter())
            .collect::<RawRow>();
        rows.push(row);
    }

    info!(
        "Parsed {} rows with {} columns from {}",
        rows.len(),
        headers.len(),
        url
    );

    Ok(rows)
}

//! Decode functions - turn a downloaded body into CSV text bytes

use crate::error::IngestError;
use crate::ingestion::types::Download;
use crate::ingestion::utils::starts_like_html;
use flate2::read::MultiGzDecoder;
use std::io::Read;
use tracing::{debug, info, warn};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Authoritative check: the gzip magic number
pub fn has_gzip_magic(body: &[u8]) -> bool {
    body.starts_with(&GZIP_MAGIC)
}

/// Secondary signals: headers and URL suffix. Static hosts often get these
/// wrong, so they only matter for logging mismatches.
pub fn hints_gzip(download: &Download) -> bool {
    let header_says = |value: &Option<String>| {
        value
            .as_deref()
            .map(|v| v.to_lowercase().contains("gzip"))
            .unwrap_or(false)
    };

    header_says(&download.content_encoding)
        || header_says(&download.content_type)
        || download.url.to_lowercase().ends_with(".gz")
}

/// Reverse gzip when the magic bytes say so, then reject HTML bodies
pub fn decode_payload(download: &Download) -> Result<Vec<u8>, IngestError> {
    let body = download.body.as_ref();
    let sniffed = has_gzip_magic(body);

    if sniffed != hints_gzip(download) {
        debug!(
            "Gzip hints disagree with magic bytes for {} (magic: {})",
            download.url, sniffed
        );
    }

    let decoded = if sniffed {
        // Concatenated members are one stream; read them all
        let mut decoder = MultiGzDecoder::new(body);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|source| IngestError::Decompression {
                url: download.url.clone(),
                source,
            })?;
        info!(
            "Decompressed {} bytes to {} bytes from {}",
            body.len(),
            out.len(),
            download.url
        );
        out
    } else {
        body.to_vec()
    };

    if starts_like_html(&decoded) {
        warn!("Payload from {} is an HTML document", download.url);
        return Err(IngestError::HtmlPayload {
            url: download.url.clone(),
        });
    }

    Ok(decoded)
}

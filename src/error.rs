use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ingestion::City;

/// Failures while turning an upstream dataset into rows
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("download failed ({}) for {url}{}{}", status_text(.status), html_note(.looks_like_html), detail_text(.detail))]
    FetchFailed {
        url: String,
        status: Option<u16>,
        looks_like_html: bool,
        detail: Option<String>,
    },

    #[error("could not decompress gzip payload from {url}: {source}")]
    Decompression {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("expected CSV from {url} but received an HTML document")]
    HtmlPayload { url: String },

    #[error("malformed CSV from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: csv::Error,
    },
}

fn status_text(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {}", code),
        None => "no response".to_string(),
    }
}

fn html_note(looks_like_html: &bool) -> &'static str {
    if *looks_like_html {
        " (body looks like an HTML error page)"
    } else {
        ""
    }
}

fn detail_text(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {}", detail),
        None => String::new(),
    }
}

/// Errors surfaced by request handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unsupported city: {0}")]
    UnsupportedCity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidCredentials(&'static str),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Failed to load dataset for {city}: {source}")]
    Upstream {
        city: City,
        #[source]
        source: IngestError,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedCity(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials(_) | ApiError::EmailTaken(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } | ApiError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            ApiError::UnsupportedCity(_) => "Unsupported city",
            ApiError::NotFound(_) => "Not found",
            ApiError::InvalidCredentials(_) => "Login failed",
            ApiError::EmailTaken(_) => "Registration failed",
            ApiError::Hashing(_) => "Internal server error",
            ApiError::Upstream { source, .. } => match source {
                IngestError::FetchFailed { .. } => "Upstream dataset download failed",
                IngestError::Decompression { .. } | IngestError::HtmlPayload { .. } => {
                    "Upstream dataset has an unexpected format"
                }
                IngestError::Parse { .. } => "Upstream dataset could not be parsed",
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        let body = ErrorBody {
            message: self.summary(),
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

//! HTTP API server implementation

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::core::client::TranslationClient;
use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslationError;
use crate::core::models::Direction;
use crate::processors::docx::DocxProcessor;

/// Media type of OOXML wordprocessing documents
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Maximum accepted upload size
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// RFC 5987 attr-char: everything outside it gets percent-encoded in the
/// disposition filename
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Application state
pub struct AppState {
    processor: DocxProcessor<TranslationClient>,
}

impl AppState {
    /// Build state around a ready processor
    pub fn new(processor: DocxProcessor<TranslationClient>) -> Self {
        Self { processor }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    translation_failures: u64,
}

/// Query parameters of the translate endpoint
#[derive(Deserialize)]
struct TranslateParams {
    /// Requested translation direction, still unvalidated
    direction: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorDetail,
}

/// Error payload carried by every failed response
#[derive(Serialize)]
pub struct ErrorDetail {
    /// Human-readable description
    pub message: String,
    /// Stable machine-readable code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// An error together with the HTTP status it maps to
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }
}

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        let (status, code) = match &err {
            TranslationError::InvalidDirection { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_direction")
            }
            TranslationError::ParseError { .. } => (StatusCode::BAD_REQUEST, "invalid_document"),
            TranslationError::StructureError { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "malformed_document")
            }
            TranslationError::SerializeError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization_failed")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let class = if self.status.is_client_error() {
            "invalid_request_error"
        } else {
            "api_error"
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                message: self.message,
                code: Some(self.code.to_string()),
                r#type: Some(class.to_string()),
            },
        });

        (self.status, body).into_response()
    }
}

/// Health check handler
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        translation_failures: state.processor.translator().failure_count(),
    })
}

/// Translate an uploaded document and send the result back as a download.
///
/// The direction is validated before the body is touched, so an unsupported
/// pair is rejected without parsing the document or issuing any translation
/// calls.
async fn translate_docx(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TranslateParams>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let direction: Direction = params.direction.parse()?;

    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("invalid_multipart", e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("document.docx").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request("invalid_multipart", e.to_string()))?;
            file = Some((filename, data.to_vec()));
            break;
        }
    }

    let (filename, data) = file.ok_or_else(|| {
        ApiError::bad_request("missing_file", "multipart field 'file' is required")
    })?;

    let failures_before = state.processor.translator().failure_count();
    let translated = state.processor.translate_document(&data, direction).await?;
    let fallbacks = state.processor.translator().failure_count() - failures_before;

    info!(
        "Translated {} ({} bytes, {}), {} fallbacks",
        filename,
        data.len(),
        direction,
        fallbacks
    );

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment_disposition(&filename)),
        ],
        translated,
    )
        .into_response())
}

/// `Content-Disposition` naming the download `translated_<original>`,
/// percent-encoded so non-ASCII filenames survive the header
fn attachment_disposition(original: &str) -> String {
    let filename = format!("translated_{}", original);
    format!(
        "attachment; filename*=UTF-8''{}",
        utf8_percent_encode(&filename, FILENAME_ENCODE_SET)
    )
}

/// Build the service router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/translate-docx/", post(translate_docx))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16) -> anyhow::Result<()> {
    let config = TranslatorConfig::from_env()?;
    let max_table_depth = config.max_table_depth;
    let translator = TranslationClient::new(config)?;
    let processor = DocxProcessor::new(translator).with_max_table_depth(max_table_depth);

    let state = Arc::new(AppState::new(processor));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_ascii_names_readable() {
        assert_eq!(
            attachment_disposition("report.docx"),
            "attachment; filename*=UTF-8''translated_report.docx"
        );
    }

    #[test]
    fn disposition_encodes_non_ascii_names() {
        let disposition = attachment_disposition("отчёт.docx");
        assert!(disposition.starts_with("attachment; filename*=UTF-8''translated_%"));
        assert!(disposition.is_ascii());
        assert!(disposition.ends_with(".docx"));
    }
}

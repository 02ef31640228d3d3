//! Async translation client with graceful fallback

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Direction, TranslateTextRequest, TranslateTextResponse};

/// Seam between the document walk and the translation transport.
///
/// Implementations fully recover failures: the returned string is either the
/// translated text or the original input, never an error.
pub trait Translate {
    /// Translate one text unit, falling back to the input on any failure
    fn translate(&self, text: &str, direction: Direction) -> impl Future<Output = String> + Send;
}

/// HTTP client for the external translation service
#[derive(Debug)]
pub struct TranslationClient {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
    failures: AtomicU64,
}

impl TranslationClient {
    /// Create a new translation client
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
            failures: AtomicU64::new(0),
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = TranslatorConfig::from_env()?;
        Self::new(config)
    }

    /// Number of translation requests that fell back to the original text
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Send one request to the translation service.
    ///
    /// Every failure surfaces as an error here; the `Translate` impl is the
    /// single place that recovers it.
    async fn request_translation(&self, text: &str, direction: Direction) -> Result<String> {
        let url = format!(
            "{}/{}/",
            self.config.api_base.trim_end_matches('/'),
            direction
        );

        let response = self
            .client
            .post(&url)
            .json(&TranslateTextRequest { text })
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: TranslateTextResponse =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        // An absent or empty field still counts as a successful response
        Ok(body.translated_text.unwrap_or_default())
    }
}

impl Translate for TranslationClient {
    fn translate(&self, text: &str, direction: Direction) -> impl Future<Output = String> + Send {
        async move {
            match self.request_translation(text, direction).await {
                Ok(translated) => {
                    debug!("Translated {} chars via {}", text.chars().count(), direction);
                    translated
                }
                Err(e) => {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    warn!("Translation request failed, keeping original text: {}", e);
                    text.to_string()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    /// Serve a stand-in translation service on an ephemeral port
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}/translate", addr)
    }

    fn client_for(api_base: String) -> TranslationClient {
        TranslationClient::new(TranslatorConfig {
            api_base,
            timeout_ms: 5_000,
            max_table_depth: 16,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn returns_translated_text_on_success() {
        let app = Router::new().route(
            "/translate/ru-kk/",
            post(|| async { Json(json!({"translated_text": "Сәлем"})) }),
        );
        let client = client_for(serve(app).await);

        assert_eq!(client.translate("Привет", Direction::RuKk).await, "Сәлем");
        assert_eq!(client.failure_count(), 0);
    }

    #[tokio::test]
    async fn falls_back_to_original_on_server_error() {
        let app = Router::new().route(
            "/translate/ru-kk/",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let client = client_for(serve(app).await);

        assert_eq!(client.translate("Привет", Direction::RuKk).await, "Привет");
        assert_eq!(client.failure_count(), 1);
    }

    #[tokio::test]
    async fn missing_field_maps_to_empty_string() {
        let app = Router::new().route(
            "/translate/kk-ru/",
            post(|| async { Json(json!({"detail": "ok"})) }),
        );
        let client = client_for(serve(app).await);

        assert_eq!(client.translate("Сәлем", Direction::KkRu).await, "");
        assert_eq!(client.failure_count(), 0);
    }

    #[tokio::test]
    async fn malformed_body_keeps_original() {
        let app = Router::new().route("/translate/ru-kk/", post(|| async { "not json" }));
        let client = client_for(serve(app).await);

        assert_eq!(client.translate("Привет", Direction::RuKk).await, "Привет");
        assert_eq!(client.failure_count(), 1);
    }

    #[tokio::test]
    async fn unreachable_service_keeps_original() {
        let client = client_for("http://127.0.0.1:1/translate".to_string());

        assert_eq!(client.translate("Привет", Direction::RuKk).await, "Привет");
        assert_eq!(client.failure_count(), 1);
    }
}

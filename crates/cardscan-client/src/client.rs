//! Card store client for the cardscan REST API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cardscan_core::config::ClientConfig;
use cardscan_core::error::{CardScanError, CardScanResult, ErrorCode};
use cardscan_core::{CardField, CardRecord, CardStore, NewCard};
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// [`CardStore`] backed by a remote cardscan server.
///
/// Build it once and share it; the underlying connection pool is reused for
/// every call until [`CardStore::close`].
pub struct CardClient {
    client: Client,
    base_url: String,
    closed: AtomicBool,
}

/// Server health as reported by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub storage: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    message: String,
    #[serde(default)]
    details: Option<ErrorDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    missing: Vec<CardField>,
}

impl CardClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str) -> CardScanResult<Self> {
        Self::with_options(Some(base_url), None)
    }

    /// Create a client with options.
    pub fn with_options(base_url: Option<&str>, timeout: Option<Duration>) -> CardScanResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CardScanError::Configuration(format!("HTTP client: {}", e)))?;

        let base_url = base_url
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(CardScanError::Configuration(format!(
                "Invalid base URL: {}",
                base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            closed: AtomicBool::new(false),
        })
    }

    /// Create a client from the `client` configuration section.
    pub fn from_config(config: &ClientConfig) -> CardScanResult<Self> {
        Self::with_options(
            Some(&config.base_url),
            Some(Duration::from_secs(config.timeout_secs)),
        )
    }

    /// Create a client from environment variables.
    pub fn from_env() -> CardScanResult<Self> {
        let base_url = std::env::var("CARDSCAN_BASE_URL").ok();
        let timeout = std::env::var("CARDSCAN_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs);

        Self::with_options(base_url.as_deref(), timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn ensure_open(&self) -> CardScanResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CardScanError::storage_connection("Client is closed"));
        }
        Ok(())
    }

    /// Check the server.
    pub async fn health(&self) -> CardScanResult<HealthStatus> {
        self.ensure_open()?;
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| connection_error("Health check failed", e))?;

        parse_json(check(response).await?).await
    }
}

#[async_trait]
impl CardStore for CardClient {
    async fn create(&self, card: NewCard) -> CardScanResult<CardRecord> {
        self.ensure_open()?;
        card.ensure_complete()?;

        debug!(url = %self.url("/cards"), "Submitting card");
        let response = self
            .client
            .post(self.url("/cards"))
            .json(&card)
            .send()
            .await
            .map_err(|e| connection_error("Failed to submit card", e))?;

        parse_json(check(response).await?).await
    }

    async fn list(&self) -> CardScanResult<Vec<CardRecord>> {
        self.ensure_open()?;
        let response = self
            .client
            .get(self.url("/cards"))
            .send()
            .await
            .map_err(|e| connection_error("Failed to list cards", e))?;

        parse_json(check(response).await?).await
    }

    async fn close(&self) -> CardScanResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn connection_error(context: &str, err: reqwest::Error) -> CardScanError {
    warn!(error = %err, "{}", context);
    CardScanError::StorageUnavailable {
        message: format!("{}: {}", context, err),
        code: ErrorCode::StoConnectionFailed,
        source: Some(Box::new(err)),
    }
}

async fn check(response: Response) -> CardScanResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_from_response(status, &body))
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> CardScanResult<T> {
    response
        .json()
        .await
        .map_err(|e| CardScanError::storage(format!("Failed to parse response: {}", e)))
}

/// Map a non-success response onto the error taxonomy.
fn error_from_response(status: StatusCode, body: &str) -> CardScanError {
    let Some(error) = serde_json::from_str::<ErrorResponse>(body).ok().map(|r| r.error) else {
        return CardScanError::from_http_status(status.as_u16(), body);
    };
    debug!(status = status.as_u16(), code = %error.code, "Server returned an error");

    let missing = error.details.map(|d| d.missing).unwrap_or_default();
    if status == StatusCode::BAD_REQUEST && !missing.is_empty() {
        return CardScanError::missing_fields(missing);
    }

    CardScanError::from_http_status(status.as_u16(), &error.message)
}

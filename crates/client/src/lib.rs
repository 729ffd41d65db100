//! HTTP client for the fraud-detection backend.
//!
//! Every call logs method and path before sending and the status once the
//! response arrives. Non-2xx answers are mapped onto [`ClientError`] with the
//! backend's own message when the body carries one.
use std::time::Duration;

use api_types::{
    ErrorBody,
    health::Health,
    metrics::{Effectiveness, MetricsSummary, RuleBreakdown},
    scenario::ScenarioReport,
    transaction::{NewTransaction, TransactionId, TransactionListBody, TransactionRecord},
};
use engine::store::FetchResult;
use reqwest::{
    Method, StatusCode, Url,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8081/fraud-detection/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("rejected: {0}")]
    Validation(String),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// Text shown to the user. Backend messages are passed through verbatim.
    pub fn message(&self) -> String {
        match self {
            Self::Conflict(message) | Self::Validation(message) => message.clone(),
            Self::Server { message, .. } => message.clone(),
            Self::Unauthorized => "Not authorized".to_string(),
            Self::Forbidden => "Access denied".to_string(),
            Self::NotFound => "Transaction not found".to_string(),
            Self::Transport(err) if err.is_timeout() => "Backend did not answer in time".to_string(),
            Self::Transport(_) => "Backend unavailable".to_string(),
            Self::Decode(_) => "Backend sent an unreadable response".to_string(),
            Self::InvalidBaseUrl(url) => format!("Invalid backend url: {url}"),
        }
    }

    /// `true` when the backend could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed =
            Url::parse(base_url).map_err(|err| ClientError::InvalidBaseUrl(format!("{base_url}: {err}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String> {
        tracing::debug!(%method, path, "backend request");
        let mut req = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.inspect_err(|err| {
            tracing::warn!(%method, path, "backend unreachable: {err}");
        })?;
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!(%method, path, status = status.as_u16(), "backend response");

        if status.is_success() {
            return Ok(text);
        }

        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("server error").to_string());
        tracing::warn!(%method, path, status = status.as_u16(), %message, "backend rejected request");

        Err(match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound,
            409 => ClientError::Conflict(message),
            400 | 422 => ClientError::Validation(message),
            _ => ClientError::Server { status, message },
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send::<()>(Method::GET, path, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let body = self.send::<()>(Method::GET, path, None).await?;
        decode_optional(&body)
    }

    /// `GET /transactions`. `None` when the backend answers with an empty body.
    pub async fn list_transactions(&self) -> Result<Option<Vec<TransactionRecord>>> {
        let list: Option<TransactionListBody> = self.get_optional("/transactions").await?;
        Ok(list.map(|list| records_of(list, "/transactions")))
    }

    pub async fn get_transaction(&self, id: &TransactionId) -> Result<TransactionRecord> {
        self.get(&format!("/transactions/{id}")).await
    }

    /// `POST /transactions`. Returns the scored record when the backend
    /// echoes it.
    pub async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<Option<TransactionRecord>> {
        let body = self
            .send(Method::POST, "/transactions", Some(transaction))
            .await?;
        decode_optional(&body)
    }

    pub async fn create_batch(
        &self,
        transactions: &[NewTransaction],
    ) -> Result<Vec<TransactionRecord>> {
        let body = self
            .send(Method::POST, "/transactions/batch", Some(transactions))
            .await?;
        let list: Option<TransactionListBody> = decode_optional(&body)?;
        Ok(list
            .map(|list| records_of(list, "/transactions/batch"))
            .unwrap_or_default())
    }

    pub async fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        self.send::<()>(Method::DELETE, &format!("/transactions/{id}"), None)
            .await?;
        Ok(())
    }

    pub async fn metrics_summary(&self) -> Result<Option<MetricsSummary>> {
        self.get_optional("/metrics/summary").await
    }

    pub async fn rule_breakdown(&self) -> Result<RuleBreakdown> {
        self.get("/metrics/rule-breakdown").await
    }

    pub async fn effectiveness(&self) -> Result<Effectiveness> {
        self.get("/metrics/effectiveness").await
    }

    pub async fn run_scenarios(&self) -> Result<ScenarioReport> {
        let body = self
            .send::<()>(Method::POST, "/scenarios/run-all", None)
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /health`. Some deployments answer with plain text, which ends up
    /// in [`Health::status`].
    pub async fn health(&self) -> Result<Health> {
        let body = self.send::<()>(Method::GET, "/health", None).await?;
        Ok(serde_json::from_str(&body).unwrap_or_else(|_| Health {
            status: Some(body.trim().trim_matches('"').to_string()),
            service: None,
        }))
    }

    /// Fetches transactions and the metrics summary concurrently.
    ///
    /// The halves fail independently; errors are reduced to their display
    /// message.
    pub async fn fetch_dashboard(&self) -> FetchResult {
        let (transactions, metrics) = tokio::join!(self.list_transactions(), self.metrics_summary());
        FetchResult {
            transactions: transactions.map_err(|err| err.to_string()),
            metrics: metrics.map_err(|err| err.to_string()),
        }
    }
}

fn records_of(list: TransactionListBody, path: &str) -> Vec<TransactionRecord> {
    let (records, skipped) = list.into_records();
    if skipped > 0 {
        tracing::warn!(path, skipped, "skipping malformed transaction records");
    }
    records
}

fn decode_optional<T: DeserializeOwned>(body: &str) -> Result<Option<T>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    Ok(serde_json::from_str::<Option<T>>(body)?)
}

//! JitoX Backend Client
//!
//! HTTP client for the JitoX backend REST API and the external SOL price
//! source. Every domain call resolves to an [`ApiResult`]; failures are
//! reported in the result, never raised.

use super::types::*;
use crate::config::ClientConfig;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::time::Duration;
use thiserror::Error;
use urlencoding::encode;

/// Price returned when the SOL price lookup fails
pub const FALLBACK_SOL_PRICE: f64 = 100.0;

/// Client for the JitoX backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    config: ClientConfig,
}

impl BackendClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ClientError::InvalidConfig(format!("user_agent: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.config.request_timeout_ms)
    }

    fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.config.submit_timeout_ms)
    }

    /// Fetch the user's wallet address
    pub async fn fetch_wallet(&self, user_id: &str) -> ApiResult<WalletInfo> {
        tracing::debug!(user_id, "Fetching wallet");
        let url = format!("{}/get_wallet?user_id={}", self.base_url(), encode(user_id));
        let result = self.get_json::<WalletInfo>(&url, self.request_timeout()).await;
        log_outcome("wallet fetch", &result);
        result.into()
    }

    /// Fetch the user's trading balance
    pub async fn fetch_balance(&self, user_id: &str) -> ApiResult<BalanceInfo> {
        tracing::debug!(user_id, "Fetching balance");
        let url = format!("{}/get_balance?user_id={}", self.base_url(), encode(user_id));
        let result = self.get_json::<BalanceInfo>(&url, self.request_timeout()).await;
        log_outcome("balance fetch", &result);
        result.into()
    }

    /// Fetch the user's PNL for a period
    pub async fn fetch_pnl(&self, user_id: &str, period: Period) -> ApiResult<PnlInfo> {
        tracing::debug!(user_id, %period, "Fetching PNL");
        let url = format!(
            "{}/get_pnl?user_id={}&period={}",
            self.base_url(),
            encode(user_id),
            period
        );
        let result = self.get_json::<PnlInfo>(&url, self.request_timeout()).await;
        log_outcome("PNL fetch", &result);
        result.into()
    }

    /// Fetch recent operations, filtered by type
    pub async fn fetch_operations(
        &self,
        user_id: &str,
        filter: OperationFilter,
        limit: u32,
    ) -> ApiResult<OperationsInfo> {
        tracing::debug!(user_id, %filter, limit, "Fetching operations");
        let url = format!(
            "{}/get_operations?user_id={}&filter={}&limit={}",
            self.base_url(),
            encode(user_id),
            filter,
            limit
        );
        let result = self.get_json::<OperationsInfo>(&url, self.request_timeout()).await;
        log_outcome("operations fetch", &result);
        result.into()
    }

    /// Fetch recent operations with the default filter and limit
    pub async fn fetch_recent_operations(&self, user_id: &str) -> ApiResult<OperationsInfo> {
        self.fetch_operations(user_id, OperationFilter::default(), DEFAULT_OPERATIONS_LIMIT)
            .await
    }

    /// Fetch global MEV statistics
    pub async fn fetch_mev_stats(&self) -> ApiResult<MevStatsInfo> {
        tracing::debug!("Fetching global MEV statistics");
        let url = format!("{}/get_mev_stats", self.base_url());
        let result = self.get_json::<MevStatsInfo>(&url, self.request_timeout()).await;
        log_outcome("MEV stats fetch", &result);
        result.into()
    }

    /// Fetch the SOL/USD price.
    ///
    /// Never fails: any error, or a missing or zero price, yields
    /// [`FALLBACK_SOL_PRICE`].
    pub async fn fetch_sol_price(&self) -> f64 {
        tracing::debug!("Fetching SOL price");
        let url = format!(
            "{}?ids=solana&vs_currencies=usd",
            self.config.price_url.trim_end_matches('/')
        );
        let timeout = Duration::from_millis(self.config.price_timeout_ms);

        match self.get_json::<serde_json::Value>(&url, timeout).await {
            Ok(body) => {
                let price = body
                    .get("solana")
                    .and_then(|s| s.get("usd"))
                    .and_then(serde_json::Value::as_f64)
                    .filter(|p| p.is_finite() && *p != 0.0)
                    .unwrap_or(FALLBACK_SOL_PRICE);
                tracing::debug!(price, "SOL price fetch successful");
                price
            }
            Err(e) => {
                tracing::warn!(error = %e, "SOL price fetch failed, using fallback");
                FALLBACK_SOL_PRICE
            }
        }
    }

    /// Submit a deposit request
    pub async fn submit_deposit(&self, user_id: &str, amount: f64) -> ApiResult<SubmissionReceipt> {
        tracing::info!(user_id, amount, "Submitting deposit request");
        let url = format!("{}/submit_deposit", self.base_url());
        let result = self.post_submission(&url, user_id, amount).await;
        log_outcome("deposit submission", &result);
        result.into()
    }

    /// Submit a withdrawal request
    pub async fn submit_withdrawal(
        &self,
        user_id: &str,
        amount: f64,
    ) -> ApiResult<SubmissionReceipt> {
        tracing::info!(user_id, amount, "Submitting withdrawal request");
        let url = format!("{}/submit_withdrawal", self.base_url());
        let result = self.post_submission(&url, user_id, amount).await;
        log_outcome("withdrawal submission", &result);
        result.into()
    }

    async fn post_submission(
        &self,
        url: &str,
        user_id: &str,
        amount: f64,
    ) -> Result<SubmissionReceipt, ClientError> {
        let body = SubmissionRequest {
            user_id: user_id.to_string(),
            amount,
        };
        let response = self
            .client
            .post(url)
            .timeout(self.submit_timeout())
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, ClientError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        decode(response).await
    }
}

/// Check the status and decode a JSON body
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::RequestFailed {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    Ok(response.json().await?)
}

fn log_outcome<T>(what: &str, result: &Result<T, ClientError>) {
    match result {
        Ok(_) => tracing::debug!("{} successful", what),
        Err(e) => tracing::warn!(error = %e, "{} failed", what),
    }
}

// ============================================
// Results
// ============================================

/// Tagged outcome of a backend call.
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult<T> {
    Success(T),
    Failure(String),
}

impl<T> ApiResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResult::Success(data) => Some(data),
            ApiResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResult::Success(_) => None,
            ApiResult::Failure(message) => Some(message),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResult<U> {
        match self {
            ApiResult::Success(data) => ApiResult::Success(f(data)),
            ApiResult::Failure(message) => ApiResult::Failure(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            ApiResult::Success(data) => Ok(data),
            ApiResult::Failure(message) => Err(message),
        }
    }
}

impl<T> From<Result<T, ClientError>> for ApiResult<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => ApiResult::Success(data),
            Err(e) => ApiResult::Failure(e.to_string()),
        }
    }
}

#[derive(Serialize)]
struct TaggedResult<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<T: Serialize> Serialize for ApiResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TaggedResult {
            success: self.is_success(),
            data: self.data(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

// ============================================
// Errors
// ============================================

/// Errors that can occur when talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP {status}{}", reason_suffix(.status_text))]
    RequestFailed { status: u16, status_text: String },

    #[error("{0}")]
    Transport(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

fn reason_suffix(status_text: &str) -> String {
    if status_text.is_empty() {
        String::new()
    } else {
        format!(": {}", status_text)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

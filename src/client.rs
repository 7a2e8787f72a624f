// Analyzer client - the HTTP boundary to the external lexer/parser/checker
use crate::config::AnalyzerConfig;
use crate::models::{AnalysisRequest, AnalysisResult, AnalysisWithMetrics};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const ANALYZE_PATH: &str = "/analyze";
pub const ANALYZE_OPTIMIZED_PATH: &str = "/analyze-optimized";
pub const ANALYZE_UNOPTIMIZED_PATH: &str = "/analyze-unoptimized";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to {0} timed out")]
    Timeout(String),
    #[error("Could not reach analyzer at {url}: {reason}")]
    Transport { url: String, reason: String },
    #[error("Analyzer returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("Invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Capability to run the three analyzer flows.
///
/// The session controller only depends on this trait, so tests can drive it
/// with an in-memory implementation.
#[async_trait]
pub trait AnalyzerClient: Send + Sync {
    async fn analyze(&self, code: &str) -> Result<AnalysisResult, ClientError>;

    async fn analyze_optimized(&self, code: &str) -> Result<AnalysisWithMetrics, ClientError>;

    async fn analyze_unoptimized(&self, code: &str) -> Result<AnalysisWithMetrics, ClientError>;
}

pub struct HttpAnalyzerClient {
    http: Client,
    base_url: String,
}

impl HttpAnalyzerClient {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, code: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path);
        debug!("POST {} ({} bytes of source)", url, code.len());

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&AnalysisRequest { code })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(url.clone())
                } else {
                    ClientError::Transport {
                        url: url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| ClientError::Decode {
            url,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl AnalyzerClient for HttpAnalyzerClient {
    async fn analyze(&self, code: &str) -> Result<AnalysisResult, ClientError> {
        self.post(ANALYZE_PATH, code).await
    }

    async fn analyze_optimized(&self, code: &str) -> Result<AnalysisWithMetrics, ClientError> {
        self.post(ANALYZE_OPTIMIZED_PATH, code).await
    }

    async fn analyze_unoptimized(&self, code: &str) -> Result<AnalysisWithMetrics, ClientError> {
        self.post(ANALYZE_UNOPTIMIZED_PATH, code).await
    }
}

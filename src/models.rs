// Wire model shared with the external analyzer
use serde::{Deserialize, Serialize};

/// A single lexical token as produced by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

/// Result of `POST /analyze`.
///
/// `syntax_errors` and `semantic_info` are kept in detection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub is_valid: bool,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub syntax_errors: Vec<String>,
    #[serde(default)]
    pub semantic_info: Vec<String>,
}

/// Raw measurements reported by the optimized and unoptimized endpoints.
///
/// `execution_time` and `memory_usage` carry their unit inline
/// (`"1500µs"`, `"12 KB"`); see [`crate::metrics`] for normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub execution_time: String,
    pub memory_usage: String,
    pub allocated_bytes: u64,
    pub total_allocs: u64,
    pub gc_cycles: u64,
    pub cpu_usage: f64,
}

impl PerformanceMetrics {
    /// All-zero record used when the analyzer could not be reached.
    pub fn zeroed() -> Self {
        Self {
            execution_time: "0ms".to_string(),
            memory_usage: "0 KB".to_string(),
            allocated_bytes: 0,
            total_allocs: 0,
            gc_cycles: 0,
            cpu_usage: 0.0,
        }
    }
}

/// Result of `POST /analyze-optimized` and `POST /analyze-unoptimized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisWithMetrics {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub metrics: PerformanceMetrics,
}

/// Request body for every analyzer endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest<'a> {
    pub code: &'a str,
}

pub const CONNECTION_ERROR_MESSAGE: &str = "Error de conexión con el servidor";
pub const UNOPTIMIZED_CONNECTION_ERROR_MESSAGE: &str =
    "Error de conexión con el servidor no optimizado";

impl AnalysisResult {
    /// Synthetic payload substituted for a normal analysis that never arrived.
    pub fn connection_failure() -> Self {
        Self {
            is_valid: false,
            tokens: Vec::new(),
            syntax_errors: vec![CONNECTION_ERROR_MESSAGE.to_string()],
            semantic_info: Vec::new(),
        }
    }
}

impl AnalysisWithMetrics {
    /// Synthetic payload substituted for an unoptimized analysis that never arrived.
    pub fn connection_failure() -> Self {
        Self {
            analysis: AnalysisResult {
                is_valid: false,
                tokens: Vec::new(),
                syntax_errors: vec![UNOPTIMIZED_CONNECTION_ERROR_MESSAGE.to_string()],
                semantic_info: Vec::new(),
            },
            metrics: PerformanceMetrics::zeroed(),
        }
    }
}

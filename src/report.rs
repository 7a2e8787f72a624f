// Display-ready view of a session: raw payloads run through the classifiers
use crate::comparison::PerformanceComparison;
use crate::error_classifier::{self, ClassifiedError};
use crate::metrics::{self, Indicator, NormalizedMetrics};
use crate::models::{AnalysisResult, AnalysisWithMetrics, PerformanceMetrics};
use crate::semantic_classifier::SemanticReport;
use crate::session::{InFlight, ResultVariant, SessionState};
use crate::token_classifier::{self, LexicalRow, TokenSummary};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub is_valid: bool,
    pub errors: Vec<ClassifiedError>,
    /// Every token in input order, with its category and location.
    pub lexical: Vec<LexicalRow>,
    pub tokens: TokenSummary,
    pub semantic: SemanticReport,
}

impl AnalysisReport {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            is_valid: result.is_valid,
            errors: error_classifier::classify_all(&result.syntax_errors),
            lexical: token_classifier::lexical_rows(&result.tokens),
            tokens: token_classifier::summarize(&result.tokens),
            semantic: SemanticReport::from_notes(&result.semantic_info),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub execution_time: String,
    pub memory_usage: String,
    pub allocated: String,
    pub bytes_per_alloc: String,
    pub total_allocs: u64,
    pub gc_cycles: u64,
    pub cpu_seconds: f64,
    pub normalized: NormalizedMetrics,
    pub indicators: Vec<Indicator>,
}

impl MetricsReport {
    pub fn from_metrics(raw: &PerformanceMetrics) -> Self {
        Self {
            execution_time: metrics::format_time(&raw.execution_time),
            memory_usage: raw.memory_usage.clone(),
            allocated: metrics::format_bytes(raw.allocated_bytes),
            bytes_per_alloc: metrics::bytes_per_alloc(raw),
            total_allocs: raw.total_allocs,
            gc_cycles: raw.gc_cycles,
            cpu_seconds: raw.cpu_usage,
            normalized: NormalizedMetrics::from_metrics(raw),
            indicators: metrics::indicators(raw),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasuredReport {
    pub analysis: AnalysisReport,
    pub metrics: MetricsReport,
}

impl MeasuredReport {
    pub fn from_result(result: &AnalysisWithMetrics) -> Self {
        Self {
            analysis: AnalysisReport::from_result(&result.analysis),
            metrics: MetricsReport::from_metrics(&result.metrics),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum ReportBody {
    None,
    Normal(AnalysisReport),
    Unoptimized(MeasuredReport),
    Comparison {
        comparison: PerformanceComparison,
        optimized: MetricsReport,
        unoptimized: MetricsReport,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub in_flight: InFlight,
    pub body: ReportBody,
}

impl SessionReport {
    pub fn from_state(state: &SessionState) -> Self {
        let body = match &state.displayed {
            ResultVariant::None => ReportBody::None,
            ResultVariant::Normal(result) => ReportBody::Normal(AnalysisReport::from_result(result)),
            ResultVariant::Unoptimized(result) => {
                ReportBody::Unoptimized(MeasuredReport::from_result(result))
            }
            ResultVariant::Comparison {
                optimized,
                unoptimized,
            } => ReportBody::Comparison {
                comparison: PerformanceComparison::build(&optimized.metrics, &unoptimized.metrics),
                optimized: MetricsReport::from_metrics(&optimized.metrics),
                unoptimized: MetricsReport::from_metrics(&unoptimized.metrics),
            },
        };

        Self {
            in_flight: state.in_flight,
            body,
        }
    }
}

// Optimized vs unoptimized comparison
use crate::metrics::NormalizedMetrics;
use crate::models::PerformanceMetrics;
use serde::Serialize;
use std::fmt;

/// Relative change from the unoptimized to the optimized run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum Improvement {
    /// Optimized is at least as good; percentage is >= 0.
    Better(f64),
    /// Optimized is worse; percentage is the absolute value of the change.
    Worse(f64),
    /// Unoptimized baseline was zero.
    NotApplicable,
}

impl Improvement {
    pub fn compute(optimized: f64, unoptimized: f64) -> Self {
        if unoptimized == 0.0 {
            return Improvement::NotApplicable;
        }
        let change = (unoptimized - optimized) / unoptimized * 100.0;
        if !change.is_finite() {
            return Improvement::NotApplicable;
        }
        if change >= 0.0 {
            Improvement::Better(change)
        } else {
            Improvement::Worse(change.abs())
        }
    }

    pub fn is_worse(&self) -> bool {
        matches!(self, Improvement::Worse(_))
    }

    /// Signed percentage: positive is better, negative is worse.
    pub fn signed(&self) -> Option<f64> {
        match self {
            Improvement::Better(p) => Some(*p),
            Improvement::Worse(p) => Some(-*p),
            Improvement::NotApplicable => None,
        }
    }

    pub fn band(&self) -> Band {
        Band::from_signed(self.signed())
    }
}

impl fmt::Display for Improvement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Improvement::Better(p) => write!(f, "{:.1}%", p),
            Improvement::Worse(p) => write!(f, "{:.1}% worse", p),
            Improvement::NotApplicable => write!(f, "N/A"),
        }
    }
}

/// Presentation weight of an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Strong,
    Moderate,
    Marginal,
    Regression,
    NotApplicable,
}

impl Band {
    pub const STRONG_ABOVE: f64 = 50.0;
    pub const MODERATE_ABOVE: f64 = 25.0;

    pub fn from_signed(signed: Option<f64>) -> Self {
        match signed {
            None => Band::NotApplicable,
            Some(p) if p > Self::STRONG_ABOVE => Band::Strong,
            Some(p) if p > Self::MODERATE_ABOVE => Band::Moderate,
            Some(p) if p >= 0.0 => Band::Marginal,
            Some(_) => Band::Regression,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ExecutionTime,
    MemoryUsage,
    AllocatedBytes,
    Allocations,
}

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::ExecutionTime => "Tiempo de Ejecución",
            MetricKind::MemoryUsage => "Uso de Memoria",
            MetricKind::AllocatedBytes => "Bytes Asignados",
            MetricKind::Allocations => "Asignaciones",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricComparison {
    pub metric: MetricKind,
    pub optimized: f64,
    pub unoptimized: f64,
    pub improvement: Improvement,
    pub band: Band,
    /// Width in percent of the efficiency bar, clamped to 10..=100.
    pub bar_width: f64,
}

impl MetricComparison {
    pub fn new(metric: MetricKind, optimized: f64, unoptimized: f64) -> Self {
        let improvement = Improvement::compute(optimized, unoptimized);
        let bar_width = if unoptimized == 0.0 {
            10.0
        } else {
            (100.0 - optimized / unoptimized * 100.0).clamp(10.0, 100.0)
        };

        Self {
            metric,
            optimized,
            unoptimized,
            improvement,
            band: improvement.band(),
            bar_width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceComparison {
    pub optimized: NormalizedMetrics,
    pub unoptimized: NormalizedMetrics,
    pub rows: Vec<MetricComparison>,
}

impl PerformanceComparison {
    pub fn build(optimized: &PerformanceMetrics, unoptimized: &PerformanceMetrics) -> Self {
        Self::from_normalized(
            NormalizedMetrics::from_metrics(optimized),
            NormalizedMetrics::from_metrics(unoptimized),
        )
    }

    pub fn from_normalized(optimized: NormalizedMetrics, unoptimized: NormalizedMetrics) -> Self {
        let rows = vec![
            MetricComparison::new(
                MetricKind::ExecutionTime,
                optimized.time_ms,
                unoptimized.time_ms,
            ),
            MetricComparison::new(
                MetricKind::MemoryUsage,
                optimized.memory_kb,
                unoptimized.memory_kb,
            ),
            MetricComparison::new(
                MetricKind::AllocatedBytes,
                optimized.allocated_bytes as f64,
                unoptimized.allocated_bytes as f64,
            ),
            MetricComparison::new(
                MetricKind::Allocations,
                optimized.total_allocs as f64,
                unoptimized.total_allocs as f64,
            ),
        ];

        Self {
            optimized,
            unoptimized,
            rows,
        }
    }

    #[allow(dead_code)]
    pub fn get(&self, metric: MetricKind) -> Option<&MetricComparison> {
        self.rows.iter().find(|row| row.metric == metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(time: &str, memory: &str, bytes: u64, allocs: u64) -> PerformanceMetrics {
        PerformanceMetrics {
            execution_time: time.to_string(),
            memory_usage: memory.to_string(),
            allocated_bytes: bytes,
            total_allocs: allocs,
            gc_cycles: 0,
            cpu_usage: 0.0,
        }
    }

    #[test]
    fn test_improvement_sign_convention() {
        assert_eq!(Improvement::compute(100.0, 200.0), Improvement::Better(50.0));
        assert_eq!(Improvement::compute(200.0, 100.0), Improvement::Worse(100.0));
        assert_eq!(Improvement::compute(5.0, 0.0), Improvement::NotApplicable);
        assert_eq!(Improvement::compute(0.0, 0.0), Improvement::NotApplicable);
    }

    #[test]
    fn test_zero_change_is_not_worse() {
        let improvement = Improvement::compute(80.0, 80.0);
        assert_eq!(improvement, Improvement::Better(0.0));
        assert!(!improvement.is_worse());
        assert_eq!(improvement.band(), Band::Marginal);
        assert_eq!(improvement.to_string(), "0.0%");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Improvement::compute(100.0, 200.0).to_string(), "50.0%");
        assert_eq!(Improvement::compute(200.0, 100.0).to_string(), "100.0% worse");
        assert_eq!(Improvement::NotApplicable.to_string(), "N/A");
    }

    #[test]
    fn test_bands() {
        assert_eq!(Band::from_signed(Some(75.0)), Band::Strong);
        assert_eq!(Band::from_signed(Some(50.0)), Band::Moderate);
        assert_eq!(Band::from_signed(Some(30.0)), Band::Moderate);
        assert_eq!(Band::from_signed(Some(25.0)), Band::Marginal);
        assert_eq!(Band::from_signed(Some(0.0)), Band::Marginal);
        assert_eq!(Band::from_signed(Some(-0.5)), Band::Regression);
        assert_eq!(Band::from_signed(None), Band::NotApplicable);
    }

    #[test]
    fn test_build_from_raw_metrics() {
        let optimized = metrics("100ms", "512 KB", 1000, 10);
        let unoptimized = metrics("0.2s", "1 MB", 500, 0);
        let comparison = PerformanceComparison::build(&optimized, &unoptimized);

        let time = comparison.get(MetricKind::ExecutionTime).unwrap();
        assert_eq!(time.improvement, Improvement::Better(50.0));
        assert_eq!(time.band, Band::Moderate);

        let memory = comparison.get(MetricKind::MemoryUsage).unwrap();
        assert_eq!(memory.improvement, Improvement::Better(50.0));

        let bytes = comparison.get(MetricKind::AllocatedBytes).unwrap();
        assert_eq!(bytes.improvement, Improvement::Worse(100.0));
        assert_eq!(bytes.band, Band::Regression);
        assert_eq!(bytes.bar_width, 10.0);

        let allocs = comparison.get(MetricKind::Allocations).unwrap();
        assert_eq!(allocs.improvement, Improvement::NotApplicable);
        assert_eq!(allocs.bar_width, 10.0);
    }

    #[test]
    fn test_degraded_baseline_is_not_applicable() {
        let optimized = metrics("3ms", "1 KB", 0, 0);
        let unoptimized = metrics("garbage", "1 KB", 0, 0);
        let comparison = PerformanceComparison::build(&optimized, &unoptimized);
        assert!(comparison.unoptimized.degraded);
        assert_eq!(
            comparison.get(MetricKind::ExecutionTime).unwrap().improvement,
            Improvement::NotApplicable
        );
    }

    #[test]
    fn test_non_finite_inputs_never_yield_nan() {
        assert_eq!(
            Improvement::compute(f64::INFINITY, f64::INFINITY),
            Improvement::NotApplicable
        );
        assert_eq!(Improvement::compute(f64::NAN, 10.0), Improvement::NotApplicable);

        let huge = format!("{}ms", "9".repeat(400));
        let comparison =
            PerformanceComparison::build(&metrics(&huge, "1 KB", 0, 0), &metrics(&huge, "1 KB", 0, 0));
        let time = comparison.get(MetricKind::ExecutionTime).unwrap();
        assert_eq!(time.improvement, Improvement::NotApplicable);
        assert_eq!(time.improvement.to_string(), "N/A");
    }

    #[test]
    fn test_bar_width_clamped() {
        assert_eq!(MetricComparison::new(MetricKind::Allocations, 0.0, 10.0).bar_width, 100.0);
        assert_eq!(MetricComparison::new(MetricKind::Allocations, 5.0, 10.0).bar_width, 50.0);
        assert_eq!(MetricComparison::new(MetricKind::Allocations, 9.5, 10.0).bar_width, 10.0);
    }
}

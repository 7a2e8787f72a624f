// Metrics normalizer - unit-bearing strings to canonical scales (ms, KB)
use crate::models::PerformanceMetrics;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref TIME_PATTERN: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(ns|µs|μs|us|ms|s)\s*$").unwrap();
    static ref MEMORY_PATTERN: Regex =
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*(GB|MB|KB|B)\s*$").unwrap();
}

const KIB: f64 = 1024.0;

/// Allocated bytes below this count as a low-memory run.
pub const LOW_MEMORY_BYTES: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "ns" => Some(Self::Nanoseconds),
            "µs" | "μs" | "us" => Some(Self::Microseconds),
            "ms" => Some(Self::Milliseconds),
            "s" => Some(Self::Seconds),
            _ => None,
        }
    }

    /// Multiplier to milliseconds
    pub fn to_ms_factor(self) -> f64 {
        match self {
            Self::Nanoseconds => 1e-6,
            Self::Microseconds => 1e-3,
            Self::Milliseconds => 1.0,
            Self::Seconds => 1e3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl MemoryUnit {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "B" => Some(Self::Bytes),
            "KB" => Some(Self::Kilobytes),
            "MB" => Some(Self::Megabytes),
            "GB" => Some(Self::Gigabytes),
            _ => None,
        }
    }

    /// Multiplier to kilobytes
    pub fn to_kb_factor(self) -> f64 {
        match self {
            Self::Bytes => 1.0 / KIB,
            Self::Kilobytes => 1.0,
            Self::Megabytes => KIB,
            Self::Gigabytes => KIB * KIB,
        }
    }
}

/// Digit runs long enough to overflow parse to infinity; treat them as unparseable.
fn parse_finite(digits: &str) -> Option<f64> {
    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Split a time string such as `"2.5s"` into value and unit.
pub fn parse_time(input: &str) -> Option<(f64, TimeUnit)> {
    let caps = TIME_PATTERN.captures(input)?;
    let value = parse_finite(&caps[1])?;
    let unit = TimeUnit::from_symbol(&caps[2])?;
    Some((value, unit))
}

/// Split a memory string such as `"1 MB"` into value and unit.
pub fn parse_memory(input: &str) -> Option<(f64, MemoryUnit)> {
    let caps = MEMORY_PATTERN.captures(input)?;
    let value = parse_finite(&caps[1])?;
    let unit = MemoryUnit::from_symbol(&caps[2])?;
    Some((value, unit))
}

/// Time string to milliseconds. Unparseable input yields 0.
pub fn time_to_ms(input: &str) -> f64 {
    parse_time(input)
        .map(|(value, unit)| value * unit.to_ms_factor())
        .unwrap_or(0.0)
}

/// Memory string to kilobytes. Unparseable input yields 0.
pub fn memory_to_kb(input: &str) -> f64 {
    parse_memory(input)
        .map(|(value, unit)| value * unit.to_kb_factor())
        .unwrap_or(0.0)
}

/// A metrics record on canonical scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedMetrics {
    pub time_ms: f64,
    pub memory_kb: f64,
    pub allocated_bytes: u64,
    pub total_allocs: u64,
    /// Set when either unit-bearing string failed to parse and was zeroed.
    pub degraded: bool,
}

impl NormalizedMetrics {
    pub fn from_metrics(metrics: &PerformanceMetrics) -> Self {
        let degraded = parse_time(&metrics.execution_time).is_none()
            || parse_memory(&metrics.memory_usage).is_none();

        Self {
            time_ms: time_to_ms(&metrics.execution_time),
            memory_kb: memory_to_kb(&metrics.memory_usage),
            allocated_bytes: metrics.allocated_bytes,
            total_allocs: metrics.total_allocs,
            degraded,
        }
    }
}

/// Strip trailing zeros from a two-decimal rendering (`1.50` -> `1.5`, `2.00` -> `2`).
fn trim_decimals(value: f64) -> String {
    let rendered = format!("{:.2}", value);
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Format a byte count with the largest unit that keeps the rounded value at least 1.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= KIB && unit < UNITS.len() - 1 {
        value /= KIB;
        unit += 1;
    }
    // 1023.999 KB would print as "1024 KB"
    if (value * 100.0).round() / 100.0 >= KIB && unit < UNITS.len() - 1 {
        value /= KIB;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), UNITS[unit])
}

/// Re-scale a time string for display. Unparseable input is returned as-is.
pub fn format_time(input: &str) -> String {
    match parse_time(input) {
        Some((value, TimeUnit::Microseconds)) if value < 1000.0 => format!("{:.2} µs", value),
        Some((value, TimeUnit::Microseconds)) => format!("{:.2} ms", value / 1000.0),
        Some((value, TimeUnit::Milliseconds)) if value >= 1000.0 => {
            format!("{:.2} s", value / 1000.0)
        }
        _ => input.to_string(),
    }
}

pub fn bytes_per_alloc(metrics: &PerformanceMetrics) -> String {
    if metrics.total_allocs == 0 {
        return "0 B/alloc".to_string();
    }
    format!(
        "{:.1} B/alloc",
        metrics.allocated_bytes as f64 / metrics.total_allocs as f64
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    LowMemory,
    HighMemory,
    FastExecution,
    SlowExecution,
    NoGarbageCollection,
    GarbageCollectionActive,
}

impl Indicator {
    pub fn label(&self) -> &'static str {
        match self {
            Indicator::LowMemory => "✅ Bajo uso de memoria",
            Indicator::HighMemory => "⚠️ Alto uso de memoria",
            Indicator::FastExecution => "⚡ Ejecución rápida",
            Indicator::SlowExecution => "🐌 Ejecución lenta",
            Indicator::NoGarbageCollection => "🎯 Sin recolección de basura",
            Indicator::GarbageCollectionActive => "🔄 Recolección de basura activa",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            Indicator::LowMemory | Indicator::FastExecution | Indicator::NoGarbageCollection
        )
    }
}

/// Qualitative memory, speed and GC flags for one metrics record.
pub fn indicators(metrics: &PerformanceMetrics) -> Vec<Indicator> {
    let memory = if metrics.allocated_bytes < LOW_MEMORY_BYTES {
        Indicator::LowMemory
    } else {
        Indicator::HighMemory
    };
    let speed = if time_to_ms(&metrics.execution_time) < 1.0 {
        Indicator::FastExecution
    } else {
        Indicator::SlowExecution
    };
    let gc = if metrics.gc_cycles == 0 {
        Indicator::NoGarbageCollection
    } else {
        Indicator::GarbageCollectionActive
    };

    vec![memory, speed, gc]
}

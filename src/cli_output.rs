// Terminal rendering of session reports
use crate::comparison::{Band, Improvement, PerformanceComparison};
use crate::error_classifier::ClassifiedError;
use crate::metrics::Indicator;
use crate::report::{AnalysisReport, MetricsReport, ReportBody, SessionReport};
use crate::semantic_classifier::{SemanticCategory, SemanticReport};
use crate::token_classifier::{LexicalRow, TokenCategory, TokenSummary};
use colored::Colorize;
use comfy_table::presets::{ASCII_FULL, UTF8_FULL};
use comfy_table::Table;
use std::io::{self, IsTerminal};

/// Output mode for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with colors and emojis
    Human,
    /// Machine-readable JSON output
    Json,
    /// Plain text without colors (for pipes/logs)
    Plain,
}

impl OutputMode {
    /// Auto-detect output mode based on environment
    pub fn auto() -> Self {
        if std::env::var("PARSESCOPE_JSON").is_ok() {
            Self::Json
        } else if !io::stdout().is_terminal() {
            Self::Plain
        } else {
            Self::Human
        }
    }
}

/// CLI output writer with mode awareness
pub struct OutputWriter {
    mode: OutputMode,
}

impl OutputWriter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        match self.mode {
            OutputMode::Human => {
                println!();
                println!("{}", title.cyan().bold());
                println!("{}", "═".repeat(title.chars().count()).cyan());
            }
            OutputMode::Plain => {
                println!();
                println!("{}", title);
                println!("{}", "=".repeat(title.chars().count()));
            }
            OutputMode::Json => {}
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "✓".green(), message.green()),
            OutputMode::Plain => println!("  [OK] {}", message),
            OutputMode::Json => {}
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => println!("  {} {}", "✗".red(), message.red()),
            OutputMode::Plain => println!("  [ERROR] {}", message),
            OutputMode::Json => {}
        }
    }

    pub fn info(&self, message: &str) {
        if self.mode != OutputMode::Json {
            println!("  {}", message);
        }
    }

    /// Print a metric
    pub fn metric(&self, label: &str, value: &str) {
        match self.mode {
            OutputMode::Human => println!("    • {}: {}", label, value.green()),
            OutputMode::Plain => println!("    - {}: {}", label, value),
            OutputMode::Json => {}
        }
    }

    /// Print horizontal bar, `percent` in 0..=100
    pub fn bar(&self, label: &str, percent: f64, caption: &str, width: usize) {
        let filled = ((percent / 100.0 * width as f64) as usize).min(width);
        let bar = match self.mode {
            OutputMode::Human => format!(
                "{}{}",
                "█".repeat(filled).green(),
                "░".repeat(width - filled)
            ),
            OutputMode::Plain => format!("{}{}", "#".repeat(filled), "-".repeat(width - filled)),
            OutputMode::Json => return,
        };

        println!("  {:<22} │{} {}", label, bar, caption);
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        match self.mode {
            OutputMode::Human => table.load_preset(UTF8_FULL),
            _ => table.load_preset(ASCII_FULL),
        };
        table
    }

    /// Render a whole session report
    pub fn render_session(&self, report: &SessionReport) -> anyhow::Result<()> {
        if self.mode == OutputMode::Json {
            println!("{}", serde_json::to_string_pretty(report)?);
            return Ok(());
        }

        match &report.body {
            ReportBody::None => {
                self.error("No hay resultados para mostrar");
            }
            ReportBody::Normal(analysis) => {
                self.section("📊 Análisis Normal (Sin métricas)");
                self.render_analysis(analysis);
            }
            ReportBody::Unoptimized(measured) => {
                self.render_metrics(
                    "📊 Análisis No Optimizado - Métricas de Rendimiento",
                    &measured.metrics,
                    false,
                );
                self.section("Estado del Análisis No Optimizado");
                self.validity(measured.analysis.is_valid);
                self.render_errors(&measured.analysis.errors);
            }
            ReportBody::Comparison {
                comparison,
                optimized,
                unoptimized,
            } => {
                self.render_comparison(comparison);
                self.render_metrics("Versión Optimizada", optimized, true);
                self.render_metrics("Versión No Optimizada", unoptimized, false);
            }
        }
        Ok(())
    }

    fn validity(&self, is_valid: bool) {
        if is_valid {
            self.success("Código válido - Sin errores sintácticos ni semánticos");
        } else {
            self.error("Código con errores sintácticos o semánticos");
        }
    }

    fn render_analysis(&self, analysis: &AnalysisReport) {
        self.validity(analysis.is_valid);
        self.render_errors(&analysis.errors);
        self.render_lexical_table(&analysis.lexical, &analysis.tokens);
        self.render_token_listing(&analysis.lexical);
        self.render_token_summary(&analysis.tokens);
        self.render_semantic(&analysis.semantic);
    }

    fn render_errors(&self, errors: &[ClassifiedError]) {
        if errors.is_empty() {
            return;
        }

        let plural = if errors.len() == 1 { "" } else { "es" };
        self.section(&format!("❌ Errores Encontrados ({} error{})", errors.len(), plural));

        for error in errors {
            let header = match error.position_label() {
                Some(position) => format!("{} {} [{}]", error.icon, error.category.label(), position),
                None => format!("{} {}", error.icon, error.category.label()),
            };
            match self.mode {
                OutputMode::Human => println!("  {}", header.red().bold()),
                _ => println!("  {}", header),
            }
            println!("    {}", error.message);
            println!("    💡 Sugerencia:");
            for suggestion in &error.suggestions {
                println!("      • {}", suggestion);
            }
        }
    }

    fn render_lexical_table(&self, rows: &[LexicalRow], summary: &TokenSummary) {
        if rows.is_empty() {
            return;
        }

        self.section("📊 Analizador Léxico");
        let mut table = self.new_table();
        let mut header = vec!["Tokens".to_string()];
        header.extend(TokenCategory::ALL.iter().map(|c| c.short_name().to_string()));
        table.set_header(header);

        for row in rows {
            let mut cells = vec![row.value.clone()];
            cells.extend(TokenCategory::ALL.iter().map(|c| {
                if *c == row.category {
                    "x".to_string()
                } else {
                    String::new()
                }
            }));
            table.add_row(cells);
        }

        let mut totals = vec!["Total".to_string()];
        totals.extend(
            TokenCategory::ALL
                .iter()
                .map(|c| summary.tally.get(*c).to_string()),
        );
        table.add_row(totals);

        println!("{table}");
    }

    fn render_token_listing(&self, rows: &[LexicalRow]) {
        if rows.is_empty() {
            return;
        }

        self.section(&format!("🔤 Tokens Encontrados ({})", rows.len()));
        let mut table = self.new_table();
        table.set_header(vec!["Valor", "Tipo", "Categoría", "Posición", "Línea:Col"]);
        for row in rows {
            table.add_row(vec![
                row.value.clone(),
                row.tag.clone(),
                row.category.label().to_string(),
                row.position.to_string(),
                row.location(),
            ]);
        }
        println!("{table}");
    }

    fn render_token_summary(&self, summary: &TokenSummary) {
        if summary.total == 0 {
            return;
        }

        self.section("🔍 Estadísticas de Tokens");
        self.metric("Total Tokens", &summary.total.to_string());
        self.metric("Identificadores", &summary.identifiers.to_string());
        self.metric("Operadores", &summary.operators.to_string());
        self.metric("Símbolos", &summary.delimiters.to_string());
    }

    fn render_semantic(&self, semantic: &SemanticReport) {
        if semantic.is_empty() {
            return;
        }

        self.section(&format!("🧠 Análisis Semántico ({} análisis)", semantic.notes.len()));
        for note in &semantic.notes {
            let line = format!("{} {}", note.icon, note.message);
            match (self.mode, note.category) {
                (OutputMode::Human, SemanticCategory::Error) => println!("  {}", line.red()),
                (OutputMode::Human, SemanticCategory::Warning) => println!("  {}", line.yellow()),
                (OutputMode::Human, SemanticCategory::Success) => println!("  {}", line.green()),
                _ => println!("  {}", line),
            }
        }

        println!();
        for (category, count) in &semantic.counts {
            self.metric(category.label(), &count.to_string());
        }
        self.metric("Variables", &semantic.variable_mentions.to_string());
        if let Some(iterations) = &semantic.iterations {
            self.info(&format!("🔢 Complejidad: {}", iterations));
        }
    }

    fn render_metrics(&self, title: &str, metrics: &MetricsReport, optimized: bool) {
        let icon = if optimized { "🚀" } else { "🐌" };
        self.section(&format!("{} {}", icon, title));
        self.metric("Tiempo de Ejecución", &metrics.execution_time);
        self.metric("Uso de Memoria", &metrics.memory_usage);
        self.metric("Memoria Asignada", &metrics.allocated);
        self.metric("Asignaciones Totales", &metrics.total_allocs.to_string());
        self.metric("Ciclos de GC", &metrics.gc_cycles.to_string());
        self.metric("Uso de CPU", &format!("{:.6}s", metrics.cpu_seconds));
        self.metric("Bytes por Asignación", &metrics.bytes_per_alloc);
        if metrics.normalized.degraded {
            self.info("⚠️ Medición incompleta: unidades no reconocidas");
        }

        let labels: Vec<String> = metrics
            .indicators
            .iter()
            .map(|indicator| self.indicator(indicator))
            .collect();
        self.info(&format!("Indicadores: {}", labels.join("  ")));
    }

    fn indicator(&self, indicator: &Indicator) -> String {
        match self.mode {
            OutputMode::Human if indicator.is_positive() => indicator.label().green().to_string(),
            OutputMode::Human => indicator.label().yellow().to_string(),
            _ => indicator.label().to_string(),
        }
    }

    fn render_comparison(&self, comparison: &PerformanceComparison) {
        self.section("⚖️ Comparación de Rendimiento");

        let mut table = self.new_table();
        table.set_header(vec!["Métrica", "Optimizado", "No Optimizado", "Mejora"]);
        for row in &comparison.rows {
            table.add_row(vec![
                row.metric.label().to_string(),
                format!("{:.3}", row.optimized),
                format!("{:.3}", row.unoptimized),
                self.improvement(&row.improvement, row.band),
            ]);
        }
        println!("{table}");

        println!();
        for row in &comparison.rows {
            let caption = format!("{} mejora", row.improvement);
            self.bar(row.metric.label(), row.bar_width, &caption, 30);
        }
    }

    fn improvement(&self, improvement: &Improvement, band: Band) -> String {
        let marker = if improvement.is_worse() { "🔻" } else { "🚀" };
        let text = format!("{} {}", marker, improvement);
        if self.mode != OutputMode::Human {
            return text;
        }
        match band {
            Band::Strong => text.green().bold().to_string(),
            Band::Moderate => text.green().to_string(),
            Band::Marginal => text.bright_green().to_string(),
            Band::Regression => text.red().to_string(),
            Band::NotApplicable => text.dimmed().to_string(),
        }
    }
}

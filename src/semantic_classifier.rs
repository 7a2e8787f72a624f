// Semantic note classifier
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticCategory {
    Error,
    Warning,
    Success,
    Info,
    Analysis,
    Structure,
    General,
}

impl SemanticCategory {
    pub fn icon(&self) -> &'static str {
        match self {
            SemanticCategory::Error => "❌",
            SemanticCategory::Warning => "⚠️",
            SemanticCategory::Success => "✅",
            SemanticCategory::Info => "📝",
            SemanticCategory::Analysis => "🔄",
            SemanticCategory::Structure => "🏗️",
            SemanticCategory::General => "ℹ️",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SemanticCategory::Error => "Errores",
            SemanticCategory::Warning => "Advertencias",
            SemanticCategory::Success => "Validaciones",
            SemanticCategory::Info => "Declaraciones",
            SemanticCategory::Analysis => "Bucles",
            SemanticCategory::Structure => "Estructura",
            SemanticCategory::General => "General",
        }
    }
}

/// Each predicate receives the lowercased note.
type Predicate = fn(&str) -> bool;

const ERROR_PREFIXES: &[&str] = &["error:", "error semántico"];

fn has_error_marker(note: &str) -> bool {
    let trimmed = note.trim_start();
    note.contains('❌') || ERROR_PREFIXES.iter().any(|p| trimmed.starts_with(p))
}

fn has_warning_marker(note: &str) -> bool {
    note.contains('⚠') || note.contains("advertencia") || note.contains("posible")
}

fn has_success_marker(note: &str) -> bool {
    note.contains('✓')
        || note.contains('✅')
        || note.contains("válida")
        || note.contains("correctamente")
}

fn mentions_declaration(note: &str) -> bool {
    note.contains("variable") && note.contains("declarada")
}

fn mentions_loop(note: &str) -> bool {
    note.contains("bucle")
        || note
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "for")
}

fn mentions_control_flow(note: &str) -> bool {
    note.contains("incremento") || note.contains("condición")
}

const RULES: &[(Predicate, SemanticCategory)] = &[
    (has_error_marker, SemanticCategory::Error),
    (has_warning_marker, SemanticCategory::Warning),
    (has_success_marker, SemanticCategory::Success),
    (mentions_declaration, SemanticCategory::Info),
    (mentions_loop, SemanticCategory::Analysis),
    (mentions_control_flow, SemanticCategory::Structure),
];

pub fn classify(note: &str) -> SemanticCategory {
    let lower = note.to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(&lower))
        .map(|(_, category)| *category)
        .unwrap_or(SemanticCategory::General)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticNote {
    pub message: String,
    pub category: SemanticCategory,
    pub icon: &'static str,
}

/// Classified notes plus the aggregates shown in the semantic panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticReport {
    pub notes: Vec<SemanticNote>,
    pub counts: BTreeMap<SemanticCategory, usize>,
    pub variable_mentions: usize,
    /// First note reporting an iteration count, if any.
    pub iterations: Option<String>,
}

impl SemanticReport {
    pub fn from_notes(notes: &[String]) -> Self {
        let mut counts = BTreeMap::new();
        let mut classified = Vec::with_capacity(notes.len());

        for note in notes {
            let category = classify(note);
            *counts.entry(category).or_insert(0) += 1;
            classified.push(SemanticNote {
                message: note.clone(),
                category,
                icon: category.icon(),
            });
        }

        let variable_mentions = notes
            .iter()
            .filter(|n| n.to_lowercase().contains("variable"))
            .count();
        let iterations = notes
            .iter()
            .find(|n| n.to_lowercase().contains("iteraciones"))
            .cloned();

        Self {
            notes: classified,
            counts,
            variable_mentions,
            iterations,
        }
    }

    #[allow(dead_code)]
    pub fn count(&self, category: SemanticCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

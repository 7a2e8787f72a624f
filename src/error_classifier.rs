// Syntax error classifier - category, source position and fix suggestions
//
// The analyzer reports diagnostics as free text in a small fixed vocabulary.
// Rules are evaluated top to bottom and the first match wins.
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref LINE_PATTERN: Regex = Regex::new(r"(?i)l[íi]nea\s+(\d+)").unwrap();
    static ref COLUMN_PATTERN: Regex = Regex::new(r"(?i)columna\s+(\d+)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Syntactic,
    Eof,
    Connection,
    Lexical,
    General,
}

impl ErrorCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Syntactic => "Error Sintáctico",
            ErrorCategory::Eof => "Error EOF",
            ErrorCategory::Connection => "Error de Conexión",
            ErrorCategory::Lexical => "Error Léxico",
            ErrorCategory::General => "Error General",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ErrorCategory::Syntactic => "⚠️",
            ErrorCategory::Eof => "🔚",
            ErrorCategory::Connection => "🔌",
            ErrorCategory::Lexical => "🔤",
            ErrorCategory::General => "❌",
        }
    }
}

/// Matches when the lowercased message contains any of the phrases.
struct CategoryRule {
    category: ErrorCategory,
    any_of: &'static [&'static str],
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: ErrorCategory::Syntactic,
        any_of: &["se esperaba"],
    },
    CategoryRule {
        category: ErrorCategory::Eof,
        any_of: &["se llegó al final"],
    },
    CategoryRule {
        category: ErrorCategory::Connection,
        any_of: &["conexión", "servidor"],
    },
    CategoryRule {
        category: ErrorCategory::Lexical,
        any_of: &["mal formado", "número"],
    },
];

/// Matches when every phrase in `all_of` and at least one in `any_of` is present.
struct SuggestionRule {
    all_of: &'static [&'static str],
    any_of: &'static [&'static str],
    suggestions: &'static [&'static str],
}

const SUGGESTION_RULES: &[SuggestionRule] = &[
    SuggestionRule {
        all_of: &["se esperaba"],
        any_of: &["semicolon", "';'", "punto y coma"],
        suggestions: &["Agrega un punto y coma (;) al final de la declaración"],
    },
    SuggestionRule {
        all_of: &["se esperaba"],
        any_of: &["identifier", "identificador"],
        suggestions: &[
            "Verifica que el nombre de la variable sea válido",
            "Los identificadores deben comenzar con letra o _",
        ],
    },
    SuggestionRule {
        all_of: &["se esperaba"],
        any_of: &["rbrace", "'}'"],
        suggestions: &[
            "Verifica que todas las llaves estén balanceadas {}",
            "Cada { debe tener su correspondiente }",
        ],
    },
    SuggestionRule {
        all_of: &["se esperaba"],
        any_of: &["assignment", "'='"],
        suggestions: &["Agrega el operador de asignación (=) en la declaración"],
    },
    SuggestionRule {
        all_of: &[],
        any_of: &["mal formado"],
        suggestions: &[
            "Verifica que el número no contenga letras",
            "Los números deben ser solo dígitos y opcionalmente un punto decimal",
        ],
    },
    SuggestionRule {
        all_of: &[],
        any_of: &["tipo"],
        suggestions: &["Declara la variable con un tipo válido (number, string, boolean)"],
    },
];

const GENERIC_SUGGESTIONS: &[&str] = &[
    "Revisa la sintaxis del código",
    "Verifica que la estructura de bloques y sentencias sea correcta",
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

pub fn classify(message: &str) -> ErrorCategory {
    let lower = message.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| contains_any(&lower, rule.any_of))
        .map(|rule| rule.category)
        .unwrap_or(ErrorCategory::General)
}

fn capture_number(pattern: &Regex, message: &str) -> Option<u32> {
    pattern
        .captures(message)
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

/// Extract `(line, column)` from a "línea N, columna M" fragment.
pub fn position(message: &str) -> (Option<u32>, Option<u32>) {
    (
        capture_number(&LINE_PATTERN, message),
        capture_number(&COLUMN_PATTERN, message),
    )
}

/// Fix suggestions for a message. Never empty.
pub fn suggestions(message: &str) -> Vec<&'static str> {
    let lower = message.to_lowercase();
    SUGGESTION_RULES
        .iter()
        .find(|rule| {
            rule.all_of.iter().all(|needle| lower.contains(needle))
                && contains_any(&lower, rule.any_of)
        })
        .map(|rule| rule.suggestions)
        .unwrap_or(GENERIC_SUGGESTIONS)
        .to_vec()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedError {
    pub message: String,
    pub category: ErrorCategory,
    pub icon: &'static str,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub suggestions: Vec<&'static str>,
}

impl ClassifiedError {
    pub fn from_message(message: &str) -> Self {
        let category = classify(message);
        let (line, column) = position(message);
        Self {
            message: message.to_string(),
            category,
            icon: category.icon(),
            line,
            column,
            suggestions: suggestions(message),
        }
    }

    /// `"Línea 3 - Columna 10"`, or whichever half is known.
    pub fn position_label(&self) -> Option<String> {
        match (self.line, self.column) {
            (Some(line), Some(column)) => Some(format!("Línea {} - Columna {}", line, column)),
            (Some(line), None) => Some(format!("Línea {}", line)),
            (None, Some(column)) => Some(format!("Columna {}", column)),
            (None, None) => None,
        }
    }
}

/// Errors in detection order, classified.
pub fn classify_all(messages: &[String]) -> Vec<ClassifiedError> {
    messages
        .iter()
        .map(|m| ClassifiedError::from_message(m))
        .collect()
}

// Token classifier - lexical categories and tallies
use crate::models::Token;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    ReservedWord,
    Identifier,
    Number,
    Symbol,
    Error,
}

impl TokenCategory {
    pub const ALL: [TokenCategory; 5] = [
        TokenCategory::ReservedWord,
        TokenCategory::Identifier,
        TokenCategory::Number,
        TokenCategory::Symbol,
        TokenCategory::Error,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TokenCategory::ReservedWord => "Palabra Reservada",
            TokenCategory::Identifier => "Identificador",
            TokenCategory::Number => "Número",
            TokenCategory::Symbol => "Símbolo",
            TokenCategory::Error => "Error",
        }
    }

    /// Column header used in the lexical table
    pub fn short_name(&self) -> &'static str {
        match self {
            TokenCategory::ReservedWord => "PR",
            TokenCategory::Identifier => "ID",
            TokenCategory::Number => "Números",
            TokenCategory::Symbol => "Símbolos",
            TokenCategory::Error => "Error",
        }
    }
}

/// Tag -> category table. Tags missing here are symbols.
const CATEGORY_TABLE: &[(&str, TokenCategory)] = &[
    ("FOR", TokenCategory::ReservedWord),
    ("DO", TokenCategory::ReservedWord),
    ("WHILE", TokenCategory::ReservedWord),
    ("KEYWORD", TokenCategory::ReservedWord),
    ("TYPE", TokenCategory::ReservedWord),
    ("LET", TokenCategory::ReservedWord),
    ("CONST", TokenCategory::ReservedWord),
    ("IDENTIFIER", TokenCategory::Identifier),
    ("NUMBER", TokenCategory::Number),
    ("UNKNOWN", TokenCategory::Error),
];

const OPERATOR_TAGS: &[&str] = &["OPERATOR", "COMPARISON", "ASSIGNMENT", "INCREMENT"];
const DELIMITER_TAGS: &[&str] = &["LPAREN", "RPAREN", "LBRACE", "RBRACE", "SEMICOLON"];

pub fn classify_tag(tag: &str) -> TokenCategory {
    CATEGORY_TABLE
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, category)| *category)
        .unwrap_or(TokenCategory::Symbol)
}

pub fn classify(token: &Token) -> TokenCategory {
    classify_tag(&token.kind)
}

/// Per-category counts over a token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTally {
    counts: BTreeMap<TokenCategory, usize>,
}

impl TokenTally {
    pub fn from_tokens<'a, I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a Token>,
    {
        let mut counts: BTreeMap<TokenCategory, usize> =
            TokenCategory::ALL.iter().map(|c| (*c, 0)).collect();

        for token in tokens {
            *counts.entry(classify(token)).or_insert(0) += 1;
        }

        Self { counts }
    }

    pub fn get(&self, category: TokenCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    #[allow(dead_code)]
    pub fn iter(&self) -> impl Iterator<Item = (TokenCategory, usize)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}

/// One row of the lexical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LexicalRow {
    pub value: String,
    pub tag: String,
    pub category: TokenCategory,
    pub position: usize,
    pub line: usize,
    pub column: usize,
}

impl LexicalRow {
    /// `line:column` as shown in the token listing
    pub fn location(&self) -> String {
        format!("{}:{}", self.line, self.column)
    }
}

pub fn lexical_rows(tokens: &[Token]) -> Vec<LexicalRow> {
    tokens
        .iter()
        .map(|token| LexicalRow {
            value: token.value.clone(),
            tag: token.kind.clone(),
            category: classify(token),
            position: token.position,
            line: token.line,
            column: token.column,
        })
        .collect()
}

/// Display summary shown under the token list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    pub total: usize,
    pub identifiers: usize,
    pub operators: usize,
    pub delimiters: usize,
    pub tally: TokenTally,
}

pub fn summarize(tokens: &[Token]) -> TokenSummary {
    let tally = TokenTally::from_tokens(tokens);
    let operators = tokens
        .iter()
        .filter(|t| OPERATOR_TAGS.contains(&t.kind.as_str()))
        .count();
    let delimiters = tokens
        .iter()
        .filter(|t| DELIMITER_TAGS.contains(&t.kind.as_str()))
        .count();

    TokenSummary {
        total: tokens.len(),
        identifiers: tally.get(TokenCategory::Identifier),
        operators,
        delimiters,
        tally,
    }
}

//! Tokenizer for the search query language.
//!
//! # Syntax Overview
//!
//! A query is a whitespace-separated list of parts:
//!
//! - **Boolean**: `AND`, `OR`
//! - **Parentheses**: `(`, `)`
//! - **Filters**: `key:value`, `key:!value`, `key:>=10`, `key:"two words"`, `key:[a,b]`
//! - **Free text**: anything else

use serde::Serialize;

use super::token::{BooleanOp, FilterToken, FilterValue, Operator, Paren, Token, TokenKind};

/// Derived view over a token sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedQuery {
    /// All tokens in order.
    pub tokens: Vec<Token>,
    /// Values of the free-text tokens.
    pub free_text: Vec<String>,
    /// Filter tokens in order.
    pub filters: Vec<FilterToken>,
}

impl ParsedQuery {
    /// Build the view from a token sequence.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut free_text = Vec::new();
        let mut filters = Vec::new();
        for token in &tokens {
            match &token.kind {
                TokenKind::FreeText { value } => free_text.push(value.clone()),
                TokenKind::Filter(filter) => filters.push(filter.clone()),
                TokenKind::Boolean { .. } | TokenKind::Paren { .. } => {}
            }
        }
        Self {
            tokens,
            free_text,
            filters,
        }
    }

    /// Check if the query has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Tokenize a query string. Never fails.
pub fn tokenize(query: &str) -> ParsedQuery {
    let tokens = split_parts(query)
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            let kind = classify(&part);
            Token::new(format!("{}_{}", kind.type_name(), i), kind)
        })
        .collect();
    ParsedQuery::from_tokens(tokens)
}

/// Split on whitespace outside quoted spans.
///
/// A `"` or `'` opens a span that only the same character closes. An
/// unterminated span runs to the end of the input.
fn split_parts(input: &str) -> Vec<String> {
    scan_parts(input).0
}

/// Split like [`split_parts`], also reporting whether a quote was left open.
fn scan_parts(input: &str) -> (Vec<String>, bool) {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
            }
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            None => current.push(c),
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    (parts, quote.is_some())
}

/// Check that `text` reads back as exactly `filter`, as a single part.
///
/// With `require_closed`, text that leaves a quote open is rejected: it
/// would swallow whatever follows it.
pub(super) fn reads_back_as(text: &str, filter: &FilterToken, require_closed: bool) -> bool {
    let (parts, open_quote) = scan_parts(text);
    if require_closed && open_quote {
        return false;
    }
    match parts.as_slice() {
        [part] => try_parse_filter(part).as_ref() == Some(filter),
        _ => false,
    }
}

/// Classify one part.
fn classify(part: &str) -> TokenKind {
    match part {
        "AND" => TokenKind::Boolean {
            value: BooleanOp::And,
        },
        "OR" => TokenKind::Boolean {
            value: BooleanOp::Or,
        },
        "(" => TokenKind::Paren { value: Paren::Open },
        ")" => TokenKind::Paren {
            value: Paren::Close,
        },
        _ => match try_parse_filter(part) {
            Some(filter) => TokenKind::Filter(filter),
            None => TokenKind::FreeText {
                value: part.to_string(),
            },
        },
    }
}

/// Try to parse a filter part (`key:[!][op]value`).
fn try_parse_filter(part: &str) -> Option<FilterToken> {
    let (key, raw_value) = part.split_once(':')?;

    let (negated, rest) = match raw_value.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, raw_value),
    };

    // Two-char operators before one-char
    let (operator, rest) = if let Some(rest) = rest.strip_prefix(">=") {
        (Operator::Gte, rest)
    } else if let Some(rest) = rest.strip_prefix("<=") {
        (Operator::Lte, rest)
    } else if let Some(rest) = rest.strip_prefix('>') {
        (Operator::Gt, rest)
    } else if let Some(rest) = rest.strip_prefix('<') {
        (Operator::Lt, rest)
    } else {
        (Operator::Eq, rest)
    };

    Some(FilterToken {
        filter_key: key.to_string(),
        operator,
        value: parse_value(rest),
        negated,
    })
}

/// Decode quoting and array syntax of a filter value.
fn parse_value(raw: &str) -> FilterValue {
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);

    if let Some(inner) = unquoted.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        if inner.trim().is_empty() {
            return FilterValue::List(Vec::new());
        }
        return FilterValue::List(inner.split(',').map(|v| v.trim().to_string()).collect());
    }

    FilterValue::Single(unquoted.to_string())
}

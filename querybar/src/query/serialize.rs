//! Serializer: token sequence back to canonical query text.

use super::parser::reads_back_as;
use super::token::{FilterToken, FilterValue, Operator, Token, TokenKind};

/// Render tokens as query text, joined by single spaces.
pub fn stringify(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| stringify_kind(&token.kind))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one token's content.
pub fn stringify_kind(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Filter(filter) => stringify_filter(filter),
        TokenKind::FreeText { value } => value.clone(),
        TokenKind::Boolean { value } => value.as_str().to_string(),
        TokenKind::Paren { value } => value.as_str().to_string(),
    }
}

fn stringify_filter(filter: &FilterToken) -> String {
    let mut prefix = String::with_capacity(filter.filter_key.len() + 4);
    prefix.push_str(&filter.filter_key);
    prefix.push(':');
    if filter.negated {
        prefix.push('!');
    }
    if filter.operator != Operator::Eq {
        prefix.push_str(filter.operator.as_str());
    }

    let value = match &filter.value {
        FilterValue::List(items) => format!("[{}]", items.join(",")),
        FilterValue::Single(value) => value.clone(),
    };
    let plain = format!("{}{}", prefix, value);
    let quoted = format!("{}\"{}\"", prefix, value);

    // Plain text wins when it reads back unchanged; an open quote is only
    // acceptable when neither form closes.
    let chosen = [(&plain, true), (&quoted, true), (&plain, false), (&quoted, false)]
        .into_iter()
        .find(|&(text, require_closed)| reads_back_as(text, filter, require_closed))
        .map(|(text, _)| text);
    chosen.unwrap_or(&plain).clone()
}

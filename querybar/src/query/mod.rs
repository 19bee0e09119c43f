//! Query tokenizer, serializer and validator.
//!
//! # Syntax Overview
//!
//! - **Filters**: `key:value` with optional `!` negation, `>`, `<`, `>=`, `<=`
//!   operators, `"quoted values"` and `[a,b]` lists
//! - **Boolean**: `AND` / `OR`
//! - **Grouping**: `(` / `)`
//! - **Free text**: any other whitespace-delimited part

mod parser;
mod serialize;
mod token;
mod validate;

pub use parser::{tokenize, ParsedQuery};
pub use serialize::{stringify, stringify_kind};
pub use token::{
    BooleanOp, FilterToken, FilterValue, Operator, Paren, Token, TokenKind, UnknownOperator,
};
pub use validate::{annotate, validate, FILTER_KEY_REQUIRED, FILTER_VALUE_REQUIRED, FREE_TEXT_EMPTY};

#[cfg(test)]
mod tests;

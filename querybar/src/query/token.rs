//! Token model shared by the tokenizer, serializer and editor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One atomic editable unit of a query.
///
/// `key` identifies the token for UI reconciliation and is unique within a
/// sequence. It is not part of the token's content: compare `kind` when you
/// care about what the token means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Stable identity string.
    pub key: String,
    /// Last validation failure, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid: Option<String>,
    /// What the token is.
    #[serde(flatten)]
    pub kind: TokenKind,
}

/// The four token variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenKind {
    /// `key:[!][op]value`
    Filter(FilterToken),
    /// Bare word.
    FreeText { value: String },
    /// `AND` / `OR`
    Boolean { value: BooleanOp },
    /// `(` / `)`
    Paren { value: Paren },
}

/// Filter constraint on a field, tag or measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterToken {
    pub filter_key: String,
    #[serde(default)]
    pub operator: Operator,
    pub value: FilterValue,
    #[serde(default)]
    pub negated: bool,
}

/// Filter value: a single string or an `[a,b,c]` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Single(String),
    List(Vec<String>),
}

/// Boolean connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOp {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

/// Grouping parenthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Paren {
    #[serde(rename = "(")]
    Open,
    #[serde(rename = ")")]
    Close,
}

/// Comparison operators for filter tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    /// `=` equals
    #[default]
    #[serde(rename = "=")]
    Eq,
    /// `!=` not equals
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "does_not_contain")]
    DoesNotContain,
    #[serde(rename = "starts_with")]
    StartsWith,
    #[serde(rename = "ends_with")]
    EndsWith,
    /// `>` greater than
    #[serde(rename = ">")]
    Gt,
    /// `>=` greater or equal
    #[serde(rename = ">=")]
    Gte,
    /// `<` less than
    #[serde(rename = "<")]
    Lt,
    /// `<=` less or equal
    #[serde(rename = "<=")]
    Lte,
}

impl Operator {
    /// Every operator in operator-menu order.
    pub const ALL: [Operator; 10] = [
        Operator::Eq,
        Operator::NotEq,
        Operator::Contains,
        Operator::DoesNotContain,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
    ];

    /// Query text for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Contains => "contains",
            Operator::DoesNotContain => "does_not_contain",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }

    /// Human-readable menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Eq => "equals",
            Operator::NotEq => "does not equal",
            Operator::Contains => "contains",
            Operator::DoesNotContain => "does not contain",
            Operator::StartsWith => "starts with",
            Operator::EndsWith => "ends with",
            Operator::Gt => "greater than",
            Operator::Gte => "greater than or equal",
            Operator::Lt => "less than",
            Operator::Lte => "less than or equal",
        }
    }

    /// One-line explanation shown under the label.
    pub fn description(&self) -> &'static str {
        match self {
            Operator::Eq => "Exact match",
            Operator::NotEq => "Not an exact match",
            Operator::Contains => "Contains the text",
            Operator::DoesNotContain => "Does not contain the text",
            Operator::StartsWith => "Begins with the text",
            Operator::EndsWith => "Ends with the text",
            Operator::Gt => "Numerically greater",
            Operator::Gte => "Numerically greater or equal",
            Operator::Lt => "Numerically less",
            Operator::Lte => "Numerically less or equal",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when text does not name an operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator: {0}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

impl BooleanOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOp::And => "AND",
            BooleanOp::Or => "OR",
        }
    }

    /// The other connective.
    pub fn toggled(self) -> Self {
        match self {
            BooleanOp::And => BooleanOp::Or,
            BooleanOp::Or => BooleanOp::And,
        }
    }
}

impl Paren {
    pub fn as_str(&self) -> &'static str {
        match self {
            Paren::Open => "(",
            Paren::Close => ")",
        }
    }
}

impl FilterValue {
    /// True for `""` and `[]`.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Single(s) => s.is_empty(),
            FilterValue::List(items) => items.is_empty(),
        }
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Single(String::new())
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Single(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Single(s)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(items: Vec<String>) -> Self {
        FilterValue::List(items)
    }
}

impl FilterToken {
    /// `key=value` filter with the default operator.
    pub fn new(filter_key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            filter_key: filter_key.into(),
            operator: Operator::Eq,
            value: value.into(),
            negated: false,
        }
    }

    /// Set the comparison operator.
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    /// Mark the filter as negated.
    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }
}

impl TokenKind {
    /// Type name used as the key prefix (`filter_3`, `freetext_0`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            TokenKind::Filter(_) => "filter",
            TokenKind::FreeText { .. } => "freetext",
            TokenKind::Boolean { .. } => "boolean",
            TokenKind::Paren { .. } => "paren",
        }
    }

    pub fn is_filter(&self) -> bool {
        matches!(self, TokenKind::Filter(_))
    }
}

impl Token {
    /// Token with an explicit key.
    pub fn new(key: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            key: key.into(),
            invalid: None,
            kind,
        }
    }

    /// Token with no key yet; the editor assigns one on insertion.
    pub fn unkeyed(kind: TokenKind) -> Self {
        Self::new(String::new(), kind)
    }

    pub fn filter(filter: FilterToken) -> Self {
        Self::unkeyed(TokenKind::Filter(filter))
    }

    pub fn free_text(value: impl Into<String>) -> Self {
        Self::unkeyed(TokenKind::FreeText {
            value: value.into(),
        })
    }

    pub fn boolean(value: BooleanOp) -> Self {
        Self::unkeyed(TokenKind::Boolean { value })
    }

    pub fn paren(value: Paren) -> Self {
        Self::unkeyed(TokenKind::Paren { value })
    }

    /// The filter payload, if this is a filter token.
    pub fn as_filter(&self) -> Option<&FilterToken> {
        match &self.kind {
            TokenKind::Filter(filter) => Some(filter),
            _ => None,
        }
    }
}

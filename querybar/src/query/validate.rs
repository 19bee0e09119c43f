//! Advisory token validation.

use super::token::{Token, TokenKind};

pub const FILTER_KEY_REQUIRED: &str = "Filter key is required";
pub const FILTER_VALUE_REQUIRED: &str = "Filter value is required";
pub const FREE_TEXT_EMPTY: &str = "Free text cannot be empty";

/// Return the reason a token is invalid, or `None`.
pub fn validate(token: &Token) -> Option<&'static str> {
    match &token.kind {
        TokenKind::Filter(filter) => {
            if filter.filter_key.is_empty() {
                Some(FILTER_KEY_REQUIRED)
            } else if filter.value.is_empty() {
                Some(FILTER_VALUE_REQUIRED)
            } else {
                None
            }
        }
        TokenKind::FreeText { value } if value.trim().is_empty() => Some(FREE_TEXT_EMPTY),
        TokenKind::FreeText { .. } | TokenKind::Boolean { .. } | TokenKind::Paren { .. } => None,
    }
}

/// Record the validation result on the token.
pub fn annotate(token: &mut Token) {
    token.invalid = validate(token).map(str::to_string);
}

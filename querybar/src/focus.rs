//! Focus model and keyboard navigation.
//!
//! Focus positions form one linear sequence:
//!
//! ```text
//! Input(0) Token(0).part(0..=3) Input(1) Token(1).part(0..=3) ... Input(n)
//! ```
//!
//! Parts of a filter token are key, operator, value and the remove control.
//! Other token kinds only have part 0 and the remove control (part 3).

use serde::{Deserialize, Serialize};

use crate::query::Token;

/// Key part of a filter token.
pub const KEY_PART: usize = 0;
/// Operator part of a filter token.
pub const OPERATOR_PART: usize = 1;
/// Value part of a filter token.
pub const VALUE_PART: usize = 2;
/// Remove control, present on every token.
pub const REMOVE_PART: usize = 3;

/// Where the caret is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FocusState {
    /// Gap before token `input_index` (or after the last token).
    Input { input_index: usize },
    /// Part `part_index` of token `token_index`.
    TokenPart {
        token_index: usize,
        part_index: usize,
    },
}

/// Horizontal navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
}

impl Default for FocusState {
    fn default() -> Self {
        FocusState::Input { input_index: 0 }
    }
}

impl FocusState {
    pub fn input(input_index: usize) -> Self {
        FocusState::Input { input_index }
    }

    pub fn part(token_index: usize, part_index: usize) -> Self {
        FocusState::TokenPart {
            token_index,
            part_index,
        }
    }

    /// Check the focus invariants against a token count.
    pub fn is_valid_for(&self, token_count: usize) -> bool {
        match *self {
            FocusState::Input { input_index } => input_index <= token_count,
            FocusState::TokenPart {
                token_index,
                part_index,
            } => token_index < token_count && part_index <= REMOVE_PART,
        }
    }

    /// Pull an out-of-range focus back into range.
    ///
    /// Token-part focus past the end falls back to the trailing gap.
    pub fn clamped(self, token_count: usize) -> Self {
        match self {
            FocusState::Input { input_index } => FocusState::input(input_index.min(token_count)),
            FocusState::TokenPart { token_index, .. } if token_index >= token_count => {
                FocusState::input(token_count)
            }
            FocusState::TokenPart {
                token_index,
                part_index,
            } => FocusState::part(token_index, part_index.min(REMOVE_PART)),
        }
    }
}

/// Next focus position in the linear four-parts-per-token model.
pub fn next(focus: FocusState, token_count: usize, direction: Direction) -> FocusState {
    match (focus, direction) {
        (FocusState::Input { input_index }, Direction::Right) => {
            if input_index < token_count {
                FocusState::part(input_index, KEY_PART)
            } else {
                focus
            }
        }
        (FocusState::Input { input_index }, Direction::Left) => {
            if input_index > 0 {
                FocusState::part(input_index - 1, REMOVE_PART)
            } else {
                focus
            }
        }
        (
            FocusState::TokenPart {
                token_index,
                part_index,
            },
            Direction::Right,
        ) => {
            if part_index < REMOVE_PART {
                FocusState::part(token_index, part_index + 1)
            } else {
                FocusState::input(token_index + 1)
            }
        }
        (
            FocusState::TokenPart {
                token_index,
                part_index,
            },
            Direction::Left,
        ) => {
            if part_index > 0 {
                FocusState::part(token_index, part_index - 1)
            } else {
                FocusState::input(token_index)
            }
        }
    }
}

/// Next focus position, skipping the operator and value parts of tokens
/// that have none.
///
/// With `skip_inert_parts` off this is exactly [`next`].
pub fn next_for_tokens(
    focus: FocusState,
    tokens: &[Token],
    direction: Direction,
    skip_inert_parts: bool,
) -> FocusState {
    if !skip_inert_parts {
        return next(focus, tokens.len(), direction);
    }

    match focus {
        FocusState::TokenPart {
            token_index,
            part_index,
        } if tokens
            .get(token_index)
            .is_some_and(|token| !token.kind.is_filter()) =>
        {
            match (direction, part_index) {
                (Direction::Right, REMOVE_PART) => FocusState::input(token_index + 1),
                (Direction::Right, _) => FocusState::part(token_index, REMOVE_PART),
                (Direction::Left, KEY_PART) => FocusState::input(token_index),
                (Direction::Left, _) => FocusState::part(token_index, KEY_PART),
            }
        }
        _ => next(focus, tokens.len(), direction),
    }
}

/// Repair focus after the token at `removed` was deleted.
///
/// Focus on the removed token moves to the gap it left. Focus on a later
/// token shifts down by one. Gap focus keeps its index, clamped to the new
/// token count.
pub fn after_removal(focus: FocusState, removed: usize, token_count: usize) -> FocusState {
    let repaired = match focus {
        FocusState::TokenPart { token_index, .. } if token_index == removed => {
            FocusState::input(removed)
        }
        FocusState::TokenPart {
            token_index,
            part_index,
        } if token_index > removed => FocusState::part(token_index - 1, part_index),
        other => other,
    };
    repaired.clamped(token_count)
}

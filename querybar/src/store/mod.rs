//! Query builder state and its reducer.
//!
//! [`reduce`] is a pure `(state, action) -> state` transition. It keeps the
//! state invariants: `query` and `parsed_query` are always derived from
//! `tokens`, token keys are unique, and focus always points at an existing
//! gap or token. [`Editor`] wraps it with callbacks and dropdown coordination.

mod editor;

use serde::Serialize;

use crate::dropdown::DropdownState;
use crate::focus::{self, Direction, FocusState};
use crate::query::{annotate, stringify, tokenize, ParsedQuery, Token};

pub use editor::Editor;

/// Complete state of one query bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryBuilderState {
    /// Canonical query text, always `stringify(tokens)`.
    pub query: String,
    pub tokens: Vec<Token>,
    pub focus: FocusState,
    /// Token being composed in an input but not yet committed.
    pub uncommitted_token: Option<Token>,
    pub parsed_query: ParsedQuery,
    pub active_dropdown: DropdownState,
}

impl QueryBuilderState {
    /// State for an initial query, focused on the trailing gap.
    pub fn new(initial_query: &str) -> Self {
        let mut state = reduce(Self::default(), Action::SetQuery(initial_query.to_string()));
        state.focus = FocusState::input(state.tokens.len());
        state
    }

    /// Replace the token sequence and re-derive everything that depends on it.
    fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.query = stringify(&tokens);
        self.parsed_query = ParsedQuery::from_tokens(tokens.clone());
        self.tokens = tokens;
        self.focus = self.focus.clamped(self.tokens.len());
    }
}

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Re-tokenize from text.
    SetQuery(String),
    /// Insert a token at `position`, or append.
    AddToken {
        token: Token,
        position: Option<usize>,
    },
    UpdateToken {
        index: usize,
        token: Token,
    },
    RemoveToken(usize),
    SetFocusState(FocusState),
    SetActiveDropdown(DropdownState),
    SetUncommittedToken(Option<Token>),
    /// Move focus one step; always closes the dropdown.
    MoveFocus {
        direction: Direction,
        skip_inert_parts: bool,
    },
    Clear,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::SetQuery(_) => "set_query",
            Action::AddToken { .. } => "add_token",
            Action::UpdateToken { .. } => "update_token",
            Action::RemoveToken(_) => "remove_token",
            Action::SetFocusState(_) => "set_focus_state",
            Action::SetActiveDropdown(_) => "set_active_dropdown",
            Action::SetUncommittedToken(_) => "set_uncommitted_token",
            Action::MoveFocus { .. } => "move_focus",
            Action::Clear => "clear",
        }
    }
}

/// Apply `action` to `state`.
///
/// Out-of-range token indices are caller bugs: they panic in debug builds
/// and are logged and ignored otherwise.
pub fn reduce(mut state: QueryBuilderState, action: Action) -> QueryBuilderState {
    tracing::debug!(
        action = action.name(),
        tokens = state.tokens.len(),
        "Applying query bar action"
    );

    match action {
        Action::SetQuery(query) => {
            let mut tokens = tokenize(&query).tokens;
            tokens.iter_mut().for_each(annotate);
            state.set_tokens(tokens);
        }

        Action::AddToken {
            mut token,
            position,
        } => {
            let len = state.tokens.len();
            let position = match position {
                Some(p) if p > len => {
                    tracing::warn!(position = p, len, "Token position past the end, appending");
                    len
                }
                Some(p) => p,
                None => len,
            };

            if token.key.is_empty() || state.tokens.iter().any(|t| t.key == token.key) {
                token.key = fresh_key(&state.tokens, token.kind.type_name());
            }
            annotate(&mut token);

            let mut tokens = state.tokens.clone();
            tokens.insert(position, token);
            state.set_tokens(tokens);
        }

        Action::UpdateToken { index, mut token } => {
            if index >= state.tokens.len() {
                contract_violation("update_token", index, state.tokens.len());
                return state;
            }

            let collides = state
                .tokens
                .iter()
                .enumerate()
                .any(|(i, t)| i != index && t.key == token.key);
            if token.key.is_empty() || collides {
                token.key = state.tokens[index].key.clone();
            }
            annotate(&mut token);

            let mut tokens = state.tokens.clone();
            tokens[index] = token;
            state.set_tokens(tokens);
        }

        Action::RemoveToken(index) => {
            if index >= state.tokens.len() {
                contract_violation("remove_token", index, state.tokens.len());
                return state;
            }

            let mut tokens = state.tokens.clone();
            tokens.remove(index);
            state.focus = focus::after_removal(state.focus, index, tokens.len());
            state.active_dropdown = dropdown_after_removal(state.active_dropdown, index);
            state.set_tokens(tokens);
        }

        Action::SetFocusState(focus) => {
            if !focus.is_valid_for(state.tokens.len()) {
                tracing::warn!(?focus, tokens = state.tokens.len(), "Focus out of range, clamping");
            }
            state.focus = focus.clamped(state.tokens.len());
        }

        Action::SetActiveDropdown(dropdown) => {
            state.active_dropdown = dropdown;
        }

        Action::SetUncommittedToken(token) => {
            state.uncommitted_token = token;
        }

        Action::MoveFocus {
            direction,
            skip_inert_parts,
        } => {
            state.focus =
                focus::next_for_tokens(state.focus, &state.tokens, direction, skip_inert_parts);
            state.active_dropdown = DropdownState::CLOSED;
        }

        Action::Clear => {
            state = QueryBuilderState::default();
        }
    }

    state
}

/// First unused `<type>_<n>` key, counting up from the token count.
fn fresh_key(tokens: &[Token], type_name: &str) -> String {
    (tokens.len()..)
        .map(|n| format!("{}_{}", type_name, n))
        .find(|key| tokens.iter().all(|t| &t.key != key))
        .unwrap_or_default()
}

/// A dropdown on the removed token closes; one on a later token follows it.
fn dropdown_after_removal(dropdown: DropdownState, removed: usize) -> DropdownState {
    match dropdown.token_index {
        Some(i) if i == removed => DropdownState::CLOSED,
        Some(i) if i > removed => DropdownState {
            token_index: Some(i - 1),
            ..dropdown
        },
        _ => dropdown,
    }
}

fn contract_violation(operation: &'static str, index: usize, len: usize) {
    if cfg!(debug_assertions) {
        panic!("{}: token index {} out of range for {} tokens", operation, index, len);
    }
    tracing::warn!(operation, index, len, "Token index out of range, ignoring");
}

//! Imperative editor wrapper around the reducer.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::{reduce, Action, QueryBuilderState};
use crate::dropdown::{DropdownCoordinator, DropdownState};
use crate::focus::{Direction, FocusState, REMOVE_PART, VALUE_PART};
use crate::query::{tokenize, FilterToken, FilterValue, Operator, Token, TokenKind};
use crate::recent::{JsonFileRecentKeyStore, RecentKeys};
use crate::suggest::{
    filter_keys_or_empty, key_sections, tag_values_or_empty, FilterKeyDescriptor, KeySection,
    SuggestionProvider,
};
use crate::Config;

type QueryCallback = Box<dyn FnMut(&str) + Send>;

/// One query bar instance.
///
/// Every operation is a synchronous state transition. `on_change` fires once
/// per operation whose canonical query text differs from before; `clear`
/// always fires it with `""`.
pub struct Editor {
    id: String,
    state: QueryBuilderState,
    config: Config,
    coordinator: Arc<DropdownCoordinator>,
    /// Set by the coordinator when another editor takes the dropdown.
    superseded: Arc<AtomicBool>,
    suggestions: Option<Arc<dyn SuggestionProvider>>,
    recent_keys: RecentKeys,
    on_change: Option<QueryCallback>,
    on_search: Option<QueryCallback>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("config", &self.config)
            .field("recent_keys", &self.recent_keys)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Editor with default config, in-memory recent keys and no suggestions.
    pub fn new(initial_query: &str, coordinator: Arc<DropdownCoordinator>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            state: QueryBuilderState::new(initial_query),
            config: Config::default(),
            coordinator,
            superseded: Arc::new(AtomicBool::new(false)),
            suggestions: None,
            recent_keys: RecentKeys::in_memory(),
            on_change: None,
            on_search: None,
        }
    }

    /// Editor whose recent keys persist under the config root.
    pub fn open(
        initial_query: &str,
        config: Config,
        coordinator: Arc<DropdownCoordinator>,
    ) -> Self {
        let store = JsonFileRecentKeyStore::from_config(&config);
        let recent_keys = RecentKeys::open(Box::new(store), config.recent_keys_limit);
        Self::new(initial_query, coordinator)
            .with_config(config)
            .with_recent_keys(recent_keys)
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_suggestions(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.suggestions = Some(provider);
        self
    }

    pub fn with_recent_keys(mut self, recent_keys: RecentKeys) -> Self {
        self.recent_keys = recent_keys;
        self
    }

    /// Called with the new query text after it changes.
    pub fn on_change(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Called with the current query text by [`Editor::search`].
    pub fn on_search(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_search = Some(Box::new(callback));
        self
    }

    /// Coordinator id of this editor.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full state snapshot, with any dropdown taken by another editor closed.
    pub fn state(&mut self) -> &QueryBuilderState {
        self.sync_superseded();
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.state.query
    }

    pub fn tokens(&self) -> &[Token] {
        &self.state.tokens
    }

    pub fn focus(&self) -> FocusState {
        self.state.focus
    }

    /// Open dropdown, or closed if another editor has since opened one.
    pub fn active_dropdown(&self) -> DropdownState {
        if self.superseded.load(Ordering::SeqCst) {
            DropdownState::CLOSED
        } else {
            self.state.active_dropdown
        }
    }

    pub fn recent_keys(&self) -> &[FilterKeyDescriptor] {
        self.recent_keys.keys()
    }

    // Core operations

    pub fn set_query(&mut self, query: &str) {
        self.dispatch(Action::SetQuery(query.to_string()));
    }

    /// Insert `token` at `position`, or append when `None`.
    pub fn add_token(&mut self, token: Token, position: Option<usize>) {
        self.dispatch(Action::AddToken { token, position });
    }

    pub fn update_token(&mut self, index: usize, token: Token) {
        self.dispatch(Action::UpdateToken { index, token });
    }

    pub fn remove_token(&mut self, index: usize) {
        self.dispatch(Action::RemoveToken(index));
    }

    pub fn set_focus_state(&mut self, focus: FocusState) {
        self.dispatch(Action::SetFocusState(focus));
    }

    pub fn set_active_dropdown(&mut self, dropdown: DropdownState) {
        self.dispatch(Action::SetActiveDropdown(dropdown));
    }

    pub fn set_uncommitted_token(&mut self, token: Option<Token>) {
        self.dispatch(Action::SetUncommittedToken(token));
    }

    pub fn clear(&mut self) {
        if !self.dispatch(Action::Clear) {
            self.notify_change();
        }
    }

    pub fn move_focus(&mut self, direction: Direction) {
        self.dispatch(Action::MoveFocus {
            direction,
            skip_inert_parts: self.config.skip_inert_parts,
        });
    }

    /// Append a filter token.
    pub fn add_filter(
        &mut self,
        filter_key: &str,
        operator: Operator,
        value: impl Into<FilterValue>,
    ) {
        let filter = FilterToken::new(filter_key, value).with_operator(operator);
        self.add_token(Token::filter(filter), None);
    }

    /// Hand the current query to the search callback.
    pub fn search(&mut self) {
        tracing::debug!(query = %self.state.query, "Search requested");
        if let Some(callback) = self.on_search.as_mut() {
            callback(&self.state.query);
        }
    }

    // Editing helpers

    /// Commit text typed into the gap `input_index`.
    ///
    /// Returns how many tokens were inserted.
    pub fn commit_input(&mut self, input_index: usize, text: &str) -> usize {
        if text.trim().is_empty() {
            return 0;
        }

        let parsed = tokenize(text);
        if self.config.disallow_free_text && !parsed.free_text.is_empty() {
            tracing::debug!(text, "Free text not allowed, nothing committed");
            return 0;
        }

        let at = input_index.min(self.state.tokens.len());
        let count = parsed.tokens.len();
        let mut actions: Vec<Action> = parsed
            .tokens
            .into_iter()
            .enumerate()
            .map(|(i, token)| Action::AddToken {
                token: Token::unkeyed(token.kind),
                position: Some(at + i),
            })
            .collect();
        actions.push(Action::SetFocusState(FocusState::input(at + count)));
        actions.push(Action::SetActiveDropdown(DropdownState::CLOSED));
        self.apply(actions);
        count
    }

    /// Backspace in an empty gap focuses the remove control of the token
    /// before it.
    pub fn backspace_at_input(&mut self, input_index: usize) {
        if input_index > 0 && input_index <= self.state.tokens.len() {
            self.set_focus_state(FocusState::part(input_index - 1, REMOVE_PART));
        }
    }

    /// Flip an AND/OR token.
    pub fn toggle_boolean(&mut self, index: usize) {
        let Some(token) = self.state.tokens.get(index) else {
            return super::contract_violation("toggle_boolean", index, self.state.tokens.len());
        };
        let TokenKind::Boolean { value } = token.kind else {
            tracing::warn!(index, kind = token.kind.type_name(), "Not a boolean token");
            return;
        };

        let kind = TokenKind::Boolean {
            value: value.toggled(),
        };
        let token = Token::new(token.key.clone(), kind);
        self.update_token(index, token);
    }

    /// Save edited free text, or drop the token if nothing is left.
    pub fn edit_free_text(&mut self, index: usize, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.remove_token(index);
        } else {
            self.update_token(index, Token::free_text(text));
        }
    }

    pub fn set_filter_key(&mut self, index: usize, filter_key: &str) {
        self.edit_filter(index, |filter| filter.filter_key = filter_key.to_string());
    }

    pub fn set_filter_operator(&mut self, index: usize, operator: Operator) {
        self.edit_filter(index, |filter| filter.operator = operator);
    }

    pub fn set_filter_value(&mut self, index: usize, value: impl Into<FilterValue>) {
        let value = value.into();
        self.edit_filter(index, move |filter| filter.value = value);
    }

    /// Pick a key from the gap's filter-key dropdown.
    ///
    /// Inserts `key:` at the gap and focuses its value part.
    pub fn select_filter_key(&mut self, input_index: usize, descriptor: FilterKeyDescriptor) {
        let at = input_index.min(self.state.tokens.len());
        let token = Token::filter(FilterToken::new(descriptor.key.clone(), ""));
        self.recent_keys.record(descriptor);
        self.apply(vec![
            Action::AddToken {
                token,
                position: Some(at),
            },
            Action::SetFocusState(FocusState::part(at, VALUE_PART)),
            Action::SetActiveDropdown(DropdownState::CLOSED),
        ]);
    }

    // Suggestions

    /// Values for the filter token at `token_index`, narrowed by `search`.
    pub fn value_suggestions(&self, token_index: usize, search: &str) -> Vec<String> {
        let (Some(provider), Some(filter)) = (
            self.suggestions.as_deref(),
            self.state.tokens.get(token_index).and_then(Token::as_filter),
        ) else {
            return Vec::new();
        };
        let query = (!search.is_empty()).then_some(search);
        tag_values_or_empty(provider, &filter.filter_key, query)
    }

    /// Filter-key dropdown sections matching `search`.
    pub fn filter_key_suggestions(&self, search: &str) -> Vec<KeySection> {
        let keys = match self.suggestions.as_deref() {
            Some(provider) => filter_keys_or_empty(provider),
            None => Vec::new(),
        };
        key_sections(&keys, self.recent_keys.keys(), search)
    }

    /// Operators offered for the filter token at `token_index`.
    pub fn operator_options(&self, token_index: usize) -> Vec<Operator> {
        let Some(filter) = self.state.tokens.get(token_index).and_then(Token::as_filter) else {
            return Vec::new();
        };
        let keys = match self.suggestions.as_deref() {
            Some(provider) => filter_keys_or_empty(provider),
            None => Vec::new(),
        };
        keys.iter()
            .find(|k| k.key == filter.filter_key)
            .map(FilterKeyDescriptor::operators)
            .unwrap_or_else(|| Operator::ALL.to_vec())
    }

    // Internals

    fn edit_filter(&mut self, index: usize, edit: impl FnOnce(&mut FilterToken)) {
        let Some(token) = self.state.tokens.get(index) else {
            return super::contract_violation("edit_filter", index, self.state.tokens.len());
        };
        let TokenKind::Filter(filter) = &token.kind else {
            tracing::warn!(index, kind = token.kind.type_name(), "Not a filter token");
            return;
        };

        let mut filter = filter.clone();
        edit(&mut filter);
        let token = Token::new(token.key.clone(), TokenKind::Filter(filter));
        self.apply(vec![
            Action::UpdateToken { index, token },
            Action::SetActiveDropdown(DropdownState::CLOSED),
        ]);
    }

    /// Apply one action. Returns whether the query text changed.
    fn dispatch(&mut self, action: Action) -> bool {
        self.apply(vec![action])
    }

    /// Apply actions as one operation, then sync the coordinator and notify.
    fn apply(&mut self, actions: Vec<Action>) -> bool {
        self.sync_superseded();
        let was_open = self.state.active_dropdown.is_open();
        let previous_query = self.state.query.clone();

        let state = std::mem::take(&mut self.state);
        self.state = actions.into_iter().fold(state, reduce);

        match (was_open, self.state.active_dropdown.is_open()) {
            (false, true) => {
                self.superseded.store(false, Ordering::SeqCst);
                let superseded = Arc::clone(&self.superseded);
                self.coordinator.open(&self.id, move || {
                    superseded.store(true, Ordering::SeqCst);
                });
            }
            (true, false) => self.coordinator.close(&self.id),
            _ => {}
        }

        let changed = self.state.query != previous_query;
        if changed {
            self.notify_change();
        }
        changed
    }

    /// Absorb a close requested by the coordinator.
    fn sync_superseded(&mut self) {
        if self.superseded.swap(false, Ordering::SeqCst) && self.state.active_dropdown.is_open() {
            tracing::debug!(id = %self.id, "Dropdown closed by another editor");
            self.state.active_dropdown = DropdownState::CLOSED;
        }
    }

    fn notify_change(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.state.query);
        }
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.coordinator.close(&self.id);
    }
}

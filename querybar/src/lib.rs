//! querybar: structured search query editing.
//!
//! Text like `status:[resolved,ignored] count:>100 "crash"` is tokenized into
//! filters, free text, booleans and parentheses, edited token by token, and
//! serialized back to canonical text. An [`Editor`] holds one query bar's
//! state; a shared [`DropdownCoordinator`] keeps at most one suggestion
//! dropdown open across editors.

pub mod config;
pub mod dropdown;
pub mod error;
pub mod focus;
pub mod query;
pub mod recent;
pub mod store;
pub mod suggest;

pub use config::Config;
pub use dropdown::{DropdownCoordinator, DropdownKind, DropdownState};
pub use error::{Error, Result};
pub use focus::{Direction, FocusState};
pub use query::{
    stringify, tokenize, validate, BooleanOp, FilterToken, FilterValue, Operator, Paren,
    ParsedQuery, Token, TokenKind,
};
pub use recent::{JsonFileRecentKeyStore, MemoryRecentKeyStore, RecentKeyStore, RecentKeys};
pub use store::{reduce, Action, Editor, QueryBuilderState};
pub use suggest::{FilterKeyDescriptor, KeySection, StaticSuggestions, SuggestionProvider};

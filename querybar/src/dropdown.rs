//! Auxiliary dropdown state and the cross-instance coordinator.

use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Which dropdown is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DropdownKind {
    FilterKey,
    Value,
    Operator,
}

/// Open dropdown of one editor, if any.
///
/// `kind: None` means closed. A `FilterKey` dropdown without a token index
/// is anchored to an inter-token input and creates a new token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownState {
    #[serde(rename = "type")]
    pub kind: Option<DropdownKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_index: Option<usize>,
}

impl DropdownState {
    /// No dropdown.
    pub const CLOSED: DropdownState = DropdownState {
        kind: None,
        token_index: None,
    };

    /// Dropdown attached to an existing token.
    pub fn for_token(kind: DropdownKind, token_index: usize) -> Self {
        Self {
            kind: Some(kind),
            token_index: Some(token_index),
        }
    }

    /// Filter-key dropdown anchored to an inter-token input.
    pub fn new_token() -> Self {
        Self {
            kind: Some(DropdownKind::FilterKey),
            token_index: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.kind.is_some()
    }
}

type CloseCallback = Box<dyn FnOnce() + Send>;

struct ActiveDropdown {
    id: String,
    on_close: CloseCallback,
}

/// Keeps at most one dropdown open across editor instances.
///
/// Construct one per process and share it (`Arc`) with every editor; tests
/// build a fresh one each. Close callbacks run outside the internal lock, so
/// they may call back into the coordinator.
#[derive(Default)]
pub struct DropdownCoordinator {
    active: Mutex<Option<ActiveDropdown>>,
}

impl fmt::Debug for DropdownCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownCoordinator")
            .field("active", &self.active_id())
            .finish()
    }
}

impl DropdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` as the open dropdown, closing any other holder first.
    ///
    /// Re-opening the active id replaces its callback without invoking the
    /// old one.
    pub fn open(&self, id: &str, on_close: impl FnOnce() + Send + 'static) {
        let previous = {
            let mut active = self.lock();
            let previous = active.take();
            *active = Some(ActiveDropdown {
                id: id.to_string(),
                on_close: Box::new(on_close),
            });
            previous
        };

        if let Some(previous) = previous {
            if previous.id != id {
                tracing::debug!(closing = %previous.id, opening = %id, "Dropdown superseded");
                (previous.on_close)();
            }
        }
    }

    /// Unregister `id` if it is the active dropdown. Stale ids are ignored.
    pub fn close(&self, id: &str) {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|a| a.id == id) {
            *active = None;
        }
    }

    /// Close whatever is open, invoking its callback.
    pub fn close_all(&self) {
        let previous = self.lock().take();
        if let Some(previous) = previous {
            (previous.on_close)();
        }
    }

    /// Check if `id` holds the open dropdown.
    pub fn is_active(&self, id: &str) -> bool {
        self.lock().as_ref().is_some_and(|a| a.id == id)
    }

    /// Id of the open dropdown, if any.
    pub fn active_id(&self) -> Option<String> {
        self.lock().as_ref().map(|a| a.id.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActiveDropdown>> {
        // Callbacks never run under the lock; the slot is always whole
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#![forbid(unsafe_code)]

//! Key bindings for the grid.
//!
//! Fixed bindings cover navigation and selection editing; single characters
//! can additionally be bound to named host actions.
//!
//! | Key                | Action                 |
//! |--------------------|------------------------|
//! | arrows             | `MoveFocus(direction)` |
//! | Space, Enter       | `ToggleFocused`        |
//! | Backspace, Delete  | `ClearSelection`       |
//! | Ctrl+Z             | `RestorePrevious`      |
//! | Ctrl+A             | `SelectCluster`        |
//! | bound character    | `Action(name)`         |

use std::collections::BTreeMap;

use plotgrid_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
use plotgrid_layout::NavDirection;

/// A logical grid command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridAction {
    /// Move the focus to the nearest cell in a direction.
    MoveFocus(NavDirection),
    /// Toggle the focused cell.
    ToggleFocused,
    /// Deselect everything.
    ClearSelection,
    /// Undo the last selection change.
    RestorePrevious,
    /// Select every cell in the focused cell's cluster.
    SelectCluster,
    /// A host-defined action, reported with the current targets.
    Action(String),
}

/// Character → action-name bindings plus the fixed grid keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    actions: BTreeMap<char, String>,
}

impl KeyMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to the named action. A later binding for the same key
    /// replaces the earlier one.
    #[must_use]
    pub fn with_action(mut self, key: char, action: impl Into<String>) -> Self {
        self.bind(key, action);
        self
    }

    /// Bind `key` in place. Returns the action it replaced.
    pub fn bind(&mut self, key: char, action: impl Into<String>) -> Option<String> {
        self.actions.insert(key, action.into())
    }

    /// The action bound to `key`, if any.
    #[must_use]
    pub fn action_for(&self, key: char) -> Option<&str> {
        self.actions.get(&key).map(String::as_str)
    }

    /// Number of character bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Map a key event to an action. Releases never map.
    #[must_use]
    pub fn resolve(&self, key: &KeyEvent) -> Option<GridAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let chorded = key.modifiers.intersects(Modifiers::CTRL | Modifiers::SUPER);
        match key.code {
            KeyCode::Up => Some(GridAction::MoveFocus(NavDirection::Up)),
            KeyCode::Down => Some(GridAction::MoveFocus(NavDirection::Down)),
            KeyCode::Left => Some(GridAction::MoveFocus(NavDirection::Left)),
            KeyCode::Right => Some(GridAction::MoveFocus(NavDirection::Right)),
            KeyCode::Enter | KeyCode::Char(' ') if !chorded => Some(GridAction::ToggleFocused),
            KeyCode::Backspace | KeyCode::Delete => Some(GridAction::ClearSelection),
            KeyCode::Char(c) if chorded => match c.to_ascii_lowercase() {
                'z' => Some(GridAction::RestorePrevious),
                'a' => Some(GridAction::SelectCluster),
                _ => None,
            },
            KeyCode::Char(c) if !key.modifiers.contains(Modifiers::ALT) => {
                self.action_for(c).map(|name| GridAction::Action(name.to_owned()))
            }
            _ => None,
        }
    }
}

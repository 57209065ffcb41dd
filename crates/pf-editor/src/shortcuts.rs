//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so every front end resolves shortcuts the same way.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Undo,
    Redo,
}

impl ShortcutAction {
    /// Whether the host must suppress its own default handling of the key
    /// combo. Both history shortcuts must never reach a browser-level undo.
    pub fn prevents_default(&self) -> bool {
        match self {
            ShortcutAction::Undo | ShortcutAction::Redo => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShortcutAction::Undo => "undo",
            ShortcutAction::Redo => "redo",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.ctrl || modifiers.meta;
        if !cmd || modifiers.alt {
            return None;
        }

        if modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        match key {
            "z" | "Z" => Some(ShortcutAction::Undo),
            "y" | "Y" => Some(ShortcutAction::Redo),
            _ => None,
        }
    }
}

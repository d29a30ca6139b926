//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to Listing-mode actions.
///
/// Provides default vim-style bindings. Text-entry modes read keys directly and
/// never consult this map.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Only code and modifiers take part in the lookup; event kind and lock
    /// state are ignored.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }

    /// Bind `key` to `action`, replacing any previous binding.
    pub fn insert(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(key, action);
    }

    fn bind(&mut self, code: KeyCode, modifiers: KeyModifiers, action: KeyAction) {
        self.insert(KeyEvent::new(code, modifiers), action);
    }

    /// Bind an uppercase letter whether or not the terminal reports SHIFT.
    fn bind_upper(&mut self, ch: char, action: KeyAction) {
        self.bind(KeyCode::Char(ch), KeyModifiers::SHIFT, action);
        self.bind(KeyCode::Char(ch), KeyModifiers::NONE, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut keys = Self {
            bindings: HashMap::new(),
        };
        let none = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;

        // Vim-style selection
        keys.bind(KeyCode::Char('j'), none, KeyAction::SelectNext);
        keys.bind(KeyCode::Char('k'), none, KeyAction::SelectPrev);
        keys.bind(KeyCode::Char('g'), none, KeyAction::SelectFirst);
        keys.bind_upper('G', KeyAction::SelectLast);

        // Arrow keys
        keys.bind(KeyCode::Down, none, KeyAction::SelectNext);
        keys.bind(KeyCode::Up, none, KeyAction::SelectPrev);
        keys.bind(KeyCode::Home, none, KeyAction::SelectFirst);
        keys.bind(KeyCode::End, none, KeyAction::SelectLast);

        // Page navigation
        keys.bind(KeyCode::PageDown, none, KeyAction::PageDown);
        keys.bind(KeyCode::PageUp, none, KeyAction::PageUp);
        keys.bind(KeyCode::Char('d'), ctrl, KeyAction::PageDown);
        keys.bind(KeyCode::Char('u'), ctrl, KeyAction::PageUp);

        // View
        keys.bind(KeyCode::Char('r'), none, KeyAction::Refresh);
        keys.bind(KeyCode::Char('/'), none, KeyAction::StartFilter);
        keys.bind(KeyCode::Char('o'), none, KeyAction::CycleSort);
        keys.bind_upper('O', KeyAction::ReverseSort);

        // Snapshot actions
        keys.bind_upper('D', KeyAction::Delete);
        keys.bind(KeyCode::Char('d'), none, KeyAction::Diff);
        keys.bind(KeyCode::Char('m'), none, KeyAction::Mount);
        keys.bind(KeyCode::Char('u'), none, KeyAction::Unmount);
        keys.bind(KeyCode::Char('b'), none, KeyAction::Browse);
        keys.bind(KeyCode::Char('s'), none, KeyAction::Send);
        keys.bind(KeyCode::Char('a'), none, KeyAction::AddTarget);

        // Application controls
        keys.bind(KeyCode::Char('?'), none, KeyAction::Help);
        keys.bind(KeyCode::Char('?'), KeyModifiers::SHIFT, KeyAction::Help);
        keys.bind(KeyCode::Char('h'), none, KeyAction::Help);
        keys.bind(KeyCode::Char('q'), none, KeyAction::Quit);
        keys.bind(KeyCode::Char('c'), ctrl, KeyAction::Quit);

        keys
    }
}

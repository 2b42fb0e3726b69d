//! Key bindings for the Arrogance Admin TUI.

use ftui::{KeyCode, KeyEvent, Modifiers};

/// Configurable key bindings.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub quit: Vec<KeyEvent>,
    pub next_tab: Vec<KeyEvent>,
    pub prev_tab: Vec<KeyEvent>,
    /// Move the table cursor down one row.
    pub next: Vec<KeyEvent>,
    /// Move the table cursor up one row.
    pub prev: Vec<KeyEvent>,
    pub first: Vec<KeyEvent>,
    pub last: Vec<KeyEvent>,
    pub page_down: Vec<KeyEvent>,
    pub page_up: Vec<KeyEvent>,
    /// Re-fetch the active data tab.
    pub refresh: Vec<KeyEvent>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: vec![
                KeyEvent::new(KeyCode::Char('q')),
                KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL),
            ],
            next_tab: vec![
                KeyEvent::new(KeyCode::Tab),
                KeyEvent::new(KeyCode::Right),
                KeyEvent::new(KeyCode::Char('l')),
            ],
            prev_tab: vec![
                KeyEvent::new(KeyCode::BackTab),
                KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT),
                KeyEvent::new(KeyCode::Left),
                KeyEvent::new(KeyCode::Char('h')),
            ],
            next: vec![
                KeyEvent::new(KeyCode::Down),
                KeyEvent::new(KeyCode::Char('j')),
            ],
            prev: vec![
                KeyEvent::new(KeyCode::Up),
                KeyEvent::new(KeyCode::Char('k')),
            ],
            first: vec![
                KeyEvent::new(KeyCode::Home),
                KeyEvent::new(KeyCode::Char('g')),
            ],
            last: vec![
                KeyEvent::new(KeyCode::End),
                KeyEvent::new(KeyCode::Char('G')),
            ],
            page_down: vec![KeyEvent::new(KeyCode::PageDown)],
            page_up: vec![KeyEvent::new(KeyCode::PageUp)],
            refresh: vec![KeyEvent::new(KeyCode::Char('r'))],
        }
    }
}

impl KeyBindings {
    fn matches_any(bindings: &[KeyEvent], key: &KeyEvent) -> bool {
        // KeyEventKind is ignored: Press and Repeat both apply.
        //
        // An extra SHIFT bit is tolerated. Many terminals report SHIFT even
        // when the shifted character is already encoded in KeyCode::Char('G').
        bindings
            .iter()
            .any(|b| b.code == key.code && mods_match(b.modifiers, key.modifiers))
    }

    pub fn is_quit(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.quit, key)
    }

    pub fn is_next_tab(&self, key: &KeyEvent) -> bool {
        // Shift+Tab must not fall through to plain Tab.
        !self.is_prev_tab(key) && Self::matches_any(&self.next_tab, key)
    }

    pub fn is_prev_tab(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.prev_tab, key)
    }

    pub fn is_next(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.next, key)
    }

    pub fn is_prev(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.prev, key)
    }

    pub fn is_first(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.first, key)
    }

    pub fn is_last(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.last, key)
    }

    pub fn is_page_down(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.page_down, key)
    }

    pub fn is_page_up(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.page_up, key)
    }

    pub fn is_refresh(&self, key: &KeyEvent) -> bool {
        Self::matches_any(&self.refresh, key)
    }
}

fn mods_match(binding: Modifiers, observed: Modifiers) -> bool {
    observed == binding || observed == (binding | Modifiers::SHIFT)
}

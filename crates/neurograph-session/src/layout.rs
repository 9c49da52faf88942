//! Panel visibility flags.

use serde::{Deserialize, Serialize};

/// Which side panels are visible. Local to the session, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutState {
    pub show_code: bool,
    pub show_chat: bool,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            show_code: true,
            show_chat: true,
        }
    }
}

impl LayoutState {
    /// Flip the code panel and return the new visibility.
    pub fn toggle_code(&mut self) -> bool {
        self.show_code = !self.show_code;
        self.show_code
    }

    /// Flip the chat panel and return the new visibility.
    pub fn toggle_chat(&mut self) -> bool {
        self.show_chat = !self.show_chat;
        self.show_chat
    }

    /// Show the chat panel. Returns `true` if it was hidden.
    pub fn open_chat(&mut self) -> bool {
        let changed = !self.show_chat;
        self.show_chat = true;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_flip_independently() {
        let mut layout = LayoutState::default();
        assert!(!layout.toggle_code());
        assert!(layout.show_chat);
        assert!(!layout.toggle_chat());
        assert!(layout.toggle_code());
        assert_eq!(
            layout,
            LayoutState {
                show_code: true,
                show_chat: false
            }
        );
    }

    #[test]
    fn open_chat_reports_change() {
        let mut layout = LayoutState::default();
        assert!(!layout.open_chat());
        layout.toggle_chat();
        assert!(layout.open_chat());
        assert!(layout.show_chat);
    }
}

//! Keyboard shortcuts
//!
//! Single-key commands outside of movement. Letter keys match regardless
//! of case.

/// A shortcut command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    /// Space: start a run from the menu or a results screen
    Start,
    /// Escape: back to the menu
    Reset,
    /// R: abandon the current run and start another
    Restart,
    /// S: open or close the settings panel
    Settings,
    /// M: toggle sound
    Mute,
    /// T: cycle the color theme
    Theme,
    /// P: toggle practice mode
    Practice,
}

impl Shortcut {
    pub const ALL: [Shortcut; 7] = [
        Shortcut::Start,
        Shortcut::Reset,
        Shortcut::Restart,
        Shortcut::Settings,
        Shortcut::Mute,
        Shortcut::Theme,
        Shortcut::Practice,
    ];

    /// Map a `KeyboardEvent.key` value to a shortcut
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            " " | "Space" | "Spacebar" => return Some(Shortcut::Start),
            "Escape" | "Esc" => return Some(Shortcut::Reset),
            _ => {}
        }
        match key.to_uppercase().as_str() {
            "R" => Some(Shortcut::Restart),
            "S" => Some(Shortcut::Settings),
            "M" => Some(Shortcut::Mute),
            "T" => Some(Shortcut::Theme),
            "P" => Some(Shortcut::Practice),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Shortcut::Start => "Space",
            Shortcut::Reset => "Esc",
            Shortcut::Restart => "R",
            Shortcut::Settings => "S",
            Shortcut::Mute => "M",
            Shortcut::Theme => "T",
            Shortcut::Practice => "P",
        }
    }

    /// What the key does, for the help overlay
    pub fn description(&self) -> &'static str {
        match self {
            Shortcut::Start => "start",
            Shortcut::Reset => "back to menu",
            Shortcut::Restart => "restart",
            Shortcut::Settings => "settings",
            Shortcut::Mute => "toggle sound",
            Shortcut::Theme => "change theme",
            Shortcut::Practice => "practice mode",
        }
    }
}

//! Player settings and preferences
//!
//! Persisted as a single JSON blob in the key-value store.

use serde::{Deserialize, Serialize};

use crate::storage::{self, KeyValueStore, keys};

/// Difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    #[serde(alias = "medium")]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    /// Multiplier applied to green and red phase durations
    pub fn modifier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.3,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.7,
        }
    }

    /// Storage key holding this tier's high score
    pub fn high_score_key(&self) -> &'static str {
        match self {
            Difficulty::Easy => keys::HIGH_SCORE_EASY,
            Difficulty::Normal => keys::HIGH_SCORE_MEDIUM,
            Difficulty::Hard => keys::HIGH_SCORE_HARD,
        }
    }
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
    System,
}

impl Theme {
    /// Next theme in the dark -> light -> system cycle
    pub fn next(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::System,
            Theme::System => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
            Theme::System => "system",
        }
    }
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub sound_enabled: bool,
    pub music_enabled: bool,
    pub vibrations_enabled: bool,
    pub difficulty: Difficulty,
    pub theme: Theme,
    /// Red light violations warn instead of costing a life
    pub practice_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            vibrations_enabled: true,
            difficulty: Difficulty::Normal,
            theme: Theme::Dark,
            practice_mode: false,
        }
    }
}

impl Settings {
    /// Load settings, using defaults for anything missing or malformed
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let settings: Settings = storage::load_json(store, keys::SETTINGS);
        log::info!(
            "Settings loaded (difficulty: {}, theme: {})",
            settings.difficulty.as_str(),
            settings.theme.as_str()
        );
        settings
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        storage::save_json(store, keys::SETTINGS, self);
        log::debug!("Settings saved");
    }

    pub fn toggle_sound(&mut self, store: &dyn KeyValueStore) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.save(store);
        self.sound_enabled
    }

    pub fn toggle_practice_mode(&mut self, store: &dyn KeyValueStore) -> bool {
        self.practice_mode = !self.practice_mode;
        self.save(store);
        self.practice_mode
    }

    pub fn set_theme(&mut self, theme: Theme, store: &dyn KeyValueStore) {
        self.theme = theme;
        self.save(store);
    }

    /// Advance to the next theme and return it
    pub fn cycle_theme(&mut self, store: &dyn KeyValueStore) -> Theme {
        self.set_theme(self.theme.next(), store);
        self.theme
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty, store: &dyn KeyValueStore) {
        self.difficulty = difficulty;
        self.save(store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_when_store_empty() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_blob_keeps_defaults_for_missing_fields() {
        let store = MemoryStore::new();
        store.set(keys::SETTINGS, r#"{"difficulty":"hard","practiceMode":true}"#);
        let settings = Settings::load(&store);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(settings.practice_mode);
        assert!(settings.sound_enabled);
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn test_malformed_blob_falls_back() {
        let store = MemoryStore::new();
        store.set(keys::SETTINGS, r#"{"difficulty":"impossible"}"#);
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_toggles_persist() {
        let store = MemoryStore::new();
        let mut settings = Settings::default();
        assert!(!settings.toggle_sound(&store));
        assert!(settings.toggle_practice_mode(&store));
        assert_eq!(settings.cycle_theme(&store), Theme::Light);

        let reloaded = Settings::load(&store);
        assert!(!reloaded.sound_enabled);
        assert!(reloaded.practice_mode);
        assert_eq!(reloaded.theme, Theme::Light);
    }

    #[test]
    fn test_theme_cycle_wraps() {
        assert_eq!(Theme::Dark.next(), Theme::Light);
        assert_eq!(Theme::Light.next(), Theme::System);
        assert_eq!(Theme::System.next(), Theme::Dark);
    }

    #[test]
    fn test_difficulty_parsing_and_modifier() {
        let store = MemoryStore::new();
        store.set(keys::SETTINGS, r#"{"difficulty":"medium"}"#);
        assert_eq!(Settings::load(&store).difficulty, Difficulty::Normal);
        store.set(keys::SETTINGS, r#"{"difficulty":"hard"}"#);
        assert_eq!(Settings::load(&store).difficulty, Difficulty::Hard);
        assert_eq!(Difficulty::Hard.modifier(), 0.7);
        assert_eq!(Difficulty::Easy.modifier(), 1.3);
    }
}

//! Game settings and preferences
//!
//! Serialized by the embedding app; the core only defines the shape and the
//! JSON round-trip. `developer_mode` is the explicit gate for the debug
//! intents in `sim::TickInput`.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enables debug intents: skip-to-boss, invulnerability, kill-all,
    /// panic mode.
    pub developer_mode: bool,

    // === Audio (forwarded to the audio collaborator) ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Background music on/off
    pub music_enabled: bool,

    // === Accessibility (forwarded to the render collaborator) ===
    /// Reduced motion (minimize shake, flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            developer_mode: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            music_enabled: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse stored settings, falling back to defaults on absence or
    /// corruption.
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json {
            Some(json) => match Self::from_json(json) {
                Ok(settings) => {
                    log::info!("loaded settings");
                    settings
                }
                Err(err) => {
                    log::warn!("settings unreadable ({err}), using defaults");
                    Self::default()
                }
            },
            None => {
                log::info!("no stored settings, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.developer_mode = true;
        settings.music_volume = 0.25;

        let json = settings.to_json().expect("serialize");
        let back = Settings::from_json(&json).expect("parse");
        assert_eq!(back, settings);
    }

    #[test]
    fn test_load_falls_back_on_garbage() {
        assert_eq!(Settings::load_or_default(Some("{not json")), Settings::default());
        assert_eq!(Settings::load_or_default(None), Settings::default());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = Settings::from_json(r#"{"developer_mode": true}"#).expect("parse");
        assert!(settings.developer_mode);
        assert_eq!(settings.master_volume, 0.8);
    }
}

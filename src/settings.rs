//! Game settings
//!
//! Loaded once at startup from the JSON diary file. A missing or corrupt file
//! never stops the game: the built-in defaults are used instead.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::*;

/// Why a diary could not be used as-is
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Player tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerData {
    /// Movement speed (units/s)
    pub speed: f32,
}

impl Default for PlayerData {
    fn default() -> Self {
        Self {
            speed: DEFAULT_PLAYER_SPEED,
        }
    }
}

/// Pulpit lifetime tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulpitData {
    /// Lower bound of the destroy-time draw (seconds)
    pub min_pulpit_destroy_time: f32,
    /// Upper bound of the destroy-time draw (seconds)
    pub max_pulpit_destroy_time: f32,
    /// Seconds before death at which a replacement is requested
    pub pulpit_spawn_time: f32,
}

impl Default for PulpitData {
    fn default() -> Self {
        Self {
            min_pulpit_destroy_time: DEFAULT_MIN_DESTROY,
            max_pulpit_destroy_time: DEFAULT_MAX_DESTROY,
            pulpit_spawn_time: DEFAULT_SPAWN_LEAD,
        }
    }
}

/// Placement and safety tuning for the pulpit manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerData {
    /// Time the player is guaranteed on a fresh pulpit after its successor appears
    pub min_safe_lifetime: f32,
    /// Raise short destroy times to `pulpit_spawn_time + min_safe_lifetime`
    pub enforce_min_safe_lifetime: bool,
    /// Seconds a just-vacated cell is kept free of new pulpits
    pub vacated_cooldown: f32,
    /// World distance between grid cells
    pub grid_step: f32,
}

impl Default for ManagerData {
    fn default() -> Self {
        Self {
            min_safe_lifetime: DEFAULT_MIN_SAFE_LIFETIME,
            enforce_min_safe_lifetime: true,
            vacated_cooldown: DEFAULT_VACATED_COOLDOWN,
            grid_step: GRID_STEP,
        }
    }
}

/// The diary: everything tunable about a run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player_data: PlayerData,
    pub pulpit_data: PulpitData,
    pub manager_data: ManagerData,
}

impl Settings {
    /// Parse and validate a diary
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a diary file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a diary file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_file(path) {
            Ok(settings) => {
                log::info!(
                    "Loaded settings from {}: player speed {:.2}, destroy {:.2}..{:.2}s, spawn lead {:.2}s",
                    path.display(),
                    settings.player_data.speed,
                    settings.pulpit_data.min_pulpit_destroy_time,
                    settings.pulpit_data.max_pulpit_destroy_time,
                    settings.pulpit_data.pulpit_spawn_time,
                );
                settings
            }
            Err(err) => {
                log::warn!("{} ({}), using default settings", err, path.display());
                Self::default()
            }
        }
    }

    /// Check ranges the simulation depends on
    pub fn validate(&self) -> Result<(), SettingsError> {
        let p = &self.pulpit_data;
        let m = &self.manager_data;

        let all_finite = [
            self.player_data.speed,
            p.min_pulpit_destroy_time,
            p.max_pulpit_destroy_time,
            p.pulpit_spawn_time,
            m.min_safe_lifetime,
            m.vacated_cooldown,
            m.grid_step,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(SettingsError::Invalid("non-finite value".into()));
        }

        if p.min_pulpit_destroy_time <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "min_pulpit_destroy_time must be positive, got {}",
                p.min_pulpit_destroy_time
            )));
        }
        if p.max_pulpit_destroy_time < p.min_pulpit_destroy_time {
            return Err(SettingsError::Invalid(format!(
                "max_pulpit_destroy_time {} is below min_pulpit_destroy_time {}",
                p.max_pulpit_destroy_time, p.min_pulpit_destroy_time
            )));
        }
        if p.pulpit_spawn_time < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "pulpit_spawn_time must not be negative, got {}",
                p.pulpit_spawn_time
            )));
        }
        if m.min_safe_lifetime < 0.0 || m.vacated_cooldown < 0.0 {
            return Err(SettingsError::Invalid(
                "manager durations must not be negative".into(),
            ));
        }
        if m.grid_step <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "grid_step must be positive, got {}",
                m.grid_step
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_diary() {
        let json = r#"{
            "player_data": { "speed": 4.5 },
            "pulpit_data": {
                "min_pulpit_destroy_time": 3.0,
                "max_pulpit_destroy_time": 6.0,
                "pulpit_spawn_time": 2.0
            }
        }"#;
        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.player_data.speed, 4.5);
        assert_eq!(settings.pulpit_data.min_pulpit_destroy_time, 3.0);
        assert_eq!(settings.pulpit_data.max_pulpit_destroy_time, 6.0);
        assert_eq!(settings.pulpit_data.pulpit_spawn_time, 2.0);
        assert_eq!(settings.manager_data, ManagerData::default());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = Settings::from_json(r#"{ "pulpit_data": { "pulpit_spawn_time": 1.0 } }"#).unwrap();
        assert_eq!(settings.pulpit_data.min_pulpit_destroy_time, DEFAULT_MIN_DESTROY);
        assert_eq!(settings.pulpit_data.max_pulpit_destroy_time, DEFAULT_MAX_DESTROY);
        assert_eq!(settings.pulpit_data.pulpit_spawn_time, 1.0);
        assert_eq!(settings.player_data.speed, DEFAULT_PLAYER_SPEED);
    }

    #[test]
    fn test_corrupt_json_is_parse_error() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_inverted_range_is_invalid() {
        let json = r#"{ "pulpit_data": { "min_pulpit_destroy_time": 5.0, "max_pulpit_destroy_time": 4.0 } }"#;
        assert!(matches!(
            Settings::from_json(json),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/definitely/not/here/DoofusDiary.json");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_round_trip_defaults() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), Settings::default());
    }
}

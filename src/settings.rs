//! Round tuning
//!
//! Fixed at construction; nothing in the simulation re-derives these at runtime.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Which candidate a zone takes when several objects qualify in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrder {
    /// First qualifying object in tracking order
    #[default]
    FirstCandidate,
    /// Closest qualifying object (ties go to tracking order)
    Nearest,
}

impl MatchOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOrder::FirstCandidate => "first_candidate",
            MatchOrder::Nearest => "nearest",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "first_candidate" | "first" => Some(MatchOrder::FirstCandidate),
            "nearest" => Some(MatchOrder::Nearest),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{field} must be {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f64,
    },
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Round and scanner tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Round ===
    /// Length of a round in seconds
    pub round_duration_secs: f32,
    /// Cart total needed to win
    pub goal_value: f64,
    /// Remaining time at which the low-time warning fires
    pub low_time_warning_secs: f32,

    // === Scanner ===
    /// Minimum seconds between two scans of the same object
    pub scan_cooldown_secs: f64,
    /// Multiplier on each zone's nominal radius
    pub zone_radius_tolerance: f32,
    /// Candidate policy when several objects qualify for one zone
    pub match_order: MatchOrder,
    /// Scanned objects are consumed and replaced (false = practice pad)
    pub retire_on_scan: bool,

    // === Respawn ===
    /// Decimal places used when comparing respawn slots
    pub slot_precision: u32,
    /// Seed for respawn item draws
    pub rng_seed: u64,

    // === Feedback ===
    /// Length of zone/object highlight pulses
    pub pulse_duration_secs: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round_duration_secs: ROUND_DURATION_SECS,
            goal_value: GOAL_VALUE,
            low_time_warning_secs: LOW_TIME_WARNING_SECS,

            scan_cooldown_secs: SCAN_COOLDOWN_SECS,
            zone_radius_tolerance: ZONE_RADIUS_TOLERANCE,
            match_order: MatchOrder::default(),
            retire_on_scan: true,

            slot_precision: SLOT_PRECISION,
            rng_seed: 0x5EED,

            pulse_duration_secs: PULSE_DURATION_SECS,
        }
    }
}

impl Settings {
    /// Parse settings JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load a settings file from disk
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values the round logic can't honor
    pub fn validate(&self) -> Result<(), SettingsError> {
        check(
            "round_duration_secs",
            "finite and > 0",
            self.round_duration_secs as f64,
            |v| v > 0.0,
        )?;
        check("goal_value", "finite and >= 0", self.goal_value, |v| v >= 0.0)?;
        check(
            "low_time_warning_secs",
            "finite and >= 0",
            self.low_time_warning_secs as f64,
            |v| v >= 0.0,
        )?;
        check(
            "scan_cooldown_secs",
            "finite and >= 0",
            self.scan_cooldown_secs,
            |v| v >= 0.0,
        )?;
        check(
            "zone_radius_tolerance",
            "finite and > 0",
            self.zone_radius_tolerance as f64,
            |v| v > 0.0,
        )?;
        check(
            "slot_precision",
            "<= 6",
            self.slot_precision as f64,
            |v| v <= 6.0,
        )?;
        check(
            "pulse_duration_secs",
            "finite and >= 0",
            self.pulse_duration_secs as f64,
            |v| v >= 0.0,
        )?;
        Ok(())
    }
}

fn check(
    field: &'static str,
    requirement: &'static str,
    value: f64,
    ok: impl Fn(f64) -> bool,
) -> Result<(), SettingsError> {
    if value.is_finite() && ok(value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            requirement,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.round_duration_secs, 30.0);
        assert_eq!(settings.goal_value, 150.0);
        assert_eq!(settings.match_order, MatchOrder::FirstCandidate);
        assert!(settings.retire_on_scan);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{"goal_value": 75.0, "match_order": "nearest"}"#).unwrap();
        assert_eq!(settings.goal_value, 75.0);
        assert_eq!(settings.match_order, MatchOrder::Nearest);
        assert_eq!(settings.scan_cooldown_secs, SCAN_COOLDOWN_SECS);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = Settings::from_json(r#"{"round_duration_secs": 0.0}"#).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::OutOfRange {
                field: "round_duration_secs",
                ..
            }
        ));
        assert!(Settings::from_json(r#"{"scan_cooldown_secs": -1.0}"#).is_err());
        assert!(Settings::from_json(r#"{"slot_precision": 9}"#).is_err());
        assert!(matches!(
            Settings::from_json("not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let path = Path::new("no/such/dir/settings.json");
        let err = Settings::load(path).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
        assert!(err.to_string().contains("settings.json"));
    }

    #[test]
    fn test_match_order_names() {
        assert_eq!(MatchOrder::from_str("Nearest"), Some(MatchOrder::Nearest));
        assert_eq!(MatchOrder::from_str("first"), Some(MatchOrder::FirstCandidate));
        assert_eq!(MatchOrder::from_str("random"), None);
        assert_eq!(MatchOrder::Nearest.as_str(), "nearest");
    }
}

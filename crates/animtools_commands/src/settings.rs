// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tool settings.
//!
//! Persisted as pretty RON. Files written by a newer format version are
//! rejected on load.

use crate::commands::{BreakdownCommand, CleanCurvesCommand, RetimeCommand, SetKeyCommand};
use crate::policy::InvalidAttrPolicy;
use animtools_curve::{BreakdownMode, BreakdownOptions, CleanOptions, RetimeOptions, SetKeyOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings persistence errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid settings RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    /// File written by a newer format version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest readable version
        supported: u32,
    },
}

/// Breakdown tool settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakdownSettings {
    /// Blend weight between the previous and next key
    pub weight: f64,
    /// Overwrite or ripple
    pub mode: BreakdownMode,
    /// Failure handling
    pub policy: InvalidAttrPolicy,
    /// Skip the ripple uniformity check
    pub ignore_ripple_check: bool,
    /// Set the breakdown marker on written keys
    pub mark_special: bool,
    /// Only break down highlighted attributes
    pub selected_attributes_only: bool,
}

impl Default for BreakdownSettings {
    fn default() -> Self {
        Self {
            weight: 0.5,
            mode: BreakdownMode::Overwrite,
            policy: InvalidAttrPolicy::FailAll,
            ignore_ripple_check: false,
            mark_special: false,
            selected_attributes_only: false,
        }
    }
}

impl BreakdownSettings {
    /// Breakdown options for the curve layer
    pub fn options(&self) -> BreakdownOptions {
        BreakdownOptions::default()
            .with_weight(self.weight)
            .with_mode(self.mode)
            .with_mark_special(self.mark_special)
    }
}

/// Settings of every curve tool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Settings format version
    pub version: u32,
    /// Breakdown tool
    pub breakdown: BreakdownSettings,
    /// Curve cleaner
    pub clean: CleanOptions,
    /// Retimer
    pub retime: RetimeOptions,
    /// Set key tool
    pub set_key: SetKeyOptions,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            breakdown: BreakdownSettings::default(),
            clean: CleanOptions::default(),
            retime: RetimeOptions::default(),
            set_key: SetKeyOptions::default(),
        }
    }
}

impl ToolSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings: ToolSettings = ron::from_str(&content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        tracing::debug!(path = %path.display(), "Loaded tool settings");
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Breakdown at `time` with these settings
    pub fn breakdown_command(&self, time: f64) -> BreakdownCommand {
        BreakdownCommand::new(time)
            .with_options(self.breakdown.options())
            .with_policy(self.breakdown.policy)
            .with_ignore_ripple_check(self.breakdown.ignore_ripple_check)
            .with_selected_attributes_only(self.breakdown.selected_attributes_only)
    }

    /// Clean with these settings
    pub fn clean_command(&self) -> CleanCurvesCommand {
        CleanCurvesCommand::new(self.clean)
    }

    /// Retime `[start, end]` with these settings
    pub fn retime_command(&self, start: f64, end: f64) -> RetimeCommand {
        RetimeCommand::new(start, end, self.retime)
    }

    /// Set keys at `time` with these settings; values are added by the host
    pub fn set_key_command(&self, time: f64) -> SetKeyCommand {
        SetKeyCommand::new(time, self.set_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use animtools_curve::{BoundaryTangent, SetKeyMode};
    use uuid::Uuid;

    #[test]
    fn test_default_settings() {
        let settings = ToolSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.breakdown.weight, 0.5);
        assert_eq!(settings.breakdown.mode, BreakdownMode::Overwrite);
        assert_eq!(settings.breakdown.policy, InvalidAttrPolicy::FailAll);
        assert!(!settings.breakdown.ignore_ripple_check);
        assert_eq!(settings.clean.boundary_tangent, BoundaryTangent::Spline);
        assert!(settings.clean.clean_tangents);
        assert!(!settings.clean.remove_redundant_keys);
        assert_eq!(settings.retime.delta, 1.0);
        assert!(!settings.retime.relative);
        assert_eq!(settings.set_key.mode, SetKeyMode::Create);
    }

    #[test]
    fn test_serialization() {
        let mut settings = ToolSettings::default();
        settings.breakdown.mode = BreakdownMode::Ripple;
        settings.clean.smoothness = 0.25;
        let ron_str = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: ToolSettings = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded: ToolSettings = ron::from_str("(breakdown: (weight: 0.25))").unwrap();
        assert_eq!(loaded.breakdown.weight, 0.25);
        assert_eq!(loaded.breakdown.mode, BreakdownMode::Overwrite);
        assert_eq!(loaded.retime, RetimeOptions::default());
    }

    #[test]
    fn test_save_load() {
        let path = std::env::temp_dir().join(format!("animtools-{}.ron", Uuid::new_v4()));
        let mut settings = ToolSettings::default();
        settings.retime = RetimeOptions::relative(2.0);
        settings.save(&path).unwrap();

        let loaded = ToolSettings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_newer_version_rejected() {
        let path = std::env::temp_dir().join(format!("animtools-{}.ron", Uuid::new_v4()));
        let settings = ToolSettings {
            version: SETTINGS_FORMAT_VERSION + 1,
            ..ToolSettings::default()
        };
        settings.save(&path).unwrap();

        let result = ToolSettings::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(SettingsError::UnsupportedVersion { found: 2, supported: 1 })));
    }

    #[test]
    fn test_command_constructors() {
        let mut settings = ToolSettings::default();
        settings.breakdown.weight = 0.25;
        settings.breakdown.policy = InvalidAttrPolicy::SkipObject;

        let breakdown = settings.breakdown_command(12.0);
        assert_eq!(breakdown.time, 12.0);
        assert_eq!(breakdown.options.weight, 0.25);
        assert_eq!(breakdown.policy, InvalidAttrPolicy::SkipObject);

        let retime = settings.retime_command(1.0, 8.0);
        assert_eq!(retime.options, settings.retime);
        assert!(settings.set_key_command(3.0).values.is_empty());
    }
}

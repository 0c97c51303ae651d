//! Generation options
//!
//! Options are plain serde data so they can be loaded from a JSON file,
//! embedded in test fixtures, or built in code.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_MAX_ROOM_ATTEMPTS;
use crate::dungeon::ThemePool;
use crate::error::ConfigError;

/// Knobs for a single `generate_level` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenOptions {
    /// Theme-template pool. `None` makes every room an ordinary random room.
    pub themes: Option<ThemePool>,
    /// Record every primitive RNG draw into `Level::rng_log`
    pub log_rng: bool,
    /// Cap on room-placement iterations
    pub max_room_attempts: u32,
    /// Run the structural validator after generation and warn on findings
    pub validate: bool,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            themes: Some(ThemePool::standard()),
            log_rng: false,
            max_room_attempts: DEFAULT_MAX_ROOM_ATTEMPTS,
            validate: false,
        }
    }
}

impl GenOptions {
    /// Options with themed rooms switched off
    pub fn plain() -> Self {
        Self {
            themes: None,
            ..Self::default()
        }
    }

    /// Same options with RNG logging switched on
    pub fn with_rng_log(mut self) -> Self {
        self.log_rng = true;
        self
    }

    /// Load options from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(contents)?;
        options.check()?;
        Ok(options)
    }

    /// Reject depths the generator has no meaning for. Depth 1 is the top level.
    pub fn check_depth(depth: i32) -> Result<i32, ConfigError> {
        if depth < 1 {
            return Err(ConfigError::InvalidValue {
                field: "depth",
                reason: format!("{} is below the first level", depth),
            });
        }
        Ok(depth)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.max_room_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_room_attempts",
                reason: "must be at least 1".into(),
            });
        }
        if let Some(themes) = &self.themes {
            themes.check()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_themes() {
        let opts = GenOptions::default();
        assert!(opts.themes.is_some());
        assert!(!opts.log_rng);
        assert_eq!(opts.max_room_attempts, DEFAULT_MAX_ROOM_ATTEMPTS);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts = GenOptions::from_json_str(r#"{ "log_rng": true, "themes": null }"#).unwrap();
        assert!(opts.log_rng);
        assert!(opts.themes.is_none());
        assert_eq!(opts.max_room_attempts, DEFAULT_MAX_ROOM_ATTEMPTS);
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = GenOptions::from_json_str(r#"{ "max_room_attempts": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "max_room_attempts", .. }));
    }

    #[test]
    fn test_depth_must_be_positive() {
        assert_eq!(GenOptions::check_depth(1).unwrap(), 1);
        assert!(matches!(
            GenOptions::check_depth(0),
            Err(ConfigError::InvalidValue { field: "depth", .. })
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            GenOptions::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_options_roundtrip() {
        let opts = GenOptions::plain().with_rng_log();
        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(GenOptions::from_json_str(&json).unwrap(), opts);
    }
}

//! Configuration structures for the futbar system.

use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration for resampling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Trading session boundaries.
    #[serde(default)]
    pub session: SessionConfig,
    /// Aggregation behavior.
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

impl Config {
    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that the configuration values are usable.
    pub fn validate(&self) -> Result<()> {
        self.session.validate()
    }
}

/// Session boundary configuration.
///
/// Times are exchange-local wall clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Timestamp of the last daytime bar; closes the daily window.
    pub daily_close: NaiveTime,
    /// End of the daytime session; stamped on emitted daily/weekly bars.
    pub session_end: NaiveTime,
    /// Start of the daytime session. Earlier bars are the night session's
    /// post-midnight tail. Used for segment classification only; it does
    /// not affect how windows close.
    pub day_open: NaiveTime,
    /// Weekday index (Monday = 0) whose daily close also closes the week.
    pub weekly_close_weekday: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            daily_close: NaiveTime::from_hms_opt(14, 59, 0).unwrap_or_default(),
            session_end: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or_default(),
            day_open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            weekly_close_weekday: 4,
        }
    }
}

impl SessionConfig {
    /// Check session settings.
    pub fn validate(&self) -> Result<()> {
        if self.weekly_close_weekday >= 7 {
            return Err(Error::config(format!(
                "weekly_close_weekday must be 0..=6, got {}",
                self.weekly_close_weekday
            )));
        }
        if self.session_end <= self.daily_close {
            return Err(Error::config(format!(
                "session_end {} must be after daily_close {}",
                self.session_end, self.daily_close
            )));
        }
        if self.day_open >= self.daily_close {
            return Err(Error::config(format!(
                "day_open {} must be before daily_close {}",
                self.day_open, self.daily_close
            )));
        }
        Ok(())
    }
}

/// Aggregation behavior configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Emit the unclosed window left at end of input as a partial bar.
    pub emit_partial_tail: bool,
    /// Reject bars whose timestamp goes backwards.
    pub validate_order: bool,
    /// Reject bars violating the OHLC/volume invariant. Off by default:
    /// some feeds stamp a settlement close outside the bar's range.
    pub validate_bars: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            emit_partial_tail: false,
            validate_order: true,
            validate_bars: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.session.daily_close,
            NaiveTime::from_hms_opt(14, 59, 0).unwrap()
        );
        assert_eq!(config.session.weekly_close_weekday, 4);
        assert!(!config.aggregation.emit_partial_tail);
        assert!(config.aggregation.validate_order);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            Config::from_json_str(r#"{"aggregation": {"emit_partial_tail": true}}"#).unwrap();
        assert!(config.aggregation.emit_partial_tail);
        assert!(!config.aggregation.validate_bars);
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_from_json_session_times() {
        let config = Config::from_json_str(
            r#"{"session": {"daily_close": "14:29:00", "session_end": "14:30:00"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.session.daily_close,
            NaiveTime::from_hms_opt(14, 29, 0).unwrap()
        );
        assert_eq!(config.session.weekly_close_weekday, 4);
    }

    #[test]
    fn test_invalid_weekday() {
        let err = Config::from_json_str(r#"{"session": {"weekly_close_weekday": 7}}"#).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_session_end_before_close() {
        let mut config = Config::default();
        config.session.session_end = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_json() {
        let err = Config::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_json_file("/nonexistent/futbar.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

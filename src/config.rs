//! Estimator configuration
//!
//! Settings come from builder calls or from the environment:
//!
//! - `PWD_DICTIONARY_PATH`: extra word list, loaded as the `custom` dictionary
//! - `PWD_MAX_PASSWORD_LENGTH`: longest accepted password in characters, `0` disables the cap

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::dictionary::{CUSTOM, DictionaryError, RankedDictionary};
use crate::matchers::RegexRule;

pub const DICTIONARY_PATH_ENV: &str = "PWD_DICTIONARY_PATH";
pub const MAX_PASSWORD_LENGTH_ENV: &str = "PWD_MAX_PASSWORD_LENGTH";

pub const DEFAULT_MAX_PASSWORD_LENGTH: usize = 256;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
}

#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    reference_date: Option<NaiveDate>,
    max_password_length: Option<usize>,
    debounce: Duration,
    dictionary_path: Option<PathBuf>,
    regex_rules: Vec<RegexRule>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            max_password_length: Some(DEFAULT_MAX_PASSWORD_LENGTH),
            debounce: DEFAULT_DEBOUNCE,
            dictionary_path: None,
            regex_rules: Vec::new(),
        }
    }
}

impl EstimatorConfig {
    /// Defaults overridden by the `PWD_*` environment variables that are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `PWD_MAX_PASSWORD_LENGTH` is not an integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var(DICTIONARY_PATH_ENV) {
            config.dictionary_path = Some(PathBuf::from(path));
        }

        if let Ok(value) = std::env::var(MAX_PASSWORD_LENGTH_ENV) {
            let max = value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: MAX_PASSWORD_LENGTH_ENV.to_string(),
                    value: value.clone(),
                })?;
            config.max_password_length = (max > 0).then_some(max);
        }

        Ok(config)
    }

    /// Fixes the date that year and date distances are measured from.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// `None` accepts passwords of any length.
    pub fn max_password_length(mut self, max: Option<usize>) -> Self {
        self.max_password_length = max;
        self
    }

    /// Delay before an async evaluation starts.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn dictionary_path(mut self, path: impl AsRef<Path>) -> Self {
        self.dictionary_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn regex_rule(mut self, rule: RegexRule) -> Self {
        self.regex_rules.push(rule);
        self
    }

    /// The configured reference date. `None` means today, read at every evaluation.
    pub fn fixed_reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    /// The configured reference date, or today's local date.
    pub fn resolved_reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn password_length_limit(&self) -> Option<usize> {
        self.max_password_length
    }

    pub fn debounce_duration(&self) -> Duration {
        self.debounce
    }

    pub fn regex_rules(&self) -> &[RegexRule] {
        &self.regex_rules
    }

    /// Loads the extra word list, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dictionary`] if the file is missing, unreadable or empty.
    pub fn load_dictionary(&self) -> Result<Option<RankedDictionary>, ConfigError> {
        match &self.dictionary_path {
            Some(path) => Ok(Some(RankedDictionary::from_path(CUSTOM, path)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value); }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key); }
    }

    fn cleanup_env() {
        remove_env(DICTIONARY_PATH_ENV);
        remove_env(MAX_PASSWORD_LENGTH_ENV);
    }

    #[test]
    fn test_defaults() {
        let config = EstimatorConfig::default();
        assert_eq!(config.fixed_reference_date(), None);
        assert_eq!(config.resolved_reference_date(), Local::now().date_naive());
        assert_eq!(config.password_length_limit(), Some(256));
        assert_eq!(config.debounce_duration(), Duration::from_millis(300));
        assert!(config.regex_rules().is_empty());
        assert!(config.load_dictionary().unwrap().is_none());
    }

    #[test]
    fn test_builder() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let rule = RegexRule::new("hex", "[0-9a-f]{8,}", 16, true).unwrap();
        let config = EstimatorConfig::default()
            .reference_date(date)
            .max_password_length(None)
            .debounce(Duration::from_millis(10))
            .regex_rule(rule);
        assert_eq!(config.fixed_reference_date(), Some(date));
        assert_eq!(config.resolved_reference_date(), date);
        assert_eq!(config.password_length_limit(), None);
        assert_eq!(config.debounce_duration(), Duration::from_millis(10));
        assert_eq!(config.regex_rules().len(), 1);
    }

    #[test]
    #[serial]
    fn test_from_env_unset_uses_defaults() {
        cleanup_env();
        let config = EstimatorConfig::from_env().unwrap();
        assert_eq!(config.password_length_limit(), Some(DEFAULT_MAX_PASSWORD_LENGTH));
        assert!(config.load_dictionary().unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_max_length() {
        set_env(MAX_PASSWORD_LENGTH_ENV, "64");
        let config = EstimatorConfig::from_env().unwrap();
        assert_eq!(config.password_length_limit(), Some(64));

        set_env(MAX_PASSWORD_LENGTH_ENV, "0");
        let config = EstimatorConfig::from_env().unwrap();
        assert_eq!(config.password_length_limit(), None);

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_max_length() {
        set_env(MAX_PASSWORD_LENGTH_ENV, "lots");
        match EstimatorConfig::from_env() {
            Err(ConfigError::InvalidValue { key, value }) => {
                assert_eq!(key, MAX_PASSWORD_LENGTH_ENV);
                assert_eq!(value, "lots");
            }
            other => panic!("Expected InvalidValue error, got {:?}", other),
        }
        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_from_env_dictionary_path() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "zorglub").expect("Failed to write");
        writeln!(temp_file, "grimble").expect("Failed to write");
        set_env(DICTIONARY_PATH_ENV, temp_file.path().to_str().unwrap());

        let config = EstimatorConfig::from_env().unwrap();
        let dictionary = config.load_dictionary().unwrap().unwrap();
        assert_eq!(dictionary.name(), CUSTOM);
        assert_eq!(dictionary.rank("grimble"), Some(2));

        cleanup_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_dictionary() {
        set_env(DICTIONARY_PATH_ENV, "/nonexistent/path/words.txt");
        let config = EstimatorConfig::from_env().unwrap();
        assert!(matches!(
            config.load_dictionary(),
            Err(ConfigError::Dictionary(DictionaryError::FileNotFound(_)))
        ));
        cleanup_env();
    }
}

//! Configuration types.

use crate::error::ConfigError;

/// Environment variable overriding [`FormConfig::draft_key`].
pub const ENV_DRAFT_KEY: &str = "APPLICATION_FORM_DRAFT_KEY";
/// Environment variable overriding [`ValidationLimits::max_file_size`] (bytes).
pub const ENV_MAX_FILE_SIZE: &str = "APPLICATION_FORM_MAX_FILE_SIZE";

/// Bounds applied by the validation rule set.
///
/// Lengths are counted in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationLimits {
    /// Maximum length of first and last names.
    pub name_max_len: usize,
    /// Maximum length of the (optional) address.
    pub address_max_len: usize,
    /// Maximum length of the high school name.
    pub high_school_name_max_len: usize,
    /// Maximum length of the free-text high school grade.
    pub grade_max_len: usize,
    /// Minimum count of phone characters after the optional leading `+`.
    pub phone_min_len: usize,
    /// Per-file size ceiling in bytes.
    pub max_file_size: u64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            name_max_len: 50,
            address_max_len: 200,
            high_school_name_max_len: 100,
            grade_max_len: 10,
            phone_min_len: 10,
            max_file_size: 5 * 1024 * 1024, // 5 MiB
        }
    }
}

/// Form session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormConfig {
    /// Storage key the draft is written under.
    pub draft_key: String,
    /// Validation bounds.
    pub limits: ValidationLimits,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            draft_key: "applicationFormDraft".to_string(),
            limits: ValidationLimits::default(),
        }
    }
}

impl FormConfig {
    /// Build a config from defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup(ENV_DRAFT_KEY) {
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_DRAFT_KEY.to_string(),
                    message: "draft key must not be empty".to_string(),
                });
            }
            config.draft_key = key.to_string();
        }

        if let Some(raw) = lookup(ENV_MAX_FILE_SIZE) {
            config.limits.max_file_size =
                raw.trim()
                    .parse()
                    .map_err(|e| ConfigError::InvalidValue {
                        key: ENV_MAX_FILE_SIZE.to_string(),
                        message: format!("{raw:?} is not a byte count: {e}"),
                    })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_form_constants() {
        let config = FormConfig::default();
        assert_eq!(config.draft_key, "applicationFormDraft");
        assert_eq!(config.limits.name_max_len, 50);
        assert_eq!(config.limits.address_max_len, 200);
        assert_eq!(config.limits.max_file_size, 5_242_880);
    }

    #[test]
    fn env_overrides_key_and_size() {
        let config = FormConfig::from_lookup(lookup_from(&[
            (ENV_DRAFT_KEY, "otherDraft"),
            (ENV_MAX_FILE_SIZE, "1024"),
        ]))
        .unwrap();
        assert_eq!(config.draft_key, "otherDraft");
        assert_eq!(config.limits.max_file_size, 1024);
        assert_eq!(config.limits.grade_max_len, 10);
    }

    #[test]
    fn unparsable_size_is_rejected() {
        let err = FormConfig::from_lookup(lookup_from(&[(ENV_MAX_FILE_SIZE, "five megs")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_MAX_FILE_SIZE));
    }

    #[test]
    fn blank_draft_key_is_rejected() {
        assert!(FormConfig::from_lookup(lookup_from(&[(ENV_DRAFT_KEY, "  ")])).is_err());
    }
}

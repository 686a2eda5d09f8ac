//! Runtime configuration read from the Lambda environment.

use crate::error::{Error, Result};

pub const ENV_DEST_BUCKET: &str = "DEST_BUCKET";
/// Comma-separated list of top-level fields to drop.
pub const ENV_EXCLUDED_FIELDS: &str = "EXCLUDED_FIELDS";
/// Fields dropped when `EXCLUDED_FIELDS` is not set.
pub const DEFAULT_EXCLUDED_FIELDS: &[&str] = &["unwanted_field"];

/// Settings shared by every notification of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformerConfig {
    pub dest_bucket: String,
    /// Top-level field names removed before encoding.
    pub excluded_fields: Vec<String>,
}

impl TransformerConfig {
    /// Creates a config with the default exclusion set.
    pub fn new(dest_bucket: impl Into<String>) -> Self {
        Self {
            dest_bucket: dest_bucket.into(),
            excluded_fields: DEFAULT_EXCLUDED_FIELDS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    pub fn with_excluded_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Loads the config with a custom environment lookup.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `DEST_BUCKET` is missing or blank.
    pub fn from_env_with<F>(get_env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dest_bucket = get_env(ENV_DEST_BUCKET)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Configuration(format!("missing {ENV_DEST_BUCKET}")))?;

        let config = Self::new(dest_bucket);
        match get_env(ENV_EXCLUDED_FIELDS) {
            Some(raw) => Ok(config.with_excluded_fields(parse_field_list(&raw))),
            None => Ok(config),
        }
    }
}

fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn dest_bucket_is_required() {
        let err = TransformerConfig::from_env_with(env(&[])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = TransformerConfig::from_env_with(env(&[(ENV_DEST_BUCKET, "  ")])).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn default_exclusions_apply_when_unset() {
        let config = TransformerConfig::from_env_with(env(&[(ENV_DEST_BUCKET, "processed")]))
            .unwrap();
        assert_eq!(config.dest_bucket, "processed");
        assert_eq!(config.excluded_fields, vec!["unwanted_field".to_string()]);
    }

    #[test]
    fn excluded_fields_are_trimmed_and_blanks_dropped() {
        let config = TransformerConfig::from_env_with(env(&[
            (ENV_DEST_BUCKET, "processed"),
            (ENV_EXCLUDED_FIELDS, " password, ,ssn,"),
        ]))
        .unwrap();
        assert_eq!(config.excluded_fields, vec!["password", "ssn"]);
    }

    #[test]
    fn empty_exclusion_list_disables_dropping() {
        let config = TransformerConfig::from_env_with(env(&[
            (ENV_DEST_BUCKET, "processed"),
            (ENV_EXCLUDED_FIELDS, ""),
        ]))
        .unwrap();
        assert!(config.excluded_fields.is_empty());
    }
}

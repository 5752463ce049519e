//! Configuration management for the Montage client

use std::collections::BTreeSet;
use std::env;

use crate::upload::{
    UploadConstraints, DEFAULT_ALLOWED_EXTENSION, DEFAULT_CHUNK_SIZE_BYTES, DEFAULT_MAX_SIZE_BYTES,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub upload: UploadConstraints,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig::default(),
            upload: UploadConstraints::default(),
        }
    }
}

impl Config {
    /// Read configuration from `MONTAGE_*` environment variables.
    ///
    /// Unset variables fall back to defaults; set but malformed ones are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api = ApiConfig {
            base_url: var("MONTAGE_API_URL").unwrap_or_else(|| "http://localhost:8000".to_string()),
            token: var("MONTAGE_API_TOKEN"),
            timeout_secs: parse_u64("MONTAGE_TIMEOUT_SECS", var("MONTAGE_TIMEOUT_SECS"), 30)?,
        };

        let allowed_extensions = match var("MONTAGE_ALLOWED_EXTENSIONS") {
            Some(list) => parse_extensions(&list),
            None => BTreeSet::from([DEFAULT_ALLOWED_EXTENSION.to_string()]),
        };

        let max_size_bytes = parse_u64(
            "MONTAGE_MAX_UPLOAD_BYTES",
            var("MONTAGE_MAX_UPLOAD_BYTES"),
            DEFAULT_MAX_SIZE_BYTES,
        )?;

        let default_chunk_size_bytes = parse_u64(
            "MONTAGE_CHUNK_SIZE_BYTES",
            var("MONTAGE_CHUNK_SIZE_BYTES"),
            DEFAULT_CHUNK_SIZE_BYTES,
        )?;
        if default_chunk_size_bytes == 0 {
            return Err(ConfigError::Invalid {
                var: "MONTAGE_CHUNK_SIZE_BYTES",
                value: "0".to_string(),
                reason: "chunk size must be positive".to_string(),
            });
        }

        Ok(Config {
            api,
            upload: UploadConstraints {
                allowed_extensions,
                max_size_bytes,
                default_chunk_size_bytes,
            },
        })
    }
}

fn parse_u64(var: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => match value.parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError::Invalid {
                var,
                value,
                reason: format!("{}", e),
            }),
        },
    }
}

/// Comma-separated list, normalized to lower case without leading dots
fn parse_extensions(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.token, None);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.upload.max_size_bytes, 52_428_800);
        assert_eq!(config.upload.default_chunk_size_bytes, 524_288);
        assert!(config.upload.allowed_extensions.contains("mp4"));
        assert_eq!(config.upload.allowed_extensions.len(), 1);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("MONTAGE_API_URL", "https://api.example.test"),
            ("MONTAGE_API_TOKEN", "tok"),
            ("MONTAGE_TIMEOUT_SECS", "5"),
            ("MONTAGE_ALLOWED_EXTENSIONS", "MP4, .mov,,webm"),
            ("MONTAGE_MAX_UPLOAD_BYTES", "1000"),
            ("MONTAGE_CHUNK_SIZE_BYTES", "100"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.example.test");
        assert_eq!(config.api.token.as_deref(), Some("tok"));
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(
            config.upload.allowed_extensions.iter().collect::<Vec<_>>(),
            vec!["mov", "mp4", "webm"]
        );
        assert_eq!(config.upload.max_size_bytes, 1000);
        assert_eq!(config.upload.default_chunk_size_bytes, 100);
    }

    #[test]
    fn test_blank_token_is_none() {
        let config = Config::from_lookup(lookup(&[("MONTAGE_API_TOKEN", "  ")])).unwrap();
        assert_eq!(config.api.token, None);
    }

    #[test]
    fn test_invalid_number() {
        let err = Config::from_lookup(lookup(&[("MONTAGE_MAX_UPLOAD_BYTES", "lots")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "MONTAGE_MAX_UPLOAD_BYTES", .. }
        ));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = Config::from_lookup(lookup(&[("MONTAGE_CHUNK_SIZE_BYTES", "0")]));
        assert!(result.is_err());
    }
}

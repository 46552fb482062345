//! Configuration for the notifier

use crate::template::DEFAULT_MAX_DEPTH;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-N size environment variable
pub const TOP_N_ENV: &str = "TOP_N";
/// Quote currency environment variable
pub const CONVERT_ENV: &str = "CONVERT";
/// Fallback template path environment variable
pub const TEMPLATE_PATH_ENV: &str = "TEMPLATE_PATH";
/// Prompt template path environment variable
pub const PROMPT_PATH_ENV: &str = "PROMPT_PATH";
/// Template nesting ceiling environment variable
pub const MAX_DEPTH_ENV: &str = "TEMPLATE_MAX_DEPTH";

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project name exposed to templates as `project_name`
    pub project_name: String,
    /// Number of ranked coins tracked
    pub top_n: usize,
    /// Quote currency for market caps
    pub convert: String,
    /// Fallback notification template
    pub template_path: PathBuf,
    /// AI prompt template
    pub prompt_path: PathBuf,
    /// Maximum block nesting rendered
    pub max_depth: usize,
    /// Format messages for Telegram's HTML parse mode
    pub telegram_html: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: "coinmarketcap_top100_bot".to_string(),
            top_n: 100,
            convert: "USD".to_string(),
            template_path: PathBuf::from("templates/telegram_post_fallback.template.md"),
            prompt_path: PathBuf::from("prompts/newcoins.prompts.md"),
            max_depth: DEFAULT_MAX_DEPTH,
            telegram_html: false,
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`; blank values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = get(TOP_N_ENV) {
            self.top_n = parse_positive(TOP_N_ENV, &raw)?;
        }
        if let Some(convert) = get(CONVERT_ENV) {
            self.convert = convert;
        }
        if let Some(path) = get(TEMPLATE_PATH_ENV) {
            self.template_path = PathBuf::from(path);
        }
        if let Some(path) = get(PROMPT_PATH_ENV) {
            self.prompt_path = PathBuf::from(path);
        }
        if let Some(raw) = get(MAX_DEPTH_ENV) {
            self.max_depth = parse_positive(MAX_DEPTH_ENV, &raw)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(Error::Config("top_n must be > 0".to_string()));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be > 0".to_string()));
        }
        if self.convert.trim().is_empty() {
            return Err(Error::Config("convert must not be empty".to_string()));
        }
        Ok(())
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<usize> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::Config(format!("{name} must be a positive integer"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let parsed: Config = serde_json::from_value(serde_json::json!({
            "top_n": 50
        }))
        .expect("parse config");
        assert_eq!(parsed.top_n, 50);
        assert_eq!(parsed.convert, "USD");
        assert_eq!(parsed.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!parsed.telegram_html);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"convert": "EUR", "telegram_html": true}}"#).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.convert, "EUR");
        assert!(config.telegram_html);
        assert_eq!(config.top_n, 100);
    }

    #[test]
    fn test_config_from_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("TOP_N", " 200 "),
                ("CONVERT", "BTC"),
                ("TEMPLATE_PATH", "custom.md"),
                ("PROMPT_PATH", ""),
                ("TEMPLATE_MAX_DEPTH", "8"),
            ]))
            .unwrap();

        assert_eq!(config.top_n, 200);
        assert_eq!(config.convert, "BTC");
        assert_eq!(config.template_path, PathBuf::from("custom.md"));
        assert_eq!(config.prompt_path, Config::default().prompt_path);
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn test_rejects_non_positive_top_n() {
        for raw in ["0", "-3", "many"] {
            let mut config = Config::default();
            let err = config.apply_overrides(lookup(&[("TOP_N", raw)])).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Configuration error: TOP_N must be a positive integer"
            );
        }
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let config = Config {
            convert: " ".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = Config {
            max_depth: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}

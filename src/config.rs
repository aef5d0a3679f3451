//! Runtime settings shared by the CLI and the HTTP server.
//!
//! Values come from the environment; binaries let flags override them.
//!
//! | variable | default |
//! |---|---|
//! | `PROFILES_PATH` | `data/profiles.csv` |
//! | `TALLY_DB` | `tally.db` |
//! | `OPENAI_API_KEY` | unset (LLM ranking disabled) |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
//! | `OPENAI_MODEL` | `gpt-4o-mini` |
//! | `PORT` | `8090` |

use std::path::PathBuf;

use crate::ranking::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct Settings {
    pub profiles_path: PathBuf,
    pub tally_db: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profiles_path: PathBuf::from("data/profiles.csv"),
            tally_db: "tally.db".to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            port: 8090,
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                tracing::warn!("Ignoring invalid PORT: {}", e);
                defaults.port
            }
            None => defaults.port,
        };

        Self {
            profiles_path: non_empty("PROFILES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.profiles_path),
            tally_db: non_empty("TALLY_DB").unwrap_or(defaults.tally_db),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: non_empty("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            port,
        }
    }

    pub fn llm_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_env_empty() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.profiles_path, PathBuf::from("data/profiles.csv"));
        assert_eq!(settings.port, 8090);
        assert!(!settings.llm_enabled());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("PROFILES_PATH", "/data/p.csv"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("PORT", "not-a-port"),
            ("TALLY_DB", "  "),
        ]
        .into_iter()
        .collect();

        let settings = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.profiles_path, PathBuf::from("/data/p.csv"));
        assert_eq!(settings.openai_model, "gpt-4o");
        assert_eq!(settings.tally_db, "tally.db");
        assert_eq!(settings.port, 8090);
        assert!(settings.llm_enabled());
    }
}

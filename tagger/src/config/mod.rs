//! Runtime configuration from the environment (and an optional `.env`).
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `CLASSICAL_TAGGER_ARCHIVE` | `tags.json` | tag archive file |
//! | `CLASSICAL_TAGGER_LOG_DIR` | `logs` | run log directory |
//! | `CLASSICAL_TAGGER_THREADS` | rayon default | worker threads |
//! | `CLASSICAL_TAGGER_EXTENSIONS` | `flac` | comma-separated audio extensions |

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const ARCHIVE_VAR: &str = "CLASSICAL_TAGGER_ARCHIVE";
pub const LOG_DIR_VAR: &str = "CLASSICAL_TAGGER_LOG_DIR";
pub const THREADS_VAR: &str = "CLASSICAL_TAGGER_THREADS";
pub const EXTENSIONS_VAR: &str = "CLASSICAL_TAGGER_EXTENSIONS";

const DEFAULT_ARCHIVE: &str = "tags.json";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_EXTENSIONS: &str = "flac";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggerConfig {
    pub archive_path: PathBuf,
    pub log_dir: PathBuf,
    /// `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Lower-case, without the dot.
    pub extensions: Vec<String>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from(DEFAULT_ARCHIVE),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            threads: None,
            extensions: parse_extensions(DEFAULT_EXTENSIONS),
        }
    }
}

impl TaggerConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key -> value lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(archive) = get(ARCHIVE_VAR) {
            config.archive_path = PathBuf::from(archive);
        }

        if let Some(dir) = get(LOG_DIR_VAR) {
            config.log_dir = PathBuf::from(dir);
        }

        if let Some(threads) = get(THREADS_VAR) {
            let count = threads.parse::<usize>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: THREADS_VAR.to_string(),
                    message: format!("expected a positive integer, got '{}'", threads),
                }
            })?;
            config.threads = Some(count);
        }

        if let Some(extensions) = get(EXTENSIONS_VAR) {
            let parsed = parse_extensions(&extensions);
            if parsed.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: EXTENSIONS_VAR.to_string(),
                    message: "no extension given".to_string(),
                });
            }
            config.extensions = parsed;
        }

        Ok(config)
    }

    /// Size rayon's global pool. Only the first call in a process takes effect.
    pub fn apply_threads(&self) {
        if let Some(threads) = self.threads {
            let _ = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global();
        }
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TaggerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TaggerConfig::default());
        assert_eq!(config.archive_path, PathBuf::from("tags.json"));
        assert_eq!(config.extensions, vec!["flac".to_string()]);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn test_overrides() {
        let config = TaggerConfig::from_lookup(lookup(&[
            (ARCHIVE_VAR, "/data/archive.json"),
            (LOG_DIR_VAR, "/tmp/logs"),
            (THREADS_VAR, "4"),
            (EXTENSIONS_VAR, ".FLAC, ogg ,"),
        ]))
        .unwrap();

        assert_eq!(config.archive_path, PathBuf::from("/data/archive.json"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.threads, Some(4));
        assert_eq!(config.extensions, vec!["flac".to_string(), "ogg".to_string()]);
    }

    #[test]
    fn test_invalid_threads() {
        for bad in ["0", "many", "-2"] {
            let err = TaggerConfig::from_lookup(lookup(&[(THREADS_VAR, bad)])).unwrap_err();
            assert!(err.to_string().contains(THREADS_VAR), "value {}", bad);
        }
    }

    #[test]
    fn test_blank_values_take_defaults() {
        let config = TaggerConfig::from_lookup(lookup(&[(ARCHIVE_VAR, "  "), (THREADS_VAR, "")])).unwrap();
        assert_eq!(config, TaggerConfig::default());
    }

    #[test]
    fn test_extensions_without_values() {
        assert!(TaggerConfig::from_lookup(lookup(&[(EXTENSIONS_VAR, ", ,")])).is_err());
    }
}

use std::env;
use std::path::PathBuf;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2:3b";
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings. Environment variables provide the defaults and command
/// line flags override them.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file backing the address book. `None` keeps everything in memory.
    pub db_path: Option<PathBuf>,
    pub ollama_url: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Reads `NEXUS_DB`, `OLLAMA_HOST` and `NEXUS_MODEL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            db_path: non_empty("NEXUS_DB").map(PathBuf::from),
            ollama_url: non_empty("OLLAMA_HOST")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.ollama_url),
            model: non_empty("NEXUS_MODEL").unwrap_or(defaults.model),
        }
    }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = Config::from_lookup(lookup(&[
            ("NEXUS_DB", "/tmp/book.db"),
            ("OLLAMA_HOST", "http://gpu-box:11434/"),
            ("NEXUS_MODEL", "qwen2.5"),
        ]));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/book.db")));
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.model, "qwen2.5");
    }

    #[test]
    fn blank_values_fall_back() {
        let config = Config::from_lookup(lookup(&[("NEXUS_DB", "  "), ("NEXUS_MODEL", "")]));
        assert_eq!(config.db_path, None);
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}

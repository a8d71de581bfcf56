//! Runtime settings for the cache/CLI boundary, stored as RON.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding cached vertex files.
    pub cache_dir: PathBuf,
    /// Largest iteration count a request may ask for. Expansion itself is
    /// unbounded, so this is the only guard against runaway memory.
    pub max_iterations: u32,
    /// Treat a drawing with no segments as an error instead of an empty file.
    pub reject_empty: bool,
    /// Default tracing filter when RUST_LOG is unset.
    pub log_filter: String,
    pub svg_stroke_width: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("saved_files"),
            max_iterations: 16,
            reject_empty: false,
            log_filter: "info".to_string(),
            svg_stroke_width: 0.1,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Config::load(path),
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = ron::from_str("(max_iterations: 8, reject_empty: true)").unwrap();
        assert_eq!(config.max_iterations, 8);
        assert!(config.reject_empty);
        assert_eq!(config.cache_dir, PathBuf::from("saved_files"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"(cache_dir: "/tmp/lsys", svg_stroke_width: 0.5)"#).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/lsys"));
        assert_eq!(config.svg_stroke_width, 0.5);
        assert_eq!(config.max_iterations, 16);

        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
        assert!(Config::load("/definitely/not/here.ron").is_err());
    }
}

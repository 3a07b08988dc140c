//! Config loading, validation, and lock path resolution.

use super::model::{CONFIG_FILE_NAME, Config};
use crate::error::{HighlanderError, Result};
use crate::instance::default_lock_dir;
use std::path::{Path, PathBuf};

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(HighlanderError::Config)` - Read error, parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            HighlanderError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load `explicit` if given, else `.highlander.yaml` in `dir` if present,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            HighlanderError::Config(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            HighlanderError::Config(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_dir`, when set, must be non-empty
    /// - `log_level` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.lock_dir
            && dir.as_os_str().is_empty()
        {
            return Err(HighlanderError::Config(
                "config validation failed: lock_dir must not be empty".to_string(),
            ));
        }

        if self.log_level.trim().is_empty() {
            return Err(HighlanderError::Config(
                "config validation failed: log_level must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the lock directory: `flag` first, then `lock_dir` from the
    /// config, then `<cwd>/.pid`. Relative paths are joined onto the working
    /// directory.
    pub fn resolve_lock_dir(&self, flag: Option<&Path>) -> Result<PathBuf> {
        let Some(chosen) = flag.or(self.lock_dir.as_deref()) else {
            return default_lock_dir();
        };

        if chosen.is_absolute() {
            return Ok(chosen.to_path_buf());
        }

        let cwd = std::env::current_dir()
            .map_err(|e| HighlanderError::io("resolve working directory for", ".", e))?;
        Ok(cwd.join(chosen))
    }
}

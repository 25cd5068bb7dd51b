// crates/config/src/loader.rs

use std::path::{Path, PathBuf};

use aari_core::{AariError, AariResult};
use tracing::debug;

use crate::{AariConfig, StoreBackend};

pub const ENV_LOG_LEVEL: &str = "AARI_LOG_LEVEL";
pub const ENV_USER_NAME: &str = "AARI_USER_NAME";
pub const ENV_STORE_PATH: &str = "AARI_STORE_PATH";
pub const ENV_STATISTICAL_MODEL: &str = "AARI_STATISTICAL_MODEL";

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_from_file(path: &Path) -> AariResult<AariConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AariError::Config(format!("Failed to read config: {}", e)))?;

        let config: AariConfig = toml::from_str(&content)
            .map_err(|e| AariError::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    pub fn save_to_file(path: &Path, config: &AariConfig) -> AariResult<()> {
        let content = toml::to_string_pretty(config)
            .map_err(|e| AariError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| AariError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Defaults with environment overrides applied.
    pub fn load_from_env() -> AariResult<AariConfig> {
        let mut config = AariConfig::default();
        Self::apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// The file at `path` when given and present, defaults otherwise; then
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> AariResult<AariConfig> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            Some(path) => {
                debug!("Config file {:?} not found, using defaults", path);
                AariConfig::default()
            }
            None => AariConfig::default(),
        };
        Self::apply_env_overrides(&mut config)?;
        Ok(config)
    }

    pub fn apply_env_overrides(config: &mut AariConfig) -> AariResult<()> {
        Self::apply_overrides(config, |key| std::env::var(key).ok())
    }

    /// Applies `AARI_*` overrides looked up through `var`.
    pub fn apply_overrides<F>(config: &mut AariConfig, var: F) -> AariResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = var(ENV_LOG_LEVEL) {
            config.app.log_level = level;
        }
        if let Some(name) = var(ENV_USER_NAME) {
            config.router.user_name = name;
        }
        if let Some(path) = var(ENV_STORE_PATH) {
            config.store.backend = StoreBackend::JsonFile;
            config.store.path = Some(PathBuf::from(path));
        }
        if let Some(flag) = var(ENV_STATISTICAL_MODEL) {
            config.nlu.statistical_model = parse_flag(&flag).ok_or_else(|| {
                AariError::Config(format!("Invalid {} value: {}", ENV_STATISTICAL_MODEL, flag))
            })?;
        }

        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> AariResult<AariConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = AariConfig::default();
        ConfigLoader::apply_overrides(&mut config, |key| vars.get(key).cloned())?;
        Ok(config)
    }

    #[test]
    fn env_overrides_apply() {
        let config = overrides(&[
            (ENV_USER_NAME, "priya"),
            (ENV_LOG_LEVEL, "warn"),
            (ENV_STORE_PATH, "/tmp/aari.json"),
            (ENV_STATISTICAL_MODEL, "off"),
        ])
        .unwrap();

        assert_eq!(config.router.user_name, "priya");
        assert_eq!(config.app.log_level, "warn");
        assert_eq!(config.store.backend, StoreBackend::JsonFile);
        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/aari.json")));
        assert!(!config.nlu.statistical_model);
    }

    #[test]
    fn invalid_flag_is_a_config_error() {
        let result = overrides(&[(ENV_STATISTICAL_MODEL, "maybe")]);
        assert!(matches!(result, Err(AariError::Config(_))));
    }

    #[test]
    fn save_and_load_preserve_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("aari.toml");

        let mut config = AariConfig::default();
        config.router.user_name = "kim".to_string();
        config.actions.dry_run = false;
        ConfigLoader::save_to_file(&path, &config).unwrap();

        assert_eq!(ConfigLoader::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.app.history_limit, AariConfig::default().app.history_limit);
    }

    #[test]
    fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[router\nuser_name = 1").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(AariError::Config(_))
        ));
    }
}

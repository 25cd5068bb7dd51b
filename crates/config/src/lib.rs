// crates/config/src/lib.rs

use aari_actions::{ActionsConfig, RouterConfig};
use aari_core::AariResult;
use aari_nlu::NluConfig;
use aari_observability::ObservabilityConfig;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub mod loader;
pub mod validator;

pub use loader::ConfigLoader;
pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AariConfig {
    pub app: AppConfig,
    pub nlu: NluConfig,
    pub router: RouterConfig,
    pub store: StoreConfig,
    pub actions: ActionsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
    /// Conversation turns kept in memory.
    pub history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "aari".to_string(),
            log_level: "aari=debug,info".to_string(),
            history_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    JsonFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: None,
        }
    }
}

/// Configuration manager holding the active configuration and the file it
/// came from.
pub struct ConfigManager {
    config_path: PathBuf,
    config: Arc<RwLock<AariConfig>>,
}

impl ConfigManager {
    /// Loads `config_path`, applies `AARI_*` overrides and validates.
    pub fn new(config_path: impl AsRef<Path>) -> AariResult<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let mut config = ConfigLoader::load_from_file(&config_path)?;
        ConfigLoader::apply_env_overrides(&mut config)?;

        ConfigValidator::validate(&config)?;

        Ok(Self {
            config_path,
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub fn with_defaults() -> Self {
        Self::from_config(PathBuf::from("config/aari.toml"), AariConfig::default())
    }

    pub fn from_config(config_path: PathBuf, config: AariConfig) -> Self {
        Self {
            config_path,
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn get(&self) -> AariConfig {
        self.config.read().clone()
    }

    /// Applies `f` and keeps the result only if it validates.
    pub fn update<F>(&self, f: F) -> AariResult<()>
    where
        F: FnOnce(&mut AariConfig),
    {
        let mut config = self.config.write();
        let mut candidate = config.clone();
        f(&mut candidate);

        ConfigValidator::validate(&candidate)?;
        ConfigValidator::validate_runtime_change(&config, &candidate)?;
        *config = candidate;

        Ok(())
    }

    /// Re-reads the file and returns the dotted names of the fields that
    /// changed.
    pub fn reload(&self) -> AariResult<Vec<String>> {
        let mut new_config = ConfigLoader::load_from_file(&self.config_path)?;
        ConfigLoader::apply_env_overrides(&mut new_config)?;
        ConfigValidator::validate(&new_config)?;

        let mut config = self.config.write();
        ConfigValidator::validate_runtime_change(&config, &new_config)?;

        let changed_fields = Self::detect_changes(&config, &new_config);
        if !changed_fields.is_empty() {
            info!("Configuration changes detected: {:?}", changed_fields);
            *config = new_config;
        }

        Ok(changed_fields)
    }

    pub fn save(&self) -> AariResult<()> {
        let config = self.config.read();
        ConfigLoader::save_to_file(&self.config_path, &config)?;
        Ok(())
    }

    fn detect_changes(old: &AariConfig, new: &AariConfig) -> Vec<String> {
        let mut changes = Vec::new();

        if old.app.log_level != new.app.log_level {
            changes.push("app.log_level".to_string());
        }
        if old.app.history_limit != new.app.history_limit {
            changes.push("app.history_limit".to_string());
        }
        if old.nlu != new.nlu {
            changes.push("nlu".to_string());
        }
        if old.router.user_name != new.router.user_name {
            changes.push("router.user_name".to_string());
        }
        if old.router.complex_task_triggers != new.router.complex_task_triggers {
            changes.push("router.complex_task_triggers".to_string());
        }
        if old.actions != new.actions {
            changes.push("actions".to_string());
        }
        if old.observability != new.observability {
            changes.push("observability".to_string());
        }

        changes
    }
}

// crates/config/src/validator.rs

use aari_core::{AariError, AariResult};
use tracing::warn;

use crate::{AariConfig, StoreBackend};

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AariConfig) -> AariResult<()> {
        // NLU
        // Matched intents must be able to score above it.
        if !(0.0..1.0).contains(&config.nlu.unknown_confidence) {
            return Err(AariError::Config(
                "Unknown confidence must be in [0.0, 1.0)".to_string(),
            ));
        }
        if config.nlu.max_features == 0 {
            return Err(AariError::Config("max_features must be > 0".to_string()));
        }
        if !(config.nlu.smoothing > 0.0) {
            return Err(AariError::Config("Smoothing must be > 0".to_string()));
        }

        // Router
        if config
            .router
            .complex_task_triggers
            .iter()
            .all(|t| t.trim().is_empty())
        {
            return Err(AariError::Config(
                "At least one complex-task trigger is required".to_string(),
            ));
        }
        if config.router.user_name.trim().is_empty() {
            warn!("No user name configured");
        }

        // Store
        if config.store.backend == StoreBackend::JsonFile && config.store.path.is_none() {
            return Err(AariError::Config(
                "The json_file store needs a path".to_string(),
            ));
        }

        // Actions
        if config.actions.enabled_modules.is_empty() {
            warn!("No action modules enabled; every dispatch will fail");
        }

        if config.app.history_limit == 0 {
            return Err(AariError::Config("history_limit must be > 0".to_string()));
        }

        Ok(())
    }

    pub fn validate_runtime_change(old: &AariConfig, new: &AariConfig) -> AariResult<()> {
        // The store is opened once at startup.
        if old.store != new.store {
            return Err(AariError::Config(
                "Cannot change the store at runtime".to_string(),
            ));
        }

        Ok(())
    }
}

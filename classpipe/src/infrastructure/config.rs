// /////////////////////////////////////////////////////////////////////////////
// Class Recording Processing Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Layered configuration: built-in defaults, an optional TOML file, then
//! environment variables (`CLASSPIPE_*`), validated eagerly at startup so a
//! misconfigured deployment fails fast instead of during the first request.

use classpipe_domain::PipelineError;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub max_connections: u32,
}

fn default_pool_size() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectStoreSettings {
    pub bucket: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    #[serde(default = "default_worker_threads")]
    pub research_concurrency: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_worker_threads() -> usize {
    8
}

fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub object_store: ObjectStoreSettings,
    #[serde(default)]
    pub worker: Option<WorkerSettings>,
}

impl Settings {
    pub fn worker(&self) -> WorkerSettings {
        self.worker.clone().unwrap_or(WorkerSettings {
            research_concurrency: default_worker_threads(),
            max_retries: default_max_retries(),
        })
    }

    /// Loads defaults, then `config/<profile>.toml` if present, then
    /// `CLASSPIPE_*` environment variable overrides.
    pub fn load(profile: &str) -> Result<Self, PipelineError> {
        let builder = Config::builder()
            .set_default("database.max_connections", 10)?
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            .add_source(Environment::with_prefix("CLASSPIPE").separator("__"));

        let config = builder.build().map_err(|e| PipelineError::configuration(e.to_string()))?;
        let settings: Settings = config.try_deserialize().map_err(|e| PipelineError::configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.database.url.is_empty() {
            return Err(PipelineError::configuration("database.url must not be empty"));
        }
        if self.object_store.bucket.is_empty() {
            return Err(PipelineError::configuration("object_store.bucket must not be empty"));
        }
        Ok(())
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_database_url() {
        let settings = Settings {
            database: DatabaseSettings {
                url: String::new(),
                max_connections: 10,
            },
            object_store: ObjectStoreSettings {
                bucket: "recordings".into(),
                region: None,
                endpoint: None,
            },
            worker: None,
        };
        assert!(settings.validate().is_err());
    }
}

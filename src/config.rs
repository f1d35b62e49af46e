// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor configuration.
//!
//! Resolution order: built-in defaults, then an optional JSON file, then `FLOWDRAFT_*`
//! environment variables. CLI flags are applied on top by the binary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::generate::{GenerateConfig, GenerateMethod, DEFAULT_ENDPOINT};
use crate::store::{AutoSaveSettings, WriteDurability, AUTOSAVE_KEY};

pub const ENV_PREFIX: &str = "FLOWDRAFT_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub storage_key: String,
    pub autosave_delay_ms: u64,
    pub status_reset_ms: u64,
    pub generate_url: String,
    pub generate_method: GenerateMethod,
    pub generate_timeout_ms: u64,
    pub store_dir: PathBuf,
    pub export_dir: PathBuf,
    pub durable_writes: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_key: AUTOSAVE_KEY.to_owned(),
            autosave_delay_ms: 2000,
            status_reset_ms: 2000,
            generate_url: DEFAULT_ENDPOINT.to_owned(),
            generate_method: GenerateMethod::Post,
            generate_timeout_ms: 60_000,
            store_dir: PathBuf::from(".flowdraft"),
            export_dir: PathBuf::from("."),
            durable_writes: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value {value:?} for {var}: {reason}")]
    Env { var: String, value: String, reason: String },
}

impl EditorConfig {
    /// Defaults, overlaid with `path` (when given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Reads a JSON file; fields it omits keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_json::from_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Applies `FLOWDRAFT_*` overrides looked up through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let var = |suffix: &str| {
            let name = format!("{ENV_PREFIX}{suffix}");
            lookup(&name).map(|value| (name, value))
        };

        if let Some((_, value)) = var("STORAGE_KEY") {
            self.storage_key = value;
        }
        if let Some(entry) = var("AUTOSAVE_DELAY_MS") {
            self.autosave_delay_ms = parse_env(entry)?;
        }
        if let Some(entry) = var("STATUS_RESET_MS") {
            self.status_reset_ms = parse_env(entry)?;
        }
        if let Some((_, value)) = var("GENERATE_URL") {
            self.generate_url = value;
        }
        if let Some(entry) = var("GENERATE_METHOD") {
            self.generate_method = parse_env(entry)?;
        }
        if let Some(entry) = var("GENERATE_TIMEOUT_MS") {
            self.generate_timeout_ms = parse_env(entry)?;
        }
        if let Some((_, value)) = var("STORE_DIR") {
            self.store_dir = PathBuf::from(value);
        }
        if let Some((_, value)) = var("EXPORT_DIR") {
            self.export_dir = PathBuf::from(value);
        }
        if let Some(entry) = var("DURABLE_WRITES") {
            self.durable_writes = parse_env(entry)?;
        }
        Ok(())
    }

    pub fn autosave_settings(&self) -> AutoSaveSettings {
        AutoSaveSettings {
            key: self.storage_key.clone(),
            debounce: Duration::from_millis(self.autosave_delay_ms),
            status_reset: Duration::from_millis(self.status_reset_ms),
        }
    }

    pub fn generate_config(&self) -> GenerateConfig {
        GenerateConfig {
            endpoint: self.generate_url.clone(),
            method: self.generate_method,
            timeout: Duration::from_millis(self.generate_timeout_ms),
        }
    }

    pub fn durability(&self) -> WriteDurability {
        if self.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        }
    }
}

fn parse_env<T>((var, value): (String, String)) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Env {
        reason: err.to_string(),
        var,
        value,
    })
}

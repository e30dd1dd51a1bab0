// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loading.
//!
//! # Loader Pipeline
//!
//! ```text
//! ConfigLoader::new()
//!   .add_ini_file(path) | .add_ini_str()
//!   .with_env_prefix("DEBFLOW")
//!   .with_package_default(name)
//!        |
//!        v
//!    build()
//!      raw = file + env
//!      for key in KEYS:
//!        empty/missing + required  --> MissingKey
//!        empty/missing             --> default (or None)
//!      resolved --> serde --> Config
//! ```

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};

use super::Config;
use super::keys::{KEYS, PACKAGE_NAME};
use crate::error::ConfigError;

/// Builder for loading a [`Config`].
pub struct ConfigLoader {
    builder: ConfigBuilder<DefaultState>,
    origin: Option<PathBuf>,
    environment: Option<Environment>,
    package_default: Option<String>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            origin: None,
            environment: None,
            package_default: None,
        }
    }

    /// Adds an INI file. `build()` fails with `NotFound` if it is missing.
    #[must_use]
    pub fn add_ini_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Ini).required(true));
        self.origin = Some(p.to_path_buf());
        self
    }

    #[must_use]
    pub fn add_ini_str(mut self, content: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Ini));
        self
    }

    /// Reads `<PREFIX>_<SECTION>__<KEY>` variables from the process environment.
    #[must_use]
    pub fn with_env_prefix(self, prefix: &str) -> Self {
        self.with_environment(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__"),
        )
    }

    /// Uses a prepared environment source.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Value for an empty `package_name`. Falls back to the basename of the
    /// current directory.
    #[must_use]
    pub fn with_package_default(mut self, name: impl Into<String>) -> Self {
        self.package_default = Some(name.into());
        self
    }

    /// Builds the configuration from all added sources.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotFound` if the added file does not exist.
    /// - `ConfigError::Parse` if a source cannot be parsed or a value does not
    ///   fit its field.
    /// - `ConfigError::MissingKey` if a required key is missing or empty.
    pub fn build(self) -> Result<Config, ConfigError> {
        let origin = self
            .origin
            .as_ref()
            .map_or_else(|| "<string>".to_string(), |p| p.display().to_string());

        if let Some(path) = &self.origin
            && !path.is_file()
        {
            return Err(ConfigError::NotFound { path: origin });
        }

        let parse_error = |e: config::ConfigError| ConfigError::Parse {
            path: origin.clone(),
            message: e.to_string(),
        };

        let builder = match self.environment {
            Some(environment) => self.builder.add_source(environment),
            None => self.builder,
        };
        let raw = builder.build().map_err(parse_error)?;

        let mut resolved = config::Config::builder();
        for key in KEYS {
            let path = key.path();
            let value = raw
                .get_string(&path)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());

            let value = match value {
                Some(value) => Some(value),
                None if key.required => {
                    return Err(ConfigError::MissingKey {
                        path: origin.clone(),
                        section: key.section.to_string(),
                        key: key.name.to_string(),
                    });
                }
                None if key.name == PACKAGE_NAME => self
                    .package_default
                    .clone()
                    .or_else(current_dir_name),
                None => key.default.map(str::to_string),
            };

            if let Some(value) = value {
                resolved = resolved.set_override(path, value).map_err(parse_error)?;
            }
        }

        resolved
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(parse_error)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn current_dir_name() -> Option<String> {
    std::env::current_dir()
        .ok()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::ConfigError;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	UserFile = 30,
	WorkspaceFile = 40,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	/// Precedence level
	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		// Defaults are applied when building the runtime config
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML).
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
	required: bool,
}

impl FileSource {
	/// User config: ~/.config/prodmap/config.toml
	pub fn user(paths: &PathsConfig) -> Self {
		Self {
			path: paths.user_config_file.clone(),
			precedence: Precedence::UserFile,
			name: "user-config",
			required: false,
		}
	}

	/// Workspace config: .prodmap/config.toml
	pub fn workspace() -> Result<Self, ConfigError> {
		Ok(Self {
			path: crate::paths::workspace_config_path()?,
			precedence: Precedence::WorkspaceFile,
			name: "workspace-config",
			required: false,
		})
	}

	/// Explicit file given with `--config`; it must exist.
	pub fn explicit(path: PathBuf) -> Self {
		Self {
			path,
			precedence: Precedence::WorkspaceFile,
			name: "explicit-config",
			required: true,
		}
	}

	/// Custom file path with specified precedence
	pub fn custom(path: PathBuf, precedence: Precedence, name: &'static str) -> Self {
		Self {
			path,
			precedence,
			name,
			required: false,
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}
	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			if self.required {
				return Err(ConfigError::FileNotFound(self.path.clone()));
			}
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Recognized variables: `PRODMAP_ASSETS_DIR`, `PRODMAP_LOG_LEVEL`,
/// `PRODMAP_LOG_FORMAT`, `PRODMAP_PRESERVE`, `PRODMAP_STRICT`,
/// `PRODMAP_ERROR_ON_MISSING_VERSIONS`, `PRODMAP_VERBOSE`, `PRODMAP_MAX_DEPTH`.
#[derive(Default)]
pub struct EnvSource {
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Read the process environment.
	pub fn new() -> Self {
		Self::default()
	}

	/// Read from a fixed set of variables instead of the process environment.
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		let vars: Vec<(String, String)> = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let mut layer = ConfigLayer::default();
		for (key, value) in vars {
			if !key.starts_with("PRODMAP_") {
				continue;
			}

			let value = value.trim().to_string();
			if value.is_empty() {
				continue;
			}

			trace!(key = %key, "processing env var");

			match key.as_str() {
				"PRODMAP_ASSETS_DIR" => layer.assets_mut().dir = Some(PathBuf::from(value)),
				"PRODMAP_LOG_LEVEL" => layer.logging_mut().level = Some(value),
				"PRODMAP_LOG_FORMAT" => layer.logging_mut().format = Some(value),
				"PRODMAP_PRESERVE" => layer.remap_mut().preserve = Some(parse_bool(&key, &value)?),
				"PRODMAP_STRICT" => layer.remap_mut().strict = Some(parse_bool(&key, &value)?),
				"PRODMAP_ERROR_ON_MISSING_VERSIONS" => {
					layer.remap_mut().error_on_missing_versions = Some(parse_bool(&key, &value)?)
				}
				"PRODMAP_VERBOSE" => layer.remap_mut().verbose = Some(parse_bool(&key, &value)?),
				"PRODMAP_MAX_DEPTH" => {
					let depth = value
						.parse()
						.map_err(|_| ConfigError::invalid_value(&key, "expected a positive integer"))?;
					layer.remap_mut().max_depth = Some(depth);
				}
				_ => {
					// Unknown PRODMAP_ variable, ignore
				}
			}
		}

		Ok(layer)
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(ConfigError::invalid_value(key, "expected a boolean")),
	}
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
///
/// Boolean switches are `Some(true)` only when the flag was passed, so an
/// absent flag never masks a value from a file or the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub assets_dir: Option<PathBuf>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub config_file: Option<PathBuf>,
	pub preserve: Option<bool>,
	pub strict: Option<bool>,
	pub error_on_missing_versions: Option<bool>,
	pub verbose: Option<bool>,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let cli = &self.overrides;
		let mut layer = ConfigLayer::default();

		if let Some(ref dir) = cli.assets_dir {
			layer.assets_mut().dir = Some(dir.clone());
		}
		if let Some(ref level) = cli.log_level {
			layer.logging_mut().level = Some(level.clone());
		}
		if let Some(ref format) = cli.log_format {
			layer.logging_mut().format = Some(format.clone());
		}

		let remap = layer.remap_mut();
		remap.preserve = cli.preserve;
		remap.strict = cli.strict;
		remap.error_on_missing_versions = cli.error_on_missing_versions;
		remap.verbose = cli.verbose;

		Ok(layer)
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::layer::*;
use crate::paths::PathsConfig;
use crate::ConfigError;

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// The final, validated configuration for prodmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProdmapConfig {
	/// Root of the packaged reference maps
	pub assets_dir: PathBuf,
	pub remap: RemapConfig,
	pub logging: LoggingConfig,

	/// Resolved XDG paths (not serialized)
	#[serde(skip)]
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemapConfig {
	/// Write `<name>.remapped.map` instead of overwriting
	pub preserve: bool,
	/// Fail a rewrite run that rewrote nothing
	pub strict: bool,
	pub error_on_missing_versions: bool,
	pub verbose: bool,
	pub max_depth: usize,
}

impl Default for RemapConfig {
	fn default() -> Self {
		Self {
			preserve: false,
			strict: false,
			error_on_missing_versions: false,
			verbose: false,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	#[default]
	Warn,
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogLevel::Error => "error",
			LogLevel::Warn => "warn",
			LogLevel::Info => "info",
			LogLevel::Debug => "debug",
			LogLevel::Trace => "trace",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

impl ProdmapConfig {
	/// Build runtime config from a merged layer and paths.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		let assets_dir = layer
			.assets
			.and_then(|a| a.dir)
			.unwrap_or_else(|| paths.default_assets_dir());
		let remap = build_remap_config(layer.remap);
		let logging = build_logging_config(layer.logging)?;

		Ok(Self {
			assets_dir,
			remap,
			logging,
			paths,
		})
	}
}

fn build_remap_config(layer: Option<RemapLayer>) -> RemapConfig {
	let layer = layer.unwrap_or_default();
	let defaults = RemapConfig::default();
	RemapConfig {
		preserve: layer.preserve.unwrap_or(defaults.preserve),
		strict: layer.strict.unwrap_or(defaults.strict),
		error_on_missing_versions: layer
			.error_on_missing_versions
			.unwrap_or(defaults.error_on_missing_versions),
		verbose: layer.verbose.unwrap_or(defaults.verbose),
		max_depth: layer.max_depth.unwrap_or(defaults.max_depth),
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> Result<LoggingConfig, ConfigError> {
	let layer = layer.unwrap_or_default();
	Ok(LoggingConfig {
		level: parse_log_level(layer.level.as_deref())?,
		format: parse_log_format(layer.format.as_deref())?,
	})
}

fn parse_log_level(s: Option<&str>) -> Result<LogLevel, ConfigError> {
	match s {
		None => Ok(LogLevel::default()),
		Some("error") => Ok(LogLevel::Error),
		Some("warn") => Ok(LogLevel::Warn),
		Some("info") => Ok(LogLevel::Info),
		Some("debug") => Ok(LogLevel::Debug),
		Some("trace") => Ok(LogLevel::Trace),
		Some(other) => Err(ConfigError::invalid_value(
			"logging.level",
			format!("unknown level '{other}'"),
		)),
	}
}

fn parse_log_format(s: Option<&str>) -> Result<LogFormat, ConfigError> {
	match s {
		None => Ok(LogFormat::default()),
		Some("json") => Ok(LogFormat::Json),
		Some("compact") => Ok(LogFormat::Compact),
		Some("pretty") => Ok(LogFormat::Pretty),
		Some(other) => Err(ConfigError::invalid_value(
			"logging.format",
			format!("unknown format '{other}'"),
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::Path;

	fn paths() -> PathsConfig {
		crate::paths::paths_under(Path::new("/cfg"), Path::new("/data"))
	}

	#[test]
	fn test_empty_layer_uses_defaults() {
		let config = ProdmapConfig::from_layer(ConfigLayer::default(), paths()).unwrap();
		assert_eq!(config.assets_dir, PathBuf::from("/data/prodmap/assets"));
		assert_eq!(config.remap, RemapConfig::default());
		assert_eq!(config.remap.max_depth, DEFAULT_MAX_DEPTH);
		assert_eq!(config.logging.level, LogLevel::Warn);
		assert_eq!(config.logging.format, LogFormat::Pretty);
	}

	#[test]
	fn test_layer_values_override_defaults() {
		let mut layer = ConfigLayer::default();
		layer.assets_mut().dir = Some(PathBuf::from("/opt/assets"));
		layer.remap_mut().preserve = Some(true);
		layer.logging_mut().level = Some("debug".to_string());
		layer.logging_mut().format = Some("json".to_string());

		let config = ProdmapConfig::from_layer(layer, paths()).unwrap();
		assert_eq!(config.assets_dir, PathBuf::from("/opt/assets"));
		assert!(config.remap.preserve);
		assert!(!config.remap.strict);
		assert_eq!(config.logging.level, LogLevel::Debug);
		assert_eq!(config.logging.format, LogFormat::Json);
	}

	#[test]
	fn test_unknown_log_level_is_rejected() {
		let mut layer = ConfigLayer::default();
		layer.logging_mut().level = Some("loud".to_string());
		assert!(matches!(
			ProdmapConfig::from_layer(layer, paths()),
			Err(ConfigError::InvalidValue { field, .. }) if field == "logging.level"
		));
	}

	#[test]
	fn test_log_level_names() {
		assert_eq!(LogLevel::Trace.as_str(), "trace");
		assert_eq!(LogLevel::default().as_str(), "warn");
	}
}

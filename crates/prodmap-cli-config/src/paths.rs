// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Resolved XDG paths for prodmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
	/// User config file: ~/.config/prodmap/config.toml
	pub user_config_file: PathBuf,
	/// Data directory: ~/.local/share/prodmap/
	pub data_dir: PathBuf,
}

impl PathsConfig {
	/// Default location of the packaged reference maps.
	pub fn default_assets_dir(&self) -> PathBuf {
		self.data_dir.join("assets")
	}
}

impl Default for PathsConfig {
	fn default() -> Self {
		Self {
			user_config_file: PathBuf::from("~/.config/prodmap/config.toml"),
			data_dir: PathBuf::from("~/.local/share/prodmap"),
		}
	}
}

/// Resolve XDG paths according to the Base Directory Specification.
///
/// Uses environment variables if set, otherwise falls back to defaults:
/// - XDG_CONFIG_HOME or ~/.config
/// - XDG_DATA_HOME or ~/.local/share
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;

	let config_home = std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.unwrap_or_else(|| home.join(".config"));

	let data_home = std::env::var_os("XDG_DATA_HOME")
		.map(PathBuf::from)
		.unwrap_or_else(|| home.join(".local/share"));

	tracing::debug!(
		config_home = %config_home.display(),
		data_home = %data_home.display(),
		"resolved XDG paths"
	);

	Ok(paths_under(&config_home, &data_home))
}

/// Paths for explicit config and data homes.
pub fn paths_under(config_home: &Path, data_home: &Path) -> PathsConfig {
	PathsConfig {
		user_config_file: config_home.join("prodmap/config.toml"),
		data_dir: data_home.join("prodmap"),
	}
}

/// Get the workspace config file path from current directory.
pub fn workspace_config_path() -> Result<PathBuf, ConfigError> {
	let cwd = std::env::current_dir()?;
	Ok(cwd.join(".prodmap/config.toml"))
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use tracing::warn;

use crate::runtime::ProdmapConfig;
use crate::ConfigError;

/// Largest accepted `remap.max_depth`.
pub const MAX_DEPTH_LIMIT: usize = 256;

/// Validate the configuration.
///
/// Returns Ok(()) if valid, or ConfigError with details.
pub fn validate_config(config: &ProdmapConfig) -> Result<(), ConfigError> {
	validate_assets(config)?;
	validate_remap(config)?;

	Ok(())
}

fn validate_assets(config: &ProdmapConfig) -> Result<(), ConfigError> {
	if config.assets_dir.as_os_str().is_empty() {
		return Err(ConfigError::invalid_value("assets.dir", "cannot be empty"));
	}

	if !config.assets_dir.is_dir() {
		// Not fatal: commands that never load a reference map still work
		warn!(
			assets_dir = %config.assets_dir.display(),
			"assets directory does not exist"
		);
	}

	Ok(())
}

fn validate_remap(config: &ProdmapConfig) -> Result<(), ConfigError> {
	let depth = config.remap.max_depth;

	if depth == 0 {
		return Err(ConfigError::invalid_value(
			"remap.max_depth",
			"must be at least 1",
		));
	}

	if depth > MAX_DEPTH_LIMIT {
		return Err(ConfigError::invalid_value(
			"remap.max_depth",
			format!("must be at most {MAX_DEPTH_LIMIT}"),
		));
	}

	Ok(())
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;
use std::path::PathBuf;

/// Partial configuration layer - all fields are Option for merging.
///
/// ```toml
/// [assets]
/// dir = "/opt/prodmap/assets"
///
/// [remap]
/// preserve = true
/// max_depth = 16
///
/// [logging]
/// level = "debug"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub assets: Option<AssetsLayer>,
	#[serde(default)]
	pub remap: Option<RemapLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetsLayer {
	#[serde(default)]
	pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemapLayer {
	#[serde(default)]
	pub preserve: Option<bool>,
	#[serde(default)]
	pub strict: Option<bool>,
	#[serde(default)]
	pub error_on_missing_versions: Option<bool>,
	#[serde(default)]
	pub verbose: Option<bool>,
	#[serde(default)]
	pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

impl ConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.assets, other.assets, AssetsLayer::merge);
		merge_option(&mut self.remap, other.remap, RemapLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}

	pub(crate) fn assets_mut(&mut self) -> &mut AssetsLayer {
		self.assets.get_or_insert_with(AssetsLayer::default)
	}

	pub(crate) fn remap_mut(&mut self) -> &mut RemapLayer {
		self.remap.get_or_insert_with(RemapLayer::default)
	}

	pub(crate) fn logging_mut(&mut self) -> &mut LoggingLayer {
		self.logging.get_or_insert_with(LoggingLayer::default)
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

fn overwrite<T>(target: &mut Option<T>, source: Option<T>) {
	if source.is_some() {
		*target = source;
	}
}

impl AssetsLayer {
	fn merge(&mut self, other: AssetsLayer) {
		overwrite(&mut self.dir, other.dir);
	}
}

impl RemapLayer {
	fn merge(&mut self, other: RemapLayer) {
		overwrite(&mut self.preserve, other.preserve);
		overwrite(&mut self.strict, other.strict);
		overwrite(
			&mut self.error_on_missing_versions,
			other.error_on_missing_versions,
		);
		overwrite(&mut self.verbose, other.verbose);
		overwrite(&mut self.max_depth, other.max_depth);
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		overwrite(&mut self.level, other.level);
		overwrite(&mut self.format, other.format);
	}
}

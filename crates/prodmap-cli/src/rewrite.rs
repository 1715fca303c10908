// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rewriting the source maps emitted by a build.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, instrument, warn};

use prodmap_remap::{ReferenceStore, Remapper, UpstreamMaps};

#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteOptions {
	/// Write `<name>.remapped.map` beside each map instead of overwriting it
	pub preserve: bool,
	/// Fail when no map was rewritten
	pub strict: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
	/// `.map` files among the assets
	pub found: usize,
	pub remapped: usize,
	pub skipped: usize,
}

/// Where a rewritten map is written.
pub fn output_path(map_path: &Path, preserve: bool) -> PathBuf {
	if !preserve {
		return map_path.to_path_buf();
	}

	let name = map_path
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_default();
	let stem = name.strip_suffix(".map").unwrap_or(&name);
	map_path.with_file_name(format!("{stem}.remapped.map"))
}

/// Remap every `.map` file in `assets`, skipping everything else.
#[instrument(skip_all, fields(assets = assets.len(), preserve = options.preserve))]
pub fn rewrite_assets<S, U>(
	remapper: &Remapper<S, U>,
	assets: &[PathBuf],
	options: RewriteOptions,
) -> Result<RewriteStats>
where
	S: ReferenceStore,
	U: UpstreamMaps,
{
	let mut stats = RewriteStats::default();

	if assets.is_empty() {
		info!("no assets to rewrite; is the build emitting any files?");
		return Ok(stats);
	}

	for asset in assets {
		if asset.extension().and_then(|e| e.to_str()) != Some("map") {
			debug!(asset = %asset.display(), "not a source map, skipping");
			continue;
		}
		stats.found += 1;

		let data = std::fs::read(asset)
			.with_context(|| format!("failed to read source map {}", asset.display()))?;
		let result = remapper
			.remap_slice(&data)
			.with_context(|| format!("failed to remap {}", asset.display()))?;

		for diagnostic in &result.diagnostics {
			debug!(
				asset = %asset.display(),
				source = %diagnostic.source,
				error = %diagnostic.error,
				"source left unchanged"
			);
		}

		if !result.rewrote {
			stats.skipped += 1;
			debug!(asset = %asset.display(), "no known library build found");
			continue;
		}

		let target = output_path(asset, options.preserve);
		let bytes = result
			.output_map
			.to_vec_pretty()
			.context("failed to serialize remapped source map")?;
		std::fs::write(&target, bytes)
			.with_context(|| format!("failed to write {}", target.display()))?;

		stats.remapped += 1;
		info!(
			asset = %asset.display(),
			output = %target.display(),
			builds = result.matched_records.len(),
			"rewrote source map"
		);
	}

	info!(
		found = stats.found,
		remapped = stats.remapped,
		skipped = stats.skipped,
		"rewrite finished"
	);

	if options.strict && stats.remapped == 0 {
		warn!(found = stats.found, "strict mode: nothing was rewritten");
		bail!(
			"no source map was rewritten ({} found); check that the build emits source maps and bundles a known library build",
			stats.found
		);
	}

	Ok(stats)
}

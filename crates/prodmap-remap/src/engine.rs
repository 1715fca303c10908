// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The remap engine.
//!
//! Walks the composition graph of an input map depth-first. Every source whose
//! base filename is a known artifact is identified by the SHA-256 of its
//! embedded content and, when the exact build is known, replaced by that
//! build's reference map. The graph is then flattened into a single map.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use prodmap_core::{Fingerprint, RemapError, Result, VersionRecord, VersionRegistry};
use prodmap_sourcemap::{flatten, normalize_source_path, MapNode, PositionMap, SourceNode};

use crate::loader::ReferenceMapLoader;
use crate::store::ReferenceStore;
use crate::upstream::{NoUpstream, UpstreamMaps};

/// Maximum nesting of maps within maps before the walk gives up.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Options controlling a remap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemapOptions {
	/// Log per-source decisions at info/warn instead of debug.
	pub verbose: bool,
	/// Fail instead of skipping when a recognized artifact cannot be classified.
	pub error_on_missing_versions: bool,
	pub max_depth: usize,
}

impl Default for RemapOptions {
	fn default() -> Self {
		Self {
			verbose: false,
			error_on_missing_versions: false,
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

/// A source that was left untouched, and why.
#[derive(Debug)]
pub struct SourceDiagnostic {
	pub source: String,
	/// 0 for sources of the input map itself.
	pub depth: usize,
	pub error: RemapError,
}

/// Outcome of one remap.
#[derive(Debug)]
pub struct RemapResult {
	pub output_map: PositionMap,
	/// True iff at least one source was substituted.
	pub rewrote: bool,
	/// Substituted builds in traversal order.
	pub matched_records: Vec<VersionRecord>,
	pub diagnostics: Vec<SourceDiagnostic>,
}

struct Walk<'a> {
	/// The map passed to `remap`.
	input: &'a PositionMap,
	matched: Vec<VersionRecord>,
	diagnostics: Vec<SourceDiagnostic>,
	/// Keys of the maps currently being expanded, outermost first.
	ancestors: Vec<String>,
}

/// Identifies known minified builds in source maps and splices in their reference maps.
///
/// Holds no per-call state; one instance can serve concurrent calls.
pub struct Remapper<S, U = NoUpstream> {
	registry: Arc<VersionRegistry>,
	loader: ReferenceMapLoader<S>,
	upstream: U,
	options: RemapOptions,
}

impl<S: ReferenceStore> Remapper<S, NoUpstream> {
	pub fn new(registry: Arc<VersionRegistry>, store: S) -> Self {
		Self {
			registry,
			loader: ReferenceMapLoader::new(store),
			upstream: NoUpstream,
			options: RemapOptions::default(),
		}
	}
}

impl<S: ReferenceStore, U: UpstreamMaps> Remapper<S, U> {
	pub fn with_options(mut self, options: RemapOptions) -> Self {
		self.options = options;
		self
	}

	/// Use `upstream` to expand non-artifact sources that are themselves generated.
	pub fn with_upstream<V: UpstreamMaps>(self, upstream: V) -> Remapper<S, V> {
		Remapper {
			registry: self.registry,
			loader: self.loader,
			upstream,
			options: self.options,
		}
	}

	pub fn options(&self) -> &RemapOptions {
		&self.options
	}

	pub fn registry(&self) -> &VersionRegistry {
		&self.registry
	}

	/// Parse `data` and remap it. Document errors surface before any remapping.
	pub fn remap_slice(&self, data: &[u8]) -> Result<RemapResult> {
		let input = PositionMap::from_slice(data)?;
		self.remap(&input)
	}

	/// Remap `input`, substituting every identified build.
	#[instrument(skip_all, fields(file = input.file.as_deref().unwrap_or(""), sources = input.sources.len()))]
	pub fn remap(&self, input: &PositionMap) -> Result<RemapResult> {
		input.validate()?;

		let mut walk = Walk {
			input,
			matched: Vec::new(),
			diagnostics: Vec::new(),
			ancestors: Vec::new(),
		};
		let root = self.build_node(input, 0, &mut walk)?;

		let mut output_map = flatten(input.file.clone(), &root);
		output_map.extensions = input
			.extensions
			.iter()
			.filter(|(key, _)| !key.ends_with("ignoreList"))
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();

		let rewrote = !walk.matched.is_empty();
		if rewrote {
			let versions: Vec<String> = walk.matched.iter().map(VersionRecord::label).collect();
			if self.options.verbose {
				info!(matched = ?versions, "remapped source map");
			} else {
				debug!(matched = ?versions, "remapped source map");
			}
		}

		Ok(RemapResult {
			output_map,
			rewrote,
			matched_records: walk.matched,
			diagnostics: walk.diagnostics,
		})
	}

	fn build_node(&self, map: &PositionMap, depth: usize, walk: &mut Walk<'_>) -> Result<MapNode> {
		if depth > self.options.max_depth {
			return Err(RemapError::DepthExceeded {
				max: self.options.max_depth,
			});
		}

		let mappings = map.decoded_mappings()?;
		let mut sources = Vec::with_capacity(map.sources.len());
		for idx in 0..map.sources.len() {
			sources.push(self.build_source(map, idx, depth, walk)?);
		}

		Ok(MapNode {
			mappings,
			names: map.names.clone(),
			sources,
		})
	}

	fn build_source(
		&self,
		map: &PositionMap,
		idx: usize,
		depth: usize,
		walk: &mut Walk<'_>,
	) -> Result<SourceNode> {
		let content = map.source_content(idx).map(str::to_string);
		let Some(path) = map.resolved_source(idx) else {
			return Ok(SourceNode::Original {
				source: None,
				content,
			});
		};

		let expanded = if self.registry.is_known_artifact(&path) {
			self.substitute_artifact(map, idx, &path, depth, walk)
		} else if let Some(upstream) = self.upstream.find_map(&path) {
			let key = format!("upstream:{}", normalize_source_path(&path));
			self.expand(&upstream, key, depth, walk).map(Some)
		} else {
			Ok(None)
		};

		match expanded {
			Ok(Some(node)) => return Ok(SourceNode::Map(node)),
			Ok(None) => {}
			Err(err) => self.skip_source(&path, depth, err, walk)?,
		}

		Ok(SourceNode::Original {
			source: Some(path),
			content,
		})
	}

	/// Identify and substitute a candidate artifact.
	///
	/// `Ok(None)` never happens for candidates; failures come back as errors for
	/// the caller to classify.
	fn substitute_artifact(
		&self,
		map: &PositionMap,
		idx: usize,
		path: &str,
		depth: usize,
		walk: &mut Walk<'_>,
	) -> Result<Option<MapNode>> {
		// Below the input, the candidate's own map is consulted first
		let origin = (depth > 0).then_some(map);
		let record = resolve_build(&self.registry, walk.input, origin, path, Some(idx))?;
		let reference = self.loader.load(&record)?;

		if self.options.verbose {
			info!(source = %path, version = %record.label(), "found matching build");
		} else {
			debug!(source = %path, version = %record.label(), "found matching build");
		}

		let mark = walk.matched.len();
		walk.matched.push(record.clone());
		let key = format!("reference:{}", record.reference_location);
		match self.expand(&reference, key, depth, walk) {
			Ok(node) => Ok(Some(node)),
			Err(err) => {
				walk.matched.truncate(mark);
				Err(err)
			}
		}
	}

	/// Expand a nested map one level deeper, refusing to re-enter an ancestor.
	fn expand(&self, map: &PositionMap, key: String, depth: usize, walk: &mut Walk<'_>) -> Result<MapNode> {
		if walk.ancestors.contains(&key) {
			return Err(RemapError::CyclicMap { key });
		}

		walk.ancestors.push(key);
		let node = self.build_node(map, depth + 1, walk);
		walk.ancestors.pop();
		node
	}

	/// Record a per-source failure, or propagate it when it must abort the call.
	fn skip_source(&self, path: &str, depth: usize, err: RemapError, walk: &mut Walk<'_>) -> Result<()> {
		let fatal = match &err {
			RemapError::DepthExceeded { .. } | RemapError::CyclicMap { .. } => true,
			RemapError::MissingSourceContent { .. } | RemapError::UnknownVersion { .. } => {
				self.options.error_on_missing_versions
			}
			_ => false,
		};
		if fatal {
			return Err(err);
		}

		if self.options.verbose {
			warn!(source = %path, depth, error = %err, "skipping source");
		} else {
			debug!(source = %path, depth, error = %err, "skipping source");
		}

		walk.diagnostics.push(SourceDiagnostic {
			source: path.to_string(),
			depth,
			error: err,
		});
		Ok(())
	}
}

/// Resolve the exact build of a candidate source from its embedded content.
///
/// `origin` is the nested map the candidate was found in, `None` when it is a
/// source of `input` itself; `hint` indexes the map the candidate came from.
/// Inline content in `origin` is used when present. Otherwise the source is
/// located in `input` and its content taken from there, so a candidate `input`
/// does not list fails with `SourceNotFound`. The content is hashed and looked
/// up by fingerprint. Filenames and path hints never decide the version.
pub fn resolve_build(
	registry: &VersionRegistry,
	input: &PositionMap,
	origin: Option<&PositionMap>,
	path: &str,
	hint: Option<usize>,
) -> Result<VersionRecord> {
	let inline = origin.and_then(|map| {
		locate_source(map, path, hint).and_then(|idx| map.source_content(idx))
	});

	let content = match inline {
		Some(content) => content,
		None => {
			let input_hint = if origin.is_none() { hint } else { None };
			let idx = locate_source(input, path, input_hint).ok_or_else(|| {
				RemapError::SourceNotFound {
					path: path.to_string(),
				}
			})?;
			input
				.source_content(idx)
				.ok_or_else(|| RemapError::MissingSourceContent {
					path: path.to_string(),
				})?
		}
	};

	let fingerprint = Fingerprint::of(content.as_bytes());
	registry
		.lookup_by_fingerprint(&fingerprint)
		.cloned()
		.ok_or_else(|| RemapError::UnknownVersion {
			path: path.to_string(),
			fingerprint,
		})
}

/// Find the index of `path` in `map.sources`.
///
/// Exact comparison first (against both the raw entry and the entry joined onto
/// `sourceRoot`, preferring `hint`), then comparison of normalized forms.
pub fn locate_source(map: &PositionMap, path: &str, hint: Option<usize>) -> Option<usize> {
	let exact = |idx: usize| {
		map.sources[idx].as_deref() == Some(path) || map.resolved_source(idx).as_deref() == Some(path)
	};

	if let Some(idx) = hint.filter(|&idx| idx < map.sources.len()) {
		if exact(idx) {
			return Some(idx);
		}
	}

	if let Some(idx) = (0..map.sources.len()).find(|&idx| exact(idx)) {
		return Some(idx);
	}

	let target = normalize_source_path(path);
	(0..map.sources.len()).find(|&idx| {
		let raw = map.sources[idx].as_deref().map(normalize_source_path);
		let resolved = map.resolved_source(idx).map(|s| normalize_source_path(&s));
		raw.as_deref() == Some(target.as_str()) || resolved.as_deref() == Some(target.as_str())
	})
}

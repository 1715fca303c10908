// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Intermediate source maps for sources that are themselves generated files.

use std::collections::HashMap;

use prodmap_sourcemap::{normalize_source_path, PositionMap};

/// Supplies the map of a source that was itself produced by an earlier build step.
pub trait UpstreamMaps: Send + Sync {
	/// The map whose generated file is `source`, if one is known.
	fn find_map(&self, source: &str) -> Option<PositionMap>;
}

/// No upstream maps: every non-artifact source is an original file.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoUpstream;

impl UpstreamMaps for NoUpstream {
	fn find_map(&self, _source: &str) -> Option<PositionMap> {
		None
	}
}

/// Upstream maps keyed by normalized source path.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUpstream {
	maps: HashMap<String, PositionMap>,
}

impl InMemoryUpstream {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, source: &str, map: PositionMap) {
		self.maps.insert(normalize_source_path(source), map);
	}
}

impl UpstreamMaps for InMemoryUpstream {
	fn find_map(&self, source: &str) -> Option<PositionMap> {
		self.maps.get(&normalize_source_path(source)).cloned()
	}
}

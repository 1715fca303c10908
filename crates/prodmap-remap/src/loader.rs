// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loads the packaged reference map for an exact build.

use std::io;

use tracing::{debug, instrument};

use prodmap_core::{RemapError, Result, VersionRecord};
use prodmap_sourcemap::PositionMap;

use crate::store::ReferenceStore;

/// Reads and parses reference maps from a [`ReferenceStore`].
///
/// Every call hits the store; nothing is cached.
#[derive(Debug, Clone)]
pub struct ReferenceMapLoader<S> {
	store: S,
}

impl<S: ReferenceStore> ReferenceMapLoader<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &S {
		&self.store
	}

	/// Load the reference map recorded for `record`.
	///
	/// A missing map is a packaging defect and fails with `ReferenceNotFound`;
	/// parse failures propagate from the codec.
	#[instrument(skip(self, record), fields(library = %record.library, version = %record.version))]
	pub fn load(&self, record: &VersionRecord) -> Result<PositionMap> {
		let location = &record.reference_location;

		if !self.store.exists(location) {
			return Err(RemapError::ReferenceNotFound {
				location: location.clone(),
			});
		}

		let data = self.store.read(location).map_err(|e| match e.kind() {
			io::ErrorKind::NotFound => RemapError::ReferenceNotFound {
				location: location.clone(),
			},
			_ => RemapError::Io(e),
		})?;

		let map = PositionMap::from_slice(&data)?;
		debug!(
			location = %location,
			sources = map.source_count(),
			"loaded reference map"
		);
		Ok(map)
	}
}

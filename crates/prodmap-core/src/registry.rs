// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only registry of known builds, keyed by fingerprint and artifact filename.
//!
//! The filename index is only a cheap candidate filter. The fingerprint index is
//! the authoritative match: a source is never attributed to a version by its
//! name or path.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::error::{RemapError, Result};
use crate::fingerprint::Fingerprint;
use crate::record::VersionRecord;
use crate::versions::{KnownVersion, KNOWN_VERSIONS};

static BUILTIN: LazyLock<Arc<VersionRegistry>> = LazyLock::new(|| {
	let registry = VersionRegistry::from_known(KNOWN_VERSIONS)
		.unwrap_or_else(|e| panic!("built-in version table is corrupt: {e}"));
	Arc::new(registry)
});

/// Immutable lookup tables over a list of [`VersionRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct VersionRegistry {
	records: Vec<VersionRecord>,
	by_fingerprint: HashMap<Fingerprint, usize>,
	by_artifact_filename: HashMap<String, Vec<VersionRecord>>,
}

impl VersionRegistry {
	/// Build a registry, rejecting a fingerprint that points at two reference maps.
	///
	/// Exact duplicate rows are collapsed.
	pub fn new(records: impl IntoIterator<Item = VersionRecord>) -> Result<Self> {
		let mut registry = Self::default();

		for record in records {
			if let Some(&idx) = registry.by_fingerprint.get(&record.fingerprint) {
				let existing = &registry.records[idx];
				if existing.reference_location != record.reference_location {
					return Err(RemapError::ConflictingFingerprint {
						fingerprint: record.fingerprint,
						first: existing.reference_location.clone(),
						second: record.reference_location,
					});
				}
				continue;
			}

			registry
				.by_fingerprint
				.insert(record.fingerprint, registry.records.len());
			registry
				.by_artifact_filename
				.entry(record.artifact_filename.clone())
				.or_default()
				.push(record.clone());
			registry.records.push(record);
		}

		Ok(registry)
	}

	/// Build a registry from static table rows.
	pub fn from_known(known: &[KnownVersion]) -> Result<Self> {
		let records = known
			.iter()
			.map(VersionRecord::from_known)
			.collect::<Result<Vec<_>>>()?;
		Self::new(records)
	}

	/// The registry built from [`KNOWN_VERSIONS`].
	///
	/// Panics on first access if the table is inconsistent.
	pub fn builtin() -> Arc<VersionRegistry> {
		Arc::clone(&BUILTIN)
	}

	pub fn lookup_by_fingerprint(&self, fingerprint: &Fingerprint) -> Option<&VersionRecord> {
		self
			.by_fingerprint
			.get(fingerprint)
			.map(|&idx| &self.records[idx])
	}

	/// All versions sharing an artifact filename, in table order.
	pub fn lookup_candidates_by_filename(&self, filename: &str) -> &[VersionRecord] {
		self
			.by_artifact_filename
			.get(filename)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	/// Candidate filter: does the base filename of `path` name a known artifact?
	pub fn is_known_artifact(&self, path: &str) -> bool {
		self
			.by_artifact_filename
			.contains_key(artifact_basename(path))
	}

	pub fn records(&self) -> &[VersionRecord] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

/// Last path segment with any query string or fragment removed.
///
/// Handles both `/` and `\` separators as well as URL-style bundler paths such
/// as `webpack://app/./node_modules/react-dom/cjs/react-dom.production.min.js?v=3`.
pub fn artifact_basename(path: &str) -> &str {
	let path = path.split(['?', '#']).next().unwrap_or(path);
	path.rsplit(['/', '\\']).next().unwrap_or(path)
}

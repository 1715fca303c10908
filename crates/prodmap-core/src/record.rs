// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Version records identifying one exact build artifact.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::versions::KnownVersion;

/// An exact minified build of a library and where its reference map lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRecord {
	/// Package name, e.g. "react-dom"
	pub library: String,
	/// Build flavor, e.g. "production" or "profiling"
	pub variant: String,
	/// Semantic version, treated as an opaque label
	pub version: String,
	/// Minified filename this record matches, e.g. "react-dom.production.min.js"
	pub artifact_filename: String,
	pub fingerprint: Fingerprint,
	/// Key of the unminified reference map in the assets store
	pub reference_location: String,
}

impl VersionRecord {
	/// Build a record from a static table row.
	pub fn from_known(known: &KnownVersion) -> Result<Self> {
		Ok(Self {
			library: known.library.to_string(),
			variant: known.variant.to_string(),
			version: known.version.to_string(),
			artifact_filename: known.artifact_filename.to_string(),
			fingerprint: known.fingerprint.parse()?,
			reference_location: known.reference_location(),
		})
	}

	/// Short human label, e.g. "react-dom@18.2.0 (production)".
	pub fn label(&self) -> String {
		format!("{}@{} ({})", self.library, self.version, self.variant)
	}
}

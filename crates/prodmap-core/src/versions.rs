// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Built-in table of known minified library builds.
//!
//! Entries are generated offline by hashing each published minified artifact
//! (`prodmap fingerprint <file>`) and packaging its unminified reference map
//! under `<library>/<version>/<artifact>.map` in the assets directory.

/// One row of the static version table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownVersion {
	pub library: &'static str,
	pub variant: &'static str,
	pub version: &'static str,
	pub artifact_filename: &'static str,
	/// Hex-encoded SHA-256 of the artifact contents.
	pub fingerprint: &'static str,
}

impl KnownVersion {
	/// Location of the reference map inside the assets store.
	pub fn reference_location(&self) -> String {
		format!(
			"{}/{}/{}.map",
			self.library, self.version, self.artifact_filename
		)
	}
}

pub const KNOWN_VERSIONS: &[KnownVersion] = &[
	KnownVersion {
		library: "react-dom",
		variant: "production",
		version: "18.2.0",
		artifact_filename: "react-dom.production.min.js",
		fingerprint: "1404cd9fd1e2ee3ce79fba01957b01c83f88ccd86a3e55e6a51a871d9fe05552",
	},
	KnownVersion {
		library: "react-dom",
		variant: "production",
		version: "18.1.0",
		artifact_filename: "react-dom.production.min.js",
		fingerprint: "db70122e66c434e360539319ef318959f303a8792417e3cbb14abb6e56294191",
	},
];

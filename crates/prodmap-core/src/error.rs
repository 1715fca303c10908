// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map remapping.

use thiserror::Error;

use crate::fingerprint::Fingerprint;

/// Errors that can occur while parsing, identifying or remapping source maps.
#[derive(Debug, Error)]
pub enum RemapError {
	#[error("invalid input source map: {0}")]
	InvalidInput(String),

	#[error("malformed source map document: {0}")]
	MalformedDocument(#[from] serde_json::Error),

	#[error("invalid source map schema: {0}")]
	InvalidSchema(String),

	#[error("invalid mappings: {0}")]
	InvalidMappings(String),

	#[error("cannot find '{path}' in its source map's sources")]
	SourceNotFound { path: String },

	#[error("cannot find source contents for '{path}'")]
	MissingSourceContent { path: String },

	#[error("no known version of '{path}' matches fingerprint {fingerprint}")]
	UnknownVersion {
		path: String,
		fingerprint: Fingerprint,
	},

	#[error("reference map not found: {location}")]
	ReferenceNotFound { location: String },

	#[error("fingerprint {fingerprint} maps to both '{first}' and '{second}'")]
	ConflictingFingerprint {
		fingerprint: Fingerprint,
		first: String,
		second: String,
	},

	#[error("invalid fingerprint: {0}")]
	InvalidFingerprint(String),

	#[error("source map graph exceeds maximum depth of {max}")]
	DepthExceeded { max: usize },

	#[error("source map graph contains a cycle through '{key}'")]
	CyclicMap { key: String },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl RemapError {
	/// Whether this error invalidates the whole document rather than a single source.
	pub fn is_document_level(&self) -> bool {
		matches!(
			self,
			RemapError::InvalidInput(_)
				| RemapError::MalformedDocument(_)
				| RemapError::InvalidSchema(_)
				| RemapError::InvalidMappings(_)
				| RemapError::DepthExceeded { .. }
				| RemapError::CyclicMap { .. }
		)
	}
}

/// Result type for remapping operations.
pub type Result<T> = std::result::Result<T, RemapError>;

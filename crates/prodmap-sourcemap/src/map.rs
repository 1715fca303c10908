// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 document parsing and serialization.
//!
//! The mappings payload is kept verbatim so a parsed document serializes back
//! without loss; unknown top-level keys are preserved in `extensions`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use prodmap_core::{RemapError, Result};

use crate::path::join_source_root;
use crate::vlq::{decode_vlq_mappings, DecodedMappings};

/// A source map v3 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMap {
	pub version: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_root: Option<String>,
	pub sources: Vec<Option<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sources_content: Option<Vec<Option<String>>>,
	pub names: Vec<String>,
	#[serde(default)]
	pub mappings: String,
	/// Any other top-level keys, e.g. `x_google_ignoreList` or `debugId`.
	#[serde(flatten)]
	pub extensions: Map<String, Value>,
}

impl PositionMap {
	/// An empty version 3 map.
	pub fn new() -> Self {
		Self {
			version: 3,
			file: None,
			source_root: None,
			sources: Vec::new(),
			sources_content: None,
			names: Vec::new(),
			mappings: String::new(),
			extensions: Map::new(),
		}
	}

	/// Parse a source map from JSON bytes.
	///
	/// Fails with `MalformedDocument` when the bytes are not JSON and with
	/// `InvalidSchema` when the JSON is not a version 3 map with `sources`
	/// and `names`.
	pub fn from_slice(data: &[u8]) -> Result<Self> {
		let value: Value = serde_json::from_slice(data)?;
		Self::from_value(value)
	}

	/// Parse a source map from a JSON string.
	#[allow(clippy::should_implement_trait)]
	pub fn from_str(data: &str) -> Result<Self> {
		Self::from_slice(data.as_bytes())
	}

	/// Validate and convert an already-parsed JSON value.
	pub fn from_value(mut value: Value) -> Result<Self> {
		check_schema(&value)?;
		// `3.0` passes the check but does not deserialize into an integer
		if let Some(obj) = value.as_object_mut() {
			obj.insert("version".to_string(), Value::from(3u32));
		}
		serde_json::from_value(value).map_err(|e| RemapError::InvalidSchema(e.to_string()))
	}

	/// Serialize as compact JSON.
	pub fn to_vec(&self) -> Result<Vec<u8>> {
		Ok(serde_json::to_vec(self)?)
	}

	/// Serialize as JSON indented with two spaces.
	pub fn to_vec_pretty(&self) -> Result<Vec<u8>> {
		Ok(serde_json::to_vec_pretty(self)?)
	}

	/// Re-check the structural invariants of a map built in code.
	pub fn validate(&self) -> Result<()> {
		if self.version != 3 {
			return Err(RemapError::InvalidInput(format!(
				"expected version 3, got {}",
				self.version
			)));
		}
		if let Some(content) = &self.sources_content {
			if content.len() > self.sources.len() {
				return Err(RemapError::InvalidInput(format!(
					"sourcesContent has {} entries but sources has {}",
					content.len(),
					self.sources.len()
				)));
			}
		}
		Ok(())
	}

	/// Decode the mappings payload.
	pub fn decoded_mappings(&self) -> Result<DecodedMappings> {
		decode_vlq_mappings(&self.mappings)
	}

	/// Source path at `idx` joined onto `sourceRoot`.
	pub fn resolved_source(&self, idx: usize) -> Option<String> {
		let source = self.sources.get(idx)?.as_deref()?;
		Some(join_source_root(self.source_root.as_deref(), source))
	}

	/// Embedded content for the source at `idx`, if any.
	pub fn source_content(&self, idx: usize) -> Option<&str> {
		self
			.sources_content
			.as_ref()?
			.get(idx)?
			.as_deref()
	}

	/// Check if this source map has embedded source content.
	pub fn has_sources_content(&self) -> bool {
		self
			.sources_content
			.as_ref()
			.is_some_and(|c| c.iter().any(Option::is_some))
	}

	pub fn source_count(&self) -> usize {
		self.sources.len()
	}
}

impl Default for PositionMap {
	fn default() -> Self {
		Self::new()
	}
}

fn check_schema(value: &Value) -> Result<()> {
	let obj = value
		.as_object()
		.ok_or_else(|| RemapError::InvalidSchema("source map is not a JSON object".to_string()))?;

	for field in ["sources", "names"] {
		if !obj.contains_key(field) {
			return Err(RemapError::InvalidSchema(format!(
				"missing required field: {field}"
			)));
		}
	}

	match obj.get("version").and_then(Value::as_f64) {
		Some(version) if version == 3.0 => Ok(()),
		Some(other) => Err(RemapError::InvalidSchema(format!(
			"expected version 3, got {other}"
		))),
		None => Err(RemapError::InvalidSchema(
			"missing or non-numeric version".to_string(),
		)),
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 handling for prodmap.
//!
//! This crate provides functionality for:
//! - Parsing and serializing source map documents without field loss
//! - Decoding and encoding Base64 VLQ mappings
//! - Resolving and normalizing source paths
//! - Composing nested maps into a single flat map
//!
//! # Example
//!
//! ```
//! use prodmap_sourcemap::PositionMap;
//!
//! let map = PositionMap::from_str(r#"{
//!     "version": 3,
//!     "sources": ["src/app.ts"],
//!     "names": [],
//!     "mappings": "AAAA"
//! }"#).unwrap();
//!
//! let bytes = map.to_vec().unwrap();
//! assert_eq!(PositionMap::from_slice(&bytes).unwrap(), map);
//! ```

pub mod compose;
pub mod map;
pub mod path;
pub mod vlq;

pub use compose::{flatten, MapNode, SourceNode};
pub use map::PositionMap;
pub use path::{join_source_root, normalize_source_path};
pub use vlq::{
	decode_vlq_mappings, decode_vlq_segment, encode_vlq_mappings, encode_vlq_value,
	DecodedMappings, Segment, SourcePosition,
};

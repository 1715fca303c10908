// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Production source map remapping.
//!
//! This crate provides:
//! - Reference map stores (filesystem and in-memory)
//! - The reference map loader
//! - The remap engine that identifies known minified builds by content
//!   fingerprint and splices in their unminified reference maps
//!
//! # Example
//!
//! ```
//! use prodmap_core::VersionRegistry;
//! use prodmap_remap::{InMemoryReferenceStore, Remapper};
//!
//! let remapper = Remapper::new(VersionRegistry::builtin(), InMemoryReferenceStore::new());
//! let result = remapper
//!     .remap_slice(br#"{"version":3,"sources":["src/app.js"],"names":[],"mappings":"AAAA"}"#)
//!     .unwrap();
//!
//! assert!(!result.rewrote);
//! assert_eq!(result.output_map.sources, vec![Some("src/app.js".to_string())]);
//! ```

pub mod engine;
pub mod loader;
pub mod store;
pub mod upstream;

pub use engine::{
	locate_source, resolve_build, RemapOptions, RemapResult, Remapper, SourceDiagnostic,
	DEFAULT_MAX_DEPTH,
};
pub use loader::ReferenceMapLoader;
pub use store::{FsReferenceStore, InMemoryReferenceStore, ReferenceStore};
pub use upstream::{InMemoryUpstream, NoUpstream, UpstreamMaps};

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for prodmap, the production source map remapper.
//!
//! This crate provides:
//! - Content fingerprints (SHA-256) of minified library builds
//! - Version records pointing at packaged reference source maps
//! - The read-only version registry and its built-in table
//! - The error taxonomy shared by the codec, loader and remap engine

pub mod error;
pub mod fingerprint;
pub mod record;
pub mod registry;
pub mod versions;

pub use error::{RemapError, Result};
pub use fingerprint::Fingerprint;
pub use record::VersionRecord;
pub use registry::{artifact_basename, VersionRegistry};
pub use versions::{KnownVersion, KNOWN_VERSIONS};

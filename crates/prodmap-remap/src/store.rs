// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only stores of packaged reference maps.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::trace;

/// Key-addressable store the reference map loader reads from.
///
/// Implementations provide access to the packaged reference maps.
pub trait ReferenceStore: Send + Sync {
	fn exists(&self, location: &str) -> bool;

	fn read(&self, location: &str) -> io::Result<Vec<u8>>;
}

impl<T: ReferenceStore + ?Sized> ReferenceStore for &T {
	fn exists(&self, location: &str) -> bool {
		(**self).exists(location)
	}

	fn read(&self, location: &str) -> io::Result<Vec<u8>> {
		(**self).read(location)
	}
}

/// Reference maps laid out under a directory as `<library>/<version>/<artifact>.map`.
#[derive(Debug, Clone)]
pub struct FsReferenceStore {
	root: PathBuf,
}

impl FsReferenceStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Resolve a location inside the root; locations escaping it resolve to nothing.
	fn path_for(&self, location: &str) -> Option<PathBuf> {
		let relative = Path::new(location);
		let contained = relative
			.components()
			.all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
		contained.then(|| self.root.join(relative))
	}
}

impl ReferenceStore for FsReferenceStore {
	fn exists(&self, location: &str) -> bool {
		self.path_for(location).is_some_and(|p| p.is_file())
	}

	fn read(&self, location: &str) -> io::Result<Vec<u8>> {
		let path = self.path_for(location).ok_or_else(|| {
			io::Error::new(
				io::ErrorKind::NotFound,
				format!("location escapes the assets directory: {location}"),
			)
		})?;
		trace!(path = %path.display(), "reading reference map");
		std::fs::read(path)
	}
}

/// In-memory reference store for testing and embedding.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReferenceStore {
	maps: HashMap<String, Vec<u8>>,
}

impl InMemoryReferenceStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, location: &str, data: Vec<u8>) {
		self.maps.insert(location.to_string(), data);
	}

	pub fn len(&self) -> usize {
		self.maps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.maps.is_empty()
	}
}

impl ReferenceStore for InMemoryReferenceStore {
	fn exists(&self, location: &str) -> bool {
		self.maps.contains_key(location)
	}

	fn read(&self, location: &str) -> io::Result<Vec<u8>> {
		self.maps.get(location).cloned().ok_or_else(|| {
			io::Error::new(io::ErrorKind::NotFound, format!("no reference map at {location}"))
		})
	}
}

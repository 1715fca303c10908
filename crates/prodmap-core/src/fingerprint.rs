// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Content fingerprints for identifying exact builds of minified artifacts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::RemapError;

/// SHA-256 digest of an artifact's exact contents.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
	/// Hash `data` with SHA-256.
	pub fn of(data: &[u8]) -> Self {
		let hash = Sha256::digest(data);
		let mut bytes = [0u8; 32];
		bytes.copy_from_slice(&hash);
		Self(bytes)
	}

	pub fn from_bytes(bytes: [u8; 32]) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}

	/// Lowercase hex encoding (64 characters).
	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl fmt::Display for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_hex())
	}
}

impl fmt::Debug for Fingerprint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Fingerprint({})", &self.to_hex()[..12])
	}
}

impl FromStr for Fingerprint {
	type Err = RemapError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let bytes = hex::decode(s).map_err(|_| RemapError::InvalidFingerprint(s.to_string()))?;
		let bytes: [u8; 32] = bytes
			.try_into()
			.map_err(|_| RemapError::InvalidFingerprint(s.to_string()))?;
		Ok(Self(bytes))
	}
}

impl Serialize for Fingerprint {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.to_hex())
	}
}

impl<'de> Deserialize<'de> for Fingerprint {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		s.parse().map_err(serde::de::Error::custom)
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source path resolution and normalization.

/// Join a source onto a map's `sourceRoot`.
///
/// Sources that are already absolute (URL with a scheme, or rooted at `/`) are
/// returned unchanged.
pub fn join_source_root(source_root: Option<&str>, source: &str) -> String {
	match source_root {
		Some(root) if !root.is_empty() && !is_absolute(source) => {
			let root = root.trim_end_matches('/');
			format!("{}/{}", root, source)
		}
		_ => source.to_string(),
	}
}

fn is_absolute(source: &str) -> bool {
	source.starts_with('/') || scheme_len(source).is_some()
}

/// Length of a leading `scheme://` prefix, if present.
fn scheme_len(path: &str) -> Option<usize> {
	let idx = path.find("://")?;
	let scheme = &path[..idx];
	let valid = scheme
		.chars()
		.next()
		.is_some_and(|c| c.is_ascii_alphabetic())
		&& scheme
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
	valid.then_some(idx + 3)
}

/// Normalize a source path for comparison.
///
/// - query string and fragment removed
/// - `\` treated as `/`
/// - `scheme://authority` prefix dropped, so `webpack://app/./src/a.js` and
///   `webpack:///src/a.js` both become `src/a.js`
/// - `.` segments, empty segments and leading `/` dropped
/// - `..` pops the previous segment (never above the root)
pub fn normalize_source_path(path: &str) -> String {
	let path = path.split(['?', '#']).next().unwrap_or(path);
	let path = path.replace('\\', "/");

	let rest = match scheme_len(&path) {
		Some(len) => {
			let after_scheme = &path[len..];
			match after_scheme.find('/') {
				Some(slash) => &after_scheme[slash..],
				None => "",
			}
		}
		None => path.as_str(),
	};

	let mut segments: Vec<&str> = Vec::new();
	for segment in rest.split('/') {
		match segment {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			s => segments.push(s),
		}
	}

	segments.join("/")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn join_with_and_without_root() {
		assert_eq!(join_source_root(None, "a.js"), "a.js");
		assert_eq!(join_source_root(Some(""), "a.js"), "a.js");
		assert_eq!(join_source_root(Some("src/"), "a.js"), "src/a.js");
		assert_eq!(join_source_root(Some("src"), "a.js"), "src/a.js");
	}

	#[test]
	fn join_leaves_absolute_sources_alone() {
		assert_eq!(join_source_root(Some("src"), "/abs/a.js"), "/abs/a.js");
		assert_eq!(
			join_source_root(Some("src"), "webpack://app/a.js"),
			"webpack://app/a.js"
		);
	}

	#[test]
	fn normalize_relative_forms() {
		assert_eq!(normalize_source_path("./vendor/lib.js"), "vendor/lib.js");
		assert_eq!(normalize_source_path("/vendor//lib.js"), "vendor/lib.js");
		assert_eq!(normalize_source_path("a/../vendor/./lib.js"), "vendor/lib.js");
		assert_eq!(normalize_source_path("../../vendor/lib.js"), "vendor/lib.js");
		assert_eq!(normalize_source_path("vendor\\lib.js"), "vendor/lib.js");
	}

	#[test]
	fn normalize_protocol_prefixed_paths() {
		assert_eq!(
			normalize_source_path("webpack://app/./node_modules/x/lib.js"),
			"node_modules/x/lib.js"
		);
		assert_eq!(
			normalize_source_path("webpack:///./node_modules/x/lib.js"),
			"node_modules/x/lib.js"
		);
		assert_eq!(normalize_source_path("file:///home/me/lib.js"), "home/me/lib.js");
		assert_eq!(normalize_source_path("webpack://app"), "");
	}

	#[test]
	fn normalize_strips_query_and_fragment() {
		assert_eq!(normalize_source_path("lib.js?v=1#top"), "lib.js");
	}

	#[test]
	fn colon_without_scheme_is_a_plain_path() {
		assert_eq!(normalize_source_path("1a://x/lib.js"), "1a:/x/lib.js");
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use prodmap_core::{Fingerprint, RemapError, VersionRecord, VersionRegistry};
use prodmap_remap::{
	FsReferenceStore, InMemoryReferenceStore, InMemoryUpstream, RemapOptions, Remapper,
};
use prodmap_sourcemap::PositionMap;
use serde_json::{json, Value};
use tempfile::TempDir;

const ARTIFACT: &str = "libname.production.min.js";
const V1_CODE: &str = "!function(){var a=1}();";
const V2_CODE: &str = "!function(){var a=2}();";

fn record(version: &str, code: &str) -> VersionRecord {
	VersionRecord {
		library: "libname".to_string(),
		variant: "production".to_string(),
		version: version.to_string(),
		artifact_filename: ARTIFACT.to_string(),
		fingerprint: Fingerprint::of(code.as_bytes()),
		reference_location: format!("libname/{version}/{ARTIFACT}.map"),
	}
}

fn registry() -> Arc<VersionRegistry> {
	Arc::new(VersionRegistry::new([record("1.2.3", V1_CODE), record("2.0.0", V2_CODE)]).unwrap())
}

fn reference_map(version: &str) -> Value {
	json!({
		"version": 3,
		"file": ARTIFACT,
		"sources": [format!("libname-{version}/src/index.js")],
		"sourcesContent": [format!("export const version = '{version}';")],
		"names": ["version"],
		"mappings": "AAAAA"
	})
}

fn store() -> InMemoryReferenceStore {
	let mut store = InMemoryReferenceStore::new();
	for version in ["1.2.3", "2.0.0"] {
		store.add(
			&format!("libname/{version}/{ARTIFACT}.map"),
			serde_json::to_vec(&reference_map(version)).unwrap(),
		);
	}
	store
}

fn remapper() -> Remapper<InMemoryReferenceStore> {
	Remapper::new(registry(), store())
}

fn map(value: Value) -> PositionMap {
	PositionMap::from_value(value).unwrap()
}

fn strings(values: &[&str]) -> Vec<Option<String>> {
	values.iter().map(|v| Some(v.to_string())).collect()
}

#[test]
fn substitutes_identified_build() {
	let input = map(json!({
		"version": 3,
		"file": "bundle.js",
		"sources": ["src/app.js", "vendor/libname.production.min.js"],
		"sourcesContent": ["console.log('app');", V1_CODE],
		"names": [],
		"mappings": "AAAA;ACAA"
	}));

	let result = remapper().remap(&input).unwrap();

	assert!(result.rewrote);
	assert_eq!(result.matched_records, vec![record("1.2.3", V1_CODE)]);
	assert!(result.diagnostics.is_empty());

	let out = &result.output_map;
	assert_eq!(out.file.as_deref(), Some("bundle.js"));
	assert_eq!(out.sources, strings(&["src/app.js", "libname-1.2.3/src/index.js"]));
	assert_eq!(
		out.sources_content,
		Some(strings(&["console.log('app');", "export const version = '1.2.3';"]))
	);
	assert_eq!(out.names, vec!["version".to_string()]);
	assert_eq!(out.mappings, "AAAA;ACAAA");
}

#[test]
fn missing_content_passes_through_by_default() {
	let input = map(json!({
		"version": 3,
		"sources": ["vendor/libname.production.min.js"],
		"names": [],
		"mappings": "AAAA"
	}));

	let result = remapper().remap(&input).unwrap();

	assert!(!result.rewrote);
	assert!(result.matched_records.is_empty());
	assert_eq!(result.output_map.sources, strings(&["vendor/libname.production.min.js"]));
	assert_eq!(result.output_map.mappings, "AAAA");
	assert_eq!(result.diagnostics.len(), 1);
	assert_eq!(result.diagnostics[0].source, "vendor/libname.production.min.js");
	assert_eq!(result.diagnostics[0].depth, 0);
	assert!(matches!(
		result.diagnostics[0].error,
		RemapError::MissingSourceContent { .. }
	));
}

#[test]
fn missing_content_fails_when_escalated() {
	let input = map(json!({
		"version": 3,
		"sources": ["vendor/libname.production.min.js"],
		"sourcesContent": [null],
		"names": [],
		"mappings": "AAAA"
	}));

	let remapper = remapper().with_options(RemapOptions {
		error_on_missing_versions: true,
		..RemapOptions::default()
	});

	assert!(matches!(
		remapper.remap(&input),
		Err(RemapError::MissingSourceContent { path }) if path == "vendor/libname.production.min.js"
	));
}

#[test]
fn unknown_build_is_skipped_or_escalated() {
	let patched = "!function(){var a=3}();";
	let input = map(json!({
		"version": 3,
		"sources": ["vendor/libname.production.min.js"],
		"sourcesContent": [patched],
		"names": [],
		"mappings": "AAAA"
	}));

	let result = remapper().remap(&input).unwrap();
	assert!(!result.rewrote);
	assert_eq!(result.output_map.sources_content, Some(strings(&[patched])));
	match &result.diagnostics[0].error {
		RemapError::UnknownVersion { fingerprint, .. } => {
			assert_eq!(*fingerprint, Fingerprint::of(patched.as_bytes()))
		}
		other => panic!("expected UnknownVersion, got {other:?}"),
	}

	let strict = remapper().with_options(RemapOptions {
		error_on_missing_versions: true,
		..RemapOptions::default()
	});
	assert!(matches!(
		strict.remap(&input),
		Err(RemapError::UnknownVersion { .. })
	));
}

#[test]
fn each_occurrence_is_identified_independently() {
	let input = map(json!({
		"version": 3,
		"sources": [
			"a/libname.production.min.js",
			"b/libname.production.min.js",
			"c/libname.production.min.js"
		],
		"sourcesContent": [V2_CODE, "tampered", V1_CODE],
		"names": [],
		"mappings": "AAAA;ACAA;ACAA"
	}));

	let result = remapper().remap(&input).unwrap();

	assert!(result.rewrote);
	assert_eq!(
		result.matched_records,
		vec![record("2.0.0", V2_CODE), record("1.2.3", V1_CODE)]
	);
	assert_eq!(result.diagnostics.len(), 1);
	assert_eq!(result.diagnostics[0].source, "b/libname.production.min.js");
	assert_eq!(
		result.output_map.sources,
		strings(&[
			"libname-2.0.0/src/index.js",
			"b/libname.production.min.js",
			"libname-1.2.3/src/index.js"
		])
	);
}

#[test]
fn repeated_build_collapses_to_one_source() {
	let input = map(json!({
		"version": 3,
		"sources": ["a/libname.production.min.js", "b/libname.production.min.js"],
		"sourcesContent": [V1_CODE, V1_CODE],
		"names": [],
		"mappings": "AAAA;ACAA"
	}));

	let result = remapper().remap(&input).unwrap();

	assert_eq!(result.matched_records.len(), 2);
	assert_eq!(result.output_map.sources, strings(&["libname-1.2.3/src/index.js"]));
	assert_eq!(result.output_map.mappings, "AAAAA;AAAAA");
}

#[test]
fn version_in_path_does_not_decide_the_match() {
	let input = map(json!({
		"version": 3,
		"sources": ["node_modules/libname/1.2.3/libname.production.min.js"],
		"sourcesContent": [V2_CODE],
		"names": [],
		"mappings": "AAAA"
	}));

	let result = remapper().remap(&input).unwrap();
	assert_eq!(result.matched_records, vec![record("2.0.0", V2_CODE)]);
	assert_eq!(result.output_map.sources, strings(&["libname-2.0.0/src/index.js"]));
}

#[test]
fn passthrough_is_stable() {
	let input = map(json!({
		"version": 3,
		"file": "bundle.js",
		"sourceRoot": "webpack://app/",
		"sources": ["src/a.js", "src/b.js"],
		"sourcesContent": ["a", "b"],
		"names": ["main"],
		"mappings": "AAAAA,KACA;ACCA",
		"debugId": "85314830-023f-4cf1-a267-535f4e37bb17",
		"x_google_ignoreList": [1]
	}));

	let first = remapper().remap(&input).unwrap();
	assert!(!first.rewrote);
	assert!(first.diagnostics.is_empty());
	assert_eq!(
		first.output_map.sources,
		strings(&["webpack://app/src/a.js", "webpack://app/src/b.js"])
	);
	assert_eq!(first.output_map.source_root, None);
	assert_eq!(
		first.output_map.extensions.get("debugId"),
		Some(&json!("85314830-023f-4cf1-a267-535f4e37bb17"))
	);
	assert!(!first.output_map.extensions.contains_key("x_google_ignoreList"));

	let second = remapper().remap(&first.output_map).unwrap();
	assert_eq!(second.output_map, first.output_map);
}

#[test]
fn null_sources_pass_through() {
	let input = map(json!({
		"version": 3,
		"sources": [null, "src/a.js"],
		"names": [],
		"mappings": "AAAA,CCAA"
	}));

	let result = remapper().remap(&input).unwrap();
	assert_eq!(result.output_map.sources, vec![None, Some("src/a.js".to_string())]);
}

#[test]
fn malformed_input_is_rejected() {
	let remapper = remapper();

	assert!(matches!(
		remapper.remap_slice(b"{not json"),
		Err(RemapError::MalformedDocument(_))
	));
	assert!(matches!(
		remapper.remap_slice(br#"{"version":2,"sources":[],"names":[],"mappings":""}"#),
		Err(RemapError::InvalidSchema(_))
	));
	assert!(matches!(
		remapper.remap_slice(br#"{"version":3,"sources":["a.js"],"names":[],"mappings":"A!"}"#),
		Err(RemapError::InvalidMappings(_))
	));

	let mut built = PositionMap::new();
	built.sources = strings(&["a.js"]);
	built.sources_content = Some(strings(&["a", "b"]));
	assert!(matches!(remapper.remap(&built), Err(RemapError::InvalidInput(_))));
}

#[test]
fn missing_reference_map_is_a_diagnostic() {
	let remapper = Remapper::new(registry(), InMemoryReferenceStore::new()).with_options(
		RemapOptions {
			error_on_missing_versions: true,
			..RemapOptions::default()
		},
	);
	let input = map(json!({
		"version": 3,
		"sources": ["libname.production.min.js"],
		"sourcesContent": [V1_CODE],
		"names": [],
		"mappings": "AAAA"
	}));

	let result = remapper.remap(&input).unwrap();
	assert!(!result.rewrote);
	assert!(result.matched_records.is_empty());
	assert!(matches!(
		&result.diagnostics[0].error,
		RemapError::ReferenceNotFound { location } if location == "libname/1.2.3/libname.production.min.js.map"
	));
	assert_eq!(result.output_map.sources, strings(&["libname.production.min.js"]));
}

#[test]
fn corrupt_reference_map_is_a_diagnostic() {
	let mut store = store();
	store.add(&format!("libname/1.2.3/{ARTIFACT}.map"), b"garbage".to_vec());
	let input = map(json!({
		"version": 3,
		"sources": ["libname.production.min.js"],
		"sourcesContent": [V1_CODE],
		"names": [],
		"mappings": "AAAA"
	}));

	let result = Remapper::new(registry(), store).remap(&input).unwrap();
	assert!(!result.rewrote);
	assert!(matches!(
		result.diagnostics[0].error,
		RemapError::MalformedDocument(_)
	));
}

#[test]
fn upstream_maps_are_expanded() {
	// build/vendor.js was itself bundled from the minified library
	let mut upstream = InMemoryUpstream::new();
	upstream.add(
		"build/vendor.js",
		map(json!({
			"version": 3,
			"sources": ["../node_modules/libname/libname.production.min.js"],
			"sourcesContent": [V1_CODE],
			"names": [],
			"mappings": "AAAA"
		})),
	);

	let input = map(json!({
		"version": 3,
		"sources": ["src/app.js", "./build/vendor.js"],
		"names": [],
		"mappings": "AAAA;ACAA"
	}));

	let result = remapper().with_upstream(upstream).remap(&input).unwrap();

	assert!(result.rewrote);
	assert_eq!(result.matched_records, vec![record("1.2.3", V1_CODE)]);
	assert_eq!(
		result.output_map.sources,
		strings(&["src/app.js", "libname-1.2.3/src/index.js"])
	);
}

#[test]
fn unidentified_artifact_in_upstream_map_reports_depth() {
	let mut upstream = InMemoryUpstream::new();
	upstream.add(
		"build/vendor.js",
		map(json!({
			"version": 3,
			"sources": ["libname.production.min.js"],
			"sourcesContent": ["unknown"],
			"names": [],
			"mappings": "AAAA"
		})),
	);
	let input = map(json!({
		"version": 3,
		"sources": ["build/vendor.js"],
		"names": [],
		"mappings": "AAAA"
	}));

	let result = remapper().with_upstream(upstream).remap(&input).unwrap();
	assert!(!result.rewrote);
	assert_eq!(result.diagnostics[0].depth, 1);
	assert_eq!(result.output_map.sources, strings(&["libname.production.min.js"]));
}

#[test]
fn nested_artifact_without_content_uses_input_content() {
	let mut upstream = InMemoryUpstream::new();
	upstream.add(
		"build/vendor.js",
		map(json!({
			"version": 3,
			"sources": ["../node_modules/libname/libname.production.min.js"],
			"names": [],
			"mappings": "AAAA"
		})),
	);
	let input = map(json!({
		"version": 3,
		"sources": ["build/vendor.js", "node_modules/libname/libname.production.min.js"],
		"sourcesContent": [null, V1_CODE],
		"names": [],
		"mappings": "AAAA;ACAA"
	}));

	let result = remapper().with_upstream(upstream).remap(&input).unwrap();

	assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
	assert_eq!(
		result.matched_records,
		vec![record("1.2.3", V1_CODE), record("1.2.3", V1_CODE)]
	);
	assert_eq!(result.output_map.sources, strings(&["libname-1.2.3/src/index.js"]));
}

#[test]
fn nested_artifact_unknown_to_input_is_not_found() {
	let mut upstream = InMemoryUpstream::new();
	upstream.add(
		"build/vendor.js",
		map(json!({
			"version": 3,
			"sources": ["libname.production.min.js"],
			"names": [],
			"mappings": "AAAA"
		})),
	);
	let input = map(json!({
		"version": 3,
		"sources": ["build/vendor.js"],
		"names": [],
		"mappings": "AAAA"
	}));

	let escalating = RemapOptions {
		error_on_missing_versions: true,
		..RemapOptions::default()
	};
	let result = remapper()
		.with_upstream(upstream)
		.with_options(escalating)
		.remap(&input)
		.unwrap();

	assert!(!result.rewrote);
	assert_eq!(result.diagnostics.len(), 1);
	assert_eq!(result.diagnostics[0].depth, 1);
	assert!(matches!(
		result.diagnostics[0].error,
		RemapError::SourceNotFound { .. }
	));
	assert_eq!(result.output_map.sources, strings(&["libname.production.min.js"]));
}

#[test]
fn cyclic_upstream_maps_fail() {
	let mut upstream = InMemoryUpstream::new();
	upstream.add(
		"a.js",
		map(json!({"version": 3, "sources": ["b.js"], "names": [], "mappings": "AAAA"})),
	);
	upstream.add(
		"b.js",
		map(json!({"version": 3, "sources": ["./a.js"], "names": [], "mappings": "AAAA"})),
	);
	let input = map(json!({"version": 3, "sources": ["a.js"], "names": [], "mappings": "AAAA"}));

	assert!(matches!(
		remapper().with_upstream(upstream).remap(&input),
		Err(RemapError::CyclicMap { .. })
	));
}

#[test]
fn nesting_is_bounded() {
	let mut upstream = InMemoryUpstream::new();
	for i in 0..3 {
		upstream.add(
			&format!("s{i}.js"),
			map(json!({
				"version": 3,
				"sources": [format!("s{}.js", i + 1)],
				"names": [],
				"mappings": "AAAA"
			})),
		);
	}
	let input = map(json!({"version": 3, "sources": ["s0.js"], "names": [], "mappings": "AAAA"}));

	let shallow = remapper()
		.with_upstream(upstream.clone())
		.with_options(RemapOptions {
			max_depth: 2,
			..RemapOptions::default()
		});
	assert!(matches!(
		shallow.remap(&input),
		Err(RemapError::DepthExceeded { max: 2 })
	));

	let deep = remapper().with_upstream(upstream).with_options(RemapOptions {
		max_depth: 3,
		..RemapOptions::default()
	});
	let result = deep.remap(&input).unwrap();
	assert_eq!(result.output_map.sources, strings(&["s3.js"]));
}

#[test]
fn reads_reference_maps_from_disk() {
	let dir = TempDir::new().unwrap();
	let location = dir.path().join("libname/1.2.3");
	std::fs::create_dir_all(&location).unwrap();
	std::fs::write(
		location.join(format!("{ARTIFACT}.map")),
		serde_json::to_vec(&reference_map("1.2.3")).unwrap(),
	)
	.unwrap();

	let remapper = Remapper::new(registry(), FsReferenceStore::new(dir.path()));
	let input = map(json!({
		"version": 3,
		"sources": ["webpack:///./node_modules/libname/libname.production.min.js?v=1"],
		"sourcesContent": [V1_CODE],
		"names": [],
		"mappings": "AAAA"
	}));

	let result = remapper.remap(&input).unwrap();
	assert!(result.rewrote);
	assert_eq!(result.output_map.sources, strings(&["libname-1.2.3/src/index.js"]));
}

#[test]
fn remapper_is_shareable_across_threads() {
	let remapper = remapper();
	let input = map(json!({
		"version": 3,
		"sources": ["libname.production.min.js"],
		"sourcesContent": [V2_CODE],
		"names": [],
		"mappings": "AAAA"
	}));

	std::thread::scope(|scope| {
		let handles: Vec<_> = (0..4)
			.map(|_| scope.spawn(|| remapper.remap(&input).unwrap().matched_records))
			.collect();
		for handle in handles {
			assert_eq!(handle.join().unwrap(), vec![record("2.0.0", V2_CODE)]);
		}
	});
}

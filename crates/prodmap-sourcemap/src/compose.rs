// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Composition of nested source maps into one flat map.
//!
//! A [`MapNode`] is a decoded map whose sources are either original files or
//! further maps. [`flatten`] traces every generated segment of the root down to
//! an original file and emits a single map over those files.

use std::collections::HashMap;

use crate::map::PositionMap;
use crate::vlq::{encode_vlq_mappings, DecodedMappings, Segment, SourcePosition};

/// A source of a map in the composition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceNode {
	/// A leaf: an original file, with its embedded content if known.
	Original {
		source: Option<String>,
		content: Option<String>,
	},
	/// A map whose generated file is this source.
	Map(MapNode),
}

/// A decoded map and the nodes for each of its sources.
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
	pub mappings: DecodedMappings,
	pub names: Vec<String>,
	/// Index-aligned with the map's `sources`.
	pub sources: Vec<SourceNode>,
}

/// Where a traced segment ends up.
enum Traced<'a> {
	Sourceless,
	Original {
		source: &'a Option<String>,
		content: &'a Option<String>,
		line: u32,
		column: u32,
		name: Option<&'a str>,
	},
}

/// Flatten a composition tree into a single map.
///
/// Segments whose position has no mapping in a nested map are dropped; names
/// recorded by deeper maps replace those of outer maps.
pub fn flatten(file: Option<String>, root: &MapNode) -> PositionMap {
	let mut builder = FlatBuilder::default();

	for (line_idx, line) in root.mappings.lines().iter().enumerate() {
		let mut out_line = Vec::with_capacity(line.len());

		for segment in line {
			let traced = match segment.original {
				None => Traced::Sourceless,
				Some(pos) => {
					let name = pos
						.name_index
						.and_then(|idx| root.names.get(idx as usize))
						.map(String::as_str);
					match root.sources.get(pos.source_index as usize) {
						Some(node) => {
							match trace(node, pos.original_line, pos.original_column, name) {
								Some(traced) => traced,
								None => continue,
							}
						}
						None => {
							tracing::trace!(
								line = line_idx,
								source_index = pos.source_index,
								"segment points past sources, dropping"
							);
							continue;
						}
					}
				}
			};

			builder.push(&mut out_line, segment.generated_column, traced);
		}

		builder.lines.push(out_line);
	}

	builder.finish(file)
}

fn trace<'a>(
	node: &'a SourceNode,
	line: u32,
	column: u32,
	name: Option<&'a str>,
) -> Option<Traced<'a>> {
	match node {
		SourceNode::Original { source, content } => Some(Traced::Original {
			source,
			content,
			line,
			column,
			name,
		}),
		SourceNode::Map(map) => {
			let segment = map.mappings.find(line, column)?;
			let pos = match segment.original {
				None => return Some(Traced::Sourceless),
				Some(pos) => pos,
			};
			let name = pos
				.name_index
				.and_then(|idx| map.names.get(idx as usize))
				.map(String::as_str)
				.or(name);
			let child = map.sources.get(pos.source_index as usize)?;
			trace(child, pos.original_line, pos.original_column, name)
		}
	}
}

#[derive(Default)]
struct FlatBuilder {
	sources: Vec<Option<String>>,
	contents: Vec<Option<String>>,
	source_ids: HashMap<(Option<String>, Option<String>), u32>,
	names: Vec<String>,
	name_ids: HashMap<String, u32>,
	lines: Vec<Vec<Segment>>,
}

impl FlatBuilder {
	fn push(&mut self, line: &mut Vec<Segment>, generated_column: u32, traced: Traced<'_>) {
		let segment = match traced {
			Traced::Sourceless => {
				// A sourceless segment only matters if it ends a mapped run
				match line.last() {
					None => return,
					Some(prev) if prev.original.is_none() => return,
					Some(_) => Segment::sourceless(generated_column),
				}
			}
			Traced::Original {
				source,
				content,
				line: original_line,
				column: original_column,
				name,
			} => Segment {
				generated_column,
				original: Some(SourcePosition {
					source_index: self.source_id(source, content),
					original_line,
					original_column,
					name_index: name.map(|n| self.name_id(n)),
				}),
			},
		};

		if let Some(prev) = line.last() {
			if prev.original.is_some() && prev.original == segment.original {
				return;
			}
		}
		line.push(segment);
	}

	fn source_id(&mut self, source: &Option<String>, content: &Option<String>) -> u32 {
		let key = (source.clone(), content.clone());
		if let Some(&id) = self.source_ids.get(&key) {
			return id;
		}
		let id = self.sources.len() as u32;
		self.sources.push(source.clone());
		self.contents.push(content.clone());
		self.source_ids.insert(key, id);
		id
	}

	fn name_id(&mut self, name: &str) -> u32 {
		if let Some(&id) = self.name_ids.get(name) {
			return id;
		}
		let id = self.names.len() as u32;
		self.names.push(name.to_string());
		self.name_ids.insert(name.to_string(), id);
		id
	}

	fn finish(self, file: Option<String>) -> PositionMap {
		let mappings = encode_vlq_mappings(&DecodedMappings::from_lines(self.lines));
		let sources_content = self
			.contents
			.iter()
			.any(Option::is_some)
			.then_some(self.contents);

		PositionMap {
			file,
			sources: self.sources,
			sources_content,
			names: self.names,
			mappings,
			..PositionMap::new()
		}
	}
}

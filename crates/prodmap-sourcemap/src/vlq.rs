// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! VLQ (Variable-Length Quantity) codec for source map mappings.
//!
//! Source maps use Base64 VLQ encoding for compact storage of line/column mappings.
//! This module decodes the payload into per-line segment tables and encodes
//! composed tables back, following the source map v3 format.

use prodmap_core::{RemapError, Result};

/// Base64 character set used in VLQ encoding.
const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const CONTINUATION_BIT: i64 = 0b100000;
const VALUE_MASK: i64 = 0b011111;

/// Decode a Base64 character to its 6-bit value.
fn decode_char(ch: u8) -> Result<i64> {
	BASE64_CHARS
		.iter()
		.position(|&c| c == ch)
		.map(|pos| pos as i64)
		.ok_or_else(|| RemapError::InvalidMappings(format!("invalid VLQ character: {}", ch as char)))
}

/// Decode a VLQ-encoded segment into a vector of signed integers.
///
/// Each segment represents 1, 4 or 5 values:
/// generated column, then source index, original line, original column, name index.
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i64>> {
	let mut values = Vec::new();
	let mut value = 0i64;
	let mut shift = 0;

	for ch in segment.bytes() {
		let digit = decode_char(ch)?;

		if shift > 30 {
			return Err(RemapError::InvalidMappings(format!(
				"VLQ value overflows in segment '{segment}'"
			)));
		}

		value += (digit & VALUE_MASK) << shift;
		shift += 5;

		if digit & CONTINUATION_BIT == 0 {
			// Lowest bit is the sign
			let negated = value & 1 != 0;
			value >>= 1;
			if negated {
				value = -value;
			}
			values.push(value);
			value = 0;
			shift = 0;
		}
	}

	if shift != 0 {
		return Err(RemapError::InvalidMappings(format!(
			"truncated VLQ value in segment '{segment}'"
		)));
	}

	Ok(values)
}

/// Append the VLQ encoding of `value` to `out`.
pub fn encode_vlq_value(value: i64, out: &mut String) {
	let mut vlq = if value < 0 {
		((-value) << 1) | 1
	} else {
		value << 1
	};

	loop {
		let mut digit = vlq & VALUE_MASK;
		vlq >>= 5;
		if vlq > 0 {
			digit |= CONTINUATION_BIT;
		}
		out.push(BASE64_CHARS[digit as usize] as char);
		if vlq == 0 {
			break;
		}
	}
}

/// Where a generated position points in an original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
	/// Index into the sources array.
	pub source_index: u32,
	/// Line in the original file (0-indexed).
	pub original_line: u32,
	/// Column in the original file (0-indexed).
	pub original_column: u32,
	/// Optional index into the names array.
	pub name_index: Option<u32>,
}

/// A single mapping segment on a generated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
	/// Column in the generated file (0-indexed).
	pub generated_column: u32,
	/// `None` for 1-field segments that map to no source.
	pub original: Option<SourcePosition>,
}

impl Segment {
	pub fn sourceless(generated_column: u32) -> Self {
		Self {
			generated_column,
			original: None,
		}
	}
}

/// Decoded mappings, one segment list per generated line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMappings {
	/// Segments per line, sorted by generated column.
	lines: Vec<Vec<Segment>>,
}

impl DecodedMappings {
	pub fn new() -> Self {
		Self { lines: Vec::new() }
	}

	pub fn from_lines(mut lines: Vec<Vec<Segment>>) -> Self {
		for line in &mut lines {
			line.sort_by_key(|s| s.generated_column);
		}
		Self { lines }
	}

	pub fn lines(&self) -> &[Vec<Segment>] {
		&self.lines
	}

	/// Find the segment for a generated line and column.
	///
	/// Returns the segment with the greatest generated column at or before
	/// `column`; on an exact hit the first of several equal columns wins.
	pub fn find(&self, line: u32, column: u32) -> Option<&Segment> {
		let segments = self.lines.get(line as usize)?;

		let idx = segments.partition_point(|s| s.generated_column < column);
		if let Some(exact) = segments.get(idx) {
			if exact.generated_column == column {
				return Some(exact);
			}
		}

		if idx == 0 {
			// Column is before all mappings on this line
			None
		} else {
			Some(&segments[idx - 1])
		}
	}

	pub fn line_count(&self) -> usize {
		self.lines.len()
	}

	/// Total number of segments across all lines.
	pub fn len(&self) -> usize {
		self.lines.iter().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.lines.iter().all(Vec::is_empty)
	}
}

fn non_negative(value: i64, what: &str) -> Result<u32> {
	u32::try_from(value)
		.map_err(|_| RemapError::InvalidMappings(format!("{what} out of range: {value}")))
}

/// Decode VLQ-encoded source map mappings string into structured form.
///
/// The mappings string format:
/// - Lines are separated by semicolons (;)
/// - Segments within a line are separated by commas (,)
/// - Each segment contains 1, 4, or 5 VLQ-encoded values
pub fn decode_vlq_mappings(mappings: &str) -> Result<DecodedMappings> {
	let mut lines = Vec::new();

	// Relative state carried across lines
	let mut prev_source = 0i64;
	let mut prev_original_line = 0i64;
	let mut prev_original_column = 0i64;
	let mut prev_name = 0i64;

	if mappings.is_empty() {
		return Ok(DecodedMappings::new());
	}

	for line in mappings.split(';') {
		let mut generated_column = 0i64;
		let mut segments = Vec::new();

		for segment in line.split(',') {
			if segment.is_empty() {
				continue;
			}

			let values = decode_vlq_segment(segment)?;

			generated_column += values[0];
			let column = non_negative(generated_column, "generated column")?;

			match values.len() {
				1 => segments.push(Segment::sourceless(column)),
				4 | 5 => {
					prev_source += values[1];
					prev_original_line += values[2];
					prev_original_column += values[3];

					let name_index = if values.len() == 5 {
						prev_name += values[4];
						Some(non_negative(prev_name, "name index")?)
					} else {
						None
					};

					segments.push(Segment {
						generated_column: column,
						original: Some(SourcePosition {
							source_index: non_negative(prev_source, "source index")?,
							original_line: non_negative(prev_original_line, "original line")?,
							original_column: non_negative(prev_original_column, "original column")?,
							name_index,
						}),
					});
				}
				n => {
					return Err(RemapError::InvalidMappings(format!(
						"segment '{segment}' has {n} fields, expected 1, 4 or 5"
					)))
				}
			}
		}

		lines.push(segments);
	}

	Ok(DecodedMappings::from_lines(lines))
}

/// Encode decoded mappings back into the VLQ mappings string.
pub fn encode_vlq_mappings(mappings: &DecodedMappings) -> String {
	let mut out = String::new();

	let mut prev_source = 0i64;
	let mut prev_original_line = 0i64;
	let mut prev_original_column = 0i64;
	let mut prev_name = 0i64;

	for (line_idx, line) in mappings.lines.iter().enumerate() {
		if line_idx > 0 {
			out.push(';');
		}

		let mut prev_column = 0i64;
		for (seg_idx, segment) in line.iter().enumerate() {
			if seg_idx > 0 {
				out.push(',');
			}

			let column = i64::from(segment.generated_column);
			encode_vlq_value(column - prev_column, &mut out);
			prev_column = column;

			if let Some(pos) = segment.original {
				let source = i64::from(pos.source_index);
				let original_line = i64::from(pos.original_line);
				let original_column = i64::from(pos.original_column);

				encode_vlq_value(source - prev_source, &mut out);
				encode_vlq_value(original_line - prev_original_line, &mut out);
				encode_vlq_value(original_column - prev_original_column, &mut out);
				prev_source = source;
				prev_original_line = original_line;
				prev_original_column = original_column;

				if let Some(name) = pos.name_index {
					let name = i64::from(name);
					encode_vlq_value(name - prev_name, &mut out);
					prev_name = name;
				}
			}
		}
	}

	out
}

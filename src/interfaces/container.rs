//! Mapping container interface.
//!
//! A mapping container accumulates generated-to-original position mappings
//! and moves them in and out of the base64 VLQ interchange format.

use std::fmt;

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Errors that can occur decoding VLQ mappings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("Invalid base64 character {character:?} at offset {offset}")]
    InvalidBase64 { character: char, offset: usize },

    #[error("Unterminated VLQ sequence")]
    UnterminatedVlq,

    #[error("VLQ value at offset {offset} exceeds 64 bits")]
    VlqOverflow { offset: usize },

    #[error("Segment has {fields} fields, expected 1, 4, or 5")]
    MalformedSegment { fields: usize },

    #[error("Decoded position out of range: line={line}, column={column}")]
    PositionOutOfRange { line: i64, column: i64 },

    #[error("Source remap index {index} out of range ({len} entries)")]
    SourceOutOfRange { index: i64, len: usize },

    #[error("Name remap index {index} out of range ({len} entries)")]
    NameOutOfRange { index: i64, len: usize },
}

/// Zero-based line/column position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Original-side half of a mapping: a position in an interned source,
/// optionally tagged with an interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalLocation {
    pub position: Position,
    pub source: u32,
    pub name: Option<u32>,
}

/// One segment: a generated position, optionally mapped back to an original
/// location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub generated: Position,
    pub original: Option<OriginalLocation>,
}

/// Interface for mapping containers.
///
/// Implementations group segments however suits their target; observable
/// behavior through this trait must be identical across backends.
pub trait MappingContainer: Send + fmt::Debug {
    /// Intern a source path, returning its stable index.
    fn add_source(&mut self, source: &str) -> u32;

    /// Intern a symbol name, returning its stable index.
    fn add_name(&mut self, name: &str) -> u32;

    /// Index of a previously interned source path.
    fn source_index(&self, source: &str) -> Option<u32>;

    /// Index of a previously interned name.
    fn name_index(&self, name: &str) -> Option<u32>;

    /// Append one mapping segment, materializing lines up to the generated
    /// line on demand.
    fn add_mapping(&mut self, generated: Position, original: Option<OriginalLocation>);

    /// Decode a VLQ mappings string, appending its segments.
    ///
    /// `sources` and `names` remap the string's local indices into this
    /// container's interned tables. `line_offset` and `column_offset` shift
    /// the generated positions.
    fn add_vlq_mappings(
        &mut self,
        input: &str,
        sources: &[u32],
        names: &[u32],
        line_offset: u32,
        column_offset: u32,
    ) -> Result<()>;

    /// Serialize all mappings as a VLQ string, sorting each line by
    /// generated column first.
    fn to_vlq_mappings(&mut self) -> String;

    /// Closest segment to `column` on `line` by generated column: the last
    /// segment at or before the column, or the line's first segment when all
    /// sit past it. `None` beyond the last materialized line or on a line
    /// with no segments.
    fn find_closest_mapping(&mut self, line: u32, column: u32) -> Option<Mapping>;

    /// Number of generated lines materialized so far.
    fn generated_lines(&self) -> u32;

    /// Total number of segments across all lines.
    fn total_segments(&self) -> usize;

    /// Interned source paths in index order.
    fn sources(&self) -> &[String];

    /// Interned names in index order.
    fn names(&self) -> &[String];
}

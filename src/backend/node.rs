//! Default backend: per-line segment layout.
//!
//! Segments are grouped into one vector per generated line, with lines
//! materialized on demand up to the highest mapped line. Each line tracks
//! whether its segments arrived in column order so serialization only sorts
//! when it has to.

use async_trait::async_trait;
use tracing::debug;

use super::intern::Interner;
use crate::interfaces::backend::{BackendError, MappingBackend, Result};
use crate::interfaces::container::{
    Mapping, MappingContainer, OriginalLocation, Position, Result as ContainerResult,
};
use crate::vlq;

/// Per-line segment backend.
#[derive(Debug, Default)]
pub struct NodeBackend;

impl NodeBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MappingBackend for NodeBackend {
    fn name(&self) -> &'static str {
        "node"
    }

    async fn init(&self) -> Result<()> {
        vlq::self_check().map_err(BackendError::SelfCheck)?;
        debug!("node backend initialized");
        Ok(())
    }

    fn container(&self) -> Box<dyn MappingContainer> {
        Box::new(NodeMappings::default())
    }
}

#[derive(Debug)]
struct MappingLine {
    segments: Vec<Mapping>,
    /// Cleared when a segment arrives out of column order.
    sorted: bool,
}

impl MappingLine {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            sorted: true,
        }
    }

    fn add(&mut self, mapping: Mapping) {
        if let Some(last) = self.segments.last() {
            if mapping.generated.column < last.generated.column {
                self.sorted = false;
            }
        }
        self.segments.push(mapping);
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.segments.sort_by_key(|m| m.generated.column);
            self.sorted = true;
        }
    }
}

/// Mapping container with one segment vector per generated line.
#[derive(Debug, Default)]
pub struct NodeMappings {
    lines: Vec<MappingLine>,
    sources: Interner,
    names: Interner,
    segment_count: usize,
}

impl NodeMappings {
    fn ensure_lines(&mut self, line: u32) {
        let needed = line as usize + 1;
        if self.lines.len() < needed {
            self.lines.reserve(needed - self.lines.len());
            while self.lines.len() < needed {
                self.lines.push(MappingLine::new());
            }
        }
    }
}

impl MappingContainer for NodeMappings {
    fn add_source(&mut self, source: &str) -> u32 {
        self.sources.add(source)
    }

    fn add_name(&mut self, name: &str) -> u32 {
        self.names.add(name)
    }

    fn source_index(&self, source: &str) -> Option<u32> {
        self.sources.get(source)
    }

    fn name_index(&self, name: &str) -> Option<u32> {
        self.names.get(name)
    }

    fn add_mapping(&mut self, generated: Position, original: Option<OriginalLocation>) {
        self.ensure_lines(generated.line);
        self.lines[generated.line as usize].add(Mapping {
            generated,
            original,
        });
        self.segment_count += 1;
    }

    fn add_vlq_mappings(
        &mut self,
        input: &str,
        sources: &[u32],
        names: &[u32],
        line_offset: u32,
        column_offset: u32,
    ) -> ContainerResult<()> {
        vlq::parse_mappings(input, sources, names, line_offset, column_offset, |m| {
            self.add_mapping(m.generated, m.original);
        })
    }

    fn to_vlq_mappings(&mut self) -> String {
        for line in &mut self.lines {
            line.ensure_sorted();
        }
        vlq::serialize_mappings(self.lines.iter().map(|l| l.segments.as_slice()))
    }

    fn find_closest_mapping(&mut self, line: u32, column: u32) -> Option<Mapping> {
        let line = self.lines.get_mut(line as usize)?;
        line.ensure_sorted();

        let segments = &line.segments;
        if segments.is_empty() {
            return None;
        }
        let at_or_before = segments.partition_point(|m| m.generated.column <= column);
        Some(segments[at_or_before.saturating_sub(1)])
    }

    fn generated_lines(&self) -> u32 {
        self.lines.len() as u32
    }

    fn total_segments(&self) -> usize {
        self.segment_count
    }

    fn sources(&self) -> &[String] {
        self.sources.as_slice()
    }

    fn names(&self) -> &[String] {
        self.names.as_slice()
    }
}

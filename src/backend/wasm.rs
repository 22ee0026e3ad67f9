//! Portable backend: flat segment layout.
//!
//! All segments live in one arena ordered lazily by (generated line,
//! generated column), a layout suited to linear-memory targets where
//! per-line allocation is expensive. Line boundaries are recomputed at
//! serialization and lookup time.

use async_trait::async_trait;
use tracing::debug;

use super::intern::Interner;
use crate::interfaces::backend::{BackendError, MappingBackend, Result};
use crate::interfaces::container::{
    Mapping, MappingContainer, OriginalLocation, Position, Result as ContainerResult,
};
use crate::vlq;

/// Flat-arena segment backend.
#[derive(Debug, Default)]
pub struct WasmBackend;

impl WasmBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MappingBackend for WasmBackend {
    fn name(&self) -> &'static str {
        "wasm"
    }

    async fn init(&self) -> Result<()> {
        vlq::self_check().map_err(BackendError::SelfCheck)?;

        // Probe the arena end to end before exposing the API.
        let mut probe = WasmMappings::default();
        probe
            .add_vlq_mappings("AAAA,IACE", &[0], &[], 0, 0)
            .map_err(|e| BackendError::Setup(e.to_string()))?;
        let out = probe.to_vlq_mappings();
        if out != "AAAA,IACE" {
            return Err(BackendError::Setup(format!(
                "arena probe serialized to {out:?}"
            )));
        }

        debug!("wasm backend initialized");
        Ok(())
    }

    fn container(&self) -> Box<dyn MappingContainer> {
        Box::new(WasmMappings::default())
    }
}

/// Mapping container holding all segments in one flat arena.
#[derive(Debug)]
pub struct WasmMappings {
    segments: Vec<Mapping>,
    /// Cleared when a segment arrives out of (line, column) order.
    sorted: bool,
    /// Lines materialized so far: highest mapped line + 1.
    line_count: u32,
    sources: Interner,
    names: Interner,
}

impl Default for WasmMappings {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            sorted: true,
            line_count: 0,
            sources: Interner::default(),
            names: Interner::default(),
        }
    }
}

impl WasmMappings {
    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.segments
                .sort_by_key(|m| (m.generated.line, m.generated.column));
            self.sorted = true;
        }
    }

    /// Arena range covering `line`. Requires a sorted arena.
    fn line_range(&self, line: u32) -> (usize, usize) {
        let start = self.segments.partition_point(|m| m.generated.line < line);
        let end = start
            + self.segments[start..].partition_point(|m| m.generated.line == line);
        (start, end)
    }
}

impl MappingContainer for WasmMappings {
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
        if let Some(last) = self.segments.last() {
            if (generated.line, generated.column)
                < (last.generated.line, last.generated.column)
            {
                self.sorted = false;
            }
        }
        self.line_count = self.line_count.max(generated.line + 1);
        self.segments.push(Mapping {
            generated,
            original,
        });
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
        self.ensure_sorted();

        let mut lines: Vec<&[Mapping]> = Vec::with_capacity(self.line_count as usize);
        let mut start = 0;
        for line in 0..self.line_count {
            let end = start
                + self.segments[start..].partition_point(|m| m.generated.line == line);
            lines.push(&self.segments[start..end]);
            start = end;
        }

        vlq::serialize_mappings(lines)
    }

    fn find_closest_mapping(&mut self, line: u32, column: u32) -> Option<Mapping> {
        if line >= self.line_count {
            return None;
        }
        self.ensure_sorted();

        let (start, end) = self.line_range(line);
        let segments = &self.segments[start..end];
        if segments.is_empty() {
            return None;
        }
        let at_or_before = segments.partition_point(|m| m.generated.column <= column);
        Some(segments[at_or_before.saturating_sub(1)])
    }

    fn generated_lines(&self) -> u32 {
        self.line_count
    }

    fn total_segments(&self) -> usize {
        self.segments.len()
    }

    fn sources(&self) -> &[String] {
        self.sources.as_slice()
    }

    fn names(&self) -> &[String] {
        self.names.as_slice()
    }
}

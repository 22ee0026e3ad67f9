//! MappingContainer interface step definitions.

use std::fmt;

use cucumber::{given, then, when, World};

use sourcemap::backend::Backend;
use sourcemap::config::{BackendKind, BACKEND_ENV_VAR};
use sourcemap::interfaces::{Mapping, MappingContainer, OriginalLocation, Position};

/// Test context for MappingContainer scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct MappingWorld {
    /// Filled in by the readiness barrier hook before each scenario.
    pub backend: Option<&'static Backend>,
    container: Option<Box<dyn MappingContainer>>,
    closest: Option<Option<Mapping>>,
    last_error: Option<String>,
}

impl fmt::Debug for MappingWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingWorld")
            .field("backend", &self.backend)
            .field("container", &self.container.is_some())
            .field("closest", &self.closest)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl MappingWorld {
    fn new() -> Self {
        Self {
            backend: None,
            container: None,
            closest: None,
            last_error: None,
        }
    }

    fn container(&mut self) -> &mut dyn MappingContainer {
        self.container
            .as_deref_mut()
            .expect("Container not initialized")
    }
}

// --- Background ---

#[given("a fresh mapping container")]
async fn given_fresh_container(world: &mut MappingWorld) {
    let backend = world.backend.expect("Readiness barrier did not run");
    world.container = Some(backend.api().container());
}

// --- When steps ---

#[when(expr = "I add the source {string}")]
async fn when_add_source(world: &mut MappingWorld, source: String) {
    world.container().add_source(&source);
}

#[when(
    expr = "I add a mapping at generated line {int} column {int} \
            from source {string} at line {int} column {int}"
)]
async fn when_add_mapping(
    world: &mut MappingWorld,
    generated_line: u32,
    generated_column: u32,
    source: String,
    original_line: u32,
    original_column: u32,
) {
    let source = world.container().add_source(&source);
    world.container().add_mapping(
        Position::new(generated_line, generated_column),
        Some(OriginalLocation {
            position: Position::new(original_line, original_column),
            source,
            name: None,
        }),
    );
}

#[when(expr = "I add the VLQ mappings {string} remapping sources to {string}")]
async fn when_add_vlq(world: &mut MappingWorld, input: String, source: String) {
    add_vlq(world, &input, &source, 0, 0);
}

#[when(
    expr = "I add the VLQ mappings {string} remapping sources to {string} \
            with line offset {int} and column offset {int}"
)]
async fn when_add_vlq_with_offsets(
    world: &mut MappingWorld,
    input: String,
    source: String,
    line_offset: u32,
    column_offset: u32,
) {
    add_vlq(world, &input, &source, line_offset, column_offset);
}

fn add_vlq(
    world: &mut MappingWorld,
    input: &str,
    source: &str,
    line_offset: u32,
    column_offset: u32,
) {
    let source = world.container().add_source(source);
    match world
        .container()
        .add_vlq_mappings(input, &[source], &[], line_offset, column_offset)
    {
        Ok(()) => world.last_error = None,
        Err(e) => world.last_error = Some(e.to_string()),
    }
}

#[when(expr = "I look up the closest mapping on line {int} at column {int}")]
async fn when_find_closest(world: &mut MappingWorld, line: u32, column: u32) {
    let closest = world.container().find_closest_mapping(line, column);
    world.closest = Some(closest);
}

// --- Then steps ---

#[then("the active backend matches the selector")]
async fn then_backend_matches_selector(world: &mut MappingWorld) {
    let expected = BackendKind::from_selector(
        std::env::var(BACKEND_ENV_VAR).ok().as_deref(),
    )
    .expect("Scenario ran with an unrecognized selector");
    let backend = world.backend.expect("Readiness barrier did not run");
    assert_eq!(backend.kind(), expected);
    assert_eq!(backend.api().name(), expected.name());
}

#[then(expr = "the container has {int} sources")]
async fn then_source_count(world: &mut MappingWorld, count: usize) {
    assert_eq!(world.container().sources().len(), count);
}

#[then(expr = "the source {string} has index {int}")]
async fn then_source_index(world: &mut MappingWorld, source: String, index: u32) {
    assert_eq!(world.container().source_index(&source), Some(index));
}

#[then(expr = "the serialized mappings equal {string}")]
async fn then_serialized(world: &mut MappingWorld, expected: String) {
    let serialized = world.container().to_vlq_mappings();
    assert_eq!(serialized, expected);
}

#[then(expr = "the container has {int} generated lines")]
async fn then_generated_lines(world: &mut MappingWorld, count: u32) {
    assert_eq!(world.container().generated_lines(), count);
}

#[then(expr = "the container has {int} segments")]
async fn then_total_segments(world: &mut MappingWorld, count: usize) {
    assert_eq!(world.container().total_segments(), count);
}

#[then(expr = "the closest mapping is at generated column {int}")]
async fn then_closest_column(world: &mut MappingWorld, column: u32) {
    let closest = world
        .closest
        .expect("No closest-mapping lookup was performed")
        .expect("Lookup found no mapping");
    assert_eq!(closest.generated.column, column);
}

#[then("there is no closest mapping")]
async fn then_no_closest(world: &mut MappingWorld) {
    let closest = world
        .closest
        .expect("No closest-mapping lookup was performed");
    assert_eq!(closest, None);
}

#[then(expr = "the mapping operation fails with {string}")]
async fn then_mapping_error(world: &mut MappingWorld, message: String) {
    let error = world
        .last_error
        .as_ref()
        .expect("Expected the mapping operation to fail");
    assert!(
        error.contains(&message),
        "error {error:?} does not contain {message:?}"
    );
}

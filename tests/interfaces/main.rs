//! Interface tests for mapping backends using Cucumber.
//!
//! These tests verify that both backends conform to the same mapping
//! container contract. Select a backend via environment variable:
//!
//! ```bash
//! # node (default)
//! cargo test --test interfaces
//!
//! # wasm
//! SOURCEMAP_BACKEND=wasm cargo test --test interfaces
//! ```
//!
//! Every scenario is gated on the resolved backend's readiness barrier; a
//! misconfigured selector or a failed initialization fails each scenario at
//! setup, before any step runs.

mod steps;

use cucumber::World;
use futures::FutureExt;
use steps::mappings::MappingWorld;

use sourcemap::config::LOG_ENV_VAR;

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    println!("\n=== Running MappingContainer Interface Tests ===\n");
    MappingWorld::cucumber()
        .before(|_feature, _rule, _scenario, world| {
            async move {
                let backend = sourcemap::backend::barrier()
                    .await
                    .expect("Backend failed to initialize");
                world.backend = Some(backend);
            }
            .boxed_local()
        })
        .fail_on_skipped()
        .run("tests/interfaces/features/mappings.feature")
        .await;
}

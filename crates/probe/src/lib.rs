//! Strongbox Probe
//!
//! Scripted round trip against a document store and a blob store. A run
//! inserts a random record, replaces it, reads it back, deletes it, then
//! uploads a random PNG, finds it by name, downloads it, compares the pixels
//! and deletes it. Progress goes to a [`ReportSink`] and to `tracing`.
//!
//! # Architecture
//!
//! - [`probe`] - The state machine driving the sequence
//! - [`report`] - Sinks receiving the human-readable transcript
//! - [`image`] - Random RGBA images and their PNG codec
//! - [`config`] - Command line and environment configuration
//! - [`error`] - Step failures
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use strongbox_persistence::backends::memory::MemoryStore;
//! use strongbox_probe::{Probe, ProbeState, Transcript};
//!
//! # tokio_test::block_on(async {
//! let mut probe = Probe::new(MemoryStore::new(), StdRng::seed_from_u64(5));
//! let mut transcript = Transcript::new();
//!
//! probe.run("test", &mut transcript).await.unwrap();
//!
//! assert_eq!(probe.state(), ProbeState::Done);
//! assert_eq!(transcript.lines().last(), Some(&"Test finished"));
//! # });
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod image;
pub mod probe;
pub mod report;

pub use config::{BackendMode, ProbeConfig};
pub use error::{ImageError, ProbeError, ProbeFailure};
pub use image::RasterImage;
pub use probe::{Probe, ProbeState, ProbeSummary, StepOutcome};
pub use report::{ConsoleSink, ReportSink, Transcript};

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "strongbox={level},strongbox_probe={level},strongbox_persistence={level}",
            level = level
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

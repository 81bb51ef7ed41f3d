//! Strongbox
//!
//! Runs the round-trip probe once against a MongoDB collection and GridFS
//! bucket, printing the transcript to standard output. Exits non-zero when
//! any step fails.

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use strongbox_persistence::Store;
use strongbox_persistence::backends::memory::MemoryStore;
use strongbox_probe::{BackendMode, ConsoleSink, Probe, ProbeConfig, init_logging};
use tracing::{error, info};

/// Runs the probe against `store` and reports whether it reached `Done`.
async fn run_probe<S: Store>(store: S, config: &ProbeConfig) -> bool {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut probe = Probe::new(store, rng)
        .with_generator(config.record_generator())
        .with_image_size(config.image_size);
    let mut sink = ConsoleSink::stdout();

    match probe.run(&config.test_name, &mut sink).await {
        Ok(summary) => {
            info!(
                test_name = %summary.test_name,
                steps = summary.steps.len(),
                "Probe finished"
            );
            true
        }
        Err(failure) => {
            error!(
                failed_state = %failure.failed_state,
                completed = failure.completed.len(),
                error = %failure.error,
                "Probe failed"
            );
            false
        }
    }
}

/// Connects to MongoDB and runs the probe.
#[cfg(feature = "mongodb")]
async fn start_mongodb(config: &ProbeConfig) -> anyhow::Result<bool> {
    use strongbox_persistence::backends::mongodb::MongoStore;
    use strongbox_persistence::resolve::SystemResolver;

    let store_config = config.store_config();
    let store = MongoStore::connect(&store_config, &SystemResolver)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to MongoDB: {}", e))?;

    Ok(run_probe(store, config).await)
}

/// Fallback when mongodb feature is not enabled.
#[cfg(not(feature = "mongodb"))]
async fn start_mongodb(_config: &ProbeConfig) -> anyhow::Result<bool> {
    anyhow::bail!(
        "The mongodb backend requires the 'mongodb' feature. \
         Build with: cargo build -p strongbox --features mongodb"
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ProbeConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        backend = %config.backend,
        test_name = %config.test_name,
        seed = ?config.seed,
        "Starting Strongbox probe"
    );

    let passed = match config.backend {
        BackendMode::Mongodb => start_mongodb(&config).await?,
        BackendMode::Memory => run_probe(MemoryStore::new(), &config).await,
    };

    if !passed {
        std::process::exit(1);
    }

    Ok(())
}

//! shade-console server entry point.
//!
//! Starts the TCP console over the bundled in-memory registry.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use shade_console::config::ConsoleConfig;
use shade_console::console::Console;
use shade_console::domain::{MemoryRegistry, ShadeController};
use shade_console::server;

/// Percentage points moved per simulation step.
const MOTION_STEP: u8 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ConsoleConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, format = ?config.format, "starting shade-console");

    // Build domain layer
    let registry = Arc::new(match &config.shades_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MemoryRegistry::from_json(&json)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => MemoryRegistry::demo(),
    });
    tracing::info!(
        shades = registry.shades().len(),
        groups = registry.groups().len(),
        "registry loaded"
    );

    if config.simulate_motion {
        let registry = Arc::clone(&registry);
        let mut ticker = tokio::time::interval(config.simulation_step);
        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                let moved = registry.advance(MOTION_STEP);
                if moved > 0 {
                    tracing::trace!(moved, "simulated motion");
                }
            }
        });
    }

    // Build console core
    let controller: Arc<dyn ShadeController> = registry;
    let console = Console::new(controller, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;

    server::serve(listener, console, config.poll_interval, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    })
    .await;

    tracing::info!("shade-console stopped");
    Ok(())
}

//! reprox edge controller.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   list    ┌────────────────────────────────────────────┐
//!   │  container   │◀──────────│  scheduler (every 30s)                     │
//!   │   runtime    │           │   discover → diff → ensure certs → render  │
//!   └──────────────┘           │   → write apps.conf → nginx -s reload      │
//!                              └───────────────┬────────────────────────────┘
//!                                              │ nudge on change
//!   ┌──────────────┐  openssl   ┌──────────────▼─────────────┐
//!   │ /etc/lets-   │◀───────────│  renewal (daily)           │
//!   │ encrypt/live │◀───────────│   certbot → reload if new  │
//!   └──────────────┘  certbot   └────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use reprox::admin::{self, AdminState};
use reprox::lifecycle::{signals, startup, Shutdown};
use reprox::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "reprox")]
#[command(about = "Keeps nginx routes and TLS certificates in sync with running containers", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "REPROX_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = startup::load(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    if cli.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_path = %config.proxy.config_path.display(),
        live_dir = %config.certs.live_dir.display(),
        poll_interval_secs = config.schedule.poll_interval_secs,
        "reprox starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let controller = startup::build_controller(&config).await?;
    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState {
            store: controller.store(),
            certs: controller.certs(),
            status: controller.status(),
            api_key: Arc::from(config.admin.api_key.as_str()),
        };
        let admin_shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = admin::serve(listener, state, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API stopped");
            }
        });
    }

    controller.run(shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

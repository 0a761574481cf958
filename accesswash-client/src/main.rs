//! # AccessWash Portal CLI
//!
//! Drives the portal client from a terminal. Sessions are kept on disk under
//! `ACCESSWASH_SESSION_DIR`, one set of files per tenant, so a login
//! survives between invocations.
//!
//! ## Usage
//!
//! ```bash
//! accesswash --tenant acme login --username jane@example.com
//! accesswash --host acme.accesswash.org dashboard
//! accesswash --tenant acme requests create --issue-type no_water --title "No water" \
//!     --description "Dry since 6am" --location "12 Riverside Dr"
//! ```

mod cli;

use accesswash_client::api::ApiClients;
use accesswash_client::config::ClientConfig;
use accesswash_client::controller::AuthController;
use accesswash_client::navigation::LogNavigator;
use accesswash_shared::storage::FileStore;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accesswash=info,accesswash_client=info,accesswash_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let config = ClientConfig::from_env()?;

    tracing::debug!(
        "AccessWash CLI v{} ({:?})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    let tenant = cli.tenant(&config.resolver());
    let store = Arc::new(FileStore::new(config.session_dir.clone()));
    let clients = ApiClients::new(config, store, Arc::new(LogNavigator))?;
    let controller = AuthController::new(Arc::new(clients));

    cli.run(&controller, &tenant).await
}

//! Vote Ledger Main Entry Point
//!
//! Recomputes the base and time-decayed scores of every item in the configured
//! collections. Meant to be run periodically by the decay scheduler.

use dotenv::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vote_ledger::{AppError, Dependencies, rescore_collections};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vote_ledger=info,vote_ledger_engine=info"));

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| AppError::Tracing(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| AppError::Tracing(e.to_string()))?;
    }

    info!(
        service_name = "vote-ledger",
        service_version = env!("CARGO_PKG_VERSION"),
        json,
        "Tracing initialized"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();

    init_tracing()?;

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!(collections = ?deps.collections, "Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match rescore_collections(&deps.engine, &deps.collections).await {
        Ok(reports) => {
            let failed: usize = reports.iter().map(|(_, report)| report.failed.len()).sum();
            info!(collections = reports.len(), failed, "Rescoring completed");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Rescoring failed");
            Err(e)
        }
    }
}

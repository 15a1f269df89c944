//! Telemetry logic.
//! Support logging and metrics.

use metrics::Unit;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::Result;

const OPERATIONS_TOTAL: &str = "credstore_operations_total";

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns an error if a global subscriber is already set.
pub fn setup_logging() -> std::result::Result<(), tracing_subscriber::util::TryInitError> {
    metrics::describe_counter!(
        OPERATIONS_TOTAL,
        Unit::Count,
        "Store operations by name and outcome."
    );

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Count one store operation, labelled with its outcome.
pub(crate) fn track<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.label(),
    };

    metrics::counter!(OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
        .increment(1);

    result
}

//! Tracing subscriber setup for embedding applications.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. `RUST_LOG` wins when set;
/// otherwise the given level applies to this crate with sqlx kept at
/// warn. Safe to call once per process.
pub fn init(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("campus_approvals={},sqlx=warn", log_level).into()),
        )
        .init();
}

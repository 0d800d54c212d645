//! Setting up diagnostic output.
//!
//! The crate reports what it is doing through [tracing] events. Warnings
//! about dropped records, skipped directives, and unusable keys are issued
//! at the `WARN` level, the signature counts at the end of a run at the
//! `INFO` level, and details about every RRset at `DEBUG` and `TRACE`.
use tracing_subscriber::EnvFilter;

/// Setup logging of events reported by the signer and the test suite.
///
/// Use the RUST_LOG environment variable to override the defaults.
///
/// E.g. To enable debug level logging:
///   RUST_LOG=DEBUG
///
/// Or to log only what happens to individual RRsets:
///   RUST_LOG=domain_resign::sign::diff=TRACE
///
/// Or to enable trace level logging but not for the reorder buffer:
///   RUST_LOG=TRACE,domain_resign::sign::reorder=OFF
///
/// Calling this more than once is harmless.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_ids(true)
        .without_time()
        .try_init()
        .ok();
}

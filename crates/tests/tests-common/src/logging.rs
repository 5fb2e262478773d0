//! Log output for test binaries.

/// Print `tracing` events through `env_logger`, filtered by `RUST_LOG`.
/// Safe to call from every test; only the first call installs the logger.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

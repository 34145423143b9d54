//! Logging setup shared by every binary and test harness.

/// Subscriber configuration (format, filters).
pub mod logging;

pub use logging::{LogFormat, init_with};

/// Initialize process-wide logging from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    logging::init();
}

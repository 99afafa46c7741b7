//! Logging and run observability.

mod logging;

pub use logging::{build_filter, setup_logging, LogGuard};

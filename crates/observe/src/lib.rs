//! Initialization of the dashboard's logging.

pub mod panic_hook;
pub mod tracing;

pub mod arguments;
pub mod registry;
pub mod store;
pub mod transaction_log;

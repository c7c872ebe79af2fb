pub mod blockchain;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod observe;

pub use {blockchain::Blockchain, config::Config};

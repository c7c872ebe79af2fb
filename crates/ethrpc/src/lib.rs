pub mod chain;
pub mod errors;
pub mod watcher;
pub mod web3;

pub use {errors::Error, web3::Web3};

pub mod eth;
pub mod liquidity;
pub mod pools;
pub mod supply;
pub mod swap;
pub mod tokens;
pub mod transfer;

//! Data shared between the dashboard commands and its persistence layer.

pub mod pool;
pub mod token;
pub mod transaction;

use {
    alloy::{
        primitives::{Address, B256, keccak256},
        sol_types::SolValue,
    },
    std::cmp::Ordering,
};

/// An unordered pair of distinct tokens. The lower address is stored first,
/// matching the `token0`/`token1` ordering of Uniswap V2 pairs.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TokenPair(Address, Address);

impl TokenPair {
    /// Returns `None` when both tokens are the same.
    pub fn new(token_a: Address, token_b: Address) -> Option<Self> {
        match token_a.cmp(&token_b) {
            Ordering::Less => Some(Self(token_a, token_b)),
            Ordering::Equal => None,
            Ordering::Greater => Some(Self(token_b, token_a)),
        }
    }

    pub fn get(&self) -> (Address, Address) {
        (self.0, self.1)
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.0 == *token || self.1 == *token
    }

    pub fn other(&self, token: &Address) -> Option<Address> {
        if self.0 == *token {
            Some(self.1)
        } else if self.1 == *token {
            Some(self.0)
        } else {
            None
        }
    }

    /// `keccak256(abi.encode(token0, token1))`, used as a stable key for
    /// reports.
    pub fn key(&self) -> B256 {
        keccak256((self.0, self.1).abi_encode())
    }
}

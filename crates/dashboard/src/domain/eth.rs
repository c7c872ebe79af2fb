//! The on-chain operations the dashboard needs, as seams that the infra
//! layer implements against a node and tests implement with mocks.

pub use alloy::primitives::{Address, TxHash, U256};
use {async_trait::async_trait, std::time::Duration};

pub type Result<T> = std::result::Result<T, ethrpc::Error>;

/// Outcome of a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub tx_hash: TxHash,
    pub success: bool,
}

impl Confirmation {
    /// Turns a reverted transaction into [`ethrpc::Error::Failed`].
    pub fn ensure_success(self) -> Result<Self> {
        match self.success {
            true => Ok(self),
            false => Err(ethrpc::Error::Failed(self.tx_hash)),
        }
    }
}

/// Raw reserves of a pair in the pair's own token ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reserves {
    pub reserve0: U256,
    pub reserve1: U256,
    pub token0: Address,
}

impl Reserves {
    /// Reserves of `(token, other token)`.
    pub fn oriented(&self, token: Address) -> (U256, U256) {
        if self.token0 == token {
            (self.reserve0, self.reserve1)
        } else {
            (self.reserve1, self.reserve0)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddLiquidity {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: U256,
    pub amount_b: U256,
    pub amount_a_min: U256,
    pub amount_b_min: U256,
    pub to: Address,
    pub deadline: U256,
    pub gas_limit: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Swap {
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub path: Vec<Address>,
    pub to: Address,
    pub deadline: U256,
    pub gas_limit: Option<u64>,
}

/// Unix timestamp `after` from now, as expected by router deadlines.
pub fn deadline(after: Duration) -> U256 {
    let now = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
    U256::from(now + after.as_secs())
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Wallet: Send + Sync {
    /// The signing account, if any.
    fn account(&self) -> Option<Address>;
    async fn chain_id(&self) -> Result<u64>;
    async fn native_balance(&self, account: Address) -> Result<U256>;
}

/// ERC-20 calls, including the `owner`, `mint` and `burn` extensions of the
/// test tokens. Sending calls wait for the transaction to be mined.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenOps: Send + Sync {
    async fn name(&self, token: Address) -> Result<String>;
    async fn symbol(&self, token: Address) -> Result<String>;
    async fn decimals(&self, token: Address) -> Result<u8>;
    async fn total_supply(&self, token: Address) -> Result<U256>;
    async fn owner(&self, token: Address) -> Result<Address>;
    async fn balance_of(&self, token: Address, account: Address) -> Result<U256>;
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<Confirmation>;
    async fn transfer(&self, token: Address, to: Address, amount: U256) -> Result<Confirmation>;
    async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<Confirmation>;
    async fn burn(&self, token: Address, amount: U256) -> Result<Confirmation>;
}

/// Uniswap V2 factory, pair and router calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AmmOps: Send + Sync {
    /// The router address, if one is configured.
    fn router(&self) -> Option<Address>;
    /// `None` when the factory has no pair for the tokens.
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Option<Address>>;
    /// Creates the pair and returns the address from the `PairCreated` event
    /// when the receipt contains one.
    async fn create_pair(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<(Confirmation, Option<Address>)>;
    async fn reserves(&self, pair: Address) -> Result<Reserves>;
    async fn amounts_out(&self, amount_in: U256, path: Vec<Address>) -> Result<Vec<U256>>;
    async fn amounts_in(&self, amount_out: U256, path: Vec<Address>) -> Result<Vec<U256>>;
    async fn add_liquidity(&self, params: AddLiquidity) -> Result<Confirmation>;
    async fn swap_exact_tokens_for_tokens(&self, params: Swap) -> Result<Confirmation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orients_reserves() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let reserves = Reserves {
            reserve0: U256::from(10),
            reserve1: U256::from(20),
            token0: b,
        };
        assert_eq!(reserves.oriented(a), (U256::from(20), U256::from(10)));
        assert_eq!(reserves.oriented(b), (U256::from(10), U256::from(20)));
    }

    #[test]
    fn failed_confirmation_is_an_error() {
        let failed = Confirmation {
            tx_hash: TxHash::repeat_byte(1),
            success: false,
        };
        assert_eq!(
            failed.ensure_success(),
            Err(ethrpc::Error::Failed(TxHash::repeat_byte(1)))
        );
    }

    #[test]
    fn deadline_is_in_the_future() {
        let now = U256::from(chrono::Utc::now().timestamp());
        let deadline = deadline(Duration::from_secs(1200));
        assert!(deadline >= now + U256::from(1200));
        assert!(deadline <= now + U256::from(1205));
    }
}

//! Bulk pool maintenance over every pair of registered tokens: initial
//! setup, balance top-ups and verification, plus single manual deposits.

pub mod ensure;
mod manual;
pub mod setup;
pub mod verify;

pub use manual::{AddLiquidityError, Deposit, add_liquidity};
use {
    crate::domain::eth::{self, Address, AmmOps, TokenOps, U256},
    itertools::Itertools,
    model::token::DeployedToken,
    number::units::format_units,
    std::collections::BTreeMap,
};

/// Signer account and router that pool operations act with.
#[derive(Clone, Copy)]
pub struct Operator<'a> {
    pub tokens: &'a dyn TokenOps,
    pub amm: &'a dyn AmmOps,
    pub account: Address,
    pub router: Address,
}

#[derive(Debug, thiserror::Error)]
#[error("at least two tokens are needed to form a pool, found {0}")]
pub struct NotEnoughTokens(pub usize);

/// Every unordered pair `(tokens[i], tokens[j])` with `i < j`.
pub fn pairs(
    tokens: &[DeployedToken],
) -> impl Iterator<Item = (&DeployedToken, &DeployedToken)> {
    tokens.iter().tuple_combinations()
}

fn pair_name(a: &DeployedToken, b: &DeployedToken) -> String {
    format!("{}-{}", a.label(), b.label())
}

/// Reserves keyed by token symbol, each formatted with its own decimals.
pub type ReserveMap = BTreeMap<String, String>;

async fn reserves(
    tokens: &dyn TokenOps,
    amm: &dyn AmmOps,
    pair: Address,
    a: &DeployedToken,
    b: &DeployedToken,
) -> eth::Result<ReserveMap> {
    let reserves = amm.reserves(pair).await?;
    let (reserve_a, reserve_b) = reserves.oriented(a.address);
    let (decimals_a, decimals_b) =
        futures::try_join!(tokens.decimals(a.address), tokens.decimals(b.address))?;
    Ok(BTreeMap::from([
        (a.label(), format_units(reserve_a, decimals_a)),
        (b.label(), format_units(reserve_b, decimals_b)),
    ]))
}

impl Operator<'_> {
    /// Approves `approval` when the router's allowance is below `amount`.
    async fn approve_if_needed(&self, token: Address, amount: U256, approval: U256) -> eth::Result<()> {
        let allowance = self
            .tokens
            .allowance(token, self.account, self.router)
            .await?;
        if allowance >= amount {
            tracing::debug!(%token, "router already approved");
            return Ok(());
        }
        tracing::info!(%token, %approval, "approving router");
        self.tokens
            .approve(token, self.router, approval)
            .await?
            .ensure_success()?;
        Ok(())
    }

    /// The pair address, creating the pair first if the factory has none.
    /// Prefers the address from the `PairCreated` event and falls back to
    /// asking the factory again.
    async fn get_or_create_pair(&self, a: Address, b: Address) -> eth::Result<Option<Address>> {
        if let Some(pair) = self.amm.get_pair(a, b).await? {
            tracing::debug!(%pair, "pool exists");
            return Ok(Some(pair));
        }
        tracing::info!(token_a = %a, token_b = %b, "creating pool");
        let (confirmation, created) = self.amm.create_pair(a, b).await?;
        confirmation.ensure_success()?;
        let pair = match created {
            Some(pair) => Some(pair),
            None => self.amm.get_pair(a, b).await?,
        };
        if let Some(pair) = pair {
            tracing::info!(%pair, "pool created");
        }
        Ok(pair)
    }
}

use {
    alloy::primitives::Address,
    chrono::{DateTime, Utc},
    serde::Serialize,
};

/// Reserve state of the AMM pair for two registered tokens, derived on every
/// monitor tick.
///
/// `reserve0` always belongs to token A and `reserve1` to token B regardless
/// of the pair's internal token ordering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    pub token_a: String,
    pub token_b: String,
    pub token_a_address: Address,
    pub token_b_address: Address,
    pub pair_address: Option<Address>,
    pub reserve0: String,
    pub reserve1: String,
    pub below_minimum: bool,
    pub needs_liquidity: bool,
}

impl PoolSnapshot {
    /// Snapshot for a pair that the factory has not created yet.
    pub fn missing(
        token_a: impl Into<String>,
        token_a_address: Address,
        token_b: impl Into<String>,
        token_b_address: Address,
    ) -> Self {
        Self {
            token_a: token_a.into(),
            token_b: token_b.into(),
            token_a_address,
            token_b_address,
            pair_address: None,
            reserve0: "0".to_owned(),
            reserve1: "0".to_owned(),
            below_minimum: true,
            needs_liquidity: true,
        }
    }

    pub fn name(&self) -> String {
        format!("{}/{}", self.token_a, self.token_b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LastActionKind {
    Info,
    Success,
    Error,
}

/// The most recent notable thing the liquidity monitor did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LastAction {
    #[serde(rename = "type")]
    pub kind: LastActionKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LastAction {
    pub fn new(kind: LastActionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Summary of a monitor run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityStatus {
    pub pools: Vec<PoolSnapshot>,
    pub last_update: Option<DateTime<Utc>>,
    pub last_action: Option<LastAction>,
    pub total_pools: usize,
    pub low_pools: usize,
    pub healthy_pools: usize,
    pub auto_managing: bool,
    pub min_liquidity: String,
}

impl LiquidityStatus {
    pub fn new(
        pools: Vec<PoolSnapshot>,
        last_update: Option<DateTime<Utc>>,
        last_action: Option<LastAction>,
        auto_managing: bool,
        min_liquidity: impl Into<String>,
    ) -> Self {
        let low_pools = pools.iter().filter(|pool| pool.below_minimum).count();
        Self {
            total_pools: pools.len(),
            healthy_pools: pools.len() - low_pools,
            low_pools,
            pools,
            last_update,
            last_action,
            auto_managing,
            min_liquidity: min_liquidity.into(),
        }
    }
}

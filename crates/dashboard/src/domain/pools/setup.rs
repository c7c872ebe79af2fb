//! First-time setup of a pool for every token pair, followed by a test swap
//! in both directions.

use {
    super::{NotEnoughTokens, Operator, ReserveMap, pair_name, pairs, reserves},
    crate::domain::eth::{self, AddLiquidity, Address, Swap, U256},
    alloy::primitives::B256,
    model::{TokenPair, token::DeployedToken},
    number::units::parse_units,
    serde::Serialize,
    std::time::Duration,
    tracing::Instrument,
};

pub const REPORT_FILE: &str = "liquidity_report.json";
const AMOUNT: &str = "10000";
const TEST_SWAP_AMOUNT: &str = "1";
const DEADLINE: Duration = Duration::from_secs(10 * 60);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub pair: String,
    pub pool_address: Address,
    pub pair_key: B256,
    pub reserves: ReserveMap,
    pub swap_test: SwapTest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SwapTest {
    #[serde(rename = "AtoB")]
    pub a_to_b: bool,
    #[serde(rename = "BtoA")]
    pub b_to_a: bool,
}

/// Sets up every pair. Pairs that fail are logged and left out of the
/// report.
pub async fn setup(
    operator: Operator<'_>,
    tokens: &[DeployedToken],
) -> Result<Vec<Entry>, NotEnoughTokens> {
    if tokens.len() < 2 {
        return Err(NotEnoughTokens(tokens.len()));
    }
    let mut report = Vec::new();
    for (a, b) in pairs(tokens) {
        let pair = pair_name(a, b);
        match setup_pair(operator, a, b)
            .instrument(tracing::info_span!("setup_pool", %pair))
            .await
        {
            Ok(Some(entry)) => report.push(entry),
            Ok(None) => tracing::warn!(%pair, "pool address unavailable after creation"),
            Err(err) => tracing::error!(%pair, ?err, "pool setup failed"),
        }
    }
    Ok(report)
}

async fn setup_pair(
    operator: Operator<'_>,
    a: &DeployedToken,
    b: &DeployedToken,
) -> eth::Result<Option<Entry>> {
    let (decimals_a, decimals_b) = futures::try_join!(
        operator.tokens.decimals(a.address),
        operator.tokens.decimals(b.address)
    )?;
    let amount_a = units(AMOUNT, decimals_a)?;
    let amount_b = units(AMOUNT, decimals_b)?;
    operator
        .approve_if_needed(a.address, amount_a, amount_a)
        .await?;
    operator
        .approve_if_needed(b.address, amount_b, amount_b)
        .await?;

    let Some(pool) = operator.get_or_create_pair(a.address, b.address).await? else {
        return Ok(None);
    };

    let deadline = eth::deadline(DEADLINE);
    let confirmation = operator
        .amm
        .add_liquidity(AddLiquidity {
            token_a: a.address,
            token_b: b.address,
            amount_a,
            amount_b,
            amount_a_min: Default::default(),
            amount_b_min: Default::default(),
            to: operator.account,
            deadline,
            gas_limit: None,
        })
        .await?
        .ensure_success()?;
    tracing::info!(tx_hash = %confirmation.tx_hash, "liquidity added");

    let reserves = reserves(operator.tokens, operator.amm, pool, a, b).await?;
    tracing::info!(?reserves, "pool reserves");

    let swap_test = SwapTest {
        a_to_b: test_swap(
            operator,
            [a.address, b.address],
            units(TEST_SWAP_AMOUNT, decimals_a)?,
            deadline,
        )
        .await,
        b_to_a: test_swap(
            operator,
            [b.address, a.address],
            units(TEST_SWAP_AMOUNT, decimals_b)?,
            deadline,
        )
        .await,
    };

    Ok(Some(Entry {
        pair: pair_name(a, b),
        pool_address: pool,
        pair_key: pair_key(a.address, b.address),
        reserves,
        swap_test,
    }))
}

fn units(amount: &str, decimals: u8) -> eth::Result<U256> {
    parse_units(amount, decimals).map_err(|err| ethrpc::Error::Rpc(err.to_string()))
}

fn pair_key(a: Address, b: Address) -> B256 {
    TokenPair::new(a, b).map(|pair| pair.key()).unwrap_or_default()
}

async fn test_swap(
    operator: Operator<'_>,
    [from, to]: [Address; 2],
    amount_in: U256,
    deadline: U256,
) -> bool {
    let result = operator
        .amm
        .swap_exact_tokens_for_tokens(Swap {
            amount_in,
            amount_out_min: Default::default(),
            path: vec![from, to],
            to: operator.account,
            deadline,
            gas_limit: None,
        })
        .await
        .and_then(|confirmation| confirmation.ensure_success());
    match result {
        Ok(confirmation) => {
            tracing::info!(%from, %to, tx_hash = %confirmation.tx_hash, "test swap succeeded");
            true
        }
        Err(err) => {
            tracing::warn!(%from, %to, ?err, "test swap failed");
            false
        }
    }
}

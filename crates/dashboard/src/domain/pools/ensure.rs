//! Tops up the signer's balance of every registered token and deposits a
//! fixed amount into every pair.

use {
    super::{Operator, ReserveMap, pair_name, pairs, reserves},
    crate::domain::eth::{self, AddLiquidity, Address, TxHash, U256},
    model::token::DeployedToken,
    number::units::{format_units, parse_units},
    serde::Serialize,
    std::time::Duration,
    tracing::Instrument,
};

pub const REPORT_FILE: &str = "liquidity_setup_report.json";
const REQUIRED_BALANCE: &str = "10000";
const AMOUNT_PER_PAIR: &str = "1000";
const DEADLINE: Duration = Duration::from_secs(20 * 60);

/// Outcome for one pair. Failed pairs only carry the error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub pair: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity_tx: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserves: Option<ReserveMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Entry {
    fn failed(pair: String, err: impl ToString) -> Self {
        Self {
            pair,
            pair_address: None,
            liquidity_tx: None,
            reserves: None,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Report {
    /// Symbols of tokens whose balance could not be topped up.
    pub unfunded: Vec<String>,
    pub entries: Vec<Entry>,
}

impl Report {
    pub fn successful(&self) -> usize {
        self.entries.iter().filter(|entry| entry.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.successful()
    }
}

pub async fn ensure(operator: Operator<'_>, tokens: &[DeployedToken]) -> Report {
    let mut report = Report::default();
    for token in tokens {
        if let Err(err) = ensure_balance(operator, token).await {
            tracing::error!(
                token = %token.label(),
                ?err,
                "failed to top up balance; the token may lack a mint function or belong to someone else"
            );
            report.unfunded.push(token.label());
        }
    }

    for (a, b) in pairs(tokens) {
        let pair = pair_name(a, b);
        let entry = match deposit(operator, a, b)
            .instrument(tracing::info_span!("deposit", %pair))
            .await
        {
            Ok(entry) => entry,
            Err(err) => {
                tracing::error!(%pair, ?err, "failed to add liquidity");
                Entry::failed(pair, err)
            }
        };
        report.entries.push(entry);
    }
    report
}

/// Mints the difference when the balance is below the required amount.
async fn ensure_balance(operator: Operator<'_>, token: &DeployedToken) -> eth::Result<()> {
    let decimals = operator.tokens.decimals(token.address).await?;
    let balance = operator
        .tokens
        .balance_of(token.address, operator.account)
        .await?;
    let required = units(REQUIRED_BALANCE, decimals)?;
    tracing::info!(
        token = %token.label(),
        balance = %format_units(balance, decimals),
        required = REQUIRED_BALANCE,
        "balance check"
    );
    if balance >= required {
        return Ok(());
    }
    let missing = required - balance;
    let confirmation = operator
        .tokens
        .mint(token.address, operator.account, missing)
        .await?
        .ensure_success()?;
    tracing::info!(
        token = %token.label(),
        minted = %format_units(missing, decimals),
        tx_hash = %confirmation.tx_hash,
        "minted"
    );
    Ok(())
}

async fn deposit(
    operator: Operator<'_>,
    a: &DeployedToken,
    b: &DeployedToken,
) -> eth::Result<Entry> {
    let (decimals_a, decimals_b) = futures::try_join!(
        operator.tokens.decimals(a.address),
        operator.tokens.decimals(b.address)
    )?;
    let amount_a = units(AMOUNT_PER_PAIR, decimals_a)?;
    let amount_b = units(AMOUNT_PER_PAIR, decimals_b)?;
    operator
        .approve_if_needed(a.address, amount_a, U256::MAX)
        .await?;
    operator
        .approve_if_needed(b.address, amount_b, U256::MAX)
        .await?;

    let pair_address = operator.get_or_create_pair(a.address, b.address).await?;

    let confirmation = operator
        .amm
        .add_liquidity(AddLiquidity {
            token_a: a.address,
            token_b: b.address,
            amount_a,
            amount_b,
            amount_a_min: U256::ZERO,
            amount_b_min: U256::ZERO,
            to: operator.account,
            deadline: eth::deadline(DEADLINE),
            gas_limit: None,
        })
        .await?
        .ensure_success()?;
    tracing::info!(tx_hash = %confirmation.tx_hash, "liquidity added");

    let reserves = match pair_address {
        Some(pair) => Some(reserves(operator.tokens, operator.amm, pair, a, b).await?),
        None => None,
    };
    Ok(Entry {
        pair: pair_name(a, b),
        pair_address,
        liquidity_tx: Some(confirmation.tx_hash),
        reserves,
        error: None,
    })
}

fn units(amount: &str, decimals: u8) -> eth::Result<U256> {
    parse_units(amount, decimals).map_err(|err| ethrpc::Error::Rpc(err.to_string()))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            eth::{MockAmmOps, MockTokenOps, Reserves},
            pools::tests::{A, ACCOUNT, B, C, ROUTER, ok, token, units as whole},
        },
        mockall::predicate::{always, eq},
        serde_json::json,
    };

    #[tokio::test]
    async fn mints_difference_and_deposits_into_every_pair() {
        let pool = Address::repeat_byte(9);
        let mut tokens = MockTokenOps::new();
        tokens.expect_decimals().returning(|_| Ok(18));
        tokens
            .expect_balance_of()
            .with(eq(A), eq(ACCOUNT))
            .returning(|_, _| Ok(whole(2_500)));
        tokens
            .expect_balance_of()
            .with(eq(B), eq(ACCOUNT))
            .returning(|_, _| Ok(whole(50_000)));
        tokens
            .expect_mint()
            .with(eq(A), eq(ACCOUNT), eq(whole(7_500)))
            .times(1)
            .returning(|_, _, _| ok());
        tokens
            .expect_allowance()
            .with(eq(A), always(), always())
            .returning(|_, _, _| Ok(U256::ZERO));
        tokens
            .expect_allowance()
            .with(eq(B), always(), always())
            .returning(|_, _, _| Ok(U256::MAX));
        tokens
            .expect_approve()
            .with(eq(A), eq(ROUTER), eq(U256::MAX))
            .times(1)
            .returning(|_, _, _| ok());

        let mut amm = MockAmmOps::new();
        amm.expect_get_pair().returning(move |_, _| Ok(Some(pool)));
        amm.expect_add_liquidity()
            .withf(|params| params.amount_a == whole(1_000) && params.amount_b == whole(1_000))
            .times(1)
            .returning(|_| ok());
        amm.expect_reserves().returning(|_| {
            Ok(Reserves {
                reserve0: whole(1_000),
                reserve1: whole(3_000),
                token0: A,
            })
        });

        let operator = Operator {
            tokens: &tokens,
            amm: &amm,
            account: ACCOUNT,
            router: ROUTER,
        };
        let report = ensure(operator, &[token(A, "A"), token(B, "B")]).await;
        assert!(report.unfunded.is_empty());
        assert_eq!((report.successful(), report.failed()), (1, 0));
        let value = serde_json::to_value(&report.entries[0]).unwrap();
        assert_eq!(value["pair"], "A-B");
        assert_eq!(value["reserves"], json!({"A": "1000.0", "B": "3000.0"}));
        assert!(value.get("error").is_none());
    }

    #[tokio::test]
    async fn mint_failures_are_reported_and_not_fatal() {
        let mut tokens = MockTokenOps::new();
        tokens.expect_decimals().returning(|_| Ok(18));
        tokens
            .expect_balance_of()
            .returning(|_, _| Ok(U256::ZERO));
        tokens
            .expect_mint()
            .returning(|_, _, _| Err(ethrpc::Error::NotOwner));
        tokens
            .expect_allowance()
            .returning(|_, _, _| Ok(U256::MAX));

        let mut amm = MockAmmOps::new();
        amm.expect_get_pair()
            .returning(|_, _| Ok(Some(Address::repeat_byte(9))));
        amm.expect_add_liquidity()
            .returning(|_| Err(ethrpc::Error::Reverted("TransferHelper: TRANSFER_FROM_FAILED".into())));

        let operator = Operator {
            tokens: &tokens,
            amm: &amm,
            account: ACCOUNT,
            router: ROUTER,
        };
        let report = ensure(operator, &[token(A, "A"), token(B, "B"), token(C, "C")]).await;
        assert_eq!(report.unfunded, ["A", "B", "C"]);
        assert_eq!(report.entries.len(), 3);
        assert_eq!((report.successful(), report.failed()), (0, 3));
        let value = serde_json::to_value(&report.entries[0]).unwrap();
        assert_eq!(value, json!({
            "pair": "A-B",
            "error": "execution reverted: TransferHelper: TRANSFER_FROM_FAILED",
        }));
    }
}

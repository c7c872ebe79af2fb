use {
    super::Operator,
    crate::domain::eth::{self, AddLiquidity, Address, Confirmation, U256},
    model::transaction::{Party, TransactionRecord},
    number::units::parse_units,
    shared::transaction_log::TransactionLog,
    std::time::Duration,
};

const DEADLINE: Duration = Duration::from_secs(20 * 60);

#[derive(Debug, thiserror::Error)]
pub enum AddLiquidityError {
    #[error("token A and token B must differ")]
    SameToken,
    #[error("{0:?} is not a valid amount")]
    InvalidAmount(String),
    #[error(transparent)]
    Chain(#[from] ethrpc::Error),
}

/// A manual deposit of both tokens into their pool.
#[derive(Clone, Debug)]
pub struct Deposit {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: String,
    pub amount_b: String,
}

/// Approves both amounts and adds them to the pool without minimum amounts.
pub async fn add_liquidity(
    operator: Operator<'_>,
    log: &TransactionLog,
    deposit: &Deposit,
) -> Result<Confirmation, AddLiquidityError> {
    if deposit.token_a == deposit.token_b {
        return Err(AddLiquidityError::SameToken);
    }
    let (decimals_a, decimals_b) = futures::try_join!(
        operator.tokens.decimals(deposit.token_a),
        operator.tokens.decimals(deposit.token_b)
    )?;
    let amount_a = amount(&deposit.amount_a, decimals_a)?;
    let amount_b = amount(&deposit.amount_b, decimals_b)?;

    for (token, amount) in [(deposit.token_a, amount_a), (deposit.token_b, amount_b)] {
        tracing::info!(%token, %amount, "approving router");
        operator
            .tokens
            .approve(token, operator.router, amount)
            .await?
            .ensure_success()?;
    }
    let confirmation = operator
        .amm
        .add_liquidity(AddLiquidity {
            token_a: deposit.token_a,
            token_b: deposit.token_b,
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

    let (symbol_a, symbol_b) = futures::join!(
        operator.tokens.symbol(deposit.token_a),
        operator.tokens.symbol(deposit.token_b)
    );
    let record = TransactionRecord::confirmed(
        format!(
            "{}/{}",
            symbol_a.unwrap_or_else(|_| deposit.token_a.to_string()),
            symbol_b.unwrap_or_else(|_| deposit.token_b.to_string())
        ),
        deposit.token_a,
        Party::Account(operator.account),
        Party::Account(operator.router),
        format!("{}/{}", deposit.amount_a, deposit.amount_b),
        confirmation.tx_hash,
    );
    if let Err(err) = log.record(record) {
        tracing::warn!(?err, "failed to log liquidity deposit");
    }
    Ok(confirmation)
}

fn amount(input: &str, decimals: u8) -> Result<U256, AddLiquidityError> {
    match parse_units(input, decimals) {
        Ok(amount) if !amount.is_zero() => Ok(amount),
        _ => Err(AddLiquidityError::InvalidAmount(input.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            eth::{MockAmmOps, MockTokenOps},
            pools::tests::{A, ACCOUNT, B, ROUTER, ok, units},
        },
        mockall::{Sequence, predicate::eq},
        shared::store::MemoryStore,
        std::sync::Arc,
    };

    fn deposit(amount_a: &str, amount_b: &str) -> Deposit {
        Deposit {
            token_a: A,
            token_b: B,
            amount_a: amount_a.to_owned(),
            amount_b: amount_b.to_owned(),
        }
    }

    #[tokio::test]
    async fn approves_both_then_deposits() {
        let mut seq = Sequence::new();
        let mut tokens = MockTokenOps::new();
        tokens.expect_decimals().returning(|_| Ok(18));
        tokens
            .expect_symbol()
            .returning(|token| Ok(if token == A { "AAA" } else { "BBB" }.to_owned()));
        tokens
            .expect_approve()
            .with(eq(A), eq(ROUTER), eq(units(100)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| ok());
        tokens
            .expect_approve()
            .with(eq(B), eq(ROUTER), eq(units(250)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| ok());
        let mut amm = MockAmmOps::new();
        amm.expect_add_liquidity()
            .withf(|params| {
                params.amount_a == units(100)
                    && params.amount_b == units(250)
                    && params.amount_a_min.is_zero()
                    && params.amount_b_min.is_zero()
                    && params.to == ACCOUNT
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| ok());

        let log = TransactionLog::new(Arc::new(MemoryStore::default()));
        let operator = Operator {
            tokens: &tokens,
            amm: &amm,
            account: ACCOUNT,
            router: ROUTER,
        };
        add_liquidity(operator, &log, &deposit("100", "250"))
            .await
            .unwrap();
        let logged = log.list().unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].token, "AAA/BBB");
        assert_eq!(logged[0].amount, "100/250");
    }

    #[tokio::test]
    async fn rejects_missing_amounts() {
        let mut tokens = MockTokenOps::new();
        tokens.expect_decimals().returning(|_| Ok(18));
        let amm = MockAmmOps::new();
        let log = TransactionLog::new(Arc::new(MemoryStore::default()));
        let operator = Operator {
            tokens: &tokens,
            amm: &amm,
            account: ACCOUNT,
            router: ROUTER,
        };
        for (a, b) in [("", "1"), ("1", "0"), ("x", "1")] {
            assert!(matches!(
                add_liquidity(operator, &log, &deposit(a, b)).await,
                Err(AddLiquidityError::InvalidAmount(_))
            ));
        }
        let same = Deposit {
            token_b: A,
            ..deposit("1", "1")
        };
        assert!(matches!(
            add_liquidity(operator, &log, &same).await,
            Err(AddLiquidityError::SameToken)
        ));
    }
}

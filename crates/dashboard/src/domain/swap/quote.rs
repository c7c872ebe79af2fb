use {
    super::{Field, Form, typed_amount},
    crate::domain::eth::AmmOps,
    number::units::format_units,
};

/// What a quote does to the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Quote {
    /// Set the field the user did not edit (an empty amount clears it).
    Counterpart(Field, String),
    /// The pool cannot serve the trade.
    ClearBoth,
    /// The quote failed for another reason; keep what is shown.
    Unchanged,
}

/// Prices the last edited amount: token A input through `getAmountsOut`,
/// token B output through `getAmountsIn`.
pub async fn quote(amm: &dyn AmmOps, form: &Form) -> Quote {
    let (Some(token_a), Some(token_b)) = (&form.token_a, &form.token_b) else {
        return Quote::Unchanged;
    };
    let path = vec![token_a.address, token_b.address];
    let result = match form.last_field {
        Field::A => {
            let amount = match typed_amount(&form.amount_a, token_a.decimals) {
                Ok(Some(amount)) => amount,
                Ok(None) => return Quote::Counterpart(Field::B, String::new()),
                Err(err) => {
                    tracing::debug!(?err, "amount cannot be quoted");
                    return Quote::Unchanged;
                }
            };
            amm.amounts_out(amount, path).await.map(|amounts| {
                let out = amounts.get(1).copied().unwrap_or_default();
                Quote::Counterpart(Field::B, format_units(out, token_b.decimals))
            })
        }
        Field::B => {
            let amount = match typed_amount(&form.amount_b, token_b.decimals) {
                Ok(Some(amount)) => amount,
                Ok(None) => return Quote::Counterpart(Field::A, String::new()),
                Err(err) => {
                    tracing::debug!(?err, "amount cannot be quoted");
                    return Quote::Unchanged;
                }
            };
            amm.amounts_in(amount, path).await.map(|amounts| {
                let input = amounts.first().copied().unwrap_or_default();
                Quote::Counterpart(Field::A, format_units(input, token_a.decimals))
            })
        }
    };
    match result {
        Ok(quote) => quote,
        Err(ethrpc::Error::InsufficientLiquidity) => {
            tracing::debug!("pool has insufficient liquidity for quote");
            Quote::ClearBoth
        }
        Err(err) => {
            tracing::warn!(?err, "quote failed");
            Quote::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::{
            eth::{Address, MockAmmOps, U256},
            swap::Token,
        },
        mockall::predicate::eq,
    };

    const A: Address = Address::new([1; 20]);
    const B: Address = Address::new([2; 20]);

    fn form() -> Form {
        let mut form = Form::default();
        form.select_token_a(Token {
            address: A,
            symbol: "A".into(),
            decimals: 18,
        });
        form.select_token_b(Token {
            address: B,
            symbol: "B".into(),
            decimals: 6,
        });
        form
    }

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10).pow(U256::from(18))
    }

    #[tokio::test]
    async fn empty_or_zero_input_clears_counterpart() {
        // No expectations: the router must not be called.
        let amm = MockAmmOps::new();
        let mut form = form();
        for input in ["", "0", "0.000", "."] {
            form.set_amount_a(input, None);
            assert_eq!(
                quote(&amm, &form).await,
                Quote::Counterpart(Field::B, String::new())
            );
            form.set_amount_b(input);
            assert_eq!(
                quote(&amm, &form).await,
                Quote::Counterpart(Field::A, String::new())
            );
        }
    }

    #[tokio::test]
    async fn unparsable_amount_keeps_counterpart() {
        let amm = MockAmmOps::new();
        let mut form = form();
        // Token B has 6 decimals.
        form.set_amount_b("1.1234567");
        assert_eq!(quote(&amm, &form).await, Quote::Unchanged);
        form.set_amount_a(&format!("1{}", "0".repeat(80)), None);
        assert_eq!(quote(&amm, &form).await, Quote::Unchanged);
    }

    #[tokio::test]
    async fn quotes_forward_and_reverse() {
        let mut amm = MockAmmOps::new();
        amm.expect_amounts_out()
            .with(eq(ether(2)), eq(vec![A, B]))
            .returning(|amount, _| Ok(vec![amount, U256::from(3_990_000)]));
        amm.expect_amounts_in()
            .with(eq(U256::from(1_500_000)), eq(vec![A, B]))
            .returning(|amount, _| Ok(vec![ether(1) / U256::from(4) * U256::from(3), amount]));

        let mut form = form();
        form.set_amount_a("2", None);
        assert_eq!(
            quote(&amm, &form).await,
            Quote::Counterpart(Field::B, "3.99".into())
        );

        form.set_amount_b("1.5");
        assert_eq!(
            quote(&amm, &form).await,
            Quote::Counterpart(Field::A, "0.75".into())
        );
    }

    #[tokio::test]
    async fn insufficient_liquidity_clears_both() {
        let mut amm = MockAmmOps::new();
        amm.expect_amounts_out()
            .returning(|_, _| Err(ethrpc::Error::InsufficientLiquidity));
        amm.expect_amounts_in()
            .returning(|_, _| Err(ethrpc::Error::Rpc("timeout".into())));

        let mut form = form();
        form.set_amount_a("1", None);
        assert_eq!(quote(&amm, &form).await, Quote::ClearBoth);
        form.set_amount_b("1");
        assert_eq!(quote(&amm, &form).await, Quote::Unchanged);
    }
}

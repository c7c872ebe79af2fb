//! Discovery of registered tokens and the per-account balance view.

use {
    crate::domain::eth::{self, Address, TokenOps, U256, Wallet},
    futures::future,
    model::token::{DeployedToken, TokenInfo},
};

/// Reads the live metadata of a registered token. The registry's `admin`
/// stands in for the owner of tokens without an `owner()` function.
pub async fn info(tokens: &dyn TokenOps, entry: &DeployedToken) -> eth::Result<TokenInfo> {
    let address = entry.address;
    let (name, symbol, decimals, total_supply) = future::try_join4(
        tokens.name(address),
        tokens.symbol(address),
        tokens.decimals(address),
        tokens.total_supply(address),
    )
    .await?;
    let owner = match tokens.owner(address).await {
        Ok(owner) => Some(owner),
        Err(err) => {
            tracing::debug!(%address, ?err, "owner() unavailable, using registry admin");
            entry.admin
        }
    };
    Ok(TokenInfo {
        address,
        name,
        symbol,
        decimals,
        total_supply,
        owner,
    })
}

/// Metadata for every registry entry whose metadata calls succeed.
pub async fn discover(tokens: &dyn TokenOps, entries: &[DeployedToken]) -> Vec<TokenInfo> {
    let mut found = Vec::with_capacity(entries.len());
    for entry in entries {
        match info(tokens, entry).await {
            Ok(info) => found.push(info),
            Err(err) => tracing::warn!(address = %entry.address, ?err, "skipping token"),
        }
    }
    found
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Holding {
    pub token: TokenInfo,
    pub balance: U256,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountView {
    pub account: Address,
    pub native_balance: Option<U256>,
    pub holdings: Vec<Holding>,
}

/// The tokens owned by `account` together with its balances.
pub async fn account_view(
    wallet: &dyn Wallet,
    tokens: &dyn TokenOps,
    entries: &[DeployedToken],
    account: Address,
) -> AccountView {
    let native_balance = wallet
        .native_balance(account)
        .await
        .inspect_err(|err| tracing::warn!(%account, ?err, "failed to read native balance"))
        .ok();

    let mut holdings = Vec::new();
    for token in discover(tokens, entries).await {
        if !token.is_owned_by(&account) {
            continue;
        }
        let balance = match tokens.balance_of(token.address, account).await {
            Ok(balance) => balance,
            Err(err) => {
                tracing::warn!(token = %token.address, ?err, "failed to read balance");
                U256::ZERO
            }
        };
        holdings.push(Holding { token, balance });
    }

    AccountView {
        account,
        native_balance,
        holdings,
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::eth::{MockTokenOps, MockWallet},
        mockall::predicate::eq,
    };

    const ACCOUNT: Address = Address::new([0xaa; 20]);

    fn metadata(tokens: &mut MockTokenOps, token: Address, symbol: &'static str) {
        tokens
            .expect_name()
            .with(eq(token))
            .returning(move |_| Ok(format!("{symbol} Token")));
        tokens
            .expect_symbol()
            .with(eq(token))
            .returning(move |_| Ok(symbol.to_owned()));
        tokens
            .expect_decimals()
            .with(eq(token))
            .returning(|_| Ok(18));
        tokens
            .expect_total_supply()
            .with(eq(token))
            .returning(|_| Ok(U256::from(1_000_000)));
    }

    #[tokio::test]
    async fn lists_only_owned_tokens() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let mut tokens = MockTokenOps::new();
        metadata(&mut tokens, a, "A");
        metadata(&mut tokens, b, "B");
        tokens
            .expect_owner()
            .with(eq(a))
            .returning(|_| Ok(ACCOUNT));
        tokens
            .expect_owner()
            .with(eq(b))
            .returning(|_| Ok(Address::repeat_byte(0xbb)));
        tokens
            .expect_balance_of()
            .with(eq(a), eq(ACCOUNT))
            .times(1)
            .returning(|_, _| Ok(U256::from(42)));

        let mut wallet = MockWallet::new();
        wallet
            .expect_native_balance()
            .returning(|_| Ok(U256::from(7)));

        let entries = vec![
            DeployedToken::new(a, "A Token", "A"),
            DeployedToken::new(b, "B Token", "B"),
        ];
        let view = account_view(&wallet, &tokens, &entries, ACCOUNT).await;

        assert_eq!(view.native_balance, Some(U256::from(7)));
        assert_eq!(view.holdings.len(), 1);
        assert_eq!(view.holdings[0].token.symbol, "A");
        assert_eq!(view.holdings[0].balance, U256::from(42));
    }

    #[tokio::test]
    async fn falls_back_to_registry_admin() {
        let token = Address::repeat_byte(3);
        let mut tokens = MockTokenOps::new();
        metadata(&mut tokens, token, "PLAIN");
        tokens
            .expect_owner()
            .returning(|_| Err(ethrpc::Error::Reverted(String::new())));

        let mut entry = DeployedToken::new(token, "Plain", "PLAIN");
        entry.admin = Some(ACCOUNT);
        let with_admin = info(&tokens, &entry).await.unwrap();
        assert!(with_admin.is_owned_by(&ACCOUNT));

        entry.admin = None;
        let without_admin = info(&tokens, &entry).await.unwrap();
        assert_eq!(without_admin.owner, None);
    }

    #[tokio::test]
    async fn skips_tokens_with_failing_metadata() {
        let good = Address::repeat_byte(1);
        let broken = Address::repeat_byte(2);
        let mut tokens = MockTokenOps::new();
        metadata(&mut tokens, good, "GOOD");
        tokens
            .expect_name()
            .with(eq(broken))
            .returning(|_| Err(ethrpc::Error::Rpc("no code".into())));
        tokens
            .expect_symbol()
            .with(eq(broken))
            .returning(|_| Ok("BROKEN".into()));
        tokens.expect_decimals().with(eq(broken)).returning(|_| Ok(18));
        tokens
            .expect_total_supply()
            .with(eq(broken))
            .returning(|_| Ok(U256::ZERO));
        tokens.expect_owner().returning(|_| Ok(ACCOUNT));

        let found = discover(
            &tokens,
            &[
                DeployedToken::new(broken, "", "BROKEN"),
                DeployedToken::new(good, "", "GOOD"),
            ],
        )
        .await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].address, good);
    }
}

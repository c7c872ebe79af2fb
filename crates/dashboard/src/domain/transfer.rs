use {
    crate::domain::eth::{Address, Confirmation, TokenOps, U256, Wallet},
    model::transaction::{Party, TransactionRecord},
    number::units::{format_units, parse_decimal, parse_units},
    shared::{registry::TokenRegistry, transaction_log::TransactionLog},
    std::sync::LazyLock,
};

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("token {0} is not in the registry")]
    UnknownToken(Address),
    #[error("no signer configured")]
    NoSigner,
    #[error("connected to chain {actual} but chain {expected} is required")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("{0:?} is not a valid recipient address")]
    InvalidRecipient(String),
    #[error("{0:?} is not a valid amount")]
    InvalidAmount(String),
    #[error("insufficient token balance: {balance} available")]
    InsufficientBalance { balance: String },
    #[error(transparent)]
    Registry(#[from] shared::store::Error),
    #[error(transparent)]
    Chain(#[from] ethrpc::Error),
}

#[derive(Clone, Debug)]
pub struct Request {
    pub token: Address,
    pub recipient: String,
    pub amount: String,
}

static HEX_ADDRESS: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new("^(0x)?[0-9a-fA-F]{40}$").expect("valid address regex")
});

/// Parses a recipient the way wallets validate pasted addresses: the `0x`
/// prefix is optional and mixed case input must carry a valid EIP-55
/// checksum.
pub fn parse_recipient(input: &str) -> Option<Address> {
    if !HEX_ADDRESS.is_match(input) {
        return None;
    }
    let hex = input.strip_prefix("0x").unwrap_or(input);
    let prefixed = format!("0x{hex}");
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(&prefixed, None).ok()
    } else {
        prefixed.parse().ok()
    }
}

/// Sends `request.amount` of a registered token to the recipient after
/// validating everything that can be checked up front.
pub async fn transfer(
    wallet: &dyn Wallet,
    tokens: &dyn TokenOps,
    registry: &TokenRegistry,
    log: &TransactionLog,
    expected_chain: Option<u64>,
    request: &Request,
) -> Result<Confirmation, TransferError> {
    let entry = registry
        .find(request.token)?
        .ok_or(TransferError::UnknownToken(request.token))?;
    let sender = wallet.account().ok_or(TransferError::NoSigner)?;
    if let Some(expected) = expected_chain {
        let actual = wallet.chain_id().await?;
        if actual != expected {
            return Err(TransferError::WrongNetwork { expected, actual });
        }
    }
    let recipient = parse_recipient(request.recipient.trim())
        .ok_or_else(|| TransferError::InvalidRecipient(request.recipient.clone()))?;
    let invalid_amount = || TransferError::InvalidAmount(request.amount.clone());
    let amount = parse_decimal(&request.amount).map_err(|_| invalid_amount())?;
    if amount <= bigdecimal::BigDecimal::from(0) {
        return Err(invalid_amount());
    }

    let decimals = tokens.decimals(entry.address).await?;
    let amount: U256 = parse_units(&request.amount, decimals).map_err(|_| invalid_amount())?;
    let balance = tokens.balance_of(entry.address, sender).await?;
    if amount > balance {
        return Err(TransferError::InsufficientBalance {
            balance: format_units(balance, decimals),
        });
    }

    tracing::info!(token = %entry.label(), %recipient, amount = %request.amount, "sending transfer");
    let confirmation = tokens
        .transfer(entry.address, recipient, amount)
        .await?
        .ensure_success()?;
    tracing::info!(tx = %confirmation.tx_hash, "transfer confirmed");

    let record = TransactionRecord::confirmed(
        entry.label(),
        entry.address,
        Party::Account(sender),
        Party::Account(recipient),
        request.amount.trim(),
        confirmation.tx_hash,
    );
    if let Err(err) = log.record(record) {
        tracing::warn!(?err, "failed to log transfer");
    }
    Ok(confirmation)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::eth::{MockTokenOps, MockWallet, TxHash},
        hex_literal::hex,
        model::token::DeployedToken,
        shared::store::MemoryStore,
        std::sync::Arc,
    };

    const TOKEN: Address = Address::new([1; 20]);
    const SENDER: Address = Address::new([0xaa; 20]);
    const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    struct Setup {
        wallet: MockWallet,
        tokens: MockTokenOps,
        registry: TokenRegistry,
        log: TransactionLog,
    }

    fn setup() -> Setup {
        let store = Arc::new(MemoryStore::default());
        let registry = TokenRegistry::new(store.clone());
        registry
            .add(DeployedToken::new(TOKEN, "My Token", "MTK"))
            .unwrap();
        let mut wallet = MockWallet::new();
        wallet.expect_account().returning(|| Some(SENDER));
        wallet.expect_chain_id().returning(|| Ok(31337));
        let mut tokens = MockTokenOps::new();
        tokens.expect_decimals().returning(|_| Ok(18));
        tokens
            .expect_balance_of()
            .returning(|_, _| Ok(U256::from(10).pow(U256::from(18))));
        Setup {
            wallet,
            tokens,
            registry,
            log: TransactionLog::new(store),
        }
    }

    fn request(recipient: &str, amount: &str) -> Request {
        Request {
            token: TOKEN,
            recipient: recipient.to_owned(),
            amount: amount.to_owned(),
        }
    }

    async fn run(setup: &Setup, request: Request) -> Result<Confirmation, TransferError> {
        transfer(
            &setup.wallet,
            &setup.tokens,
            &setup.registry,
            &setup.log,
            Some(31337),
            &request,
        )
        .await
    }

    #[test]
    fn recipient_validation() {
        let expected = Address::new(hex!("70997970c51812dc3a010c7d01b50e0d17dc79c8"));
        assert_eq!(parse_recipient(RECIPIENT), Some(expected));
        assert_eq!(
            parse_recipient("70997970c51812dc3a010c7d01b50e0d17dc79c8"),
            Some(expected)
        );
        assert_eq!(
            parse_recipient("0x70997970C51812DC3A010C7D01B50E0D17DC79C8"),
            Some(expected)
        );
        // bad checksum
        assert_eq!(
            parse_recipient("0x70997970c51812dc3A010C7d01b50e0d17dc79C8"),
            None
        );
        assert_eq!(parse_recipient("0x1234"), None);
        assert_eq!(parse_recipient("not an address"), None);
    }

    #[tokio::test]
    async fn rejects_invalid_input_without_sending() {
        // `expect_transfer` is never set up, so any transfer call panics.
        let setup = setup();
        assert!(matches!(
            run(&setup, request("0x1234", "1")).await,
            Err(TransferError::InvalidRecipient(_))
        ));
        for amount in ["0", "", "-1", "abc", "0.0"] {
            assert!(matches!(
                run(&setup, request(RECIPIENT, amount)).await,
                Err(TransferError::InvalidAmount(_))
            ));
        }
        assert!(matches!(
            run(&setup, request(RECIPIENT, "1.5")).await,
            Err(TransferError::InsufficientBalance { balance }) if balance == "1.0"
        ));
        assert!(setup.log.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn checks_registry_signer_and_network_first() {
        let mut setup = setup();
        let unknown = Request {
            token: Address::repeat_byte(9),
            ..request("bad", "bad")
        };
        assert!(matches!(
            run(&setup, unknown).await,
            Err(TransferError::UnknownToken(_))
        ));

        setup.wallet.checkpoint();
        setup.wallet.expect_account().returning(|| Some(SENDER));
        setup.wallet.expect_chain_id().returning(|| Ok(1));
        assert!(matches!(
            run(&setup, request("bad", "bad")).await,
            Err(TransferError::WrongNetwork {
                expected: 31337,
                actual: 1
            })
        ));

        setup.wallet.checkpoint();
        setup.wallet.expect_account().returning(|| None);
        assert!(matches!(
            run(&setup, request("bad", "bad")).await,
            Err(TransferError::NoSigner)
        ));
    }

    #[tokio::test]
    async fn sends_and_logs_transfer() {
        let mut setup = setup();
        let recipient = parse_recipient(RECIPIENT).unwrap();
        setup
            .tokens
            .expect_transfer()
            .withf(move |token, to, amount| {
                *token == TOKEN
                    && *to == recipient
                    && *amount == U256::from(250_000_000_000_000_000u64)
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(Confirmation {
                    tx_hash: TxHash::repeat_byte(5),
                    success: true,
                })
            });

        let confirmation = run(&setup, request(RECIPIENT, "0.25")).await.unwrap();
        assert_eq!(confirmation.tx_hash, TxHash::repeat_byte(5));

        let log = setup.log.list().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].token, "MTK");
        assert_eq!(log[0].amount, "0.25");
        assert_eq!(log[0].from, Party::Account(SENDER));
        assert_eq!(log[0].to, Party::Account(recipient));
        assert_eq!(log[0].tx_hash, Some(TxHash::repeat_byte(5)));
    }
}

//! Minting and burning of the owner controlled test tokens.

use {
    crate::domain::eth::{Address, Confirmation, TokenOps, U256, Wallet},
    model::transaction::{Party, TransactionRecord},
    number::units::{format_units, parse_units},
    shared::transaction_log::TransactionLog,
};

#[derive(Debug, thiserror::Error)]
pub enum SupplyError {
    #[error("{0:?} is not a valid amount")]
    InvalidAmount(String),
    #[error("no signer configured")]
    NoSigner,
    #[error("insufficient balance to burn: {balance} available")]
    InsufficientBalance { balance: String },
    #[error("only the token owner can mint")]
    NotOwner,
    #[error("token does not support {0}; deploy a new token to use mint and burn")]
    Unsupported(&'static str),
    #[error(transparent)]
    Chain(ethrpc::Error),
}

impl SupplyError {
    fn classify(err: ethrpc::Error, operation: &'static str) -> Self {
        match err {
            ethrpc::Error::NotOwner => Self::NotOwner,
            ethrpc::Error::MissingFunction(_) => Self::Unsupported(operation),
            // Calling a function a contract lacks reverts without a reason.
            ethrpc::Error::Reverted(reason) if reason.is_empty() => Self::Unsupported(operation),
            err => Self::Chain(err),
        }
    }
}

/// A token as the user picked it, with the symbol used in the transaction log.
#[derive(Clone, Debug)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
}

async fn prepare(
    wallet: &dyn Wallet,
    tokens: &dyn TokenOps,
    token: &Token,
    amount: &str,
) -> Result<(Address, U256, u8), SupplyError> {
    let invalid = || SupplyError::InvalidAmount(amount.to_owned());
    let account = wallet.account().ok_or(SupplyError::NoSigner)?;
    let decimals = tokens
        .decimals(token.address)
        .await
        .map_err(SupplyError::Chain)?;
    let value = parse_units(amount, decimals).map_err(|_| invalid())?;
    if value.is_zero() {
        return Err(invalid());
    }
    Ok((account, value, decimals))
}

/// Mints `amount` to the signing account.
pub async fn mint(
    wallet: &dyn Wallet,
    tokens: &dyn TokenOps,
    log: &TransactionLog,
    token: &Token,
    amount: &str,
) -> Result<Confirmation, SupplyError> {
    let (account, value, _) = prepare(wallet, tokens, token, amount).await?;
    tracing::info!(token = %token.symbol, %amount, "minting");
    let confirmation = tokens
        .mint(token.address, account, value)
        .await
        .and_then(Confirmation::ensure_success)
        .map_err(|err| SupplyError::classify(err, "minting"))?;
    record(
        log,
        token,
        Party::Mint,
        Party::Account(account),
        amount,
        &confirmation,
    );
    Ok(confirmation)
}

/// Burns `amount` from the signing account.
pub async fn burn(
    wallet: &dyn Wallet,
    tokens: &dyn TokenOps,
    log: &TransactionLog,
    token: &Token,
    amount: &str,
) -> Result<Confirmation, SupplyError> {
    let (account, value, decimals) = prepare(wallet, tokens, token, amount).await?;
    let balance = tokens
        .balance_of(token.address, account)
        .await
        .map_err(SupplyError::Chain)?;
    if balance < value {
        return Err(SupplyError::InsufficientBalance {
            balance: format_units(balance, decimals),
        });
    }
    tracing::info!(token = %token.symbol, %amount, "burning");
    let confirmation = tokens
        .burn(token.address, value)
        .await
        .and_then(Confirmation::ensure_success)
        .map_err(|err| SupplyError::classify(err, "burning"))?;
    record(
        log,
        token,
        Party::Account(account),
        Party::Burn,
        amount,
        &confirmation,
    );
    Ok(confirmation)
}

fn record(
    log: &TransactionLog,
    token: &Token,
    from: Party,
    to: Party,
    amount: &str,
    confirmation: &Confirmation,
) {
    let entry = TransactionRecord::confirmed(
        token.symbol.clone(),
        token.address,
        from,
        to,
        amount.trim(),
        confirmation.tx_hash,
    );
    if let Err(err) = log.record(entry) {
        tracing::warn!(?err, "failed to log supply change");
    }
}

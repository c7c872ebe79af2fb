use alloy::{
    primitives::TxHash,
    providers::PendingTransactionError,
    rpc::json_rpc::ErrorPayload,
    transports::TransportError,
};

/// JSON-RPC error code a wallet returns when the user declines a request.
pub const USER_REJECTED: i64 = 4001;
/// JSON-RPC error code a wallet returns for a chain it does not know about.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// Every failure of a node or wallet interaction, classified once at the RPC
/// boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no signer configured")]
    NoSigner,
    #[error("connected to chain {actual} but chain {expected} is required")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("request rejected by the user")]
    Rejected,
    #[error("insufficient funds for gas")]
    InsufficientFunds,
    #[error("insufficient liquidity for this trade")]
    InsufficientLiquidity,
    #[error("chain not known to the wallet")]
    UnrecognizedChain,
    #[error("only the token owner can do this")]
    NotOwner,
    #[error("contract does not implement {0}")]
    MissingFunction(String),
    #[error("execution reverted: {0}")]
    Reverted(String),
    #[error("transaction {0} failed")]
    Failed(TxHash),
    #[error("rpc error: {0}")]
    Rpc(String),
}

impl Error {
    /// Errors that are the caller's fault or the user's decision rather than
    /// a problem with the node.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NoSigner | Self::WrongNetwork { .. })
    }

    /// Classifies a free-form error message as reported by nodes, wallets and
    /// contract reverts.
    pub fn from_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("user rejected") || lower.contains("user denied") {
            Self::Rejected
        } else if lower.contains("unrecognized chain") {
            Self::UnrecognizedChain
        } else if lower.contains("insufficient funds") {
            Self::InsufficientFunds
        } else if lower.contains("insufficient_liquidity") {
            Self::InsufficientLiquidity
        } else if lower.contains("caller is not the owner")
            || lower.contains("ownableunauthorizedaccount")
            || lower.contains("only owner")
        {
            Self::NotOwner
        } else if lower.contains("is not a function")
            || lower.contains("function selector was not recognized")
            || lower.contains("no fallback function")
        {
            Self::MissingFunction(message.to_owned())
        } else if lower.contains("revert") {
            Self::Reverted(revert_reason(message))
        } else {
            Self::Rpc(message.to_owned())
        }
    }

    fn from_payload(payload: &ErrorPayload) -> Self {
        match payload.code {
            USER_REJECTED => return Self::Rejected,
            UNRECOGNIZED_CHAIN => return Self::UnrecognizedChain,
            _ => (),
        }
        // Prefer the ABI encoded `Error(string)` when the node returns one.
        if let Some(reason) = payload
            .as_revert_data()
            .and_then(|data| alloy::sol_types::decode_revert_reason(&data))
        {
            return match Self::from_message(&reason) {
                Self::Rpc(reason) => Self::Reverted(revert_reason(&reason)),
                classified => classified,
            };
        }
        Self::from_message(&payload.message)
    }
}

fn revert_reason(message: &str) -> String {
    let reason = match message.split_once("reverted") {
        Some((_, rest)) => rest.trim_start_matches([':', ' ']),
        None => message,
    };
    let reason = reason.trim().trim_start_matches("with reason string").trim();
    reason.trim_matches(['\'', '"']).to_owned()
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self::from_payload(payload),
            None => Self::from_message(&err.to_string()),
        }
    }
}

impl From<PendingTransactionError> for Error {
    fn from(err: PendingTransactionError) -> Self {
        match err {
            PendingTransactionError::TransportError(err) => err.into(),
            err => Self::Rpc(err.to_string()),
        }
    }
}

impl From<alloy::contract::Error> for Error {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(err) => err.into(),
            alloy::contract::Error::PendingTransactionError(err) => err.into(),
            alloy::contract::Error::UnknownFunction(name) => Self::MissingFunction(name),
            err => Self::from_message(&err.to_string()),
        }
    }
}

use {
    alloy::primitives::{Address, TxHash},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    std::{convert::Infallible, fmt, str::FromStr},
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Confirmed,
    Submitted,
    Simulated,
}

/// Sender or receiver of a logged transaction. Supply changes use the
/// `mint` and `burn` markers instead of an address.
#[derive(Clone, Debug, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub enum Party {
    Account(Address),
    Mint,
    Burn,
    Other(String),
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Account(address) => write!(f, "{address}"),
            Party::Mint => f.write_str("mint"),
            Party::Burn => f.write_str("burn"),
            Party::Other(other) => f.write_str(other),
        }
    }
}

impl FromStr for Party {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "mint" => Party::Mint,
            "burn" => Party::Burn,
            _ => match s.parse::<Address>() {
                Ok(address) => Party::Account(address),
                Err(_) => Party::Other(s.to_owned()),
            },
        })
    }
}

impl Party {
    fn mentions(&self, marker: &str) -> bool {
        matches!(self, Party::Other(other) if other.contains(marker))
    }
}

/// An entry of the local transaction log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Milliseconds since the Unix epoch at the time the entry was created.
    pub id: i64,
    pub token: String,
    pub token_address: Address,
    pub from: Party,
    pub to: Party,
    /// Human readable amount as entered by the user.
    pub amount: String,
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    #[serde(default)]
    pub tx_hash: Option<TxHash>,
}

impl TransactionRecord {
    pub fn confirmed(
        token: impl Into<String>,
        token_address: Address,
        from: Party,
        to: Party,
        amount: impl Into<String>,
        tx_hash: TxHash,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            token: token.into(),
            token_address,
            from,
            to,
            amount: amount.into(),
            timestamp: now,
            status: Status::Confirmed,
            tx_hash: Some(tx_hash),
        }
    }

    /// Simulated entries and entries between local placeholder accounts are
    /// kept in the log but hidden from listings.
    pub fn is_visible(&self) -> bool {
        self.status != Status::Simulated
            && !self.from.mentions("local")
            && !self.to.mentions("local")
            && !self.from.mentions("mint-sim")
            && !self.to.mentions("mint-sim")
            && !self.to.mentions("burn-sim")
    }
}

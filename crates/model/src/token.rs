use {
    alloy::primitives::{Address, U256},
    chrono::{DateTime, Utc},
    number::serialization::DecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
};

/// An entry of the deployed token registry.
///
/// Only `address`, `name` and `symbol` are required so that registries
/// written by hand (or exported from older tooling) still load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedToken {
    pub address: Address,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    /// Human readable supply minted at deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_supply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
}

impl DeployedToken {
    pub fn new(address: Address, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            initial_supply: None,
            admin: None,
            network: None,
            deployed_at: None,
        }
    }

    /// The symbol, or the address when the registry has no symbol recorded.
    pub fn label(&self) -> String {
        if self.symbol.is_empty() {
            self.address.to_string()
        } else {
            self.symbol.clone()
        }
    }
}

/// Live metadata read from a token contract.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde_as(as = "DecimalU256")]
    pub total_supply: U256,
    pub owner: Option<Address>,
}

impl TokenInfo {
    pub fn is_owned_by(&self, account: &Address) -> bool {
        self.owner.as_ref() == Some(account)
    }
}

//! Chain descriptions in the shape wallets expect for
//! `wallet_addEthereumChain` (EIP-3085).

use serde::Serialize;

pub const SEPOLIA: u64 = 11155111;
pub const HARDHAT: u64 = 31337;

/// `0x` prefixed lowercase hex chain id as used by the wallet RPC methods.
pub fn hex_id(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    #[serde(skip)]
    pub id: u64,
    #[serde(rename = "chainId")]
    pub hex_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
}

impl Chain {
    pub fn sepolia(rpc_url: impl Into<String>) -> Self {
        Self {
            id: SEPOLIA,
            hex_id: hex_id(SEPOLIA),
            chain_name: "Sepolia".to_owned(),
            rpc_urls: vec![rpc_url.into()],
            native_currency: NativeCurrency {
                name: "SepoliaETH".to_owned(),
                symbol: "ETH".to_owned(),
                decimals: 18,
            },
            block_explorer_urls: vec!["https://sepolia.etherscan.io".to_owned()],
        }
    }

    pub fn hardhat(rpc_url: impl Into<String>) -> Self {
        Self {
            id: HARDHAT,
            hex_id: hex_id(HARDHAT),
            chain_name: "Hardhat".to_owned(),
            rpc_urls: vec![rpc_url.into()],
            native_currency: NativeCurrency {
                name: "Ether".to_owned(),
                symbol: "ETH".to_owned(),
                decimals: 18,
            },
            block_explorer_urls: Vec::new(),
        }
    }

    /// The known chain with the given id, or a generic description.
    pub fn for_id(id: u64, rpc_url: impl Into<String>) -> Self {
        match id {
            SEPOLIA => Self::sepolia(rpc_url),
            HARDHAT => Self::hardhat(rpc_url),
            _ => Self {
                id,
                hex_id: hex_id(id),
                chain_name: format!("Chain {id}"),
                rpc_urls: vec![rpc_url.into()],
                native_currency: NativeCurrency {
                    name: "Ether".to_owned(),
                    symbol: "ETH".to_owned(),
                    decimals: 18,
                },
                block_explorer_urls: Vec::new(),
            },
        }
    }
}

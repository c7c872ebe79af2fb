use {
    crate::{Error, chain::Chain},
    alloy::{
        network::EthereumWallet,
        primitives::{Address, U256},
        providers::{DynProvider, Provider, ProviderBuilder},
        signers::local::PrivateKeySigner,
    },
    serde_json::json,
    std::fmt,
    url::Url,
};

/// A JSON-RPC connection together with the account that signs for it.
///
/// Without a signer the connection is read-only: every state changing
/// operation fails with [`Error::NoSigner`].
#[derive(Clone)]
pub struct Web3 {
    provider: DynProvider,
    account: Option<Address>,
    url: Url,
}

impl Web3 {
    pub fn new(url: Url, signer: Option<PrivateKeySigner>) -> Self {
        let (provider, account) = match signer {
            Some(signer) => {
                let account = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url.clone())
                    .erased();
                (provider, Some(account))
            }
            None => (
                ProviderBuilder::new().connect_http(url.clone()).erased(),
                None,
            ),
        };
        Self {
            provider,
            account,
            url,
        }
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn require_signer(&self) -> Result<Address, Error> {
        self.account.ok_or(Error::NoSigner)
    }

    pub async fn chain_id(&self) -> Result<u64, Error> {
        Ok(self.provider.get_chain_id().await?)
    }

    pub async fn ensure_chain(&self, expected: u64) -> Result<(), Error> {
        let actual = self.chain_id().await?;
        if actual != expected {
            return Err(Error::WrongNetwork { expected, actual });
        }
        Ok(())
    }

    pub async fn native_balance(&self, account: Address) -> Result<U256, Error> {
        Ok(self.provider.get_balance(account).await?)
    }

    /// Accounts the endpoint exposes. The local signer takes precedence;
    /// otherwise `eth_requestAccounts` is tried before plain `eth_accounts`
    /// since regular nodes do not implement the wallet method.
    pub async fn request_accounts(&self) -> Result<Vec<Address>, Error> {
        if let Some(account) = self.account {
            return Ok(vec![account]);
        }
        match self
            .provider
            .raw_request::<_, Vec<Address>>("eth_requestAccounts".into(), ())
            .await
        {
            Ok(accounts) => Ok(accounts),
            Err(err) => {
                tracing::debug!(?err, "eth_requestAccounts failed, falling back to eth_accounts");
                Ok(self.provider.get_accounts().await?)
            }
        }
    }

    /// Asks the wallet behind the endpoint to switch to `chain`, registering
    /// the chain first when the wallet does not know it.
    pub async fn switch_chain(&self, chain: &Chain) -> Result<(), Error> {
        let switched = self
            .provider
            .raw_request::<_, serde_json::Value>(
                "wallet_switchEthereumChain".into(),
                [json!({ "chainId": chain.hex_id })],
            )
            .await
            .map_err(Error::from);
        match switched {
            Ok(_) => Ok(()),
            Err(Error::UnrecognizedChain) => {
                tracing::info!(chain = %chain.chain_name, "chain unknown to wallet, adding it");
                self.provider
                    .raw_request::<_, serde_json::Value>(
                        "wallet_addEthereumChain".into(),
                        [chain.clone()],
                    )
                    .await?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

impl fmt::Debug for Web3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Web3")
            .field("url", &self.url.as_str())
            .field("account", &self.account)
            .finish()
    }
}

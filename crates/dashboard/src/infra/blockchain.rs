//! Token, factory, pair and router calls against a node.

use {
    crate::domain::eth::{
        self, AddLiquidity, Address, AmmOps, Confirmation, Reserves, Swap, TokenOps, U256, Wallet,
    },
    alloy::{
        network::Ethereum,
        providers::{DynProvider, PendingTransactionBuilder},
    },
    async_trait::async_trait,
    contracts::alloy::{MockERC20, UniswapV2Factory, UniswapV2Pair, UniswapV2Router},
    ethrpc::{Error, Web3},
};

/// The node connection plus the AMM contracts the dashboard is configured
/// with.
#[derive(Clone, Debug)]
pub struct Blockchain {
    web3: Web3,
    router: Option<Address>,
    factory: Option<Address>,
}

impl Blockchain {
    pub fn new(web3: Web3, router: Option<Address>, factory: Option<Address>) -> Self {
        Self {
            web3,
            router,
            factory,
        }
    }

    pub fn web3(&self) -> &Web3 {
        &self.web3
    }

    fn provider(&self) -> DynProvider {
        self.web3.provider().clone()
    }

    fn token(&self, token: Address) -> MockERC20::MockERC20Instance<DynProvider> {
        MockERC20::new(token, self.provider())
    }

    fn factory(&self) -> eth::Result<UniswapV2Factory::UniswapV2FactoryInstance<DynProvider>> {
        let factory = self
            .factory
            .ok_or_else(|| Error::Rpc("no factory address configured".to_owned()))?;
        Ok(UniswapV2Factory::new(factory, self.provider()))
    }

    fn router_contract(&self) -> eth::Result<UniswapV2Router::UniswapV2RouterInstance<DynProvider>> {
        let router = self
            .router
            .ok_or_else(|| Error::Rpc("no router address configured".to_owned()))?;
        Ok(UniswapV2Router::new(router, self.provider()))
    }
}

/// Waits for the receipt of a submitted transaction.
async fn confirm(pending: PendingTransactionBuilder<Ethereum>) -> eth::Result<Confirmation> {
    let tx_hash = *pending.tx_hash();
    tracing::debug!(%tx_hash, "waiting for receipt");
    let receipt = pending.get_receipt().await?;
    let confirmation = Confirmation {
        tx_hash: receipt.transaction_hash,
        success: receipt.status(),
    };
    tracing::debug!(%tx_hash, success = confirmation.success, "transaction mined");
    Ok(confirmation)
}

#[async_trait]
impl Wallet for Blockchain {
    fn account(&self) -> Option<Address> {
        self.web3.account()
    }

    async fn chain_id(&self) -> eth::Result<u64> {
        self.web3.chain_id().await
    }

    async fn native_balance(&self, account: Address) -> eth::Result<U256> {
        self.web3.native_balance(account).await
    }
}

#[async_trait]
impl TokenOps for Blockchain {
    async fn name(&self, token: Address) -> eth::Result<String> {
        Ok(self.token(token).name().call().await?)
    }

    async fn symbol(&self, token: Address) -> eth::Result<String> {
        Ok(self.token(token).symbol().call().await?)
    }

    async fn decimals(&self, token: Address) -> eth::Result<u8> {
        Ok(self.token(token).decimals().call().await?)
    }

    async fn total_supply(&self, token: Address) -> eth::Result<U256> {
        Ok(self.token(token).totalSupply().call().await?)
    }

    async fn owner(&self, token: Address) -> eth::Result<Address> {
        Ok(self.token(token).owner().call().await?)
    }

    async fn balance_of(&self, token: Address, account: Address) -> eth::Result<U256> {
        Ok(self.token(token).balanceOf(account).call().await?)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> eth::Result<U256> {
        Ok(self.token(token).allowance(owner, spender).call().await?)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> eth::Result<Confirmation> {
        self.web3.require_signer()?;
        tracing::debug!(%token, %spender, %amount, "approve");
        confirm(self.token(token).approve(spender, amount).send().await?).await
    }

    async fn transfer(&self, token: Address, to: Address, amount: U256) -> eth::Result<Confirmation> {
        self.web3.require_signer()?;
        tracing::debug!(%token, %to, %amount, "transfer");
        confirm(self.token(token).transfer(to, amount).send().await?).await
    }

    async fn mint(&self, token: Address, to: Address, amount: U256) -> eth::Result<Confirmation> {
        self.web3.require_signer()?;
        tracing::debug!(%token, %to, %amount, "mint");
        confirm(self.token(token).mint(to, amount).send().await?).await
    }

    async fn burn(&self, token: Address, amount: U256) -> eth::Result<Confirmation> {
        self.web3.require_signer()?;
        tracing::debug!(%token, %amount, "burn");
        confirm(self.token(token).burn(amount).send().await?).await
    }
}

#[async_trait]
impl AmmOps for Blockchain {
    fn router(&self) -> Option<Address> {
        self.router
    }

    async fn get_pair(&self, token_a: Address, token_b: Address) -> eth::Result<Option<Address>> {
        let pair = self.factory()?.getPair(token_a, token_b).call().await?;
        Ok((!pair.is_zero()).then_some(pair))
    }

    async fn create_pair(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> eth::Result<(Confirmation, Option<Address>)> {
        self.web3.require_signer()?;
        let pending = self.factory()?.createPair(token_a, token_b).send().await?;
        let receipt = pending.get_receipt().await?;
        let pair = receipt.inner.logs().iter().find_map(|log| {
            log.log_decode::<UniswapV2Factory::PairCreated>()
                .ok()
                .map(|event| event.inner.data.pair)
        });
        let confirmation = Confirmation {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
        };
        tracing::debug!(tx_hash = %confirmation.tx_hash, ?pair, "pair creation mined");
        Ok((confirmation, pair))
    }

    async fn reserves(&self, pair: Address) -> eth::Result<Reserves> {
        let pair = UniswapV2Pair::new(pair, self.provider());
        let (get_reserves, token0) = (pair.getReserves(), pair.token0());
        let (reserves, token0) = futures::try_join!(
            get_reserves.call().into_future(),
            token0.call().into_future()
        )?;
        Ok(Reserves {
            reserve0: U256::from(reserves.reserve0),
            reserve1: U256::from(reserves.reserve1),
            token0,
        })
    }

    async fn amounts_out(&self, amount_in: U256, path: Vec<Address>) -> eth::Result<Vec<U256>> {
        Ok(self
            .router_contract()?
            .getAmountsOut(amount_in, path)
            .call()
            .await?)
    }

    async fn amounts_in(&self, amount_out: U256, path: Vec<Address>) -> eth::Result<Vec<U256>> {
        Ok(self
            .router_contract()?
            .getAmountsIn(amount_out, path)
            .call()
            .await?)
    }

    async fn add_liquidity(&self, params: AddLiquidity) -> eth::Result<Confirmation> {
        self.web3.require_signer()?;
        let router = self.router_contract()?;
        let mut call = router.addLiquidity(
            params.token_a,
            params.token_b,
            params.amount_a,
            params.amount_b,
            params.amount_a_min,
            params.amount_b_min,
            params.to,
            params.deadline,
        );
        if let Some(gas) = params.gas_limit {
            call = call.gas(gas);
        }
        confirm(call.send().await?).await
    }

    async fn swap_exact_tokens_for_tokens(&self, params: Swap) -> eth::Result<Confirmation> {
        self.web3.require_signer()?;
        let router = self.router_contract()?;
        let mut call = router.swapExactTokensForTokens(
            params.amount_in,
            params.amount_out_min,
            params.path,
            params.to,
            params.deadline,
        );
        if let Some(gas) = params.gas_limit {
            call = call.gas(gas);
        }
        let pending = call.send().await?;
        tracing::info!(tx_hash = %pending.tx_hash(), "swap submitted");
        confirm(pending).await
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::signers::local::PrivateKeySigner};

    const HARDHAT_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn blockchain(signer: Option<PrivateKeySigner>) -> Blockchain {
        // Nothing listens on this port; tests only exercise local checks.
        let web3 = Web3::new("http://127.0.0.1:1".parse().unwrap(), signer);
        Blockchain::new(web3, None, None)
    }

    #[tokio::test]
    async fn writes_require_a_signer() {
        let chain = blockchain(None);
        let token = Address::repeat_byte(1);
        assert_eq!(
            chain.approve(token, Address::ZERO, U256::from(1)).await,
            Err(Error::NoSigner)
        );
        assert_eq!(chain.burn(token, U256::from(1)).await, Err(Error::NoSigner));
        assert_eq!(
            chain.create_pair(token, Address::ZERO).await.map(|_| ()),
            Err(Error::NoSigner)
        );
    }

    #[tokio::test]
    async fn amm_calls_need_configured_contracts() {
        let chain = blockchain(Some(HARDHAT_KEY.parse().unwrap()));
        assert_eq!(chain.router(), None);
        assert!(matches!(
            chain.get_pair(Address::ZERO, Address::repeat_byte(1)).await,
            Err(Error::Rpc(message)) if message.contains("factory")
        ));
        assert!(matches!(
            chain.amounts_out(U256::from(1), vec![]).await,
            Err(Error::Rpc(message)) if message.contains("router")
        ));
    }
}

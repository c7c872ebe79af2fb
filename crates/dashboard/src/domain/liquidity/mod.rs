//! Monitoring of pool reserves across every pair of registered tokens, with
//! optional automatic top-ups of under-funded pools.

mod scheduler;

pub use scheduler::{Scheduler, TickInProgress};
use {
    crate::domain::eth::{self, AddLiquidity, Address, AmmOps, TokenOps, U256},
    bigdecimal::BigDecimal,
    chrono::Utc,
    model::{
        pool::{LastAction, LastActionKind, LiquidityStatus, PoolSnapshot},
        token::DeployedToken,
    },
    number::units::{format_units, parse_units, to_decimal},
    shared::registry::TokenRegistry,
    std::{
        sync::{Arc, Mutex, PoisonError},
        time::Duration,
    },
    tokio::sync::watch,
    tracing::Instrument,
};

#[derive(Clone, Debug)]
pub struct Config {
    /// Reserve of the first token below which a pool counts as low, in whole
    /// token units.
    pub min_liquidity: BigDecimal,
    /// Amount of each token added to a low pool, in whole token units.
    pub top_up_amount: String,
    pub deadline: Duration,
    pub gas_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_liquidity: BigDecimal::from(10_000),
            top_up_amount: "15000".to_owned(),
            deadline: Duration::from_secs(20 * 60),
            gas_limit: 500_000,
        }
    }
}

#[derive(Default)]
struct State {
    pools: Vec<PoolSnapshot>,
    last_update: Option<chrono::DateTime<Utc>>,
    last_action: Option<LastAction>,
}

pub struct Monitor {
    tokens: Arc<dyn TokenOps>,
    amm: Arc<dyn AmmOps>,
    registry: TokenRegistry,
    account: Option<Address>,
    config: Config,
    state: Mutex<State>,
    ticks: watch::Sender<u64>,
}

impl Monitor {
    pub fn new(
        tokens: Arc<dyn TokenOps>,
        amm: Arc<dyn AmmOps>,
        registry: TokenRegistry,
        account: Option<Address>,
        config: Config,
    ) -> Self {
        Self {
            tokens,
            amm,
            registry,
            account,
            config,
            state: Default::default(),
            ticks: watch::channel(0).0,
        }
    }

    /// Number of completed ticks, changing after every tick.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.ticks.subscribe()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self, auto_managing: bool) -> LiquidityStatus {
        let state = self.state();
        LiquidityStatus::new(
            state.pools.clone(),
            state.last_update,
            state.last_action.clone(),
            auto_managing,
            self.config.min_liquidity.to_string(),
        )
    }

    pub fn record_action(&self, kind: LastActionKind, message: impl Into<String>) {
        self.state().last_action = Some(LastAction::new(kind, message));
    }

    /// Reads the reserve state of the `(a, b)` pair. `None` when any call
    /// fails.
    pub async fn check_liquidity(
        &self,
        a: &DeployedToken,
        b: &DeployedToken,
    ) -> Option<PoolSnapshot> {
        match self.try_check_liquidity(a, b).await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::warn!(pool = %format!("{}/{}", a.label(), b.label()), ?err, "failed to check liquidity");
                None
            }
        }
    }

    async fn try_check_liquidity(
        &self,
        a: &DeployedToken,
        b: &DeployedToken,
    ) -> eth::Result<PoolSnapshot> {
        let Some(pair) = self.amm.get_pair(a.address, b.address).await? else {
            return Ok(PoolSnapshot::missing(
                a.label(),
                a.address,
                b.label(),
                b.address,
            ));
        };
        let reserves = self.amm.reserves(pair).await?;
        let decimals = self.tokens.decimals(a.address).await?;
        let (reserve_a, reserve_b) = reserves.oriented(a.address);
        let below_minimum = to_decimal(reserve_a, decimals) < self.config.min_liquidity;
        Ok(PoolSnapshot {
            token_a: a.label(),
            token_b: b.label(),
            token_a_address: a.address,
            token_b_address: b.address,
            pair_address: Some(pair),
            reserve0: format_units(reserve_a, decimals),
            // Formatted with token A's decimals like the first reserve.
            reserve1: format_units(reserve_b, decimals),
            below_minimum,
            needs_liquidity: below_minimum || reserve_a.is_zero(),
        })
    }

    /// Mints what is missing, approves the router and adds the configured
    /// top-up amount of both tokens. Returns whether liquidity was added.
    pub async fn remediate(&self, pool: &PoolSnapshot) -> bool {
        let (Some(account), Some(router)) = (self.account, self.amm.router()) else {
            tracing::info!(pool = %pool.name(), "no signer or router, skipping top-up");
            return false;
        };
        tracing::info!(pool = %pool.name(), amount = %self.config.top_up_amount, "adding liquidity");
        match self.add_liquidity(pool, account, router).await {
            Ok(()) => {
                self.record_action(
                    LastActionKind::Success,
                    format!(
                        "Added {} liquidity to {}",
                        self.config.top_up_amount,
                        pool.name()
                    ),
                );
                true
            }
            Err(err) => {
                tracing::error!(pool = %pool.name(), ?err, "failed to add liquidity");
                self.record_action(
                    LastActionKind::Error,
                    format!("Failed to add liquidity to {}: {err}", pool.name()),
                );
                false
            }
        }
    }

    async fn add_liquidity(
        &self,
        pool: &PoolSnapshot,
        account: Address,
        router: Address,
    ) -> eth::Result<()> {
        let tokens = [pool.token_a_address, pool.token_b_address];
        let mut amounts = [U256::ZERO; 2];
        for (token, amount) in tokens.iter().zip(&mut amounts) {
            let decimals = self.tokens.decimals(*token).await?;
            *amount = parse_units(&self.config.top_up_amount, decimals)
                .map_err(|err| ethrpc::Error::Rpc(format!("invalid top-up amount: {err}")))?;
        }

        for (token, amount) in tokens.iter().zip(amounts) {
            // Minting is best effort: tokens we do not own may still be funded.
            if let Err(err) = self.mint_shortfall(*token, account, amount).await {
                tracing::info!(%token, ?err, "token not mintable, using existing balance");
            }
        }
        for (token, amount) in tokens.iter().zip(amounts) {
            self.tokens
                .approve(*token, router, amount)
                .await?
                .ensure_success()?;
        }
        self.amm
            .add_liquidity(AddLiquidity {
                token_a: tokens[0],
                token_b: tokens[1],
                amount_a: amounts[0],
                amount_b: amounts[1],
                amount_a_min: U256::ZERO,
                amount_b_min: U256::ZERO,
                to: account,
                deadline: eth::deadline(self.config.deadline),
                gas_limit: Some(self.config.gas_limit),
            })
            .await?
            .ensure_success()?;
        Ok(())
    }

    async fn mint_shortfall(&self, token: Address, account: Address, amount: U256) -> eth::Result<()> {
        if self.tokens.owner(token).await? != account {
            return Ok(());
        }
        let balance = self.tokens.balance_of(token, account).await?;
        if balance >= amount {
            return Ok(());
        }
        let shortfall = amount - balance;
        tracing::info!(%token, %shortfall, "minting shortfall");
        self.tokens
            .mint(token, account, shortfall)
            .await?
            .ensure_success()?;
        Ok(())
    }

    /// One monitoring pass over every pair of registered tokens.
    pub async fn tick(&self, auto_manage: bool) {
        let tokens = match self.registry.list() {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::error!(?err, "failed to read token registry");
                return;
            }
        };
        if tokens.len() < 2 {
            tracing::debug!(tokens = tokens.len(), "not enough tokens to form a pool");
            return;
        }

        let mut pools = Vec::new();
        for (i, a) in tokens.iter().enumerate() {
            for b in &tokens[i + 1..] {
                let Some(pool) = self.check_liquidity(a, b).await else {
                    continue;
                };
                if auto_manage && pool.needs_liquidity {
                    self.remediate(&pool)
                        .instrument(tracing::info_span!("remediate", pool = %pool.name()))
                        .await;
                }
                pools.push(pool);
            }
        }

        let low = pools.iter().filter(|pool| pool.below_minimum).count();
        tracing::info!(pools = pools.len(), low, "liquidity checked");
        {
            let mut state = self.state();
            state.pools = pools;
            state.last_update = Some(Utc::now());
        }
        self.ticks.send_modify(|ticks| *ticks += 1);
    }
}

use {
    super::{Config, Form, SwapStatus, min_amount_out, typed_amount},
    crate::domain::eth::{self, Address, AmmOps, Confirmation, Swap, TokenOps, U256},
    model::transaction::{Party, TransactionRecord},
    shared::transaction_log::TransactionLog,
    std::sync::Arc,
    tokio::sync::watch,
};

/// Executes swaps and publishes their progress.
pub struct Swapper {
    tokens: Arc<dyn TokenOps>,
    amm: Arc<dyn AmmOps>,
    account: Option<Address>,
    log: TransactionLog,
    config: Config,
    status: watch::Sender<Option<SwapStatus>>,
}

impl Swapper {
    pub fn new(
        tokens: Arc<dyn TokenOps>,
        amm: Arc<dyn AmmOps>,
        account: Option<Address>,
        log: TransactionLog,
        config: Config,
    ) -> Self {
        Self {
            tokens,
            amm,
            account,
            log,
            config,
            status: watch::channel(None).0,
        }
    }

    /// Progress of the running swap; `None` when idle.
    pub fn subscribe(&self) -> watch::Receiver<Option<SwapStatus>> {
        self.status.subscribe()
    }

    fn set(&self, status: Option<SwapStatus>) -> Option<SwapStatus> {
        self.status.send_replace(status);
        status
    }

    /// Swaps the form's token A amount for token B. Returns the final status,
    /// or `None` when there was nothing to swap. The form amounts are reset
    /// after a successful swap.
    pub async fn execute(&self, form: &mut Form) -> Option<SwapStatus> {
        self.set(Some(SwapStatus::Pending));
        let (Some(account), Some(router)) = (self.account, self.amm.router()) else {
            return self.set(Some(SwapStatus::NoSigner));
        };
        let (Some(token_a), Some(token_b)) = (form.token_a.clone(), form.token_b.clone()) else {
            return self.set(None);
        };
        let amount_in = match typed_amount(&form.amount_a, token_a.decimals) {
            Ok(Some(amount)) => amount,
            Ok(None) => {
                tracing::info!(amount = %form.amount_a, "nothing to swap");
                return self.set(None);
            }
            Err(err) => {
                tracing::warn!(%err, token = %token_a.symbol, "invalid swap amount");
                return self.set(Some(SwapStatus::Error));
            }
        };
        let path = vec![token_a.address, token_b.address];

        let result = async {
            let allowance = self
                .tokens
                .allowance(token_a.address, account, router)
                .await?;
            if allowance < amount_in {
                self.set(Some(SwapStatus::Approving));
                tracing::info!(token = %token_a.symbol, %amount_in, "approving router");
                self.tokens
                    .approve(token_a.address, router, amount_in)
                    .await?
                    .ensure_success()?;
                self.set(Some(SwapStatus::Pending));
            }

            let amount_out_min = match self.amm.amounts_out(amount_in, path.clone()).await {
                Ok(amounts) => min_amount_out(
                    amounts.get(1).copied().unwrap_or_default(),
                    self.config.slippage_bps,
                ),
                Err(err) => {
                    tracing::warn!(?err, "could not quote for slippage protection, using 0");
                    U256::ZERO
                }
            };

            self.amm
                .swap_exact_tokens_for_tokens(Swap {
                    amount_in,
                    amount_out_min,
                    path,
                    to: account,
                    deadline: eth::deadline(self.config.deadline),
                    gas_limit: Some(self.config.gas_limit),
                })
                .await
        }
        .await;

        let status = match result {
            Ok(Confirmation {
                tx_hash,
                success: true,
            }) => {
                tracing::info!(%tx_hash, "swap succeeded");
                let record = TransactionRecord::confirmed(
                    format!("{}->{}", token_a.symbol, token_b.symbol),
                    token_a.address,
                    Party::Account(account),
                    Party::Account(account),
                    form.amount_a.clone(),
                    tx_hash,
                );
                if let Err(err) = self.log.record(record) {
                    tracing::warn!(?err, "failed to log swap");
                }
                form.clear_amounts();
                SwapStatus::Success
            }
            Ok(Confirmation { tx_hash, .. }) => {
                tracing::warn!(%tx_hash, "swap reverted");
                SwapStatus::Failed
            }
            Err(ethrpc::Error::Rejected) => SwapStatus::Rejected,
            Err(ethrpc::Error::Failed(tx_hash)) => {
                tracing::warn!(%tx_hash, "approval reverted");
                SwapStatus::Failed
            }
            Err(err) => {
                tracing::error!(?err, "swap failed");
                SwapStatus::Error
            }
        };
        self.set(Some(status))
    }
}

//! Logging of the notable things a command did, so that every command
//! reports them the same way.

use {
    crate::{
        domain::{eth::Confirmation, swap::SwapStatus},
        infra::deploy::Deployment,
    },
    ethrpc::watcher::Event,
    model::pool::LiquidityStatus,
};

pub fn deployed(contract: &str, deployment: &Deployment) {
    tracing::info!(
        contract,
        address = %deployment.address,
        tx_hash = %deployment.tx_hash,
        "contract deployed"
    );
}

pub fn confirmed(action: &str, confirmation: &Confirmation) {
    tracing::info!(action, tx_hash = %confirmation.tx_hash, "transaction confirmed");
}

pub fn swap_status(status: Option<SwapStatus>) {
    match status {
        Some(status) => tracing::debug!(%status, "swap status"),
        None => tracing::debug!("swap idle"),
    }
}

pub fn liquidity_status(status: &LiquidityStatus) {
    tracing::info!(
        total = status.total_pools,
        low = status.low_pools,
        healthy = status.healthy_pools,
        auto_managing = status.auto_managing,
        "liquidity status"
    );
    for pool in status.pools.iter().filter(|pool| pool.below_minimum) {
        tracing::warn!(
            pool = %pool.name(),
            reserve = %pool.reserve0,
            minimum = %status.min_liquidity,
            "pool below minimum liquidity"
        );
    }
}

pub fn wallet_event(event: &Event) {
    match event {
        Event::AccountsChanged(accounts) => tracing::info!(?accounts, "accounts changed"),
        Event::Disconnected => tracing::warn!("wallet disconnected"),
        Event::ChainChanged(chain_id) => tracing::info!(chain_id, "chain changed"),
    }
}

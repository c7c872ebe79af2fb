//! Polling replacement for the `accountsChanged` and `chainChanged`
//! notifications of injected wallets.

use {
    crate::{Error, Web3},
    alloy::primitives::Address,
    std::time::Duration,
    tokio::sync::mpsc,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
}

impl Snapshot {
    pub async fn fetch(web3: &Web3) -> Result<Self, Error> {
        Ok(Self {
            chain_id: web3.chain_id().await?,
            accounts: web3.request_accounts().await?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    AccountsChanged(Vec<Address>),
    /// The endpoint stopped exposing any account.
    Disconnected,
    ChainChanged(u64),
}

/// Events that turn `previous` into `current`.
pub fn changes(previous: &Snapshot, current: &Snapshot) -> Vec<Event> {
    let mut events = Vec::new();
    if previous.accounts != current.accounts {
        events.push(match current.accounts.is_empty() {
            true => Event::Disconnected,
            false => Event::AccountsChanged(current.accounts.clone()),
        });
    }
    if previous.chain_id != current.chain_id {
        events.push(Event::ChainChanged(current.chain_id));
    }
    events
}

/// Polls the endpoint every `interval` and reports changes. The task stops
/// once the receiver is dropped.
pub fn spawn(web3: Web3, interval: Duration) -> mpsc::UnboundedReceiver<Event> {
    let (sender, receiver) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut previous: Option<Snapshot> = None;
        loop {
            match Snapshot::fetch(&web3).await {
                Ok(current) => {
                    if let Some(previous) = &previous {
                        for event in changes(previous, &current) {
                            tracing::debug!(?event, "wallet state changed");
                            if sender.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    previous = Some(current);
                }
                Err(err) => tracing::warn!(?err, "failed to poll wallet state"),
            }
            if sender.is_closed() {
                return;
            }
            tokio::time::sleep(interval).await;
        }
    });
    receiver
}

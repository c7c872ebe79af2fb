//! Local history of the transactions sent from the dashboard.

use {
    crate::store::{self, Store},
    model::transaction::TransactionRecord,
    serde_json::Value,
    std::sync::Arc,
};

pub const KEY: &str = "web3_transactions_v1";

#[derive(Clone)]
pub struct TransactionLog {
    store: Arc<dyn Store>,
}

impl TransactionLog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn record(&self, record: TransactionRecord) -> Result<(), store::Error> {
        tracing::debug!(
            token = %record.token,
            from = %record.from,
            to = %record.to,
            amount = %record.amount,
            status = %record.status,
            "logging transaction"
        );
        let entry = serde_json::to_value(&record)?;
        store::update_list(self.store.as_ref(), KEY, |log| log.insert(0, entry.clone()))?;
        Ok(())
    }

    /// Every entry, newest first.
    pub fn list(&self) -> Result<Vec<TransactionRecord>, store::Error> {
        Ok(store::decode_list(KEY, self.store.get(KEY)?))
    }

    /// Entries worth showing to the user.
    pub fn visible(&self) -> Result<Vec<TransactionRecord>, store::Error> {
        Ok(self
            .list()?
            .into_iter()
            .filter(TransactionRecord::is_visible)
            .collect())
    }

    pub fn clear(&self) -> Result<(), store::Error> {
        self.store.set(KEY, Value::Array(Vec::new()))
    }
}

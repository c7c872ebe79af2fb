//! The list of tokens deployed or imported by the user.

use {
    crate::store::{self, Store},
    alloy::primitives::Address,
    model::token::DeployedToken,
    serde::Deserialize,
    serde_json::Value,
    std::sync::Arc,
};

pub const KEY: &str = "deployed_tokens_v1";

/// The identifying part of a stored entry.
#[derive(Deserialize)]
struct Keyed {
    address: Address,
}

fn is_for(entry: &Value, address: Address) -> bool {
    store::decode_entry::<Keyed>(entry).is_some_and(|entry| entry.address == address)
}

#[derive(Clone)]
pub struct TokenRegistry {
    store: Arc<dyn Store>,
}

impl TokenRegistry {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Newest entry first.
    pub fn list(&self) -> Result<Vec<DeployedToken>, store::Error> {
        Ok(store::decode_list(KEY, self.store.get(KEY)?))
    }

    pub fn find(&self, address: Address) -> Result<Option<DeployedToken>, store::Error> {
        Ok(self
            .list()?
            .into_iter()
            .find(|token| token.address == address))
    }

    /// Puts `token` at the front, replacing an older entry for the same
    /// address.
    pub fn add(&self, token: DeployedToken) -> Result<(), store::Error> {
        tracing::debug!(address = %token.address, symbol = %token.symbol, "registering token");
        let entry = serde_json::to_value(&token)?;
        store::update_list(self.store.as_ref(), KEY, |entries| {
            entries.retain(|existing| !is_for(existing, token.address));
            entries.insert(0, entry.clone());
        })?;
        Ok(())
    }

    /// Returns whether an entry was removed.
    pub fn remove(&self, address: Address) -> Result<bool, store::Error> {
        let mut removed = false;
        store::update_list(self.store.as_ref(), KEY, |entries| {
            let before = entries.len();
            entries.retain(|entry| !is_for(entry, address));
            removed = entries.len() != before;
        })?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::store::{FileStore, MemoryStore},
        hex_literal::hex,
    };

    fn registry() -> TokenRegistry {
        TokenRegistry::new(Arc::new(MemoryStore::default()))
    }

    #[test]
    fn newest_first_and_deduplicated() {
        let registry = registry();
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        registry.add(DeployedToken::new(a, "Alpha", "A")).unwrap();
        registry.add(DeployedToken::new(b, "Beta", "B")).unwrap();
        registry.add(DeployedToken::new(a, "Alpha v2", "A2")).unwrap();

        let tokens = registry.list().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].symbol, "A2");
        assert_eq!(tokens[1].address, b);
        assert_eq!(registry.find(a).unwrap().unwrap().name, "Alpha v2");
    }

    #[test]
    fn remove_entry() {
        let registry = registry();
        let a = Address::repeat_byte(1);
        registry.add(DeployedToken::new(a, "Alpha", "A")).unwrap();
        assert!(registry.remove(a).unwrap());
        assert!(!registry.remove(a).unwrap());
        assert!(registry.list().unwrap().is_empty());
        assert_eq!(registry.find(a).unwrap(), None);
    }

    #[test]
    fn reads_browser_export_with_mixed_case_addresses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("deployed_tokens_v1.json"),
            r#"[
                {"address": "0x5FbDB2315678afecb367f032d93F642f64180aa3", "name": "MyToken", "symbol": "MTK"},
                {"address": "not an address", "symbol": "BAD"}
            ]"#,
        )
        .unwrap();
        let registry = TokenRegistry::new(Arc::new(FileStore::new(dir.path()).unwrap()));

        let address = Address::new(hex!("5fbdb2315678afecb367f032d93f642f64180aa3"));
        let tokens = registry.list().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(registry.find(address).unwrap().unwrap().symbol, "MTK");
    }

    #[test]
    fn changes_keep_unreadable_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("deployed_tokens_v1.json"),
            r#"[{"address": "not an address", "symbol": "BAD"}]"#,
        )
        .unwrap();
        let store = Arc::new(FileStore::new(dir.path()).unwrap());
        let registry = TokenRegistry::new(store.clone());

        let a = Address::repeat_byte(1);
        registry.add(DeployedToken::new(a, "Alpha", "A")).unwrap();
        registry.add(DeployedToken::new(a, "Alpha", "A")).unwrap();
        assert!(registry.remove(Address::repeat_byte(2)).is_ok_and(|removed| !removed));

        let stored = store.get(KEY).unwrap().unwrap();
        let stored = stored.as_array().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1]["symbol"], "BAD");
        assert_eq!(registry.list().unwrap().len(), 1);
    }
}

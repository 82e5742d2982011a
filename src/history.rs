use crate::model::QuoteRecord;
use crate::storage::{BUDGETS_KEY, KeyValueStore};

/// Finished quotes, newest first, written through on every change.
pub struct QuoteHistory<S: KeyValueStore> {
    store: S,
    records: Vec<QuoteRecord>,
}

impl<S: KeyValueStore> QuoteHistory<S> {
    /// Unreadable or absent data gives an empty history.
    pub fn load(store: S) -> Self {
        let records = match store.load(BUDGETS_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Stored quotes are unreadable, starting empty: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!("Failed to load quotes: {}", e);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} quotes", records.len());
        QuoteHistory { store, records }
    }

    pub fn list(&self) -> &[QuoteRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&QuoteRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn append(&mut self, record: QuoteRecord) {
        self.records.insert(0, record);
        self.persist();
    }

    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() != before {
            self.persist();
        }
    }

    fn persist(&mut self) {
        let result = serde_json::to_vec(&self.records)
            .map_err(Into::into)
            .and_then(|bytes| self.store.save(BUDGETS_KEY, &bytes));
        if let Err(e) = result {
            tracing::error!("Failed to save quotes: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, Result};
    use crate::model::{CalculationResult, ClientData, CostDetails, ProjectDetails, QuoteType};
    use crate::storage::{FileStore, MemoryStore};
    use chrono::{TimeZone, Utc};

    fn record(millis: i64, description: &str) -> QuoteRecord {
        QuoteRecord::new(
            QuoteType::Project,
            CalculationResult {
                description: description.into(),
                quantity: 1,
                total: 10.0,
                unit_price: 10.0,
                addons: vec![],
                details: CostDetails::Project(ProjectDetails {
                    execution_hours: 1.0,
                    hourly_rate: 10.0,
                    materials_cost: 0.0,
                    software_cost: 0.0,
                    other_costs: 0.0,
                    deadline: None,
                }),
            },
            ClientData {
                name: "Bia".into(),
                email: "bia@example.com".into(),
                phone: "1199".into(),
                ..Default::default()
            },
            Utc.timestamp_millis_opt(millis).unwrap(),
        )
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn load(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(Error::Persistence("disk on fire".into()))
        }

        fn save(&mut self, _key: &str, _bytes: &[u8]) -> Result<()> {
            Err(Error::Persistence("disk on fire".into()))
        }
    }

    #[test]
    fn test_newest_first() {
        let mut history = QuoteHistory::load(MemoryStore::new());
        let r1 = record(1_000_000_111_111, "primeiro");
        let r2 = record(1_000_000_222_222, "segundo");
        history.append(r1.clone());
        history.append(r2.clone());
        assert_eq!(history.list(), &[r2, r1]);
    }

    #[test]
    fn test_persists_and_reloads() {
        let mut history = QuoteHistory::load(MemoryStore::new());
        history.append(record(1_000_000_111_111, "a"));
        history.append(record(1_000_000_222_222, "b"));
        let store = history.store.clone();

        let reloaded = QuoteHistory::load(store);
        assert_eq!(reloaded.list().len(), 2);
        assert_eq!(reloaded.list()[0].id, "ORC-222222");
        assert!(reloaded.get("ORC-111111").is_some());
    }

    #[test]
    fn test_remove_and_remove_missing() {
        let mut history = QuoteHistory::load(MemoryStore::new());
        history.append(record(1_000_000_111_111, "a"));
        history.remove("ORC-000000");
        assert_eq!(history.list().len(), 1);
        history.remove("ORC-111111");
        assert!(history.list().is_empty());
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let mut store = MemoryStore::new();
        store.save(BUDGETS_KEY, b"{not json").unwrap();
        let history = QuoteHistory::load(store);
        assert!(history.list().is_empty());
    }

    #[test]
    fn test_broken_store_never_fails() {
        let mut history = QuoteHistory::load(BrokenStore);
        assert!(history.list().is_empty());
        history.append(record(1_000_000_111_111, "a"));
        assert_eq!(history.list().len(), 1);
    }

    #[test]
    fn test_unwritable_data_dir_keeps_session_history() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let mut history = QuoteHistory::load(FileStore::new(blocker.join("data")));
        assert!(history.list().is_empty());
        history.append(record(1_000_000_111_111, "a"));
        assert_eq!(history.list()[0].id, "ORC-111111");
    }
}

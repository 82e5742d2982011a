//! Catalog of reusable add-ons ("insumos") with their unit price.

use chrono::{DateTime, Utc};
use slug::slugify;

use crate::currency;
use crate::errors::{Error, Result};
use crate::model::RegisteredItem;
use crate::storage::{KeyValueStore, REGISTERED_ITEMS_KEY};

fn default_items() -> Vec<RegisteredItem> {
    vec![RegisteredItem {
        id: "led".to_string(),
        name: "LED".to_string(),
        price: 2.50,
    }]
}

pub struct ItemCatalog<S: KeyValueStore> {
    store: S,
    items: Vec<RegisteredItem>,
}

impl<S: KeyValueStore> ItemCatalog<S> {
    /// Seeds the LED entry when nothing usable is stored.
    pub fn load(store: S) -> Self {
        let items = match store.load(REGISTERED_ITEMS_KEY) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Stored items are unreadable, using defaults: {}", e);
                default_items()
            }),
            Ok(None) => default_items(),
            Err(e) => {
                tracing::error!("Failed to load registered items: {}", e);
                default_items()
            }
        };
        ItemCatalog { store, items }
    }

    pub fn list(&self) -> &[RegisteredItem] {
        &self.items
    }

    pub fn add(&mut self, name: &str, price_text: &str) -> Result<RegisteredItem> {
        self.add_at(name, price_text, Utc::now())
    }

    pub fn add_at(
        &mut self,
        name: &str,
        price_text: &str,
        now: DateTime<Utc>,
    ) -> Result<RegisteredItem> {
        let name = name.trim();
        if name.is_empty() || price_text.trim().is_empty() {
            return Err(Error::Validation(
                "Nome e preço do insumo são obrigatórios.".to_string(),
            ));
        }
        let item = RegisteredItem {
            id: format!("{}-{}", slugify(name), now.timestamp_millis()),
            name: name.to_string(),
            price: currency::parse(price_text),
        };
        self.items.push(item.clone());
        self.persist();
        tracing::debug!("Registered item {}", item.id);
        Ok(item)
    }

    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    fn persist(&mut self) {
        let result = serde_json::to_vec(&self.items)
            .map_err(Into::into)
            .and_then(|bytes| self.store.save(REGISTERED_ITEMS_KEY, &bytes));
        if let Err(e) = result {
            tracing::error!("Failed to save registered items: {}", e);
        }
    }
}

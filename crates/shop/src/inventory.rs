//! Snapshot cache of server-held inventory records.
//!
//! The server is the source of truth; the client keeps a read-only snapshot
//! keyed by normalized product name, replaced wholesale on every fetch and
//! never partially merged.

use std::collections::BTreeMap;

use ezfood_core::ItemId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A server-held stock record for a purchasable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
}

/// Normalize a product name into a cache key (lowercased, trimmed).
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_lowercase().trim().to_string()
}

/// In-memory snapshot of the last-fetched inventory.
///
/// Keys are deterministic (ordered map) so that the name resolver's fuzzy
/// strategies always pick the same record for an unchanged snapshot.
#[derive(Debug, Default, Clone)]
pub struct InventoryCache {
    by_name: BTreeMap<String, InventoryRecord>,
    by_id: BTreeMap<ItemId, String>,
}

impl InventoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot with freshly fetched records.
    ///
    /// Records with duplicate normalized names keep the last occurrence,
    /// matching the original key-overwrite behavior.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = InventoryRecord>) {
        self.by_name.clear();
        self.by_id.clear();
        for record in records {
            let key = name_key(&record.name);
            self.by_id.insert(record.id, key.clone());
            self.by_name.insert(key, record);
        }
        debug!(items = self.by_name.len(), "inventory snapshot replaced");
    }

    /// Look up a record by its normalized name key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&InventoryRecord> {
        self.by_name.get(key)
    }

    /// Look up a record by its stable item id.
    #[must_use]
    pub fn get_by_id(&self, id: ItemId) -> Option<&InventoryRecord> {
        self.by_id.get(&id).and_then(|key| self.by_name.get(key))
    }

    /// Iterate over `(key, record)` pairs in deterministic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InventoryRecord)> {
        self.by_name.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of records in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

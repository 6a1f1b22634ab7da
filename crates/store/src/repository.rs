//! Repository abstractions over the persistence boundary.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use orderflow_core::{DomainError, DomainResult, Entity, ItemId, LocationId};
use orderflow_inventory::{InventoryItem, Location, StockLedger, StockRecord};

/// Catalog access for inventory items.
pub trait ItemRepository: Send + Sync {
    fn get(&self, item_id: ItemId) -> Option<InventoryItem>;
    fn upsert(&self, item: InventoryItem);
    fn list(&self) -> Vec<InventoryItem>;
}

/// Catalog access for storage locations.
pub trait LocationRepository: Send + Sync {
    fn get(&self, location_id: LocationId) -> Option<Location>;
    fn upsert(&self, location: Location);
    fn list(&self) -> Vec<Location>;
}

/// Access to the persisted stock records.
pub trait StockRepository: Send + Sync {
    /// Current records for one item across all locations.
    fn snapshot_for_item(&self, item_id: ItemId) -> Vec<StockRecord>;

    /// Current records at one location across all items.
    fn snapshot_at(&self, location_id: LocationId) -> Vec<StockRecord>;

    /// All current records.
    fn snapshot(&self) -> Vec<StockRecord>;

    /// Serialized read-modify-write over one item's records.
    ///
    /// The callback receives a ledger built from the item's current records.
    /// On `Ok` the ledger's records replace the stored ones atomically; on
    /// `Err` nothing is written. Implementations must not run two mutations
    /// for the same item concurrently; lost updates between the read and
    /// the write are this trait's problem, not the caller's.
    fn mutate_item(
        &self,
        item_id: ItemId,
        mutation: &mut dyn FnMut(&mut StockLedger) -> DomainResult<()>,
    ) -> DomainResult<()>;
}

impl<R> ItemRepository for Arc<R>
where
    R: ItemRepository + ?Sized,
{
    fn get(&self, item_id: ItemId) -> Option<InventoryItem> {
        (**self).get(item_id)
    }

    fn upsert(&self, item: InventoryItem) {
        (**self).upsert(item)
    }

    fn list(&self) -> Vec<InventoryItem> {
        (**self).list()
    }
}

impl<R> LocationRepository for Arc<R>
where
    R: LocationRepository + ?Sized,
{
    fn get(&self, location_id: LocationId) -> Option<Location> {
        (**self).get(location_id)
    }

    fn upsert(&self, location: Location) {
        (**self).upsert(location)
    }

    fn list(&self) -> Vec<Location> {
        (**self).list()
    }
}

impl<R> StockRepository for Arc<R>
where
    R: StockRepository + ?Sized,
{
    fn snapshot_for_item(&self, item_id: ItemId) -> Vec<StockRecord> {
        (**self).snapshot_for_item(item_id)
    }

    fn snapshot_at(&self, location_id: LocationId) -> Vec<StockRecord> {
        (**self).snapshot_at(location_id)
    }

    fn snapshot(&self) -> Vec<StockRecord> {
        (**self).snapshot()
    }

    fn mutate_item(
        &self,
        item_id: ItemId,
        mutation: &mut dyn FnMut(&mut StockLedger) -> DomainResult<()>,
    ) -> DomainResult<()> {
        (**self).mutate_item(item_id, mutation)
    }
}

/// In-memory item catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    inner: RwLock<HashMap<ItemId, InventoryItem>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ItemRepository for InMemoryItemRepository {
    fn get(&self, item_id: ItemId) -> Option<InventoryItem> {
        let map = self.inner.read().ok()?;
        map.get(&item_id).cloned()
    }

    fn upsert(&self, item: InventoryItem) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(*item.id(), item);
        }
    }

    fn list(&self) -> Vec<InventoryItem> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => vec![],
        }
    }
}

/// In-memory location catalog for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLocationRepository {
    inner: RwLock<HashMap<LocationId, Location>>,
}

impl InMemoryLocationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationRepository for InMemoryLocationRepository {
    fn get(&self, location_id: LocationId) -> Option<Location> {
        let map = self.inner.read().ok()?;
        map.get(&location_id).cloned()
    }

    fn upsert(&self, location: Location) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(*location.id(), location);
        }
    }

    fn list(&self) -> Vec<Location> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => vec![],
        }
    }
}

/// In-memory stock store for tests/dev.
///
/// Holds the write lock for the whole of [`mutate_item`], which gives the
/// serialized read-modify-write the trait demands. A document-database
/// implementation would use a transaction or compare-and-swap instead.
#[derive(Debug, Default)]
pub struct InMemoryStockRepository {
    inner: RwLock<HashMap<(ItemId, LocationId), u64>>,
}

impl InMemoryStockRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StockRepository for InMemoryStockRepository {
    fn snapshot_for_item(&self, item_id: ItemId) -> Vec<StockRecord> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        let mut out: Vec<StockRecord> = map
            .iter()
            .filter(|((item, _), _)| *item == item_id)
            .map(|(&(item_id, location_id), &quantity)| StockRecord {
                item_id,
                location_id,
                quantity,
            })
            .collect();
        out.sort_by_key(|r| r.location_id);
        out
    }

    fn snapshot_at(&self, location_id: LocationId) -> Vec<StockRecord> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        let mut out: Vec<StockRecord> = map
            .iter()
            .filter(|((_, loc), _)| *loc == location_id)
            .map(|(&(item_id, location_id), &quantity)| StockRecord {
                item_id,
                location_id,
                quantity,
            })
            .collect();
        out.sort_by_key(|r| r.item_id);
        out
    }

    fn snapshot(&self) -> Vec<StockRecord> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        let mut out: Vec<StockRecord> = map
            .iter()
            .map(|(&(item_id, location_id), &quantity)| StockRecord {
                item_id,
                location_id,
                quantity,
            })
            .collect();
        out.sort_by_key(|r| (r.item_id, r.location_id));
        out
    }

    fn mutate_item(
        &self,
        item_id: ItemId,
        mutation: &mut dyn FnMut(&mut StockLedger) -> DomainResult<()>,
    ) -> DomainResult<()> {
        let Ok(mut map) = self.inner.write() else {
            return Err(DomainError::validation("stock store lock poisoned"));
        };

        let current: Vec<StockRecord> = map
            .iter()
            .filter(|((item, _), _)| *item == item_id)
            .map(|(&(item_id, location_id), &quantity)| StockRecord {
                item_id,
                location_id,
                quantity,
            })
            .collect();

        let mut ledger = StockLedger::from_records(current)?;
        mutation(&mut ledger)?;

        map.retain(|(item, _), _| *item != item_id);
        for rec in ledger.records_for_item(item_id) {
            map.insert((rec.item_id, rec.location_id), rec.quantity);
        }
        Ok(())
    }
}

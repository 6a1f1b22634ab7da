//! Transfer boundary: catalog validation + ledger mutation + persistence.

use tracing::{info, warn};

use orderflow_core::{DomainError, DomainResult, Entity, ItemId, LocationId};
use orderflow_inventory::{
    InventoryItem, StockLedger, Transfer, TransferMode, TransferReceipt,
};

use crate::repository::{ItemRepository, LocationRepository, StockRepository};

/// Operator-facing stock operations.
///
/// The UI boundary hands this service `(item, from, to, quantity)`; the
/// service resolves the catalog entities, applies the ledger operation under
/// the stock repository's serialized read-modify-write, and returns the
/// receipt (or the rejection, with the stored ledger unchanged).
pub struct StockService<I, L, S> {
    items: I,
    locations: L,
    stock: S,
    mode: TransferMode,
}

impl<I, L, S> StockService<I, L, S>
where
    I: ItemRepository,
    L: LocationRepository,
    S: StockRepository,
{
    /// Strict shortfall policy by default; see [`StockService::with_mode`]
    /// for the legacy-permissive behavior.
    pub fn new(items: I, locations: L, stock: S) -> Self {
        Self {
            items,
            locations,
            stock,
            mode: TransferMode::Strict,
        }
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// Move stock between two locations.
    pub fn transfer(&self, transfer: &Transfer) -> DomainResult<TransferReceipt> {
        self.stock_tracked_item(transfer.item_id)?;
        self.known_location(transfer.from)?;
        self.known_location(transfer.to)?;

        let mut receipt = None;
        let result = self.stock.mutate_item(transfer.item_id, &mut |ledger| {
            receipt = Some(ledger.transfer(transfer, self.mode)?);
            Ok(())
        });

        match result {
            Ok(()) => {
                let receipt = receipt
                    .ok_or_else(|| DomainError::validation("transfer mutation did not run"))?;
                if receipt.shortfall > 0 {
                    warn!(
                        item_id = %receipt.item_id,
                        from = %receipt.from,
                        to = %receipt.to,
                        quantity = receipt.quantity,
                        shortfall = receipt.shortfall,
                        "permissive transfer absorbed a shortfall"
                    );
                } else {
                    info!(
                        item_id = %receipt.item_id,
                        from = %receipt.from,
                        to = %receipt.to,
                        quantity = receipt.quantity,
                        "transfer applied"
                    );
                }
                Ok(receipt)
            }
            Err(err) => {
                warn!(
                    item_id = %transfer.item_id,
                    from = %transfer.from,
                    to = %transfer.to,
                    quantity = transfer.quantity,
                    error = %err,
                    "transfer rejected"
                );
                Err(err)
            }
        }
    }

    /// Credit received stock to a location.
    pub fn receive(
        &self,
        item_id: ItemId,
        location_id: LocationId,
        quantity: u64,
    ) -> DomainResult<()> {
        self.stock_tracked_item(item_id)?;
        self.known_location(location_id)?;

        self.stock
            .mutate_item(item_id, &mut |ledger| {
                ledger.receive(item_id, location_id, quantity)
            })?;

        info!(%item_id, %location_id, quantity, "stock received");
        Ok(())
    }

    /// Debit despatched stock from a location. Returns the absorbed
    /// shortfall (always zero under the strict policy).
    pub fn despatch(
        &self,
        item_id: ItemId,
        location_id: LocationId,
        quantity: u64,
    ) -> DomainResult<u64> {
        self.stock_tracked_item(item_id)?;
        self.known_location(location_id)?;

        let mut shortfall = 0;
        self.stock.mutate_item(item_id, &mut |ledger| {
            shortfall = ledger.despatch(item_id, location_id, quantity, self.mode)?;
            Ok(())
        })?;

        info!(%item_id, %location_id, quantity, shortfall, "stock despatched");
        Ok(shortfall)
    }

    /// Quantity of an item at one location (zero for a missing record).
    pub fn quantity_at(&self, item_id: ItemId, location_id: LocationId) -> DomainResult<u64> {
        Ok(self.ledger_for_item(item_id)?.quantity_at(item_id, location_id))
    }

    /// Total quantity of an item across all locations.
    pub fn on_hand(&self, item_id: ItemId) -> DomainResult<u64> {
        Ok(self.ledger_for_item(item_id)?.on_hand(item_id))
    }

    /// Snapshot of the whole ledger (reporting boundary).
    pub fn ledger_snapshot(&self) -> DomainResult<StockLedger> {
        StockLedger::from_records(self.stock.snapshot())
    }

    fn stock_tracked_item(&self, item_id: ItemId) -> DomainResult<InventoryItem> {
        let item = self
            .items
            .get(item_id)
            .ok_or(DomainError::ItemNotFound(item_id))?;
        if !item.is_stock_tracked() {
            return Err(DomainError::validation(format!(
                "item {} ({}) does not hold stock of its own",
                item.sku(),
                item.id()
            )));
        }
        Ok(item)
    }

    fn known_location(&self, location_id: LocationId) -> DomainResult<()> {
        self.locations
            .get(location_id)
            .map(|_| ())
            .ok_or(DomainError::LocationNotFound(location_id))
    }

    fn ledger_for_item(&self, item_id: ItemId) -> DomainResult<StockLedger> {
        StockLedger::from_records(self.stock.snapshot_for_item(item_id))
    }
}

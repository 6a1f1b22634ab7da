use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::{DomainError, DomainResult, ItemId, LocationId};

use crate::availability::StockLevels;

/// A quantity of one item at one location.
///
/// At most one record exists per `(item_id, location_id)` pair, and no record
/// is ever stored with quantity zero (such records are pruned).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub item_id: ItemId,
    pub location_id: LocationId,
    pub quantity: u64,
}

/// Shortfall policy for debits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Reject any debit that exceeds the source quantity. Recommended.
    Strict,
    /// Legacy behavior: apply the debit regardless. The original system let
    /// the record go negative and then pruned it; the observable post-prune
    /// state is a source floored at zero, which is what this mode produces.
    Permissive,
}

/// Ephemeral transfer command. Not persisted; it mutates stock records as a
/// paired debit/credit. Not idempotent; at-most-once submission is the
/// caller's concern.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub item_id: ItemId,
    pub from: LocationId,
    pub to: LocationId,
    pub quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// What a transfer actually did.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub item_id: ItemId,
    pub from: LocationId,
    pub to: LocationId,
    /// Quantity credited to the destination.
    pub quantity: u64,
    /// Portion of the debit the source could not cover. Always zero in
    /// strict mode.
    pub shortfall: u64,
    pub occurred_at: DateTime<Utc>,
}

/// In-memory snapshot of the stock ledger.
///
/// The map key enforces the one-record-per-`(item, location)` invariant by
/// construction. This is a snapshot supplied by (and written back through)
/// the persistence boundary, never canonical process-global state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockLedger {
    records: HashMap<(ItemId, LocationId), u64>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from persisted records. Duplicate `(item, location)`
    /// pairs are summed; zero-quantity records are dropped. Records whose
    /// sum would exceed `u64::MAX` are rejected rather than wrapped.
    pub fn from_records(records: impl IntoIterator<Item = StockRecord>) -> DomainResult<Self> {
        let mut ledger = Self::new();
        for rec in records {
            if rec.quantity > 0 {
                ledger.credit(rec.item_id, rec.location_id, rec.quantity)?;
            }
        }
        Ok(ledger)
    }

    /// All records, ordered by `(item, location)` for deterministic output.
    pub fn records(&self) -> Vec<StockRecord> {
        let mut out: Vec<StockRecord> = self
            .records
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

    /// Records for one item, ordered by location.
    pub fn records_for_item(&self, item_id: ItemId) -> Vec<StockRecord> {
        let mut out: Vec<StockRecord> = self
            .records
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

    /// Explicit record lookup. `None` means "no stock has ever been credited
    /// here (or it was all moved away)"; callers that want a number should
    /// use [`StockLedger::quantity_at`], which applies the zero default.
    pub fn record(&self, item_id: ItemId, location_id: LocationId) -> Option<StockRecord> {
        self.records
            .get(&(item_id, location_id))
            .map(|&quantity| StockRecord {
                item_id,
                location_id,
                quantity,
            })
    }

    /// Quantity of an item at one location. A missing record reads as zero;
    /// this defaulting is deliberate, not a silent fallback.
    pub fn quantity_at(&self, item_id: ItemId, location_id: LocationId) -> u64 {
        self.records
            .get(&(item_id, location_id))
            .copied()
            .unwrap_or(0)
    }

    /// Total quantity of an item across all locations.
    pub fn on_hand(&self, item_id: ItemId) -> u64 {
        self.records
            .iter()
            .filter(|((item, _), _)| *item == item_id)
            .map(|(_, &q)| q)
            .sum()
    }

    /// Per-item levels summed over all locations (availability snapshot).
    pub fn levels(&self) -> StockLevels {
        let mut levels = StockLevels::new();
        for (&(item_id, _), &quantity) in &self.records {
            *levels.entry(item_id).or_insert(0) += quantity;
        }
        levels
    }

    /// Per-item levels at a single location (single-location contexts).
    pub fn levels_at(&self, location_id: LocationId) -> StockLevels {
        self.records
            .iter()
            .filter(|((_, loc), _)| *loc == location_id)
            .map(|(&(item_id, _), &quantity)| (item_id, quantity))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Credit stock to a location, creating the record on first receipt.
    pub fn receive(
        &mut self,
        item_id: ItemId,
        location_id: LocationId,
        quantity: u64,
    ) -> DomainResult<()> {
        if quantity == 0 {
            return Err(DomainError::invalid_quantity(quantity));
        }
        self.credit(item_id, location_id, quantity)
    }

    /// Debit stock from a location. Returns the absorbed shortfall (always
    /// zero in strict mode). A record driven to zero is pruned.
    pub fn despatch(
        &mut self,
        item_id: ItemId,
        location_id: LocationId,
        quantity: u64,
        mode: TransferMode,
    ) -> DomainResult<u64> {
        if quantity == 0 {
            return Err(DomainError::invalid_quantity(quantity));
        }
        self.debit(item_id, location_id, quantity, mode)
    }

    /// Move stock between two locations as a paired debit/credit.
    ///
    /// Rejections leave the ledger unchanged. In permissive mode the credit
    /// is always the full quantity even when the source could not cover it;
    /// the receipt reports the shortfall.
    pub fn transfer(
        &mut self,
        transfer: &Transfer,
        mode: TransferMode,
    ) -> DomainResult<TransferReceipt> {
        if transfer.quantity == 0 {
            return Err(DomainError::invalid_quantity(transfer.quantity));
        }
        if transfer.from == transfer.to {
            return Err(DomainError::same_location(transfer.from));
        }

        // Check the credit side up front so a rejection cannot land after
        // the debit has already been applied.
        if self
            .quantity_at(transfer.item_id, transfer.to)
            .checked_add(transfer.quantity)
            .is_none()
        {
            return Err(DomainError::validation(format!(
                "transfer would overflow stock of item {} at location {}",
                transfer.item_id, transfer.to
            )));
        }

        let shortfall = self.debit(transfer.item_id, transfer.from, transfer.quantity, mode)?;
        self.credit(transfer.item_id, transfer.to, transfer.quantity)?;

        Ok(TransferReceipt {
            item_id: transfer.item_id,
            from: transfer.from,
            to: transfer.to,
            quantity: transfer.quantity,
            shortfall,
            occurred_at: transfer.occurred_at,
        })
    }

    fn credit(
        &mut self,
        item_id: ItemId,
        location_id: LocationId,
        quantity: u64,
    ) -> DomainResult<()> {
        let updated = self
            .quantity_at(item_id, location_id)
            .checked_add(quantity)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "stock of item {item_id} at location {location_id} would overflow"
                ))
            })?;
        self.records.insert((item_id, location_id), updated);
        Ok(())
    }

    fn debit(
        &mut self,
        item_id: ItemId,
        location_id: LocationId,
        quantity: u64,
        mode: TransferMode,
    ) -> DomainResult<u64> {
        let available = self.quantity_at(item_id, location_id);

        if available < quantity && mode == TransferMode::Strict {
            return Err(DomainError::InsufficientStock {
                item_id,
                location_id,
                available,
                requested: quantity,
            });
        }

        let remaining = available.saturating_sub(quantity);
        if remaining == 0 {
            self.records.remove(&(item_id, location_id));
        } else {
            self.records.insert((item_id, location_id), remaining);
        }

        Ok(quantity.saturating_sub(available))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn transfer(item: ItemId, from: LocationId, to: LocationId, quantity: u64) -> Transfer {
        Transfer {
            item_id: item,
            from,
            to,
            quantity,
            occurred_at: now(),
        }
    }

    #[test]
    fn transfer_moves_stock_between_warehouses() {
        let gps = ItemId::new();
        let warehouse_a = LocationId::new();
        let warehouse_b = LocationId::new();

        let mut ledger = StockLedger::new();
        ledger.receive(gps, warehouse_a, 10).unwrap();

        let receipt = ledger
            .transfer(&transfer(gps, warehouse_a, warehouse_b, 4), TransferMode::Strict)
            .unwrap();

        assert_eq!(receipt.shortfall, 0);
        assert_eq!(ledger.quantity_at(gps, warehouse_a), 6);
        assert_eq!(ledger.quantity_at(gps, warehouse_b), 4);
        assert_eq!(ledger.records_for_item(gps).len(), 2);
    }

    #[test]
    fn transferring_the_entire_holding_removes_the_record() {
        let item = ItemId::new();
        let from = LocationId::new();
        let to = LocationId::new();

        let mut ledger = StockLedger::new();
        ledger.receive(item, from, 6).unwrap();

        ledger
            .transfer(&transfer(item, from, to, 6), TransferMode::Strict)
            .unwrap();

        assert_eq!(ledger.record(item, from), None);
        assert_eq!(ledger.quantity_at(item, to), 6);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let item = ItemId::new();
        let mut ledger = StockLedger::new();
        let err = ledger
            .transfer(
                &transfer(item, LocationId::new(), LocationId::new(), 0),
                TransferMode::Strict,
            )
            .unwrap_err();
        assert_eq!(err, DomainError::InvalidQuantity(0));
    }

    #[test]
    fn same_location_is_rejected() {
        let item = ItemId::new();
        let loc = LocationId::new();
        let mut ledger = StockLedger::new();
        ledger.receive(item, loc, 5).unwrap();

        let err = ledger
            .transfer(&transfer(item, loc, loc, 2), TransferMode::Strict)
            .unwrap_err();
        assert_eq!(err, DomainError::SameLocation(loc));
        assert_eq!(ledger.quantity_at(item, loc), 5);
    }

    #[test]
    fn strict_shortfall_is_rejected_and_leaves_ledger_unchanged() {
        let item = ItemId::new();
        let from = LocationId::new();
        let to = LocationId::new();

        let mut ledger = StockLedger::new();
        ledger.receive(item, from, 3).unwrap();
        let before = ledger.clone();

        let err = ledger
            .transfer(&transfer(item, from, to, 5), TransferMode::Strict)
            .unwrap_err();

        assert_eq!(
            err,
            DomainError::InsufficientStock {
                item_id: item,
                location_id: from,
                available: 3,
                requested: 5,
            }
        );
        assert_eq!(ledger, before);
    }

    #[test]
    fn permissive_shortfall_floors_source_and_credits_in_full() {
        let item = ItemId::new();
        let from = LocationId::new();
        let to = LocationId::new();

        let mut ledger = StockLedger::new();
        ledger.receive(item, from, 3).unwrap();

        let receipt = ledger
            .transfer(&transfer(item, from, to, 5), TransferMode::Permissive)
            .unwrap();

        assert_eq!(receipt.shortfall, 2);
        assert_eq!(ledger.record(item, from), None);
        assert_eq!(ledger.quantity_at(item, to), 5);
    }

    #[test]
    fn permissive_debit_from_missing_record_reads_as_zero() {
        let item = ItemId::new();
        let from = LocationId::new();
        let to = LocationId::new();

        let mut ledger = StockLedger::new();
        let receipt = ledger
            .transfer(&transfer(item, from, to, 4), TransferMode::Permissive)
            .unwrap();

        assert_eq!(receipt.shortfall, 4);
        assert_eq!(ledger.quantity_at(item, to), 4);
    }

    #[test]
    fn despatch_prunes_emptied_record() {
        let item = ItemId::new();
        let loc = LocationId::new();

        let mut ledger = StockLedger::new();
        ledger.receive(item, loc, 2).unwrap();
        let shortfall = ledger.despatch(item, loc, 2, TransferMode::Strict).unwrap();

        assert_eq!(shortfall, 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn from_records_sums_duplicates_and_drops_zeros() {
        let item = ItemId::new();
        let loc = LocationId::new();
        let other = LocationId::new();

        let ledger = StockLedger::from_records(vec![
            StockRecord { item_id: item, location_id: loc, quantity: 3 },
            StockRecord { item_id: item, location_id: loc, quantity: 4 },
            StockRecord { item_id: item, location_id: other, quantity: 0 },
        ])
        .unwrap();

        assert_eq!(ledger.quantity_at(item, loc), 7);
        assert_eq!(ledger.record(item, other), None);
    }

    #[test]
    fn from_records_rejects_overflowing_duplicates() {
        let item = ItemId::new();
        let loc = LocationId::new();

        let err = StockLedger::from_records(vec![
            StockRecord { item_id: item, location_id: loc, quantity: u64::MAX },
            StockRecord { item_id: item, location_id: loc, quantity: 1 },
        ])
        .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn receive_rejects_quantity_overflow() {
        let item = ItemId::new();
        let loc = LocationId::new();

        let mut ledger = StockLedger::new();
        ledger.receive(item, loc, u64::MAX).unwrap();

        let err = ledger.receive(item, loc, 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(ledger.quantity_at(item, loc), u64::MAX);
    }

    #[test]
    fn transfer_into_a_full_destination_is_rejected_before_the_debit() {
        let item = ItemId::new();
        let from = LocationId::new();
        let to = LocationId::new();

        let mut ledger = StockLedger::new();
        ledger.receive(item, from, 5).unwrap();
        ledger.receive(item, to, u64::MAX).unwrap();
        let before = ledger.clone();

        let err = ledger
            .transfer(&transfer(item, from, to, 1), TransferMode::Strict)
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(ledger, before);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a strict transfer with sufficient stock conserves the
        /// item's total across locations and moves exactly `quantity`.
        #[test]
        fn strict_transfer_conserves_total_and_moves_exact_quantity(
            initial_from in 1u64..10_000,
            initial_to in 0u64..10_000,
            quantity in 1u64..10_000,
        ) {
            prop_assume!(quantity <= initial_from);

            let item = ItemId::new();
            let from = LocationId::new();
            let to = LocationId::new();

            let mut ledger = StockLedger::new();
            ledger.receive(item, from, initial_from).unwrap();
            if initial_to > 0 {
                ledger.receive(item, to, initial_to).unwrap();
            }

            let total_before = ledger.on_hand(item);
            ledger.transfer(&transfer(item, from, to, quantity), TransferMode::Strict).unwrap();

            prop_assert_eq!(ledger.on_hand(item), total_before);
            prop_assert_eq!(ledger.quantity_at(item, from), initial_from - quantity);
            prop_assert_eq!(ledger.quantity_at(item, to), initial_to + quantity);
        }

        /// Property: no zero-quantity record survives any sequence of
        /// receives, despatches, and transfers.
        #[test]
        fn no_zero_quantity_record_survives(
            ops in prop::collection::vec((0u8..3, 0usize..3, 0usize..3, 1u64..50), 1..40)
        ) {
            let item = ItemId::new();
            let locations: Vec<LocationId> =
                (0..3).map(|_| LocationId::new()).collect();

            let mut ledger = StockLedger::new();
            for (op, a, b, quantity) in ops {
                let from = locations[a];
                let to = locations[b];
                match op {
                    0 => {
                        ledger.receive(item, from, quantity).unwrap();
                    }
                    1 => {
                        let _ = ledger.despatch(item, from, quantity, TransferMode::Permissive);
                    }
                    _ => {
                        let _ = ledger.transfer(
                            &transfer(item, from, to, quantity),
                            TransferMode::Permissive,
                        );
                    }
                }
            }

            for rec in ledger.records() {
                prop_assert!(rec.quantity > 0);
            }
        }

        /// Property: strict rejections never mutate the ledger.
        #[test]
        fn strict_rejection_is_side_effect_free(
            available in 0u64..100,
            requested in 1u64..200,
        ) {
            prop_assume!(requested > available);

            let item = ItemId::new();
            let from = LocationId::new();
            let to = LocationId::new();

            let mut ledger = StockLedger::new();
            if available > 0 {
                ledger.receive(item, from, available).unwrap();
            }
            let before = ledger.clone();

            let result = ledger.transfer(
                &transfer(item, from, to, requested),
                TransferMode::Strict,
            );

            prop_assert!(result.is_err());
            prop_assert_eq!(ledger, before);
        }
    }
}

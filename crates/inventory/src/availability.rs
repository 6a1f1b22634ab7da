//! Composite availability calculator.
//!
//! Pure functions over a stock-level snapshot. Callers capture the snapshot
//! (via [`StockLedger::levels`](crate::ledger::StockLedger::levels) or
//! [`levels_at`](crate::ledger::StockLedger::levels_at)) and pass it in; the
//! calculator never reads live shared state, so a concurrent transfer cannot
//! tear a read.

use std::collections::HashMap;

use orderflow_core::{DomainError, DomainResult, Entity, ItemId};

use crate::item::{InventoryItem, ItemKind};

/// Per-item stock levels captured at a point in time. A missing entry reads
/// as zero (the documented zero-default for absent stock records).
pub type StockLevels = HashMap<ItemId, u64>;

/// Maximum number of composite-item units constructible from component stock.
///
/// For each bill-of-materials line, `floor(level / quantity_required)`; the
/// result is the minimum across all lines. Only composite items have a
/// buildable quantity; anything else is a validation error. A composite with
/// an empty bill of materials, or with a zero-quantity component line, is
/// rejected rather than computed over. Constructors forbid both, but records
/// read back from the persistence boundary bypass them and get the same
/// checks here.
pub fn buildable_quantity(item: &InventoryItem, levels: &StockLevels) -> DomainResult<u64> {
    let ItemKind::Composite { components, .. } = item.kind() else {
        return Err(DomainError::validation(format!(
            "item {} is not a composite",
            item.id()
        )));
    };
    if components.is_empty() {
        return Err(DomainError::empty_bill_of_materials(*item.id()));
    }

    let mut buildable = u64::MAX;
    for component in components {
        // Persisted documents bypass the Component::new guard.
        if component.quantity_required == 0 {
            return Err(DomainError::invalid_quantity(0));
        }
        let level = levels.get(&component.item_id).copied().unwrap_or(0);
        buildable = buildable.min(level / component.quantity_required);
    }
    Ok(buildable)
}

/// Low-stock flag.
///
/// Simple items compare their level against the threshold directly;
/// composite items compare their buildable quantity. Services have no stock
/// concept and are never low.
pub fn is_low_stock(item: &InventoryItem, levels: &StockLevels) -> DomainResult<bool> {
    match item.kind() {
        ItemKind::Simple { min_threshold, .. } => {
            let level = levels.get(item.id()).copied().unwrap_or(0);
            Ok(level < *min_threshold)
        }
        ItemKind::Composite { min_threshold, .. } => {
            Ok(buildable_quantity(item, levels)? < *min_threshold)
        }
        ItemKind::Service => Ok(false),
    }
}

//! Reporting surface for the stock model.
//!
//! Pure reads over a ledger snapshot: low-stock flags and buildable
//! quantities for dashboards. No mutation happens here.

use serde::{Deserialize, Serialize};
use tracing::debug;

use orderflow_core::{DomainResult, Entity, ItemId};
use orderflow_inventory::{
    InventoryItem, ItemKind, Sku, StockLedger, buildable_quantity, is_low_stock,
};

/// How an item's availability figure was derived.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityKind {
    /// On-hand quantity summed across locations.
    OnHand,
    /// Buildable quantity derived from component stock.
    Buildable,
}

/// One dashboard line: an item's availability and low-stock flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockHealthLine {
    pub item_id: ItemId,
    pub sku: Sku,
    pub name: String,
    pub availability: AvailabilityKind,
    pub available: u64,
    pub min_threshold: u64,
    pub low_stock: bool,
}

/// Compute dashboard lines for every stocked or composite item in the
/// catalog. Service items carry no stock concept and are skipped.
///
/// The ledger is a snapshot captured by the caller; the report never reads
/// live shared state.
pub fn stock_health<'a>(
    items: impl IntoIterator<Item = &'a InventoryItem>,
    ledger: &StockLedger,
) -> DomainResult<Vec<StockHealthLine>> {
    let levels = ledger.levels();
    let mut lines = Vec::new();

    for item in items {
        let (availability, available, min_threshold) = match item.kind() {
            ItemKind::Simple { min_threshold, .. } => (
                AvailabilityKind::OnHand,
                ledger.on_hand(*item.id()),
                *min_threshold,
            ),
            ItemKind::Composite { min_threshold, .. } => (
                AvailabilityKind::Buildable,
                buildable_quantity(item, &levels)?,
                *min_threshold,
            ),
            ItemKind::Service => continue,
        };

        lines.push(StockHealthLine {
            item_id: *item.id(),
            sku: item.sku().clone(),
            name: item.name().to_string(),
            availability,
            available,
            min_threshold,
            low_stock: is_low_stock(item, &levels)?,
        });
    }

    lines.sort_by(|a, b| a.sku.as_str().cmp(b.sku.as_str()));
    debug!(lines = lines.len(), "stock health report generated");
    Ok(lines)
}

/// Items currently flagged low, in SKU order.
pub fn low_stock_items<'a>(
    items: impl IntoIterator<Item = &'a InventoryItem>,
    ledger: &StockLedger,
) -> DomainResult<Vec<StockHealthLine>> {
    let mut lines = stock_health(items, ledger)?;
    lines.retain(|line| line.low_stock);
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::LocationId;
    use orderflow_inventory::Component;

    fn ledger(entries: &[(ItemId, u64)]) -> StockLedger {
        let location = LocationId::new();
        let mut ledger = StockLedger::new();
        for &(item, quantity) in entries {
            if quantity > 0 {
                ledger.receive(item, location, quantity).unwrap();
            }
        }
        ledger
    }

    #[test]
    fn report_covers_simple_and_composite_items_and_skips_services() {
        let gps = ItemId::new();
        let antenna = ItemId::new();
        let kit = ItemId::new();

        let catalog = vec![
            InventoryItem::simple(gps, Sku::new("GPS-1").unwrap(), "GPS tracker", 2500, 5)
                .unwrap(),
            InventoryItem::simple(antenna, Sku::new("ANT-1").unwrap(), "Antenna", 900, 10)
                .unwrap(),
            InventoryItem::composite(
                kit,
                Sku::new("KIT-1").unwrap(),
                "Tracker kit",
                vec![
                    Component::new(gps, 2).unwrap(),
                    Component::new(antenna, 1).unwrap(),
                ],
                4,
            )
            .unwrap(),
            InventoryItem::service(ItemId::new(), Sku::new("INSTALL").unwrap(), "Install")
                .unwrap(),
        ];

        let ledger = ledger(&[(gps, 10), (antenna, 3)]);
        let lines = stock_health(catalog.iter(), &ledger).unwrap();

        // SKU order: ANT-1, GPS-1, KIT-1; the service item is skipped.
        assert_eq!(lines.len(), 3);

        let ant = &lines[0];
        assert_eq!(ant.availability, AvailabilityKind::OnHand);
        assert_eq!(ant.available, 3);
        assert!(ant.low_stock);

        let gps_line = &lines[1];
        assert_eq!(gps_line.available, 10);
        assert!(!gps_line.low_stock);

        let kit_line = &lines[2];
        assert_eq!(kit_line.availability, AvailabilityKind::Buildable);
        // min(10/2, 3/1) = 3, below the threshold of 4.
        assert_eq!(kit_line.available, 3);
        assert!(kit_line.low_stock);
    }

    #[test]
    fn low_stock_items_filters_healthy_lines() {
        let gps = ItemId::new();
        let catalog = vec![
            InventoryItem::simple(gps, Sku::new("GPS-1").unwrap(), "GPS tracker", 2500, 5)
                .unwrap(),
        ];

        let healthy = ledger(&[(gps, 9)]);
        assert!(low_stock_items(catalog.iter(), &healthy).unwrap().is_empty());

        let low = ledger(&[(gps, 2)]);
        let lines = low_stock_items(catalog.iter(), &low).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_id, gps);
    }

    #[test]
    fn empty_catalog_yields_empty_report() {
        let catalog: Vec<InventoryItem> = vec![];
        let lines = stock_health(catalog.iter(), &StockLedger::new()).unwrap();
        assert!(lines.is_empty());
    }
}

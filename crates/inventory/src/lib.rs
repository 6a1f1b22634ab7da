//! Inventory domain module.
//!
//! This crate contains the business rules for stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage):
//!
//! - the item catalog model (simple / composite / service items),
//! - the stock ledger (per-location quantities, transfer debit/credit),
//! - the composite availability calculator (buildable quantity from a
//!   bill of materials).

pub mod availability;
pub mod item;
pub mod ledger;
pub mod location;

pub use availability::{StockLevels, buildable_quantity, is_low_stock};
pub use item::{Component, InventoryItem, ItemKind, Sku};
pub use ledger::{StockLedger, StockRecord, Transfer, TransferMode, TransferReceipt};
pub use location::Location;

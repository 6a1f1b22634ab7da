//! Persistence boundary for the stock model.
//!
//! Repository traits over the document-database collaborator, with in-memory
//! implementations for tests/dev, plus the [`StockService`] that validates
//! stock movements against the catalog before applying them to the ledger.
//!
//! The canonical ledger state lives behind the repositories, never in a
//! process-global; the domain crate only ever sees snapshots.

pub mod repository;
pub mod service;

pub use repository::{
    InMemoryItemRepository, InMemoryLocationRepository, InMemoryStockRepository, ItemRepository,
    LocationRepository, StockRepository,
};
pub use service::StockService;

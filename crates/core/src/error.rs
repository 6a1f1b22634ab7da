//! Domain error model.

use thiserror::Error;

use crate::id::{ItemId, LocationId};

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// stock invariants, unknown identifiers). Infrastructure concerns belong
/// elsewhere; nothing here is retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, wrong item kind).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stock movement was requested with a zero quantity.
    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(u64),

    /// A transfer named the same location as source and destination.
    #[error("source and destination are the same location ({0})")]
    SameLocation(LocationId),

    /// The referenced inventory item does not exist.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// The referenced storage location does not exist.
    #[error("location not found: {0}")]
    LocationNotFound(LocationId),

    /// A strict-mode debit would drive the source record negative.
    #[error(
        "insufficient stock of item {item_id} at location {location_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientStock {
        item_id: ItemId,
        location_id: LocationId,
        available: u64,
        requested: u64,
    },

    /// A composite item with no components; availability is meaningless and
    /// almost certainly a data-entry error.
    #[error("composite item {0} has an empty bill of materials")]
    EmptyBillOfMaterials(ItemId),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_quantity(quantity: u64) -> Self {
        Self::InvalidQuantity(quantity)
    }

    pub fn same_location(location_id: LocationId) -> Self {
        Self::SameLocation(location_id)
    }

    pub fn item_not_found(item_id: ItemId) -> Self {
        Self::ItemNotFound(item_id)
    }

    pub fn location_not_found(location_id: LocationId) -> Self {
        Self::LocationNotFound(location_id)
    }

    pub fn empty_bill_of_materials(item_id: ItemId) -> Self {
        Self::EmptyBillOfMaterials(item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_quantities() {
        let err = DomainError::InsufficientStock {
            item_id: ItemId::new(),
            location_id: LocationId::new(),
            available: 2,
            requested: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("available 2"));
        assert!(msg.contains("requested 5"));
    }
}

//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**; they represent
/// concepts where identity doesn't matter. A `Sku` or a bill-of-materials
/// component line is a value object; an `InventoryItem` is an entity.
///
/// To "modify" a value object, create a new one with the new values. The
/// trait requires `Clone` (values are cheap to copy), `PartialEq` (compared
/// by attribute values) and `Debug` (logging, testing).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

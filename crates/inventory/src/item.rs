use serde::{Deserialize, Serialize};

use orderflow_core::{DomainError, DomainResult, Entity, ItemId, ValueObject};

/// Stock-keeping unit code.
///
/// Normalized on construction: trimmed and uppercased, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn new(raw: impl AsRef<str>) -> DomainResult<Self> {
        let normalized = raw.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(DomainError::validation("SKU cannot be empty"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Sku {}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of a composite item's bill of materials.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub item_id: ItemId,
    pub quantity_required: u64,
}

impl Component {
    pub fn new(item_id: ItemId, quantity_required: u64) -> DomainResult<Self> {
        if quantity_required == 0 {
            return Err(DomainError::invalid_quantity(quantity_required));
        }
        Ok(Self {
            item_id,
            quantity_required,
        })
    }
}

impl ValueObject for Component {}

/// What kind of item this is, and the kind-specific data that comes with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum ItemKind {
    /// A physical item held as stock. `unit_cost` is in the smallest
    /// currency unit (e.g. cents).
    Simple { unit_cost: u64, min_threshold: u64 },
    /// A bill-of-materials item. Holds no stock of its own; availability is
    /// computed from component stock.
    Composite {
        components: Vec<Component>,
        min_threshold: u64,
    },
    /// No stock concept (labour, installation work).
    Service,
}

/// Catalog entity: an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    id: ItemId,
    sku: Sku,
    name: String,
    kind: ItemKind,
}

impl InventoryItem {
    /// Create a simple (stock-tracked) item.
    pub fn simple(
        id: ItemId,
        sku: Sku,
        name: impl Into<String>,
        unit_cost: u64,
        min_threshold: u64,
    ) -> DomainResult<Self> {
        Self::validated(
            id,
            sku,
            name.into(),
            ItemKind::Simple {
                unit_cost,
                min_threshold,
            },
        )
    }

    /// Create a composite item from its bill of materials.
    ///
    /// An empty component list is rejected outright: "zero buildable" would
    /// silently mask a data-entry error.
    pub fn composite(
        id: ItemId,
        sku: Sku,
        name: impl Into<String>,
        components: Vec<Component>,
        min_threshold: u64,
    ) -> DomainResult<Self> {
        if components.is_empty() {
            return Err(DomainError::empty_bill_of_materials(id));
        }
        Self::validated(
            id,
            sku,
            name.into(),
            ItemKind::Composite {
                components,
                min_threshold,
            },
        )
    }

    /// Create a service item (no stock concept).
    pub fn service(id: ItemId, sku: Sku, name: impl Into<String>) -> DomainResult<Self> {
        Self::validated(id, sku, name.into(), ItemKind::Service)
    }

    fn validated(id: ItemId, sku: Sku, name: String, kind: ItemKind) -> DomainResult<Self> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        Ok(Self { id, sku, name, kind })
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Whether this item holds stock of its own. Only simple items do;
    /// composite availability is derived, services have no stock concept.
    pub fn is_stock_tracked(&self) -> bool {
        matches!(self.kind, ItemKind::Simple { .. })
    }

    /// Low-stock threshold, where one applies.
    pub fn min_threshold(&self) -> Option<u64> {
        match &self.kind {
            ItemKind::Simple { min_threshold, .. }
            | ItemKind::Composite { min_threshold, .. } => Some(*min_threshold),
            ItemKind::Service => None,
        }
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

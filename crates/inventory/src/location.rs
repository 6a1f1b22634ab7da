use serde::{Deserialize, Serialize};

use orderflow_core::{DomainError, DomainResult, Entity, LocationId};

/// A named storage place (warehouse/shelf).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    name: String,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }
        Ok(Self { id, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

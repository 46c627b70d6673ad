//! Artist aggregate.

use uuid::Uuid;

use crate::error::{DomainError, Result};

/// An artist signed to a label. Unlabeled artists are unsupported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    id: Uuid,
    name: String,
    label_id: Uuid,
}

impl Artist {
    /// Create a new artist. The name must be non-blank.
    pub fn new(id: Uuid, name: impl Into<String>, label_id: Uuid) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_input("artist name cannot be empty"));
        }
        Ok(Self { id, name, label_id })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label_id(&self) -> Uuid {
        self.label_id
    }

    /// Whether this artist is signed to the given label.
    pub fn is_signed_to(&self, label_id: Uuid) -> bool {
        self.label_id == label_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_name() {
        let result = Artist::new(Uuid::new_v4(), "   ", Uuid::new_v4());
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn label_membership() {
        let label_id = Uuid::new_v4();
        let artist = Artist::new(Uuid::new_v4(), "Nova Rae", label_id).unwrap();
        assert!(artist.is_signed_to(label_id));
        assert!(!artist.is_signed_to(Uuid::new_v4()));
    }
}

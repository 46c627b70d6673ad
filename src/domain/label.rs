//! Record label aggregate.

use uuid::Uuid;

use crate::domain::Release;
use crate::error::{DomainError, Result};

/// A record label holding approval authority over its artists' releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    id: Uuid,
    name: String,
}

impl Label {
    /// Create a new label. The name must be non-blank.
    pub fn new(id: Uuid, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_input("label name cannot be empty"));
        }
        Ok(Self { id, name })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this label may approve a date for the release.
    ///
    /// A release is only approvable once the artist has proposed a date.
    pub fn can_approve(&self, release: &Release) -> bool {
        release.proposed_date().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn rejects_blank_name() {
        let result = Label::new(Uuid::new_v4(), "");
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn approval_requires_a_proposed_date() {
        let label = Label::new(Uuid::new_v4(), "Polar Tapes").unwrap();
        let mut release = Release::new(Uuid::new_v4(), "Night Drive", Uuid::new_v4());
        assert!(!label.can_approve(&release));

        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        release.propose_date(date).unwrap();
        assert!(label.can_approve(&release));
    }
}

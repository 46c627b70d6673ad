//! Song aggregate.

use std::time::Duration;

use uuid::Uuid;

use crate::error::{DomainError, Result};

/// A song owned by an artist. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    id: Uuid,
    title: String,
    artist_id: Uuid,
    duration: Duration,
}

impl Song {
    /// Create a new song. The title must be non-blank and the
    /// duration strictly positive.
    pub fn new(
        id: Uuid,
        title: impl Into<String>,
        artist_id: Uuid,
        duration: Duration,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::invalid_input("song title cannot be empty"));
        }
        if duration.is_zero() {
            return Err(DomainError::invalid_input("song duration must be positive"));
        }
        Ok(Self {
            id,
            title,
            artist_id,
            duration,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist_id(&self) -> Uuid {
        self.artist_id
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether this song is owned by the given artist.
    pub fn is_by(&self, artist_id: Uuid) -> bool {
        self.artist_id == artist_id
    }
}

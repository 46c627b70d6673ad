//! Domain repositories.
//!
//! Async trait seams over entity storage, plus the in-memory
//! implementations this deployment runs on. Lookups return
//! `Option`; saves are upserts.

mod memory;

pub use memory::{
    InMemoryArtistRepository, InMemoryLabelRepository, InMemoryReleaseRepository,
    InMemorySongRepository, InMemoryStreamRepository,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::{Artist, Label, Release, Song, StreamRecord};

/// Artist lookups.
#[async_trait]
pub trait ArtistRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Option<Artist>;

    /// Exact-name lookup; artist names are unique.
    async fn find_by_name(&self, name: &str) -> Option<Artist>;

    async fn save(&self, artist: Artist);
}

/// Label lookups.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Option<Label>;

    /// Exact-name lookup; label names are unique.
    async fn find_by_name(&self, name: &str) -> Option<Label>;

    async fn save(&self, label: Label);
}

/// Song lookups.
#[async_trait]
pub trait SongRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Option<Song>;

    async fn find_by_artist(&self, artist_id: Uuid) -> Vec<Song>;

    async fn save(&self, song: Song);
}

/// Release lookups.
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Option<Release>;

    async fn find_by_artist(&self, artist_id: Uuid) -> Vec<Release>;

    /// All releases whose song set contains the given song.
    async fn find_containing_song(&self, song_id: Uuid) -> Vec<Release>;

    /// Approved releases whose approved date is on or before `on`,
    /// i.e. candidates for publishing.
    async fn ready_for_publishing(&self, on: NaiveDate) -> Vec<Release>;

    async fn save(&self, release: Release);
}

/// Stream lookups.
#[async_trait]
pub trait StreamRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Option<StreamRecord>;

    async fn find_by_song(&self, song_id: Uuid) -> Vec<StreamRecord>;

    /// Streams of every song owned by the artist (join through
    /// song ownership).
    async fn find_by_artist(&self, artist_id: Uuid) -> Vec<StreamRecord>;

    /// Monetizable streams of the artist's songs within the
    /// inclusive window.
    async fn find_monetizable_by_artist(
        &self,
        artist_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<StreamRecord>;

    async fn save(&self, stream: StreamRecord);
}

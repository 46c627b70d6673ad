//! In-memory repository implementations.
//!
//! DashMap-backed stores used by this deployment and by tests.
//! Iteration order is not defined; callers needing determinism
//! sort on their side.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{Artist, Label, Release, Song, StreamRecord};

use super::{
    ArtistRepository, LabelRepository, ReleaseRepository, SongRepository, StreamRepository,
};

/// In-memory artist store.
#[derive(Default)]
pub struct InMemoryArtistRepository {
    artists: DashMap<Uuid, Artist>,
}

impl InMemoryArtistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtistRepository for InMemoryArtistRepository {
    async fn find_by_id(&self, id: Uuid) -> Option<Artist> {
        self.artists.get(&id).map(|entry| entry.clone())
    }

    async fn find_by_name(&self, name: &str) -> Option<Artist> {
        self.artists
            .iter()
            .find(|entry| entry.name() == name)
            .map(|entry| entry.clone())
    }

    async fn save(&self, artist: Artist) {
        self.artists.insert(artist.id(), artist);
    }
}

/// In-memory label store.
#[derive(Default)]
pub struct InMemoryLabelRepository {
    labels: DashMap<Uuid, Label>,
}

impl InMemoryLabelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LabelRepository for InMemoryLabelRepository {
    async fn find_by_id(&self, id: Uuid) -> Option<Label> {
        self.labels.get(&id).map(|entry| entry.clone())
    }

    async fn find_by_name(&self, name: &str) -> Option<Label> {
        self.labels
            .iter()
            .find(|entry| entry.name() == name)
            .map(|entry| entry.clone())
    }

    async fn save(&self, label: Label) {
        self.labels.insert(label.id(), label);
    }
}

/// In-memory song store.
#[derive(Default)]
pub struct InMemorySongRepository {
    songs: DashMap<Uuid, Song>,
}

impl InMemorySongRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SongRepository for InMemorySongRepository {
    async fn find_by_id(&self, id: Uuid) -> Option<Song> {
        self.songs.get(&id).map(|entry| entry.clone())
    }

    async fn find_by_artist(&self, artist_id: Uuid) -> Vec<Song> {
        self.songs
            .iter()
            .filter(|entry| entry.is_by(artist_id))
            .map(|entry| entry.clone())
            .collect()
    }

    async fn save(&self, song: Song) {
        self.songs.insert(song.id(), song);
    }
}

/// In-memory release store.
#[derive(Default)]
pub struct InMemoryReleaseRepository {
    releases: DashMap<Uuid, Release>,
}

impl InMemoryReleaseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReleaseRepository for InMemoryReleaseRepository {
    async fn find_by_id(&self, id: Uuid) -> Option<Release> {
        self.releases.get(&id).map(|entry| entry.clone())
    }

    async fn find_by_artist(&self, artist_id: Uuid) -> Vec<Release> {
        self.releases
            .iter()
            .filter(|entry| entry.artist_id() == artist_id)
            .map(|entry| entry.clone())
            .collect()
    }

    async fn find_containing_song(&self, song_id: Uuid) -> Vec<Release> {
        self.releases
            .iter()
            .filter(|entry| entry.song_ids().contains(&song_id))
            .map(|entry| entry.clone())
            .collect()
    }

    async fn ready_for_publishing(&self, on: NaiveDate) -> Vec<Release> {
        self.releases
            .iter()
            .filter(|entry| {
                entry.status() == crate::domain::ReleaseStatus::Approved
                    && entry.approved_date().is_some_and(|date| date <= on)
            })
            .map(|entry| entry.clone())
            .collect()
    }

    async fn save(&self, release: Release) {
        self.releases.insert(release.id(), release);
    }
}

/// In-memory stream store.
///
/// Artist-scoped queries join through the song repository, since
/// streams only carry the song id.
pub struct InMemoryStreamRepository {
    streams: DashMap<Uuid, StreamRecord>,
    songs: Arc<dyn SongRepository>,
}

impl InMemoryStreamRepository {
    pub fn new(songs: Arc<dyn SongRepository>) -> Self {
        Self {
            streams: DashMap::new(),
            songs,
        }
    }

    async fn artist_song_ids(&self, artist_id: Uuid) -> Vec<Uuid> {
        self.songs
            .find_by_artist(artist_id)
            .await
            .iter()
            .map(|song| song.id())
            .collect()
    }
}

#[async_trait]
impl StreamRepository for InMemoryStreamRepository {
    async fn find_by_id(&self, id: Uuid) -> Option<StreamRecord> {
        self.streams.get(&id).map(|entry| entry.clone())
    }

    async fn find_by_song(&self, song_id: Uuid) -> Vec<StreamRecord> {
        self.streams
            .iter()
            .filter(|entry| entry.song_id() == song_id)
            .map(|entry| entry.clone())
            .collect()
    }

    async fn find_by_artist(&self, artist_id: Uuid) -> Vec<StreamRecord> {
        let song_ids = self.artist_song_ids(artist_id).await;
        self.streams
            .iter()
            .filter(|entry| song_ids.contains(&entry.song_id()))
            .map(|entry| entry.clone())
            .collect()
    }

    async fn find_monetizable_by_artist(
        &self,
        artist_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<StreamRecord> {
        let song_ids = self.artist_song_ids(artist_id).await;
        self.streams
            .iter()
            .filter(|entry| {
                entry.is_monetizable()
                    && song_ids.contains(&entry.song_id())
                    && entry.recorded_at() >= from
                    && entry.recorded_at() <= to
            })
            .map(|entry| entry.clone())
            .collect()
    }

    async fn save(&self, stream: StreamRecord) {
        self.streams.insert(stream.id(), stream);
    }
}

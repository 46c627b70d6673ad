//! Artist stream report.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::StreamRecord;
use crate::error::{DomainError, Result};
use crate::event::{DomainEvent, EventKind, EventPayload};
use crate::repository::{ArtistRepository, SongRepository, StreamRepository};
use crate::store::{EventSubscriber, SubscriberResult};

/// Per-song slice of an [`ArtistStreamReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongStreamStats {
    pub song_id: Uuid,
    pub song_title: String,
    pub total_streams: u64,
    pub monetized_streams: u64,
    pub non_monetized_streams: u64,
}

/// How an artist's songs were streamed in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistStreamReport {
    pub artist_id: Uuid,
    pub artist_name: String,
    pub total_streams: u64,
    pub monetized_streams: u64,
    pub non_monetized_streams: u64,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Sorted by total streams descending; ties resolve by song id.
    pub song_stats: Vec<SongStreamStats>,
}

/// Generates stream reports for artists.
///
/// Reports recompute from the repositories so they stay accurate;
/// the projection additionally caches song titles seen on stream
/// events to label songs that have since left the catalog.
pub struct ArtistStreamProjection {
    artists: Arc<dyn ArtistRepository>,
    songs: Arc<dyn SongRepository>,
    streams: Arc<dyn StreamRepository>,
    titles: RwLock<HashMap<Uuid, String>>,
}

impl ArtistStreamProjection {
    pub fn new(
        artists: Arc<dyn ArtistRepository>,
        songs: Arc<dyn SongRepository>,
        streams: Arc<dyn StreamRepository>,
    ) -> Self {
        Self {
            artists,
            songs,
            streams,
            titles: RwLock::new(HashMap::new()),
        }
    }

    /// Build the stream report for an artist, optionally bounded to
    /// an inclusive window.
    pub async fn stream_report(
        &self,
        artist_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<ArtistStreamReport> {
        let artist = self
            .artists
            .find_by_id(artist_id)
            .await
            .ok_or(DomainError::not_found("artist", artist_id))?;

        let mut titles: HashMap<Uuid, String> = self
            .songs
            .find_by_artist(artist_id)
            .await
            .into_iter()
            .map(|song| (song.id(), song.title().to_string()))
            .collect();
        {
            let cached = self.titles.read().await;
            for (song_id, title) in cached.iter() {
                titles.entry(*song_id).or_insert_with(|| title.clone());
            }
        }

        let streams: Vec<StreamRecord> = self
            .streams
            .find_by_artist(artist_id)
            .await
            .into_iter()
            .filter(|stream| {
                from.map_or(true, |from| stream.recorded_at() >= from)
                    && to.map_or(true, |to| stream.recorded_at() <= to)
            })
            .collect();

        // BTreeMap keeps grouping deterministic; ties in the sort
        // below then resolve by song id.
        let mut by_song: BTreeMap<Uuid, Vec<&StreamRecord>> = BTreeMap::new();
        for stream in &streams {
            by_song.entry(stream.song_id()).or_default().push(stream);
        }

        let mut monetized_total = 0;
        let mut non_monetized_total = 0;
        let mut song_stats = Vec::with_capacity(by_song.len());
        for (song_id, song_streams) in by_song {
            let monetized = song_streams
                .iter()
                .filter(|stream| stream.is_monetizable())
                .count() as u64;
            let non_monetized = song_streams.len() as u64 - monetized;
            monetized_total += monetized;
            non_monetized_total += non_monetized;
            song_stats.push(SongStreamStats {
                song_id,
                song_title: titles
                    .get(&song_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown Song".to_string()),
                total_streams: song_streams.len() as u64,
                monetized_streams: monetized,
                non_monetized_streams: non_monetized,
            });
        }
        song_stats.sort_by(|a, b| b.total_streams.cmp(&a.total_streams));

        Ok(ArtistStreamReport {
            artist_id,
            artist_name: artist.name().to_string(),
            total_streams: streams.len() as u64,
            monetized_streams: monetized_total,
            non_monetized_streams: non_monetized_total,
            from,
            to,
            song_stats,
        })
    }
}

#[async_trait]
impl EventSubscriber for ArtistStreamProjection {
    fn name(&self) -> &str {
        "artist_streams"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::StreamRecorded]
    }

    async fn apply(&self, event: &DomainEvent) -> SubscriberResult {
        if let EventPayload::StreamRecorded {
            song_id,
            song_title,
            ..
        } = &event.payload
        {
            self.titles
                .write()
                .await
                .insert(*song_id, song_title.clone());
        }
        Ok(())
    }
}

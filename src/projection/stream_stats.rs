//! Running stream counters per song, per artist, and per day.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event::{DomainEvent, EventKind, EventPayload};
use crate::store::{EventSubscriber, SubscriberResult};

/// Stream counters for one song or one artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamStatistics {
    pub id: Uuid,
    pub total_streams: u64,
    pub monetized_streams: u64,
    pub non_monetized_streams: u64,
}

impl StreamStatistics {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            total_streams: 0,
            monetized_streams: 0,
            non_monetized_streams: 0,
        }
    }

    fn record(&mut self, monetized: bool) {
        self.total_streams += 1;
        if monetized {
            self.monetized_streams += 1;
        } else {
            self.non_monetized_streams += 1;
        }
    }

    /// Share of streams that were monetized, 0.0 when empty.
    pub fn monetization_rate(&self) -> f64 {
        if self.total_streams == 0 {
            return 0.0;
        }
        self.monetized_streams as f64 / self.total_streams as f64
    }
}

#[derive(Default)]
struct StatsState {
    by_song: HashMap<Uuid, StreamStatistics>,
    by_artist: HashMap<Uuid, StreamStatistics>,
    /// Stream count per song per UTC calendar day.
    daily_by_song: HashMap<NaiveDate, HashMap<Uuid, u64>>,
}

/// Counts every recorded stream as it happens.
#[derive(Default)]
pub struct StreamStatsProjection {
    state: RwLock<StatsState>,
}

impl StreamStatsProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for a song; zeroes if it was never streamed.
    pub async fn song_statistics(&self, song_id: Uuid) -> StreamStatistics {
        self.state
            .read()
            .await
            .by_song
            .get(&song_id)
            .cloned()
            .unwrap_or_else(|| StreamStatistics::new(song_id))
    }

    /// Counters for an artist; zeroes if never streamed.
    pub async fn artist_statistics(&self, artist_id: Uuid) -> StreamStatistics {
        self.state
            .read()
            .await
            .by_artist
            .get(&artist_id)
            .cloned()
            .unwrap_or_else(|| StreamStatistics::new(artist_id))
    }

    /// Streams of a song on one UTC calendar day.
    pub async fn daily_streams(&self, song_id: Uuid, day: NaiveDate) -> u64 {
        self.state
            .read()
            .await
            .daily_by_song
            .get(&day)
            .and_then(|per_song| per_song.get(&song_id))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl EventSubscriber for StreamStatsProjection {
    fn name(&self) -> &str {
        "stream_stats"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::StreamRecorded]
    }

    async fn apply(&self, event: &DomainEvent) -> SubscriberResult {
        if let EventPayload::StreamRecorded {
            song_id,
            artist_id,
            stream_at,
            monetized,
            ..
        } = &event.payload
        {
            let mut state = self.state.write().await;
            state
                .by_song
                .entry(*song_id)
                .or_insert_with(|| StreamStatistics::new(*song_id))
                .record(*monetized);
            state
                .by_artist
                .entry(*artist_id)
                .or_insert_with(|| StreamStatistics::new(*artist_id))
                .record(*monetized);
            let day = stream_at.date_naive();
            *state
                .daily_by_song
                .entry(day)
                .or_default()
                .entry(*song_id)
                .or_insert(0) += 1;
        }
        Ok(())
    }
}

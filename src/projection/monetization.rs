//! Running monetization totals.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event::{DomainEvent, EventKind, EventPayload};
use crate::store::{EventSubscriber, SubscriberResult};

/// A single monetized stream, as tracked for an artist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonetizedStream {
    pub stream_id: Uuid,
    pub song_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub amount: Decimal,
}

#[derive(Default)]
struct MonetizationState {
    artist_totals: HashMap<Uuid, Decimal>,
    song_totals: HashMap<Uuid, Decimal>,
    /// Chronological (append-order) monetized streams per artist.
    streams_by_artist: HashMap<Uuid, Vec<MonetizedStream>>,
}

/// Accumulates monetized amounts per artist and per song.
#[derive(Default)]
pub struct MonetizationProjection {
    state: RwLock<MonetizationState>,
}

impl MonetizationProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total monetized amount for an artist; zero if none.
    pub async fn artist_total(&self, artist_id: Uuid) -> Decimal {
        self.state
            .read()
            .await
            .artist_totals
            .get(&artist_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Total monetized amount for a song; zero if none.
    pub async fn song_total(&self, song_id: Uuid) -> Decimal {
        self.state
            .read()
            .await
            .song_totals
            .get(&song_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Monetized streams for an artist, optionally bounded to an
    /// inclusive window.
    pub async fn artist_monetized_streams(
        &self,
        artist_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Vec<MonetizedStream> {
        self.state
            .read()
            .await
            .streams_by_artist
            .get(&artist_id)
            .map(|streams| {
                streams
                    .iter()
                    .filter(|stream| {
                        from.map_or(true, |from| stream.recorded_at >= from)
                            && to.map_or(true, |to| stream.recorded_at <= to)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventSubscriber for MonetizationProjection {
    fn name(&self) -> &str {
        "monetization"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::StreamMonetized]
    }

    async fn apply(&self, event: &DomainEvent) -> SubscriberResult {
        if let EventPayload::StreamMonetized {
            song_id,
            artist_id,
            stream_at,
            amount,
            ..
        } = &event.payload
        {
            let mut state = self.state.write().await;
            *state.artist_totals.entry(*artist_id).or_insert(Decimal::ZERO) += *amount;
            *state.song_totals.entry(*song_id).or_insert(Decimal::ZERO) += *amount;
            state
                .streams_by_artist
                .entry(*artist_id)
                .or_default()
                .push(MonetizedStream {
                    stream_id: event.aggregate_id,
                    song_id: *song_id,
                    recorded_at: *stream_at,
                    amount: *amount,
                });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn monetized(
        stream_id: Uuid,
        song_id: Uuid,
        artist_id: Uuid,
        at: &str,
        amount: Decimal,
    ) -> DomainEvent {
        let at: DateTime<Utc> = at.parse().unwrap();
        DomainEvent::new(
            stream_id,
            at,
            EventPayload::StreamMonetized {
                song_id,
                artist_id,
                stream_at: at,
                duration: Duration::from_secs(45),
                amount,
            },
        )
    }

    #[tokio::test]
    async fn totals_accumulate_per_artist_and_song() {
        let projection = MonetizationProjection::new();
        let artist = Uuid::new_v4();
        let song = Uuid::new_v4();
        let other_song = Uuid::new_v4();

        projection
            .apply(&monetized(Uuid::new_v4(), song, artist, "2024-06-10T10:00:00Z", dec!(0.004)))
            .await
            .unwrap();
        projection
            .apply(&monetized(
                Uuid::new_v4(),
                other_song,
                artist,
                "2024-06-11T10:00:00Z",
                dec!(0.008),
            ))
            .await
            .unwrap();

        assert_eq!(projection.artist_total(artist).await, dec!(0.012));
        assert_eq!(projection.song_total(song).await, dec!(0.004));
        assert_eq!(projection.song_total(other_song).await, dec!(0.008));
        assert_eq!(projection.artist_total(Uuid::new_v4()).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn window_filter_is_inclusive_and_optional() {
        let projection = MonetizationProjection::new();
        let artist = Uuid::new_v4();
        let song = Uuid::new_v4();

        for at in [
            "2024-06-01T00:00:00Z",
            "2024-06-15T00:00:00Z",
            "2024-06-30T00:00:00Z",
        ] {
            projection
                .apply(&monetized(Uuid::new_v4(), song, artist, at, dec!(0.004)))
                .await
                .unwrap();
        }

        let all = projection.artist_monetized_streams(artist, None, None).await;
        assert_eq!(all.len(), 3);

        let bounded = projection
            .artist_monetized_streams(
                artist,
                Some("2024-06-15T00:00:00Z".parse().unwrap()),
                Some("2024-06-30T00:00:00Z".parse().unwrap()),
            )
            .await;
        assert_eq!(bounded.len(), 2);

        let tail = projection
            .artist_monetized_streams(artist, Some("2024-06-16T00:00:00Z".parse().unwrap()), None)
            .await;
        assert_eq!(tail.len(), 1);
    }
}

//! Payment and monetization reports.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::MonetizationConfig;
use crate::error::{DomainError, Result};
use crate::event::{DomainEvent, EventKind, EventPayload};
use crate::repository::{ArtistRepository, SongRepository, StreamRepository};
use crate::store::{EventSubscriber, SubscriberResult};

/// Per-song slice of a [`PaymentReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongPayment {
    pub song_id: Uuid,
    pub song_title: String,
    pub monetized_streams: u64,
    pub amount: Decimal,
}

/// What an artist is owed for monetizable streams in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentReport {
    pub report_id: Uuid,
    pub artist_id: Uuid,
    pub artist_name: String,
    pub total_monetized_streams: u64,
    pub total_amount: Decimal,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    /// Sorted by amount descending; ties resolve by song id.
    pub song_payments: Vec<SongPayment>,
}

/// Summary of an artist's monetization since the last payment
/// request (or an explicit window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonetizationReport {
    pub artist_id: Uuid,
    pub artist_name: String,
    pub total_streams: u64,
    pub monetizable_streams: u64,
    pub estimated_revenue: Decimal,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

/// Generates payment and monetization reports.
///
/// Report figures recompute from the repositories; the projection
/// itself only tracks when each artist last requested a payment
/// report, which seeds the default window of the summary report.
pub struct PaymentReportProjection {
    artists: Arc<dyn ArtistRepository>,
    songs: Arc<dyn SongRepository>,
    streams: Arc<dyn StreamRepository>,
    clock: Arc<dyn Clock>,
    monetization: MonetizationConfig,
    last_payment_requests: RwLock<HashMap<Uuid, DateTime<Utc>>>,
}

impl PaymentReportProjection {
    pub fn new(
        artists: Arc<dyn ArtistRepository>,
        songs: Arc<dyn SongRepository>,
        streams: Arc<dyn StreamRepository>,
        clock: Arc<dyn Clock>,
        monetization: MonetizationConfig,
    ) -> Self {
        Self {
            artists,
            songs,
            streams,
            clock,
            monetization,
            last_payment_requests: RwLock::new(HashMap::new()),
        }
    }

    /// Simplified payout model for reports: a flat rate per
    /// monetizable stream.
    fn amount_for(&self, stream_count: u64) -> Decimal {
        self.monetization.rate_per_minute * Decimal::from(stream_count)
    }

    /// When the artist last requested a payment report.
    pub async fn last_payment_request(&self, artist_id: Uuid) -> Option<DateTime<Utc>> {
        self.last_payment_requests
            .read()
            .await
            .get(&artist_id)
            .copied()
    }

    /// Build the payment report for an explicit inclusive window.
    pub async fn payment_report(
        &self,
        artist_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PaymentReport> {
        let artist = self
            .artists
            .find_by_id(artist_id)
            .await
            .ok_or(DomainError::not_found("artist", artist_id))?;

        let titles: HashMap<Uuid, String> = self
            .songs
            .find_by_artist(artist_id)
            .await
            .into_iter()
            .map(|song| (song.id(), song.title().to_string()))
            .collect();

        let monetizable = self
            .streams
            .find_monetizable_by_artist(artist_id, from, to)
            .await;

        let mut by_song: BTreeMap<Uuid, u64> = BTreeMap::new();
        for stream in &monetizable {
            *by_song.entry(stream.song_id()).or_insert(0) += 1;
        }

        let mut total_amount = Decimal::ZERO;
        let mut song_payments = Vec::with_capacity(by_song.len());
        for (song_id, count) in by_song {
            let amount = self.amount_for(count);
            total_amount += amount;
            song_payments.push(SongPayment {
                song_id,
                song_title: titles
                    .get(&song_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown Song".to_string()),
                monetized_streams: count,
                amount,
            });
        }
        song_payments.sort_by(|a, b| b.amount.cmp(&a.amount));

        Ok(PaymentReport {
            report_id: Uuid::new_v4(),
            artist_id,
            artist_name: artist.name().to_string(),
            total_monetized_streams: monetizable.len() as u64,
            total_amount,
            from,
            to,
            generated_at: self.clock.now(),
            song_payments,
        })
    }

    /// Build the monetization summary. A missing `from` defaults to
    /// the artist's last payment request (or the epoch); a missing
    /// `to` defaults to now.
    pub async fn monetization_report(
        &self,
        artist_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<MonetizationReport> {
        let artist = self
            .artists
            .find_by_id(artist_id)
            .await
            .ok_or(DomainError::not_found("artist", artist_id))?;

        let last_payment_at = self.last_payment_request(artist_id).await;
        let from = from
            .or(last_payment_at)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let to = to.unwrap_or_else(|| self.clock.now());

        let in_window: Vec<_> = self
            .streams
            .find_by_artist(artist_id)
            .await
            .into_iter()
            .filter(|stream| stream.recorded_at() >= from && stream.recorded_at() <= to)
            .collect();
        let monetizable = in_window
            .iter()
            .filter(|stream| stream.is_monetizable())
            .count() as u64;

        Ok(MonetizationReport {
            artist_id,
            artist_name: artist.name().to_string(),
            total_streams: in_window.len() as u64,
            monetizable_streams: monetizable,
            estimated_revenue: self.amount_for(monetizable),
            last_payment_at,
            from,
            to,
            generated_at: self.clock.now(),
        })
    }
}

#[async_trait]
impl EventSubscriber for PaymentReportProjection {
    fn name(&self) -> &str {
        "payment_reports"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::PaymentReportRequested]
    }

    async fn apply(&self, event: &DomainEvent) -> SubscriberResult {
        if let EventPayload::PaymentReportRequested { artist_id, .. } = &event.payload {
            self.last_payment_requests
                .write()
                .await
                .insert(*artist_id, self.clock.now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::domain::{Artist, Song, StreamRecord};
    use crate::repository::{
        InMemoryArtistRepository, InMemorySongRepository, InMemoryStreamRepository,
    };
    use rust_decimal_macros::dec;
    use std::time::Duration;

    const THRESHOLD: Duration = Duration::from_secs(30);

    struct Fixture {
        artists: Arc<InMemoryArtistRepository>,
        songs: Arc<InMemorySongRepository>,
        streams: Arc<InMemoryStreamRepository>,
        clock: Arc<FixedClock>,
        projection: PaymentReportProjection,
    }

    impl Fixture {
        fn new() -> Self {
            let artists = Arc::new(InMemoryArtistRepository::new());
            let songs = Arc::new(InMemorySongRepository::new());
            let streams = Arc::new(InMemoryStreamRepository::new(songs.clone()));
            let clock = Arc::new(FixedClock::at("2024-06-30T12:00:00Z".parse().unwrap()));
            let projection = PaymentReportProjection::new(
                artists.clone(),
                songs.clone(),
                streams.clone(),
                clock.clone(),
                MonetizationConfig::default(),
            );
            Self {
                artists,
                songs,
                streams,
                clock,
                projection,
            }
        }

        async fn seed(&self) -> (Artist, Song, Song) {
            let artist = Artist::new(Uuid::new_v4(), "Nova Rae", Uuid::new_v4()).unwrap();
            self.artists.save(artist.clone()).await;
            let hit = Song::new(
                Uuid::new_v4(),
                "Glasswork",
                artist.id(),
                Duration::from_secs(200),
            )
            .unwrap();
            let b_side = Song::new(
                Uuid::new_v4(),
                "Undertow",
                artist.id(),
                Duration::from_secs(190),
            )
            .unwrap();
            self.songs.save(hit.clone()).await;
            self.songs.save(b_side.clone()).await;
            (artist, hit, b_side)
        }

        async fn stream(&self, song_id: Uuid, at: &str, secs: u64) {
            self.streams
                .save(StreamRecord::new(
                    Uuid::new_v4(),
                    song_id,
                    Uuid::new_v4(),
                    at.parse().unwrap(),
                    Duration::from_secs(secs),
                    THRESHOLD,
                ))
                .await;
        }
    }

    #[tokio::test]
    async fn payment_report_sums_rate_times_count_sorted_by_amount() {
        let fx = Fixture::new();
        let (artist, hit, b_side) = fx.seed().await;

        // Three monetizable streams of the hit, one of the b-side,
        // one too short to count.
        fx.stream(hit.id(), "2024-06-10T10:00:00Z", 45).await;
        fx.stream(hit.id(), "2024-06-11T10:00:00Z", 45).await;
        fx.stream(hit.id(), "2024-06-12T10:00:00Z", 45).await;
        fx.stream(b_side.id(), "2024-06-12T11:00:00Z", 45).await;
        fx.stream(b_side.id(), "2024-06-13T11:00:00Z", 20).await;

        let report = fx
            .projection
            .payment_report(
                artist.id(),
                "2024-06-01T00:00:00Z".parse().unwrap(),
                "2024-06-30T00:00:00Z".parse().unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(report.total_monetized_streams, 4);
        assert_eq!(report.total_amount, dec!(0.016));
        assert_eq!(report.song_payments.len(), 2);
        assert_eq!(report.song_payments[0].song_id, hit.id());
        assert_eq!(report.song_payments[0].amount, dec!(0.012));
        assert_eq!(report.song_payments[1].amount, dec!(0.004));
        assert_eq!(report.generated_at, fx.clock.now());
    }

    #[tokio::test]
    async fn unknown_artist_is_rejected() {
        let fx = Fixture::new();
        let result = fx
            .projection
            .payment_report(
                Uuid::new_v4(),
                "2024-06-01T00:00:00Z".parse().unwrap(),
                "2024-06-30T00:00:00Z".parse().unwrap(),
            )
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn monetization_report_defaults_window_from_last_request() {
        let fx = Fixture::new();
        let (artist, hit, _) = fx.seed().await;
        fx.stream(hit.id(), "2024-06-10T10:00:00Z", 45).await;
        fx.stream(hit.id(), "2024-06-20T10:00:00Z", 45).await;

        // No request yet: window starts at the epoch, ends now.
        let report = fx
            .projection
            .monetization_report(artist.id(), None, None)
            .await
            .unwrap();
        assert_eq!(report.from, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(report.to, fx.clock.now());
        assert_eq!(report.total_streams, 2);
        assert_eq!(report.monetizable_streams, 2);
        assert_eq!(report.estimated_revenue, dec!(0.008));
        assert!(report.last_payment_at.is_none());

        // A payment request moves the default start forward.
        fx.clock.set("2024-06-15T00:00:00Z".parse().unwrap());
        let request_at: DateTime<Utc> = "2024-06-15T00:00:00Z".parse().unwrap();
        fx.projection
            .apply(&DomainEvent::new(
                artist.id(),
                request_at,
                EventPayload::PaymentReportRequested {
                    request_id: Uuid::new_v4(),
                    artist_id: artist.id(),
                    artist_name: artist.name().to_string(),
                    from: "2024-06-01T00:00:00Z".parse().unwrap(),
                    to: request_at,
                },
            ))
            .await
            .unwrap();
        fx.clock.set("2024-06-30T12:00:00Z".parse().unwrap());

        let report = fx
            .projection
            .monetization_report(artist.id(), None, None)
            .await
            .unwrap();
        assert_eq!(report.last_payment_at, Some(request_at));
        assert_eq!(report.from, request_at);
        // Only the stream after the request remains.
        assert_eq!(report.total_streams, 1);
        assert_eq!(report.estimated_revenue, dec!(0.004));
    }
}

//! Command handlers.
//!
//! One handler per command. Each is a single unit of work:
//! load -> authorize -> mutate -> persist -> emit. Every guard runs
//! before the first persistence or emission, so a rejected command
//! leaves no partial effects. Handlers that mutate a release hold
//! its lease (see [`AggregateLocks`]) for the whole span.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::MonetizationConfig;
use crate::domain::{Release, StreamRecord};
use crate::error::{DomainError, Result};
use crate::event::{DomainEvent, EventPayload};
use crate::repository::{
    ArtistRepository, LabelRepository, ReleaseRepository, SongRepository, StreamRepository,
};
use crate::store::EventStore;

use super::locks::AggregateLocks;
use super::{
    AddSongsToRelease, ApproveReleaseDate, CreateRelease, ProposeReleaseDate, PublishRelease,
    RecordStream, RequestPaymentReport, WithdrawRelease,
};

/// Handles [`CreateRelease`].
pub struct CreateReleaseHandler {
    artists: Arc<dyn ArtistRepository>,
    releases: Arc<dyn ReleaseRepository>,
    store: Arc<EventStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<AggregateLocks>,
}

impl CreateReleaseHandler {
    pub fn new(
        artists: Arc<dyn ArtistRepository>,
        releases: Arc<dyn ReleaseRepository>,
        store: Arc<EventStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<AggregateLocks>,
    ) -> Self {
        Self {
            artists,
            releases,
            store,
            clock,
            locks,
        }
    }

    /// Returns the created release.
    pub async fn handle(&self, command: CreateRelease) -> Result<Release> {
        let _lease = self.locks.acquire(command.release_id).await;

        let artist = self
            .artists
            .find_by_id(command.artist_id)
            .await
            .ok_or(DomainError::not_found("artist", command.artist_id))?;

        let release = Release::new(command.release_id, command.title, artist.id());
        self.releases.save(release.clone()).await;

        self.store
            .append(DomainEvent::new(
                release.id(),
                self.clock.now(),
                EventPayload::ReleaseCreated {
                    title: release.title().to_string(),
                    artist_id: release.artist_id(),
                },
            ))
            .await;

        info!(release.id = %release.id(), release.title = %release.title(), "Release created");
        Ok(release)
    }
}

/// Handles [`AddSongsToRelease`].
pub struct AddSongsHandler {
    releases: Arc<dyn ReleaseRepository>,
    songs: Arc<dyn SongRepository>,
    store: Arc<EventStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<AggregateLocks>,
}

impl AddSongsHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        songs: Arc<dyn SongRepository>,
        store: Arc<EventStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<AggregateLocks>,
    ) -> Self {
        Self {
            releases,
            songs,
            store,
            clock,
            locks,
        }
    }

    pub async fn handle(&self, command: AddSongsToRelease) -> Result<()> {
        let _lease = self.locks.acquire(command.release_id).await;

        let mut release = self
            .releases
            .find_by_id(command.release_id)
            .await
            .ok_or(DomainError::not_found("release", command.release_id))?;

        if release.artist_id() != command.artist_id {
            return Err(DomainError::rule("artist does not own this release"));
        }

        for song_id in &command.song_ids {
            let song = self
                .songs
                .find_by_id(*song_id)
                .await
                .ok_or(DomainError::not_found("song", *song_id))?;
            if !song.is_by(command.artist_id) {
                return Err(DomainError::rule("artist does not own all the songs"));
            }
        }

        release.add_songs(&command.song_ids)?;
        self.releases.save(release.clone()).await;

        self.store
            .append(DomainEvent::new(
                release.id(),
                self.clock.now(),
                EventPayload::SongsAddedToRelease {
                    song_ids: command.song_ids,
                    release_title: release.title().to_string(),
                    artist_id: release.artist_id(),
                },
            ))
            .await;

        Ok(())
    }
}

/// Handles [`ProposeReleaseDate`].
pub struct ProposeDateHandler {
    releases: Arc<dyn ReleaseRepository>,
    artists: Arc<dyn ArtistRepository>,
    store: Arc<EventStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<AggregateLocks>,
}

impl ProposeDateHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        artists: Arc<dyn ArtistRepository>,
        store: Arc<EventStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<AggregateLocks>,
    ) -> Self {
        Self {
            releases,
            artists,
            store,
            clock,
            locks,
        }
    }

    pub async fn handle(&self, command: ProposeReleaseDate) -> Result<()> {
        let _lease = self.locks.acquire(command.release_id).await;

        let mut release = self
            .releases
            .find_by_id(command.release_id)
            .await
            .ok_or(DomainError::not_found("release", command.release_id))?;

        if release.artist_id() != command.artist_id {
            return Err(DomainError::rule("artist does not own this release"));
        }

        let artist = self
            .artists
            .find_by_id(command.artist_id)
            .await
            .ok_or(DomainError::not_found("artist", command.artist_id))?;

        release.propose_date(command.proposed_date)?;
        self.releases.save(release.clone()).await;

        self.store
            .append(DomainEvent::new(
                release.id(),
                self.clock.now(),
                EventPayload::ReleaseDateProposed {
                    proposed_date: command.proposed_date,
                    release_title: release.title().to_string(),
                    artist_id: release.artist_id(),
                    label_id: artist.label_id(),
                },
            ))
            .await;

        Ok(())
    }
}

/// Handles [`ApproveReleaseDate`].
pub struct ApproveDateHandler {
    releases: Arc<dyn ReleaseRepository>,
    artists: Arc<dyn ArtistRepository>,
    labels: Arc<dyn LabelRepository>,
    store: Arc<EventStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<AggregateLocks>,
}

impl ApproveDateHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        artists: Arc<dyn ArtistRepository>,
        labels: Arc<dyn LabelRepository>,
        store: Arc<EventStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<AggregateLocks>,
    ) -> Self {
        Self {
            releases,
            artists,
            labels,
            store,
            clock,
            locks,
        }
    }

    pub async fn handle(&self, command: ApproveReleaseDate) -> Result<()> {
        let _lease = self.locks.acquire(command.release_id).await;

        let mut release = self
            .releases
            .find_by_id(command.release_id)
            .await
            .ok_or(DomainError::not_found("release", command.release_id))?;

        let artist = self
            .artists
            .find_by_id(release.artist_id())
            .await
            .ok_or(DomainError::not_found("artist", release.artist_id()))?;

        if !artist.is_signed_to(command.label_id) {
            return Err(DomainError::rule("label is not responsible for this artist"));
        }

        let label = self
            .labels
            .find_by_id(command.label_id)
            .await
            .ok_or(DomainError::not_found("label", command.label_id))?;

        if !label.can_approve(&release) {
            return Err(DomainError::rule("label cannot approve this release"));
        }

        release.approve_date(command.approved_date)?;
        self.releases.save(release.clone()).await;

        self.store
            .append(DomainEvent::new(
                release.id(),
                self.clock.now(),
                EventPayload::ReleaseDateApproved {
                    approved_date: command.approved_date,
                    release_title: release.title().to_string(),
                    artist_id: release.artist_id(),
                    label_id: label.id(),
                },
            ))
            .await;

        Ok(())
    }
}

/// Handles [`PublishRelease`].
pub struct PublishHandler {
    releases: Arc<dyn ReleaseRepository>,
    store: Arc<EventStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<AggregateLocks>,
}

impl PublishHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        store: Arc<EventStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<AggregateLocks>,
    ) -> Self {
        Self {
            releases,
            store,
            clock,
            locks,
        }
    }

    pub async fn handle(&self, command: PublishRelease) -> Result<()> {
        let _lease = self.locks.acquire(command.release_id).await;

        let mut release = self
            .releases
            .find_by_id(command.release_id)
            .await
            .ok_or(DomainError::not_found("release", command.release_id))?;

        let approved = release
            .approved_date()
            .ok_or_else(|| DomainError::rule("release has no approved date"))?;
        if approved > command.current_date {
            return Err(DomainError::rule(
                "approved release date has not been reached yet",
            ));
        }

        release.publish(command.current_date)?;
        self.releases.save(release.clone()).await;

        self.store
            .append(DomainEvent::new(
                release.id(),
                self.clock.now(),
                EventPayload::ReleasePublished {
                    published_date: command.current_date,
                    release_title: release.title().to_string(),
                    artist_id: release.artist_id(),
                    song_ids: release.song_ids().clone(),
                },
            ))
            .await;

        info!(
            release.id = %release.id(),
            release.title = %release.title(),
            published_date = %command.current_date,
            "Release published"
        );
        Ok(())
    }
}

/// Handles [`WithdrawRelease`].
pub struct WithdrawHandler {
    releases: Arc<dyn ReleaseRepository>,
    store: Arc<EventStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<AggregateLocks>,
}

impl WithdrawHandler {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        store: Arc<EventStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<AggregateLocks>,
    ) -> Self {
        Self {
            releases,
            store,
            clock,
            locks,
        }
    }

    pub async fn handle(&self, command: WithdrawRelease) -> Result<()> {
        let _lease = self.locks.acquire(command.release_id).await;

        let mut release = self
            .releases
            .find_by_id(command.release_id)
            .await
            .ok_or(DomainError::not_found("release", command.release_id))?;

        if release.artist_id() != command.artist_id {
            return Err(DomainError::rule("artist does not own this release"));
        }
        if !release.is_published() {
            return Err(DomainError::rule("only published releases can be withdrawn"));
        }

        release.withdraw()?;
        self.releases.save(release.clone()).await;

        self.store
            .append(DomainEvent::new(
                release.id(),
                self.clock.now(),
                EventPayload::ReleaseWithdrawn {
                    release_title: release.title().to_string(),
                    artist_id: release.artist_id(),
                    song_ids: release.song_ids().clone(),
                },
            ))
            .await;

        info!(release.id = %release.id(), release.title = %release.title(), "Release withdrawn");
        Ok(())
    }
}

/// Handles [`RecordStream`].
pub struct StreamHandler {
    songs: Arc<dyn SongRepository>,
    releases: Arc<dyn ReleaseRepository>,
    streams: Arc<dyn StreamRepository>,
    store: Arc<EventStore>,
    clock: Arc<dyn Clock>,
    monetization: MonetizationConfig,
}

impl StreamHandler {
    pub fn new(
        songs: Arc<dyn SongRepository>,
        releases: Arc<dyn ReleaseRepository>,
        streams: Arc<dyn StreamRepository>,
        store: Arc<EventStore>,
        clock: Arc<dyn Clock>,
        monetization: MonetizationConfig,
    ) -> Self {
        Self {
            songs,
            releases,
            streams,
            store,
            clock,
            monetization,
        }
    }

    /// Payout for one monetizable stream: rate per started minute.
    fn monetization_amount(&self, duration: Duration) -> Decimal {
        let started_minutes = duration.as_secs().div_ceil(60);
        self.monetization.rate_per_minute * Decimal::from(started_minutes)
    }

    pub async fn handle(&self, command: RecordStream) -> Result<()> {
        let song = self
            .songs
            .find_by_id(command.song_id)
            .await
            .ok_or(DomainError::not_found("song", command.song_id))?;

        let releases = self.releases.find_containing_song(command.song_id).await;
        if !releases.iter().any(Release::is_published) {
            return Err(DomainError::rule("song is not available for streaming"));
        }

        let stream = StreamRecord::new(
            Uuid::new_v4(),
            command.song_id,
            command.user_id,
            command.recorded_at,
            command.duration,
            Duration::from_secs(self.monetization.threshold_secs),
        );
        self.streams.save(stream.clone()).await;

        self.store
            .append(DomainEvent::new(
                stream.id(),
                self.clock.now(),
                EventPayload::StreamRecorded {
                    song_id: song.id(),
                    user_id: stream.user_id(),
                    artist_id: song.artist_id(),
                    song_title: song.title().to_string(),
                    stream_at: stream.recorded_at(),
                    duration: stream.duration(),
                    monetized: stream.is_monetizable(),
                },
            ))
            .await;

        if stream.is_monetizable() {
            let amount = self.monetization_amount(stream.duration());
            self.store
                .append(DomainEvent::new(
                    stream.id(),
                    self.clock.now(),
                    EventPayload::StreamMonetized {
                        song_id: song.id(),
                        artist_id: song.artist_id(),
                        stream_at: stream.recorded_at(),
                        duration: stream.duration(),
                        amount,
                    },
                ))
                .await;
            info!(stream.id = %stream.id(), song.id = %song.id(), %amount, "Stream monetized");
        }

        Ok(())
    }
}

/// Handles [`RequestPaymentReport`].
///
/// Write-side trigger only: verifies the artist and appends the
/// request event for the query side to pick up.
pub struct PaymentReportHandler {
    artists: Arc<dyn ArtistRepository>,
    store: Arc<EventStore>,
    clock: Arc<dyn Clock>,
}

impl PaymentReportHandler {
    pub fn new(
        artists: Arc<dyn ArtistRepository>,
        store: Arc<EventStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            artists,
            store,
            clock,
        }
    }

    pub async fn handle(&self, command: RequestPaymentReport) -> Result<()> {
        let artist = self
            .artists
            .find_by_id(command.artist_id)
            .await
            .ok_or(DomainError::not_found("artist", command.artist_id))?;

        self.store
            .append(DomainEvent::new(
                artist.id(),
                self.clock.now(),
                EventPayload::PaymentReportRequested {
                    request_id: command.request_id,
                    artist_id: artist.id(),
                    artist_name: artist.name().to_string(),
                    from: command.from,
                    to: command.to,
                },
            ))
            .await;

        Ok(())
    }
}

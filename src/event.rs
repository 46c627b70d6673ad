//! Domain events.
//!
//! Immutable facts appended by command handlers and fanned out to
//! projections. Payloads are enriched with the fields read models
//! need so projections never have to chase the write side.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag identifying a concrete event variant, used as the
/// subscription registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ReleaseCreated,
    SongsAddedToRelease,
    ReleaseDateProposed,
    ReleaseDateApproved,
    ReleasePublished,
    ReleaseWithdrawn,
    StreamRecorded,
    StreamMonetized,
    PaymentReportRequested,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Event-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EventPayload {
    ReleaseCreated {
        title: String,
        artist_id: Uuid,
    },
    SongsAddedToRelease {
        song_ids: BTreeSet<Uuid>,
        release_title: String,
        artist_id: Uuid,
    },
    ReleaseDateProposed {
        proposed_date: NaiveDate,
        release_title: String,
        artist_id: Uuid,
        label_id: Uuid,
    },
    ReleaseDateApproved {
        approved_date: NaiveDate,
        release_title: String,
        artist_id: Uuid,
        label_id: Uuid,
    },
    ReleasePublished {
        published_date: NaiveDate,
        release_title: String,
        artist_id: Uuid,
        song_ids: BTreeSet<Uuid>,
    },
    ReleaseWithdrawn {
        release_title: String,
        artist_id: Uuid,
        song_ids: BTreeSet<Uuid>,
    },
    StreamRecorded {
        song_id: Uuid,
        user_id: Uuid,
        artist_id: Uuid,
        song_title: String,
        stream_at: DateTime<Utc>,
        duration: Duration,
        monetized: bool,
    },
    StreamMonetized {
        song_id: Uuid,
        artist_id: Uuid,
        stream_at: DateTime<Utc>,
        duration: Duration,
        amount: Decimal,
    },
    PaymentReportRequested {
        request_id: Uuid,
        artist_id: Uuid,
        artist_name: String,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl EventPayload {
    /// The variant tag of this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ReleaseCreated { .. } => EventKind::ReleaseCreated,
            Self::SongsAddedToRelease { .. } => EventKind::SongsAddedToRelease,
            Self::ReleaseDateProposed { .. } => EventKind::ReleaseDateProposed,
            Self::ReleaseDateApproved { .. } => EventKind::ReleaseDateApproved,
            Self::ReleasePublished { .. } => EventKind::ReleasePublished,
            Self::ReleaseWithdrawn { .. } => EventKind::ReleaseWithdrawn,
            Self::StreamRecorded { .. } => EventKind::StreamRecorded,
            Self::StreamMonetized { .. } => EventKind::StreamMonetized,
            Self::PaymentReportRequested { .. } => EventKind::PaymentReportRequested,
        }
    }
}

/// Envelope around an [`EventPayload`].
///
/// `aggregate_id` is the release id for release events, the stream
/// id for stream events, and the artist id for payment requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub aggregate_id: Uuid,
    pub payload: EventPayload,
}

impl DomainEvent {
    /// Wrap a payload in a fresh envelope. The timestamp comes from
    /// the caller's clock; events never read ambient time.
    pub fn new(aggregate_id: Uuid, recorded_at: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at,
            aggregate_id,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_payload() {
        let event = DomainEvent::new(
            Uuid::new_v4(),
            Utc::now(),
            EventPayload::ReleaseCreated {
                title: "Night Drive".into(),
                artist_id: Uuid::new_v4(),
            },
        );
        assert_eq!(event.kind(), EventKind::ReleaseCreated);
    }

    #[test]
    fn envelopes_get_unique_ids() {
        let aggregate = Uuid::new_v4();
        let payload = EventPayload::ReleaseWithdrawn {
            release_title: "Night Drive".into(),
            artist_id: Uuid::new_v4(),
            song_ids: BTreeSet::new(),
        };
        let first = DomainEvent::new(aggregate, Utc::now(), payload.clone());
        let second = DomainEvent::new(aggregate, Utc::now(), payload);
        assert_ne!(first.id, second.id);
    }
}

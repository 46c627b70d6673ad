//! Commands and their handlers.
//!
//! A command is an intent to change state. Construction validates
//! shape (blank titles, empty song sets, inverted windows, past
//! dates) and fails fast with `InvalidInput` before any repository
//! access; handlers then enforce existence, ownership, and the
//! aggregate state machine.

mod dispatcher;
mod handlers;
mod locks;

pub use dispatcher::{Command, CommandDispatcher, Dispatched};
pub use handlers::{
    AddSongsHandler, ApproveDateHandler, CreateReleaseHandler, PaymentReportHandler,
    ProposeDateHandler, PublishHandler, StreamHandler, WithdrawHandler,
};
pub use locks::AggregateLocks;

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{DomainError, Result};

/// Validation failure messages.
pub(crate) mod errmsg {
    pub const RELEASE_TITLE_EMPTY: &str = "release title cannot be empty";
    pub const SONG_SET_EMPTY: &str = "song id set cannot be empty";
    pub const PROPOSED_DATE_PAST: &str = "proposed date cannot be in the past";
    pub const WINDOW_INVERTED: &str = "window start cannot be after window end";
}

/// Create a new release in draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRelease {
    pub release_id: Uuid,
    pub title: String,
    pub artist_id: Uuid,
}

impl CreateRelease {
    pub fn new(release_id: Uuid, title: impl Into<String>, artist_id: Uuid) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::invalid_input(errmsg::RELEASE_TITLE_EMPTY));
        }
        Ok(Self {
            release_id,
            title,
            artist_id,
        })
    }
}

/// Add songs to a release owned by the commanding artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddSongsToRelease {
    pub release_id: Uuid,
    pub song_ids: BTreeSet<Uuid>,
    pub artist_id: Uuid,
}

impl AddSongsToRelease {
    pub fn new(release_id: Uuid, song_ids: BTreeSet<Uuid>, artist_id: Uuid) -> Result<Self> {
        if song_ids.is_empty() {
            return Err(DomainError::invalid_input(errmsg::SONG_SET_EMPTY));
        }
        Ok(Self {
            release_id,
            song_ids,
            artist_id,
        })
    }
}

/// Propose a release date to the label.
///
/// `today` comes from the caller's clock; commands never read
/// ambient time themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposeReleaseDate {
    pub release_id: Uuid,
    pub artist_id: Uuid,
    pub proposed_date: NaiveDate,
}

impl ProposeReleaseDate {
    pub fn new(
        release_id: Uuid,
        artist_id: Uuid,
        proposed_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self> {
        if proposed_date < today {
            return Err(DomainError::invalid_input(errmsg::PROPOSED_DATE_PAST));
        }
        Ok(Self {
            release_id,
            artist_id,
            proposed_date,
        })
    }
}

/// Approve a proposed release date on behalf of the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveReleaseDate {
    pub release_id: Uuid,
    pub label_id: Uuid,
    pub approved_date: NaiveDate,
}

impl ApproveReleaseDate {
    pub fn new(release_id: Uuid, label_id: Uuid, approved_date: NaiveDate) -> Self {
        Self {
            release_id,
            label_id,
            approved_date,
        }
    }
}

/// Publish a release whose approved date has been reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRelease {
    pub release_id: Uuid,
    pub current_date: NaiveDate,
}

impl PublishRelease {
    pub fn new(release_id: Uuid, current_date: NaiveDate) -> Self {
        Self {
            release_id,
            current_date,
        }
    }
}

/// Withdraw a published release from distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawRelease {
    pub release_id: Uuid,
    pub artist_id: Uuid,
}

impl WithdrawRelease {
    pub fn new(release_id: Uuid, artist_id: Uuid) -> Self {
        Self {
            release_id,
            artist_id,
        }
    }
}

/// Record a single play of a song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStream {
    pub song_id: Uuid,
    pub user_id: Uuid,
    pub duration: Duration,
    pub recorded_at: DateTime<Utc>,
}

impl RecordStream {
    pub fn new(song_id: Uuid, user_id: Uuid, duration: Duration, recorded_at: DateTime<Utc>) -> Self {
        Self {
            song_id,
            user_id,
            duration,
            recorded_at,
        }
    }
}

/// Request a payment report for an artist's monetized streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPaymentReport {
    pub request_id: Uuid,
    pub artist_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl RequestPaymentReport {
    pub fn new(
        request_id: Uuid,
        artist_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Self> {
        if from > to {
            return Err(DomainError::invalid_input(errmsg::WINDOW_INVERTED));
        }
        Ok(Self {
            request_id,
            artist_id,
            from,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn create_release_rejects_blank_title() {
        let result = CreateRelease::new(Uuid::new_v4(), "  ", Uuid::new_v4());
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn add_songs_rejects_empty_set() {
        let result = AddSongsToRelease::new(Uuid::new_v4(), BTreeSet::new(), Uuid::new_v4());
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn propose_rejects_past_dates_but_allows_today() {
        let today = date("2024-06-15");
        assert!(matches!(
            ProposeReleaseDate::new(Uuid::new_v4(), Uuid::new_v4(), date("2024-06-14"), today),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(ProposeReleaseDate::new(Uuid::new_v4(), Uuid::new_v4(), today, today).is_ok());
    }

    #[test]
    fn payment_report_rejects_inverted_window() {
        let from: DateTime<Utc> = "2024-06-30T00:00:00Z".parse().unwrap();
        let to: DateTime<Utc> = "2024-06-01T00:00:00Z".parse().unwrap();
        let result = RequestPaymentReport::new(Uuid::new_v4(), Uuid::new_v4(), from, to);
        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
        assert!(RequestPaymentReport::new(Uuid::new_v4(), Uuid::new_v4(), to, from).is_ok());
    }
}

//! Release aggregate root and its lifecycle state machine.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{DomainError, Result};

/// Lifecycle status of a release.
///
/// Transitions move strictly forward:
/// `Draft -> Proposed -> Approved -> Published -> Withdrawn`.
/// Re-proposing while `Proposed` or `Approved` resets to `Proposed`;
/// `Withdrawn` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseStatus {
    Draft,
    Proposed,
    Approved,
    Published,
    Withdrawn,
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::Proposed => "proposed",
            Self::Approved => "approved",
            Self::Published => "published",
            Self::Withdrawn => "withdrawn",
        };
        f.write_str(name)
    }
}

/// A music release: a titled set of songs moving through the
/// negotiation lifecycle with its label.
///
/// Mutations are only reachable through command handlers, which
/// enforce ownership before calling into the aggregate; the
/// aggregate itself enforces the state machine. Guard failures
/// leave the state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    id: Uuid,
    title: String,
    artist_id: Uuid,
    song_ids: BTreeSet<Uuid>,
    proposed_date: Option<NaiveDate>,
    approved_date: Option<NaiveDate>,
    published_date: Option<NaiveDate>,
    status: ReleaseStatus,
}

impl Release {
    /// Create a new release in `Draft`.
    pub fn new(id: Uuid, title: impl Into<String>, artist_id: Uuid) -> Self {
        Self {
            id,
            title: title.into(),
            artist_id,
            song_ids: BTreeSet::new(),
            proposed_date: None,
            approved_date: None,
            published_date: None,
            status: ReleaseStatus::Draft,
        }
    }

    /// Union songs into the release. Idempotent; already-present ids
    /// are a no-op. Fails once the release is withdrawn.
    pub fn add_songs(&mut self, song_ids: &BTreeSet<Uuid>) -> Result<()> {
        if self.status == ReleaseStatus::Withdrawn {
            return Err(DomainError::rule("cannot add songs to a withdrawn release"));
        }
        self.song_ids.extend(song_ids.iter().copied());
        Ok(())
    }

    /// Propose (or re-propose) a release date. Resets status to
    /// `Proposed`, so a previously approved date needs re-approval.
    pub fn propose_date(&mut self, date: NaiveDate) -> Result<()> {
        if self.status == ReleaseStatus::Withdrawn {
            return Err(DomainError::rule(
                "cannot propose a release date for a withdrawn release",
            ));
        }
        self.proposed_date = Some(date);
        self.status = ReleaseStatus::Proposed;
        Ok(())
    }

    /// Approve a release date. Only valid while a proposal is pending.
    pub fn approve_date(&mut self, date: NaiveDate) -> Result<()> {
        if self.status != ReleaseStatus::Proposed {
            return Err(DomainError::rule(
                "cannot approve a date for a release that has not been proposed",
            ));
        }
        self.approved_date = Some(date);
        self.status = ReleaseStatus::Approved;
        Ok(())
    }

    /// Publish the release once the approved date has been reached.
    pub fn publish(&mut self, current_date: NaiveDate) -> Result<()> {
        if self.status != ReleaseStatus::Approved {
            return Err(DomainError::rule(
                "cannot publish a release that has not been approved",
            ));
        }
        match self.approved_date {
            Some(approved) if approved > current_date => {
                return Err(DomainError::rule(
                    "cannot publish a release before its approved date",
                ));
            }
            Some(_) => {}
            // Unreachable through the state machine; Approved implies a date.
            None => {
                return Err(DomainError::rule("release has no approved date"));
            }
        }
        self.published_date = Some(current_date);
        self.status = ReleaseStatus::Published;
        Ok(())
    }

    /// Withdraw the release from distribution. Terminal; the song set
    /// and dates are retained for audit.
    pub fn withdraw(&mut self) -> Result<()> {
        if self.status != ReleaseStatus::Published {
            return Err(DomainError::rule("only published releases can be withdrawn"));
        }
        self.status = ReleaseStatus::Withdrawn;
        Ok(())
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

    pub fn song_ids(&self) -> &BTreeSet<Uuid> {
        &self.song_ids
    }

    pub fn proposed_date(&self) -> Option<NaiveDate> {
        self.proposed_date
    }

    pub fn approved_date(&self) -> Option<NaiveDate> {
        self.approved_date
    }

    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published_date
    }

    pub fn status(&self) -> ReleaseStatus {
        self.status
    }

    pub fn is_published(&self) -> bool {
        self.status == ReleaseStatus::Published
    }

    pub fn is_withdrawn(&self) -> bool {
        self.status == ReleaseStatus::Withdrawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn draft() -> Release {
        Release::new(Uuid::new_v4(), "Night Drive", Uuid::new_v4())
    }

    fn approved() -> Release {
        let mut release = draft();
        release.propose_date(date("2024-07-01")).unwrap();
        release.approve_date(date("2024-07-01")).unwrap();
        release
    }

    fn published() -> Release {
        let mut release = approved();
        release.publish(date("2024-07-01")).unwrap();
        release
    }

    #[test]
    fn starts_in_draft_with_no_songs() {
        let release = draft();
        assert_eq!(release.status(), ReleaseStatus::Draft);
        assert!(release.song_ids().is_empty());
        assert!(release.proposed_date().is_none());
    }

    #[test]
    fn add_songs_unions_idempotently() {
        let mut release = draft();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        release.add_songs(&BTreeSet::from([a, b])).unwrap();
        release.add_songs(&BTreeSet::from([a])).unwrap();
        assert_eq!(release.song_ids().len(), 2);
    }

    #[test]
    fn add_songs_rejected_after_withdrawal() {
        let mut release = published();
        release.withdraw().unwrap();
        let before = release.clone();
        let result = release.add_songs(&BTreeSet::from([Uuid::new_v4()]));
        assert!(matches!(result, Err(DomainError::RuleViolation(_))));
        assert_eq!(release, before);
    }

    #[test]
    fn propose_moves_to_proposed() {
        let mut release = draft();
        release.propose_date(date("2024-07-01")).unwrap();
        assert_eq!(release.status(), ReleaseStatus::Proposed);
        assert_eq!(release.proposed_date(), Some(date("2024-07-01")));
    }

    #[test]
    fn repropose_after_approval_resets_to_proposed() {
        let mut release = approved();
        release.propose_date(date("2024-08-01")).unwrap();
        assert_eq!(release.status(), ReleaseStatus::Proposed);
        assert_eq!(release.proposed_date(), Some(date("2024-08-01")));
        // The earlier approval no longer authorizes publishing.
        let result = release.publish(date("2024-08-01"));
        assert!(matches!(result, Err(DomainError::RuleViolation(_))));
    }

    #[test]
    fn approve_requires_proposed() {
        let mut release = draft();
        let result = release.approve_date(date("2024-07-01"));
        assert!(matches!(result, Err(DomainError::RuleViolation(_))));
        assert_eq!(release.status(), ReleaseStatus::Draft);
    }

    #[test]
    fn publish_requires_approved() {
        let mut release = draft();
        let result = release.publish(date("2024-07-01"));
        assert!(matches!(result, Err(DomainError::RuleViolation(_))));
        assert_eq!(release.status(), ReleaseStatus::Draft);
    }

    #[test]
    fn publish_before_approved_date_is_rejected() {
        let mut release = approved();
        let result = release.publish(date("2024-06-30"));
        assert!(matches!(result, Err(DomainError::RuleViolation(_))));
        assert_eq!(release.status(), ReleaseStatus::Approved);
        assert!(release.published_date().is_none());
    }

    #[test]
    fn publish_on_or_after_approved_date_succeeds() {
        let mut on_the_day = approved();
        on_the_day.publish(date("2024-07-01")).unwrap();
        assert!(on_the_day.is_published());
        assert_eq!(on_the_day.published_date(), Some(date("2024-07-01")));

        let mut later = approved();
        later.publish(date("2024-07-15")).unwrap();
        assert!(later.is_published());
        assert_eq!(later.published_date(), Some(date("2024-07-15")));
    }

    #[test]
    fn withdraw_only_from_published() {
        for mut release in [draft(), approved()] {
            let status = release.status();
            let result = release.withdraw();
            assert!(matches!(result, Err(DomainError::RuleViolation(_))));
            assert_eq!(release.status(), status);
        }

        let mut release = published();
        release.withdraw().unwrap();
        assert!(release.is_withdrawn());
    }

    #[test]
    fn withdraw_is_terminal() {
        let mut release = published();
        let songs = BTreeSet::from([Uuid::new_v4()]);
        release.add_songs(&songs).unwrap();
        release.withdraw().unwrap();

        assert!(release.propose_date(date("2024-09-01")).is_err());
        assert!(release.withdraw().is_err());
        // Audit trail is retained.
        assert_eq!(release.song_ids(), &songs);
        assert!(release.published_date().is_some());
    }
}

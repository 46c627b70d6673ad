//! Stream (song play) aggregate.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A single play of a song. Immutable once created.
///
/// The monetizable flag is derived once at construction: a stream
/// earns only if it lasted strictly longer than the threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    id: Uuid,
    song_id: Uuid,
    user_id: Uuid,
    recorded_at: DateTime<Utc>,
    duration: Duration,
    monetized: bool,
}

impl StreamRecord {
    /// Create a new stream record. `threshold` is the minimum
    /// duration that must be strictly exceeded for monetization.
    pub fn new(
        id: Uuid,
        song_id: Uuid,
        user_id: Uuid,
        recorded_at: DateTime<Utc>,
        duration: Duration,
        threshold: Duration,
    ) -> Self {
        Self {
            id,
            song_id,
            user_id,
            recorded_at,
            duration,
            monetized: duration.as_secs() > threshold.as_secs(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn song_id(&self) -> Uuid {
        self.song_id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether this stream is eligible for payment calculation.
    pub fn is_monetizable(&self) -> bool {
        self.monetized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: Duration = Duration::from_secs(30);

    fn stream_of(duration: Duration) -> StreamRecord {
        StreamRecord::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc::now(),
            duration,
            THRESHOLD,
        )
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!stream_of(Duration::from_secs(30)).is_monetizable());
        assert!(stream_of(Duration::from_secs(31)).is_monetizable());
    }

    #[test]
    fn zero_duration_is_not_monetizable() {
        assert!(!stream_of(Duration::ZERO).is_monetizable());
    }
}

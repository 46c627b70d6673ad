//! Searchable-song index.
//!
//! Tracks which songs belong to which release and which releases
//! are currently published. A song is searchable while at least one
//! release containing it is published and not withdrawn.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event::{DomainEvent, EventKind, EventPayload};
use crate::store::{EventSubscriber, SubscriberResult};

#[derive(Default)]
struct SearchState {
    songs_by_release: HashMap<Uuid, BTreeSet<Uuid>>,
    published_releases: HashSet<Uuid>,
}

/// Maintains the set of songs available for title search.
#[derive(Default)]
pub struct SongSearchProjection {
    state: RwLock<SearchState>,
}

impl SongSearchProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of all songs in currently published releases.
    pub async fn searchable_song_ids(&self) -> BTreeSet<Uuid> {
        let state = self.state.read().await;
        state
            .published_releases
            .iter()
            .filter_map(|release_id| state.songs_by_release.get(release_id))
            .flatten()
            .copied()
            .collect()
    }

    /// Whether a song is currently searchable.
    pub async fn is_searchable(&self, song_id: Uuid) -> bool {
        let state = self.state.read().await;
        state.published_releases.iter().any(|release_id| {
            state
                .songs_by_release
                .get(release_id)
                .is_some_and(|songs| songs.contains(&song_id))
        })
    }
}

#[async_trait]
impl EventSubscriber for SongSearchProjection {
    fn name(&self) -> &str {
        "song_search"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[
            EventKind::SongsAddedToRelease,
            EventKind::ReleasePublished,
            EventKind::ReleaseWithdrawn,
        ]
    }

    async fn apply(&self, event: &DomainEvent) -> SubscriberResult {
        let mut state = self.state.write().await;
        match &event.payload {
            EventPayload::SongsAddedToRelease { song_ids, .. } => {
                state
                    .songs_by_release
                    .entry(event.aggregate_id)
                    .or_default()
                    .extend(song_ids.iter().copied());
            }
            EventPayload::ReleasePublished { song_ids, .. } => {
                // The publish event carries the full song set, so the
                // index stays correct even when rebuilt from this
                // event alone.
                state
                    .songs_by_release
                    .entry(event.aggregate_id)
                    .or_default()
                    .extend(song_ids.iter().copied());
                state.published_releases.insert(event.aggregate_id);
            }
            EventPayload::ReleaseWithdrawn { .. } => {
                state.published_releases.remove(&event.aggregate_id);
            }
            _ => {}
        }
        Ok(())
    }
}

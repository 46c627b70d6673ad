//! Fuzzy title search over currently distributable songs.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Song;
use crate::projection::SongSearchProjection;
use crate::repository::SongRepository;

/// Classic Levenshtein edit distance: unit-cost insertions,
/// deletions, and substitutions, computed over Unicode scalar
/// values with a two-row matrix.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Title search over the searchable set maintained by
/// [`SongSearchProjection`].
pub struct SongSearchService {
    songs: Arc<dyn SongRepository>,
    index: Arc<SongSearchProjection>,
}

impl SongSearchService {
    pub fn new(songs: Arc<dyn SongRepository>, index: Arc<SongSearchProjection>) -> Self {
        Self { songs, index }
    }

    /// All searchable songs whose case-folded title is within
    /// `max_distance` edits of the case-folded query. An empty
    /// query matches nothing; distance 0 is an exact
    /// (case-insensitive) match. Result order is unspecified.
    pub async fn search_by_title(&self, query: &str, max_distance: usize) -> Vec<Song> {
        if query.is_empty() {
            return Vec::new();
        }
        let query = query.to_lowercase();

        let mut matches = Vec::new();
        for song_id in self.index.searchable_song_ids().await {
            let Some(song) = self.songs.find_by_id(song_id).await else {
                continue;
            };
            if levenshtein(&query, &song.title().to_lowercase()) <= max_distance {
                matches.push(song);
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{DomainEvent, EventPayload};
    use crate::repository::InMemorySongRepository;
    use crate::store::EventSubscriber;
    use chrono::Utc;
    use std::collections::BTreeSet;
    use std::time::Duration;

    #[test]
    fn distance_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "kitten"), 0);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("bad habi", "bad habits"), 2);
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(levenshtein("winter", "winter wonder"), 7);
        assert_eq!(levenshtein("winter wonder", "winter"), 7);
    }

    async fn fixture_with_published_song(title: &str) -> (SongSearchService, Song) {
        let songs = Arc::new(InMemorySongRepository::new());
        let index = Arc::new(SongSearchProjection::new());

        let song = Song::new(Uuid::new_v4(), title, Uuid::new_v4(), Duration::from_secs(200))
            .unwrap();
        songs.save(song.clone()).await;

        let release_id = Uuid::new_v4();
        index
            .apply(&DomainEvent::new(
                release_id,
                Utc::now(),
                EventPayload::ReleasePublished {
                    published_date: "2024-07-01".parse().unwrap(),
                    release_title: "Night Drive".into(),
                    artist_id: Uuid::new_v4(),
                    song_ids: BTreeSet::from([song.id()]),
                },
            ))
            .await
            .unwrap();

        let service = SongSearchService::new(songs, index);
        (service, song)
    }

    #[tokio::test]
    async fn near_miss_matches_within_distance() {
        let (service, song) = fixture_with_published_song("Bad Habits").await;

        let matches = service.search_by_title("Bad Habi", 2).await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id(), song.id());

        // One edit short of the gap.
        assert!(service.search_by_title("Bad Habi", 1).await.is_empty());
    }

    #[tokio::test]
    async fn exact_match_is_case_insensitive() {
        let (service, song) = fixture_with_published_song("Bad Habits").await;
        let matches = service.search_by_title("bad habits", 0).await;
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id(), song.id());
    }

    #[tokio::test]
    async fn empty_query_matches_nothing() {
        let (service, _) = fixture_with_published_song("Bad Habits").await;
        assert!(service.search_by_title("", 10).await.is_empty());
    }

    #[tokio::test]
    async fn unreleased_songs_are_invisible() {
        let songs = Arc::new(InMemorySongRepository::new());
        let index = Arc::new(SongSearchProjection::new());
        let song = Song::new(
            Uuid::new_v4(),
            "Winter Wonder",
            Uuid::new_v4(),
            Duration::from_secs(200),
        )
        .unwrap();
        songs.save(song).await;

        let service = SongSearchService::new(songs, index);
        assert!(service.search_by_title("Winter", 0).await.is_empty());
        assert!(service.search_by_title("Winter Wonder", 0).await.is_empty());
    }
}

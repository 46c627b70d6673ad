//! Projections and read models.
//!
//! Each projection subscribes to a fixed subset of event kinds and
//! keeps its own query-optimized state behind a single mutation
//! entry point. Report generators recompute from repositories on
//! demand for accuracy; the incrementally-updated state serves the
//! running-total queries.

mod artist_streams;
mod monetization;
mod payment;
mod song_search;
mod stream_stats;

pub use artist_streams::{ArtistStreamProjection, ArtistStreamReport, SongStreamStats};
pub use monetization::{MonetizationProjection, MonetizedStream};
pub use payment::{MonetizationReport, PaymentReport, PaymentReportProjection, SongPayment};
pub use song_search::SongSearchProjection;
pub use stream_stats::{StreamStatistics, StreamStatsProjection};

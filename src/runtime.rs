//! Composition root.
//!
//! Wires repositories, the event store, projections, and the
//! command dispatcher into a ready-to-use core. Embedders and
//! integration tests build one of these; production wiring beyond
//! it (transports, schedulers) stays outside the crate.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::clock::Clock;
use crate::command::{
    AddSongsHandler, AggregateLocks, ApproveDateHandler, CommandDispatcher, CreateReleaseHandler,
    PaymentReportHandler, ProposeDateHandler, PublishHandler, StreamHandler, WithdrawHandler,
};
use crate::config::{Config, LOG_ENV_VAR};
use crate::projection::{
    ArtistStreamProjection, MonetizationProjection, PaymentReportProjection, SongSearchProjection,
    StreamStatsProjection,
};
use crate::publisher::ReleasePublisher;
use crate::repository::{
    ArtistRepository, InMemoryArtistRepository, InMemoryLabelRepository,
    InMemoryReleaseRepository, InMemorySongRepository, InMemoryStreamRepository, LabelRepository,
    ReleaseRepository, SongRepository, StreamRepository,
};
use crate::search::SongSearchService;
use crate::store::EventStore;

/// Initialize tracing with the `CHORUS_LOG` environment variable.
///
/// Defaults to "info" level if `CHORUS_LOG` is not set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// A fully wired core: write side, event store, and read side.
///
/// `Clone` is cheap; all state is `Arc`-wrapped and shared.
#[derive(Clone)]
pub struct Core {
    pub clock: Arc<dyn Clock>,
    pub artists: Arc<dyn ArtistRepository>,
    pub labels: Arc<dyn LabelRepository>,
    pub songs: Arc<dyn SongRepository>,
    pub releases: Arc<dyn ReleaseRepository>,
    pub streams: Arc<dyn StreamRepository>,
    pub store: Arc<EventStore>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub artist_streams: Arc<ArtistStreamProjection>,
    pub payments: Arc<PaymentReportProjection>,
    pub monetization: Arc<MonetizationProjection>,
    pub stream_stats: Arc<StreamStatsProjection>,
    pub search_index: Arc<SongSearchProjection>,
    pub search: Arc<SongSearchService>,
    pub publisher: Arc<ReleasePublisher>,
}

impl Core {
    /// Assemble the core on in-memory storage: build repositories
    /// and the store, register every projection, and wire one
    /// handler per command into the dispatcher.
    pub async fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        let artists: Arc<InMemoryArtistRepository> = Arc::new(InMemoryArtistRepository::new());
        let labels: Arc<InMemoryLabelRepository> = Arc::new(InMemoryLabelRepository::new());
        let songs: Arc<InMemorySongRepository> = Arc::new(InMemorySongRepository::new());
        let releases: Arc<InMemoryReleaseRepository> = Arc::new(InMemoryReleaseRepository::new());
        let streams = Arc::new(InMemoryStreamRepository::new(songs.clone()));

        let store = Arc::new(EventStore::new());
        let locks = Arc::new(AggregateLocks::new());

        let artist_streams = Arc::new(ArtistStreamProjection::new(
            artists.clone(),
            songs.clone(),
            streams.clone(),
        ));
        let payments = Arc::new(PaymentReportProjection::new(
            artists.clone(),
            songs.clone(),
            streams.clone(),
            clock.clone(),
            config.monetization.clone(),
        ));
        let monetization = Arc::new(MonetizationProjection::new());
        let stream_stats = Arc::new(StreamStatsProjection::new());
        let search_index = Arc::new(SongSearchProjection::new());

        store.subscribe(artist_streams.clone()).await;
        store.subscribe(payments.clone()).await;
        store.subscribe(monetization.clone()).await;
        store.subscribe(stream_stats.clone()).await;
        store.subscribe(search_index.clone()).await;

        let dispatcher = Arc::new(CommandDispatcher::new(
            CreateReleaseHandler::new(
                artists.clone(),
                releases.clone(),
                store.clone(),
                clock.clone(),
                locks.clone(),
            ),
            AddSongsHandler::new(
                releases.clone(),
                songs.clone(),
                store.clone(),
                clock.clone(),
                locks.clone(),
            ),
            ProposeDateHandler::new(
                releases.clone(),
                artists.clone(),
                store.clone(),
                clock.clone(),
                locks.clone(),
            ),
            ApproveDateHandler::new(
                releases.clone(),
                artists.clone(),
                labels.clone(),
                store.clone(),
                clock.clone(),
                locks.clone(),
            ),
            PublishHandler::new(
                releases.clone(),
                store.clone(),
                clock.clone(),
                locks.clone(),
            ),
            WithdrawHandler::new(
                releases.clone(),
                store.clone(),
                clock.clone(),
                locks.clone(),
            ),
            StreamHandler::new(
                songs.clone(),
                releases.clone(),
                streams.clone(),
                store.clone(),
                clock.clone(),
                config.monetization.clone(),
            ),
            PaymentReportHandler::new(artists.clone(), store.clone(), clock.clone()),
        ));

        let search = Arc::new(SongSearchService::new(songs.clone(), search_index.clone()));
        let publisher = Arc::new(ReleasePublisher::new(
            releases.clone(),
            dispatcher.clone(),
            clock.clone(),
        ));

        Self {
            clock,
            artists,
            labels,
            songs,
            releases,
            streams,
            store,
            dispatcher,
            artist_streams,
            payments,
            monetization,
            stream_stats,
            search_index,
            search,
            publisher,
        }
    }
}

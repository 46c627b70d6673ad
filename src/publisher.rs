//! Scheduled release publishing.
//!
//! The cron trigger itself lives outside the core; whatever fires
//! it calls [`ReleasePublisher::run_once`] once per period.

use std::sync::Arc;

use tracing::{error, info};

use crate::clock::Clock;
use crate::command::{CommandDispatcher, PublishRelease};
use crate::repository::ReleaseRepository;

/// Outcome of one publishing sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishSweep {
    pub published: usize,
    pub failed: usize,
}

/// Publishes every release whose approved date has been reached.
pub struct ReleasePublisher {
    releases: Arc<dyn ReleaseRepository>,
    dispatcher: Arc<CommandDispatcher>,
    clock: Arc<dyn Clock>,
}

impl ReleasePublisher {
    pub fn new(
        releases: Arc<dyn ReleaseRepository>,
        dispatcher: Arc<CommandDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            releases,
            dispatcher,
            clock,
        }
    }

    /// One sweep: find due releases and publish each. A failure on
    /// one release never blocks the rest of the batch.
    pub async fn run_once(&self) -> PublishSweep {
        let today = self.clock.today();
        let due = self.releases.ready_for_publishing(today).await;
        info!(%today, count = due.len(), "Checking for releases to publish");

        let mut sweep = PublishSweep::default();
        for release in due {
            let command = PublishRelease::new(release.id(), today);
            match self.dispatcher.publish_release(command).await {
                Ok(()) => {
                    info!(
                        release.id = %release.id(),
                        release.title = %release.title(),
                        "Published release"
                    );
                    sweep.published += 1;
                }
                Err(err) => {
                    error!(
                        release.id = %release.id(),
                        release.title = %release.title(),
                        error = %err,
                        "Failed to publish release"
                    );
                    sweep.failed += 1;
                }
            }
        }
        sweep
    }
}

//! Append-only event store with synchronous fan-out.
//!
//! Events are kept in a per-aggregate log plus a global
//! chronological log (in-memory in this deployment). Each append
//! fans out to the subscribers registered for that event's kind
//! through an explicit registry; a subscriber failure is logged and
//! isolated, and never unwinds the already-completed append.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::event::{DomainEvent, EventKind};

/// Result type for subscriber operations.
pub type SubscriberResult = std::result::Result<(), SubscriberError>;

/// Errors from event subscribers.
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("projection failed: {0}")]
    Failed(String),
}

/// A consumer of appended events, typically a projection.
///
/// `apply` takes `&self`; subscribers that maintain mutable read
/// state should guard it with a single interior-mutability entry
/// point (e.g. `RwLock`).
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Name of this subscriber, for logging.
    fn name(&self) -> &str;

    /// Event kinds this subscriber wants to receive.
    fn interests(&self) -> &'static [EventKind];

    /// Apply a single event to the subscriber's state.
    async fn apply(&self, event: &DomainEvent) -> SubscriberResult;
}

/// In-memory append-only event store.
///
/// Append is the only mutating operation; events are never edited
/// or deleted. Fan-out runs synchronously within the appending
/// unit of work, so in this deployment projections are
/// read-after-write consistent. The append itself is complete
/// before delivery starts, keeping durability separate from
/// read-model freshness.
#[derive(Default)]
pub struct EventStore {
    by_aggregate: RwLock<HashMap<Uuid, Vec<DomainEvent>>>,
    log: RwLock<Vec<DomainEvent>>,
    subscribers: RwLock<HashMap<EventKind, Vec<Arc<dyn EventSubscriber>>>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for each of its declared interests.
    pub async fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        info!(
            subscriber.name = %subscriber.name(),
            subscriber.interests = ?subscriber.interests(),
            "Registered event subscriber"
        );
        let mut registry = self.subscribers.write().await;
        for kind in subscriber.interests() {
            registry
                .entry(*kind)
                .or_default()
                .push(Arc::clone(&subscriber));
        }
    }

    /// Append an event to both logs, then deliver it to subscribers.
    pub async fn append(&self, event: DomainEvent) {
        {
            let mut by_aggregate = self.by_aggregate.write().await;
            by_aggregate
                .entry(event.aggregate_id)
                .or_default()
                .push(event.clone());
        }
        {
            let mut log = self.log.write().await;
            log.push(event.clone());
        }

        self.fan_out(&event).await;
    }

    /// All events for one aggregate, in append order.
    pub async fn events_for_aggregate(&self, aggregate_id: Uuid) -> Vec<DomainEvent> {
        self.by_aggregate
            .read()
            .await
            .get(&aggregate_id)
            .cloned()
            .unwrap_or_default()
    }

    /// All events of one kind across aggregates, in append order.
    pub async fn events_by_kind(&self, kind: EventKind) -> Vec<DomainEvent> {
        self.log
            .read()
            .await
            .iter()
            .filter(|event| event.kind() == kind)
            .cloned()
            .collect()
    }

    /// The full global log, in append order.
    pub async fn all_events(&self) -> Vec<DomainEvent> {
        self.log.read().await.clone()
    }

    /// Deliver an event to every subscriber registered for its kind.
    ///
    /// Delivery failures are isolated per subscriber: the rest of
    /// the registry still receives the event.
    async fn fan_out(&self, event: &DomainEvent) {
        let interested: Vec<Arc<dyn EventSubscriber>> = {
            let registry = self.subscribers.read().await;
            registry.get(&event.kind()).cloned().unwrap_or_default()
        };

        for subscriber in interested {
            if let Err(error) = subscriber.apply(event).await {
                warn!(
                    subscriber.name = %subscriber.name(),
                    event.kind = %event.kind(),
                    error = %error,
                    "Event subscriber failed; continuing fan-out"
                );
            }
        }
    }
}

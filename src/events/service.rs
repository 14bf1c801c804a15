//! Subscription registry and dispatcher
//!
//! `EventService` maps each concrete event type to the listeners interested
//! in it. Subscribing to an abstract type expands it through the
//! `TypeHierarchy` into its concrete leaves and records the listener under
//! each one, so `publish` only ever needs an exact lookup on the event's own
//! type. Storage keyed per concrete type with set semantics is what
//! guarantees a listener is notified at most once per published event, no
//! matter how many overlapping categories it subscribed through.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

use super::listener::{EventListener, ListenerRef, SharedListener};
use super::types::{Event, EventType};
use crate::error::{DispatchError, ListenerFailure};
use crate::hierarchy::TypeHierarchy;

/// How `publish` reacts to a failing listener
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Stop at the first failing listener and return its error
    #[default]
    Propagate,
    /// Notify every listener, then report all failures together
    Isolate,
}

/// Configuration for the event service
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Name recorded on tracing spans
    pub name: Option<String>,
    /// Listener failure handling during publish
    pub failure_mode: FailureMode,
    /// Whether to log every individual delivery
    pub verbose: bool,
}

impl ServiceConfig {
    /// Create a new service config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the service name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the failure mode
    pub fn failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Shorthand for `failure_mode(FailureMode::Isolate)`
    pub fn isolate_failures(self) -> Self {
        self.failure_mode(FailureMode::Isolate)
    }

    /// Enable verbose logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

type SubscriberMap = HashMap<EventType, Vec<ListenerRef>>;

/// Publish/subscribe registry with type-hierarchy-aware routing
///
/// All operations are synchronous. A single lock serializes access to the
/// subscriber map: `subscribe`/`unsubscribe` take it exclusively, `publish`
/// holds it shared for the whole fan-out of one event. Once `unsubscribe`
/// returns, the listener will not be notified again through the
/// unsubscribed types.
///
/// Shared acquisitions are recursive, so a listener may `publish` again (or
/// query the service) from inside `notify` even while a writer is queued.
pub struct EventService {
    hierarchy: Arc<TypeHierarchy>,
    config: ServiceConfig,
    subscribers: RwLock<SubscriberMap>,
}

impl EventService {
    /// Create a new event service over the given hierarchy
    pub fn new(hierarchy: impl Into<Arc<TypeHierarchy>>) -> Self {
        Self::with_config(hierarchy, ServiceConfig::default())
    }

    /// Create a new event service with a custom config
    pub fn with_config(hierarchy: impl Into<Arc<TypeHierarchy>>, config: ServiceConfig) -> Self {
        Self {
            hierarchy: hierarchy.into(),
            config,
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// The type hierarchy used to resolve subscriptions
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// The service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Subscribe a listener to a concrete or abstract event type
    ///
    /// The listener is recorded under every concrete type the tag resolves
    /// to. Subscribing again to a type it already covers has no effect, and
    /// a tag with no concrete descendants (including an unknown tag) is a
    /// no-op.
    pub fn subscribe(&self, listener: SharedListener, event_type: impl AsRef<str>) {
        let event_type = event_type.as_ref();
        let leaves = self.hierarchy.leaf_descendants(event_type);
        if leaves.is_empty() {
            debug!(
                service = ?self.config.name,
                event_type = %event_type,
                "No concrete types to subscribe to"
            );
            return;
        }

        let name = listener.name().to_string();
        let listener = ListenerRef::new(listener);
        let mut added = 0usize;
        {
            let mut subscribers = self.write();
            for leaf in &leaves {
                let set = subscribers.entry(leaf.clone()).or_default();
                if !set.contains(&listener) {
                    set.push(listener.clone());
                    added += 1;
                }
            }
        }

        debug!(
            service = ?self.config.name,
            listener = %name,
            event_type = %event_type,
            resolved = leaves.len(),
            added = added,
            "Listener subscribed"
        );
    }

    /// Unsubscribe a listener from a concrete or abstract event type
    ///
    /// The listener is removed from every concrete type the tag resolves to,
    /// whether or not it was subscribed to all of them. A concrete type
    /// left without listeners is dropped from the registry.
    pub fn unsubscribe<L>(&self, listener: &Arc<L>, event_type: impl AsRef<str>)
    where
        L: EventListener + ?Sized,
    {
        let event_type = event_type.as_ref();
        let leaves = self.hierarchy.leaf_descendants(event_type);

        let mut removed = 0usize;
        {
            let mut subscribers = self.write();
            for leaf in &leaves {
                let Some(set) = subscribers.get_mut(leaf) else {
                    continue;
                };
                let before = set.len();
                set.retain(|existing| !existing.is(listener));
                removed += before - set.len();
                if set.is_empty() {
                    subscribers.remove(leaf);
                }
            }
        }

        debug!(
            service = ?self.config.name,
            listener = %listener.name(),
            event_type = %event_type,
            resolved = leaves.len(),
            removed = removed,
            "Listener unsubscribed"
        );
    }

    /// Publish an event to every listener subscribed to its concrete type
    ///
    /// The event's own type is looked up directly; it is never resolved
    /// through the hierarchy. Each listener is notified once, in
    /// subscription order. Returns the number of listeners that handled the
    /// event successfully; publishing a type nobody listens to returns 0.
    ///
    /// With `FailureMode::Propagate` the first listener error stops the
    /// fan-out and is returned as `DispatchError::ListenerFailed`; listeners
    /// after it are not notified. With `FailureMode::Isolate` all listeners
    /// are notified and any failures are returned together as
    /// `DispatchError::PartialDelivery`.
    #[instrument(
        skip(self, event),
        fields(service = ?self.config.name, event_type = %event.event_type(), event_id = %event.id())
    )]
    pub fn publish(&self, event: &Event) -> Result<usize, DispatchError> {
        let subscribers = self.read();
        let Some(listeners) = subscribers.get(event.event_type()) else {
            trace!("No subscribers for event type");
            return Ok(0);
        };

        let mut delivered = 0usize;
        let mut failures = Vec::new();

        for entry in listeners {
            let listener = entry.listener();
            match listener.notify(event) {
                Ok(()) => {
                    delivered += 1;
                    if self.config.verbose {
                        debug!(listener = %listener.name(), "Event delivered");
                    }
                }
                Err(error) => {
                    warn!(listener = %listener.name(), error = %error, "Listener failed");
                    match self.config.failure_mode {
                        FailureMode::Propagate => {
                            return Err(DispatchError::listener_failed(
                                listener.name(),
                                event.event_type().clone(),
                                error,
                            ));
                        }
                        FailureMode::Isolate => failures.push(ListenerFailure {
                            listener: listener.name().to_string(),
                            error,
                        }),
                    }
                }
            }
        }

        if failures.is_empty() {
            trace!(delivered = delivered, "Event dispatched");
            Ok(delivered)
        } else {
            Err(DispatchError::PartialDelivery {
                delivered,
                failures,
            })
        }
    }

    /// Total number of (listener, concrete type) subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    /// Number of listeners subscribed to a concrete type
    pub fn subscriber_count_for(&self, event_type: &str) -> usize {
        self.read().get(event_type).map_or(0, Vec::len)
    }

    /// Concrete types that currently have at least one listener
    pub fn subscribed_types(&self) -> BTreeSet<EventType> {
        self.read().keys().cloned().collect()
    }

    /// Check whether a listener is subscribed to a concrete type
    pub fn is_subscribed<L>(&self, listener: &Arc<L>, event_type: &str) -> bool
    where
        L: EventListener + ?Sized,
    {
        self.read()
            .get(event_type)
            .is_some_and(|set| set.iter().any(|existing| existing.is(listener)))
    }

    /// Check whether any listener is subscribed
    pub fn has_subscribers(&self) -> bool {
        !self.read().is_empty()
    }

    // Recursive: a nested publish from inside `notify` must not queue
    // behind a waiting writer while this thread already holds a read guard.
    fn read(&self) -> RwLockReadGuard<'_, SubscriberMap> {
        self.subscribers.read_recursive()
    }

    fn write(&self) -> RwLockWriteGuard<'_, SubscriberMap> {
        self.subscribers.write()
    }
}

impl fmt::Debug for EventService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventService")
            .field("name", &self.config.name)
            .field("subscribed_types", &self.subscribed_types().len())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

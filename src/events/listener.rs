//! Event listeners
//!
//! A listener is an opaque capability with a single operation, `notify`.
//! The service identifies listeners by the identity of the `Arc` handed to
//! `subscribe`, never by value.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::types::{Event, EventType};
use crate::error::ListenerError;

/// Trait for receiving published events
///
/// `notify` runs synchronously on the publishing thread while the service
/// holds its read lock. It may `publish` again or query the service, but it
/// must not call `subscribe` or `unsubscribe` on the service that is
/// delivering to it: those need the write lock and would deadlock.
pub trait EventListener: Send + Sync {
    /// Handle a delivered event
    ///
    /// An error aborts (or, in isolated mode, is recorded by) the `publish`
    /// call that triggered it.
    fn notify(&self, event: &Event) -> Result<(), ListenerError>;

    /// Name used in logs and dispatch errors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Type alias for a shared listener
pub type SharedListener = Arc<dyn EventListener>;

/// A listener compared and hashed by identity
#[derive(Clone)]
pub(crate) struct ListenerRef(SharedListener);

impl ListenerRef {
    pub(crate) fn new(listener: SharedListener) -> Self {
        Self(listener)
    }

    pub(crate) fn is<L: EventListener + ?Sized>(&self, listener: &Arc<L>) -> bool {
        self.addr() == addr_of(listener)
    }

    pub(crate) fn listener(&self) -> &dyn EventListener {
        self.0.as_ref()
    }

    fn addr(&self) -> *const () {
        addr_of(&self.0)
    }
}

// The vtable half of a fat pointer is not unique per type, so only the data
// address takes part in identity.
fn addr_of<L: EventListener + ?Sized>(listener: &Arc<L>) -> *const () {
    Arc::as_ptr(listener) as *const ()
}

impl PartialEq for ListenerRef {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for ListenerRef {}

impl Hash for ListenerRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Debug for ListenerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListenerRef").field(&self.0.name()).finish()
    }
}

/// Logging listener
///
/// Logs every delivered event using the `tracing` crate.
#[derive(Default)]
pub struct LoggingListener {
    /// Whether to include event attributes in logs
    pub verbose: bool,
}

impl LoggingListener {
    /// Create a new logging listener
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a verbose logging listener
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl EventListener for LoggingListener {
    fn notify(&self, event: &Event) -> Result<(), ListenerError> {
        if self.verbose {
            info!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                attributes = ?event.attributes(),
                "Event received"
            );
        } else {
            info!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                "Event received"
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}

/// Recording listener
///
/// Keeps every event it receives, in delivery order.
pub struct RecordingListener {
    name: String,
    events: Mutex<Vec<Event>>,
    notifications: AtomicU64,
}

impl RecordingListener {
    /// Create a new recording listener
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Mutex::new(Vec::new()),
            notifications: AtomicU64::new(0),
        }
    }

    /// Create a shared recording listener
    pub fn shared(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(name))
    }

    /// Number of events received
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check whether no events were received
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of all received events
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Number of received events of the given concrete type
    pub fn count_of(&self, event_type: &str) -> usize {
        self.lock().iter().filter(|e| e.is(event_type)).count()
    }

    /// Concrete types of the received events, in delivery order
    pub fn event_types(&self) -> Vec<EventType> {
        self.lock().iter().map(|e| e.event_type().clone()).collect()
    }

    /// Total notifications handled since creation
    pub fn total_notifications(&self) -> u64 {
        self.notifications.load(Ordering::Relaxed)
    }

    /// Forget all received events
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventListener for RecordingListener {
    fn notify(&self, event: &Event) -> Result<(), ListenerError> {
        self.notifications.fetch_add(1, Ordering::Relaxed);
        self.lock().push(event.clone());
        debug!(listener = %self.name, event_type = %event.event_type(), "Event recorded");
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A listener implemented as a closure
pub struct FnListener<F>
where
    F: Fn(&Event) -> Result<(), ListenerError> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnListener<F>
where
    F: Fn(&Event) -> Result<(), ListenerError> + Send + Sync,
{
    /// Create a new function-based listener
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&Event) -> Result<(), ListenerError> + Send + Sync,
{
    fn notify(&self, event: &Event) -> Result<(), ListenerError> {
        (self.func)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Wrap a closure as a shared listener
pub fn listener_fn<F>(name: impl Into<String>, func: F) -> SharedListener
where
    F: Fn(&Event) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(FnListener::new(name, func))
}

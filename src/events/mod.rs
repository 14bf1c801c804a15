//! Events, listeners and the publish/subscribe service
//!
//! This module provides an in-process publish/subscribe registry that
//! routes events by type. A listener may subscribe to a concrete event type
//! or to an abstract category; a category subscription covers every
//! concrete type below it in the `TypeHierarchy`.
//!
//! # Example
//!
//! ```rust
//! use eventgraph::events::{Event, EventService, RecordingListener};
//! use eventgraph::hierarchy::TypeHierarchy;
//!
//! let hierarchy = TypeHierarchy::builder()
//!     .add_category("ManagementEvent", ["FaultEvent", "SecurityEvent"])
//!     .compile()
//!     .unwrap();
//! let service = EventService::new(hierarchy);
//!
//! let audit = RecordingListener::shared("audit");
//! service.subscribe(audit.clone(), "ManagementEvent");
//!
//! service.publish(&Event::new("FaultEvent")).unwrap();
//! service.publish(&Event::new("SecurityEvent")).unwrap();
//! assert_eq!(audit.len(), 2);
//! ```

mod listener;
mod service;
mod types;

pub use listener::{
    listener_fn, EventListener, FnListener, LoggingListener, RecordingListener, SharedListener,
};
pub use service::{EventService, FailureMode, ServiceConfig};
pub use types::{Event, EventType};

use std::sync::Arc;

use crate::hierarchy::TypeHierarchy;

/// Create a shared event service with default configuration
pub fn new_event_service(hierarchy: impl Into<Arc<TypeHierarchy>>) -> Arc<EventService> {
    Arc::new(EventService::new(hierarchy))
}

/// Create a shared event service with a custom configuration
pub fn new_event_service_with_config(
    hierarchy: impl Into<Arc<TypeHierarchy>>,
    config: ServiceConfig,
) -> Arc<EventService> {
    Arc::new(EventService::with_config(hierarchy, config))
}

//! Error types for eventgraph
//!
//! Registry operations never fail: unknown types, duplicate subscriptions and
//! redundant unsubscribes are silent no-ops. Errors only arise when building
//! a type hierarchy and when a listener rejects an event during dispatch.

use thiserror::Error;

use crate::events::EventType;

/// Errors that can occur while compiling a type hierarchy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    /// The "is-a" relation contains a cycle
    #[error("Type hierarchy contains a cycle through: {0}")]
    CycleDetected(String),

    /// A type was declared as its own subtype
    #[error("Type declared as its own subtype: {0}")]
    SelfReference(String),
}

/// Errors raised by a listener while handling an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListenerError {
    /// The listener refused the event
    #[error("Event rejected: {0}")]
    Rejected(String),

    /// Generic listener failure
    #[error("{0}")]
    Other(String),
}

impl ListenerError {
    /// Create a rejected error
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// A single listener failure captured during isolated dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Name of the listener that failed
    pub listener: String,
    /// The error it returned
    pub error: ListenerError,
}

/// Errors that can occur while publishing an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A listener failed and the remaining deliveries were abandoned
    #[error("Listener '{listener}' failed on {event_type}: {source}")]
    ListenerFailed {
        /// Name of the listener that failed
        listener: String,
        /// Concrete type of the event being delivered
        event_type: EventType,
        /// The underlying listener error
        #[source]
        source: ListenerError,
    },

    /// Every listener was notified but some of them failed
    #[error("{delivered} listeners notified, {} failed", .failures.len())]
    PartialDelivery {
        /// Listeners that handled the event successfully
        delivered: usize,
        /// Listeners that returned an error
        failures: Vec<ListenerFailure>,
    },
}

impl DispatchError {
    /// Create a listener failed error
    pub fn listener_failed(
        listener: impl Into<String>,
        event_type: EventType,
        source: ListenerError,
    ) -> Self {
        Self::ListenerFailed {
            listener: listener.into(),
            event_type,
            source,
        }
    }

    /// Names of the listeners that failed
    pub fn failed_listeners(&self) -> Vec<&str> {
        match self {
            Self::ListenerFailed { listener, .. } => vec![listener.as_str()],
            Self::PartialDelivery { failures, .. } => {
                failures.iter().map(|f| f.listener.as_str()).collect()
            }
        }
    }
}

//! Prelude module for eventgraph
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```rust,ignore
//! use eventgraph::prelude::*;
//! ```

// Error types
pub use crate::error::{DispatchError, HierarchyError, ListenerError, ListenerFailure};

// Type hierarchy
pub use crate::hierarchy::{HierarchyTable, TypeHierarchy, TypeHierarchyBuilder};

// Events and dispatch
pub use crate::events::{
    listener_fn, Event, EventListener, EventService, EventType, FailureMode, FnListener,
    LoggingListener, RecordingListener, ServiceConfig, SharedListener,
};

// Stock management events
pub use crate::management::{
    fault_event, financial_event, management_hierarchy, security_event, FaultLevel,
    FinancialLevel, SecurityLevel,
};

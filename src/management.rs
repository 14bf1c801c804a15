//! Management event catalog
//!
//! The stock hierarchy used for operations alerts:
//!
//! ```text
//! Event
//! └── ManagementEvent
//!     ├── FaultEvent
//!     ├── SecurityEvent
//!     └── FinancialEvent
//! ```
//!
//! Each concrete event stores its severity in the `level` attribute.

use serde::{Deserialize, Serialize};

use crate::error::HierarchyError;
use crate::events::Event;
use crate::hierarchy::TypeHierarchy;

/// Root of every event type
pub const EVENT: &str = "Event";
/// Abstract category of all management events
pub const MANAGEMENT_EVENT: &str = "ManagementEvent";
/// A system fault
pub const FAULT_EVENT: &str = "FaultEvent";
/// A security incident
pub const SECURITY_EVENT: &str = "SecurityEvent";
/// A large financial movement
pub const FINANCIAL_EVENT: &str = "FinancialEvent";

/// Attribute key holding the event level
pub const LEVEL_ATTRIBUTE: &str = "level";

/// Severity of a fault
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultLevel {
    /// Minor fault
    Low,
    /// Degraded service
    Moderate,
    /// Outage
    Critical,
}

/// Kind of security incident
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    /// Access without credentials
    UnauthorizedAccess,
    /// Credentials were rejected
    AuthorizationFailed,
    /// An authorization check fired
    AuthorizationTriggered,
}

/// Amount bracket of a financial movement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancialLevel {
    /// More than 100k
    #[serde(rename = "ABOVE_100K")]
    Above100k,
    /// More than 500k
    #[serde(rename = "ABOVE_500K")]
    Above500k,
    /// More than 1M
    #[serde(rename = "ABOVE_1M")]
    Above1m,
    /// More than 1.5M
    #[serde(rename = "ABOVE_1M500K")]
    Above1m500k,
}

impl FaultLevel {
    /// Wire name stored in the `level` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::Critical => "CRITICAL",
        }
    }
}

impl SecurityLevel {
    /// Wire name stored in the `level` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnauthorizedAccess => "UNAUTHORIZED_ACCESS",
            Self::AuthorizationFailed => "AUTHORIZATION_FAILED",
            Self::AuthorizationTriggered => "AUTHORIZATION_TRIGGERED",
        }
    }
}

impl FinancialLevel {
    /// Wire name stored in the `level` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Above100k => "ABOVE_100K",
            Self::Above500k => "ABOVE_500K",
            Self::Above1m => "ABOVE_1M",
            Self::Above1m500k => "ABOVE_1M500K",
        }
    }
}

/// The management hierarchy shown in the module docs
pub fn management_hierarchy() -> Result<TypeHierarchy, HierarchyError> {
    TypeHierarchy::builder()
        .add_subtype(EVENT, MANAGEMENT_EVENT)
        .add_category(MANAGEMENT_EVENT, [FAULT_EVENT, SECURITY_EVENT, FINANCIAL_EVENT])
        .compile()
}

/// Create a fault event
pub fn fault_event(level: FaultLevel) -> Event {
    Event::new(FAULT_EVENT).with_attribute(LEVEL_ATTRIBUTE, level.as_str())
}

/// Create a security event
pub fn security_event(level: SecurityLevel) -> Event {
    Event::new(SECURITY_EVENT).with_attribute(LEVEL_ATTRIBUTE, level.as_str())
}

/// Create a financial event
pub fn financial_event(level: FinancialLevel) -> Event {
    Event::new(FINANCIAL_EVENT).with_attribute(LEVEL_ATTRIBUTE, level.as_str())
}

/// Read a typed level back from an event's `level` attribute
pub fn level_of<L: for<'de> Deserialize<'de>>(event: &Event) -> Option<L> {
    let value = event.attribute(LEVEL_ATTRIBUTE)?;
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_hierarchy() {
        let hierarchy = management_hierarchy().unwrap();

        assert!(hierarchy.is_abstract(EVENT));
        assert!(hierarchy.is_abstract(MANAGEMENT_EVENT));
        assert_eq!(hierarchy.leaf_descendants(EVENT).len(), 3);
        assert_eq!(hierarchy.leaf_descendants(MANAGEMENT_EVENT).len(), 3);
        for tag in [FAULT_EVENT, SECURITY_EVENT, FINANCIAL_EVENT] {
            assert!(hierarchy.is_concrete(tag));
        }
    }

    #[test]
    fn test_event_constructors() {
        let event = fault_event(FaultLevel::Moderate);
        assert!(event.is(FAULT_EVENT));
        assert_eq!(event.attribute(LEVEL_ATTRIBUTE), Some(&serde_json::Value::from("MODERATE")));

        let event = security_event(SecurityLevel::AuthorizationFailed);
        assert!(event.is(SECURITY_EVENT));
        assert_eq!(level_of(&event), Some(SecurityLevel::AuthorizationFailed));

        let event = financial_event(FinancialLevel::Above500k);
        assert!(event.is(FINANCIAL_EVENT));
        assert_eq!(event.attribute(LEVEL_ATTRIBUTE), Some(&serde_json::Value::from("ABOVE_500K")));
        assert_eq!(level_of(&event), Some(FinancialLevel::Above500k));
    }

    #[test]
    fn test_level_names_match_serde() {
        use serde_json::Value;

        for level in [FaultLevel::Low, FaultLevel::Moderate, FaultLevel::Critical] {
            assert_eq!(serde_json::to_value(level).unwrap(), Value::from(level.as_str()));
            assert_eq!(level_of(&fault_event(level)), Some(level));
        }
        for level in [
            SecurityLevel::UnauthorizedAccess,
            SecurityLevel::AuthorizationFailed,
            SecurityLevel::AuthorizationTriggered,
        ] {
            assert_eq!(serde_json::to_value(level).unwrap(), Value::from(level.as_str()));
            assert_eq!(level_of(&security_event(level)), Some(level));
        }
        for level in [
            FinancialLevel::Above100k,
            FinancialLevel::Above500k,
            FinancialLevel::Above1m,
            FinancialLevel::Above1m500k,
        ] {
            assert_eq!(serde_json::to_value(level).unwrap(), Value::from(level.as_str()));
            assert_eq!(level_of(&financial_event(level)), Some(level));
        }
    }

    #[test]
    fn test_level_of_wrong_type() {
        let event = fault_event(FaultLevel::Critical);
        assert_eq!(level_of::<SecurityLevel>(&event), None);
        assert_eq!(level_of::<FaultLevel>(&Event::new(FAULT_EVENT)), None);
    }
}

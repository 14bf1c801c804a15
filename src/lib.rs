//! # eventgraph
//!
//! In-process publish/subscribe with type-hierarchy-aware routing.
//!
//! eventgraph routes events to listeners by type, where a subscription may
//! name either a concrete event type or an abstract category:
//! - **Explicit type hierarchy** declared once at startup with `TypeHierarchyBuilder`
//! - **Category subscriptions** expanded to every concrete descendant
//! - **Exactly-once delivery** per listener, even across overlapping categories
//! - **Synchronous dispatch** with configurable listener failure handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use eventgraph::prelude::*;
//!
//! let hierarchy = TypeHierarchy::builder()
//!     .add_subtype("Event", "ManagementEvent")
//!     .add_category("ManagementEvent", ["FaultEvent", "SecurityEvent"])
//!     .compile()?;
//!
//! let service = EventService::new(hierarchy);
//! let pager = RecordingListener::shared("pager");
//!
//! // Covers FaultEvent and SecurityEvent
//! service.subscribe(pager.clone(), "ManagementEvent");
//!
//! service.publish(&Event::new("FaultEvent"))?;
//! assert_eq!(pager.len(), 1);
//! ```

#![warn(missing_docs)]

// Core modules
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod management;

/// Convenient re-exports for common usage
pub mod prelude;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    struct Fixture {
        service: EventService,
        login: Arc<RecordingListener>,
        database: Arc<RecordingListener>,
    }

    fn fixture() -> Fixture {
        Fixture {
            service: EventService::new(management_hierarchy().unwrap()),
            login: RecordingListener::shared("login_system"),
            database: RecordingListener::shared("database_system"),
        }
    }

    fn fault() -> Event {
        fault_event(FaultLevel::Moderate)
    }

    fn security() -> Event {
        security_event(SecurityLevel::AuthorizationFailed)
    }

    fn financial() -> Event {
        financial_event(FinancialLevel::Above500k)
    }

    #[test]
    fn test_subscribe() {
        let f = fixture();
        assert_eq!(f.service.subscriber_count(), 0);

        f.service.subscribe(f.login.clone(), "FaultEvent");
        f.service.subscribe(f.database.clone(), "SecurityEvent");

        assert_eq!(f.service.subscriber_count(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let f = fixture();

        f.service.subscribe(f.login.clone(), "FaultEvent");
        f.service.subscribe(f.database.clone(), "SecurityEvent");
        assert_eq!(f.service.subscriber_count(), 2);

        f.service.unsubscribe(&f.login, "FaultEvent");
        f.service.unsubscribe(&f.database, "SecurityEvent");
        assert_eq!(f.service.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribe_and_publish() {
        let f = fixture();

        f.service.subscribe(f.login.clone(), "FaultEvent");
        f.service.publish(&fault()).unwrap();
        assert_eq!(f.login.len(), 1);

        f.service.publish(&security()).unwrap();
        assert_eq!(f.login.len(), 1);
    }

    #[test]
    fn test_publish_unsubscribed_type() {
        let f = fixture();

        f.service.subscribe(f.login.clone(), "FaultEvent");
        f.service.publish(&security()).unwrap();

        assert!(f.login.is_empty());
    }

    #[test]
    fn test_multiple_listeners_and_types() {
        let f = fixture();

        f.service.subscribe(f.login.clone(), "FaultEvent");
        f.service.subscribe(f.login.clone(), "SecurityEvent");
        f.service.subscribe(f.database.clone(), "SecurityEvent");

        f.service.publish(&fault()).unwrap();
        assert_eq!(f.login.len(), 1);
        assert_eq!(f.database.len(), 0);

        f.service.publish(&security()).unwrap();
        assert_eq!(f.login.len(), 2);
        assert_eq!(f.database.len(), 1);
    }

    #[test]
    fn test_abstract_subscriptions() {
        let f = fixture();

        f.service.subscribe(f.database.clone(), "ManagementEvent");
        f.service.subscribe(f.login.clone(), "Event");
        assert!(f.login.is_empty());
        assert!(f.database.is_empty());

        f.service.publish(&fault()).unwrap();
        assert_eq!(f.login.len(), 1);
        assert_eq!(f.database.len(), 1);

        f.service.publish(&security()).unwrap();
        assert_eq!(f.login.len(), 2);
        assert_eq!(f.database.len(), 2);
    }

    #[test]
    fn test_leaf_descendants_of_category() {
        let f = fixture();
        let leaves = f.service.hierarchy().leaf_descendants("ManagementEvent");

        assert!(leaves.contains("FaultEvent"));
        assert!(leaves.contains("SecurityEvent"));
        assert!(leaves.contains("FinancialEvent"));
    }

    #[test]
    fn test_selective_unsubscribe_from_categories() {
        let f = fixture();

        f.service.subscribe(f.login.clone(), "Event");
        f.service.subscribe(f.database.clone(), "ManagementEvent");
        assert_eq!(f.service.subscriber_count(), 6);

        f.service.unsubscribe(&f.login, "FaultEvent");
        assert_eq!(f.service.subscriber_count(), 5);
        f.service.unsubscribe(&f.database, "SecurityEvent");
        assert_eq!(f.service.subscriber_count(), 4);
        f.service.unsubscribe(&f.database, "FinancialEvent");
        assert_eq!(f.service.subscriber_count(), 3);

        f.service.unsubscribe(&f.database, "FaultEvent");
        assert_eq!(f.service.subscriber_count(), 2);
        // FaultEvent has no listeners left
        assert_eq!(f.service.subscriber_count_for("FaultEvent"), 0);
        assert!(!f.service.subscribed_types().contains("FaultEvent"));

        f.service.unsubscribe(&f.login, "Event");
        assert_eq!(f.service.subscriber_count(), 0);
        assert!(!f.service.has_subscribers());
    }

    #[test]
    fn test_unsubscribe_category_stops_delivery() {
        let f = fixture();

        f.service.subscribe(f.database.clone(), "ManagementEvent");
        f.service.subscribe(f.login.clone(), "Event");

        f.service.publish(&fault()).unwrap();
        f.service.publish(&financial()).unwrap();
        assert_eq!(f.login.len(), 2);
        assert_eq!(f.database.len(), 2);

        f.service.unsubscribe(&f.database, "Event");
        f.service.publish(&security()).unwrap();

        assert_eq!(f.login.len(), 3);
        assert_eq!(f.database.len(), 2);
    }

    #[test]
    fn test_category_equals_individual_subscriptions() {
        let by_category = fixture();
        by_category.service.subscribe(by_category.login.clone(), "ManagementEvent");

        let individually = fixture();
        for tag in ["FaultEvent", "SecurityEvent", "FinancialEvent"] {
            individually.service.subscribe(individually.login.clone(), tag);
        }

        assert_eq!(
            by_category.service.subscribed_types(),
            individually.service.subscribed_types()
        );

        for f in [&by_category, &individually] {
            f.service.publish(&fault()).unwrap();
            f.service.publish(&security()).unwrap();
            f.service.publish(&financial()).unwrap();
            assert_eq!(f.login.len(), 3);
            assert_eq!(f.login.count_of("FaultEvent"), 1);
        }
    }
}

//! Management alerts
//!
//! Routes fault, security and financial events to listeners that subscribed
//! either to a concrete event type or to a whole category.
//!
//! Run with: `RUST_LOG=debug cargo run --example management_alerts`

use eventgraph::management::level_of;
use eventgraph::prelude::*;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str())),
        )
        .init();

    let hierarchy = management_hierarchy()?;
    println!("{}", hierarchy.to_mermaid());

    let config = ServiceConfig::new().name("alerts").isolate_failures();
    let service = EventService::with_config(hierarchy, config);

    let audit = RecordingListener::shared("audit");
    let pager = listener_fn("pager", |event| {
        match level_of::<FaultLevel>(event) {
            Some(FaultLevel::Critical) => info!(event_id = %event.id(), "Paging on-call"),
            Some(level) => info!(?level, "Fault below paging threshold"),
            None => return Err(ListenerError::rejected("fault without level")),
        }
        Ok(())
    });

    // The audit trail sees everything, the pager only faults
    service.subscribe(audit.clone(), "Event");
    service.subscribe(Arc::clone(&pager), "FaultEvent");
    service.subscribe(Arc::new(LoggingListener::verbose()), "SecurityEvent");

    info!(subscriptions = service.subscriber_count(), "Listeners registered");

    service.publish(&fault_event(FaultLevel::Critical))?;
    service.publish(&fault_event(FaultLevel::Low))?;
    service.publish(&security_event(SecurityLevel::UnauthorizedAccess))?;
    service.publish(&financial_event(FinancialLevel::Above1m))?;

    if let Err(err) = service.publish(&Event::new("FaultEvent")) {
        info!(error = %err, failed = ?err.failed_listeners(), "Delivery partially failed");
    }

    service.unsubscribe(&pager, "ManagementEvent");
    service.publish(&fault_event(FaultLevel::Critical))?;

    info!(
        received = audit.len(),
        faults = audit.count_of("FaultEvent"),
        "Audit trail complete"
    );
    Ok(())
}

//! EventSubscriber port - Interface for subscribing to domain events.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for published events.
///
/// Handlers must be idempotent: delivery is at-least-once.
///
/// # Example
///
/// ```ignore
/// struct RenewalNoticeSender { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for RenewalNoticeSender {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let record: HistoryRecord = event.payload_as()?;
///         // queue a notice when record.new_status is grace...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "RenewalNoticeSender"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for registering event handlers by event type.
pub trait EventSubscriber: Send + Sync {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}

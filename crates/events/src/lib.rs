//! `lojapet-events` — event mechanics and decision-core event schemas.
//!
//! The mechanics (Event trait, bus, subscription) are domain-agnostic; the
//! `decision` module holds the integration events the decision core produces
//! and consumes at its boundary.

pub mod bus;
pub mod decision;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use decision::{
    AiAlertEvent, AlertSeverity, DecisionAppliedEvent, DecisionEvent, DecisionReviewedEvent,
    ReviewAction,
};
pub use event::Event;
pub use in_memory_bus::InMemoryEventBus;

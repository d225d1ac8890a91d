//! The notification seam between the cache and the host application.
//!
//! The cache is a pure publisher: it emits exactly one event per completed
//! load sequence and registers no listeners of its own. The event payload is
//! advisory; consumers are expected to read the cache for the authoritative
//! value rather than trust the event.

use crate::types::UserId;

/// Published on the event bus once per completed load sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    /// The load sequence settled with the results of a successful list fetch.
    ///
    /// Individual entries may still have failed; the settled value is
    /// authoritative.
    Loaded { user_id: UserId },
    /// The list fetch failed and the user settled with an empty list.
    Failed { user_id: UserId },
}

impl ProfileEvent {
    pub fn user_id(&self) -> &UserId {
        match self {
            ProfileEvent::Loaded { user_id } => user_id,
            ProfileEvent::Failed { user_id } => user_id,
        }
    }
}

/// An opaque publish/subscribe mechanism provided by the host application.
pub trait EventBus: Send + Sync {
    fn dispatch(&self, event: ProfileEvent);
}

/// Swallows all events, for hosts without a bus.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventBus;

impl EventBus for NoopEventBus {
    fn dispatch(&self, _event: ProfileEvent) {}
}

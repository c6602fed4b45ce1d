//! Raw repository events and the upstream event source seam.

use crate::error::ObservationError;
use bitflags::bitflags;
use std::sync::Arc;

bitflags! {
    /// Mask of raw repository event types a subscription receives.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventTypes: u8 {
        const NODE_ADDED = 1 << 0;
        const NODE_REMOVED = 1 << 1;
        const PROPERTY_ADDED = 1 << 2;
        const PROPERTY_CHANGED = 1 << 3;
        const PROPERTY_REMOVED = 1 << 4;

        const PROPERTIES = Self::PROPERTY_ADDED.bits()
            | Self::PROPERTY_CHANGED.bits()
            | Self::PROPERTY_REMOVED.bits();
    }
}

/// Type of a single raw repository event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    NodeAdded,
    NodeRemoved,
    PropertyAdded,
    PropertyChanged,
    PropertyRemoved,
}

impl RawEventKind {
    pub fn event_type(self) -> EventTypes {
        match self {
            RawEventKind::NodeAdded => EventTypes::NODE_ADDED,
            RawEventKind::NodeRemoved => EventTypes::NODE_REMOVED,
            RawEventKind::PropertyAdded => EventTypes::PROPERTY_ADDED,
            RawEventKind::PropertyChanged => EventTypes::PROPERTY_CHANGED,
            RawEventKind::PropertyRemoved => EventTypes::PROPERTY_REMOVED,
        }
    }
}

/// Low-level event as delivered by the event repository, in native addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Node path for node events, property path for property events
    pub path: String,
    pub kind: RawEventKind,
    /// Originated outside this process or session
    pub external: bool,
    pub user_id: Option<String>,
}

impl RawEvent {
    pub fn new(kind: RawEventKind, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            external: false,
            user_id: None,
        }
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Root path, type mask and depth of one upstream subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionScope {
    pub root: String,
    pub types: EventTypes,
    pub include_descendants: bool,
}

/// Receives ordered batches of raw events on the source's delivery thread.
pub trait RawEventListener: Send + Sync {
    fn on_events(&self, events: Vec<RawEvent>);
}

/// A session on the event repository holding at most one subscription.
///
/// `unsubscribe` must not return while a delivery to the listener is still
/// pending, and no delivery may start after it returns.
pub trait EventSession: Send {
    fn subscribe(
        &mut self,
        scope: &SubscriptionScope,
        listener: Arc<dyn RawEventListener>,
    ) -> Result<(), ObservationError>;

    fn unsubscribe(&mut self) -> Result<(), ObservationError>;

    /// Release the session itself.
    fn logout(&mut self);
}

/// Opens sessions on the underlying repository.
pub trait EventRepository: Send + Sync {
    fn login(&self) -> Result<Box<dyn EventSession>, ObservationError>;
}

//! Change observation: raw repository events to scoped, namespace-relative changes.

pub mod change;
pub mod normalizer;
pub mod path_mapper;
pub mod reporter;
pub mod scope;
pub mod source;

pub use change::{ChangeKind, ChangeRecord};
pub use normalizer::{add_mount_prefix, ChangeNormalizer};
pub use path_mapper::{IdentityPathMapper, PathMapper, PathMapping, PrefixPathMapper};
pub use reporter::{
    NullReporter, ObservationReporter, ObserverConfiguration, ReportedBatch, StaticReporter,
};
pub use source::{
    EventRepository, EventSession, EventTypes, RawEvent, RawEventKind, RawEventListener,
    SubscriptionScope,
};

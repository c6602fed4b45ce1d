//! Core types for the strata mount registry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity token of a provider registration, as assigned by the provider source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub u64);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}

/// Ranking: higher values win the mount path
pub type Ranking = i64;

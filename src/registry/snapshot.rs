//! Point-in-time runtime view of the mount table for introspection.

use crate::provider::{AuthType, ProviderInfo};
use crate::types::{ProviderId, Ranking};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Why a registered provider is not serving its mount path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The descriptor failed validation
    Invalid,
    /// Activation failed
    ServiceNotObtainable,
    /// A higher-priority provider is active on the same path
    Shadowed,
}

/// Descriptor fields of one provider as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    pub id: ProviderId,
    pub name: Option<String>,
    pub path: String,
    pub ranking: Ranking,
    pub auth_type: AuthType,
    pub modifiable: bool,
    pub use_access_security: bool,
}

impl From<&ProviderInfo> for ProviderSummary {
    fn from(info: &ProviderInfo) -> Self {
        Self {
            id: info.id(),
            name: info.name().map(str::to_string),
            path: info.path().to_string(),
            ranking: info.ranking(),
            auth_type: info.auth_type(),
            modifiable: info.modifiable(),
            use_access_security: info.use_access_security(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    #[serde(flatten)]
    pub provider: ProviderSummary,
    pub reason: FailureReason,
}

/// Active providers plus every provider that is shadowed, invalid, or failed.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeSnapshot {
    pub taken_at: DateTime<Utc>,
    pub providers: Vec<ProviderSummary>,
    pub failed_providers: Vec<ProviderFailure>,
}

impl RuntimeSnapshot {
    /// The active provider mounted exactly at `path`.
    pub fn active_at(&self, path: &str) -> Option<&ProviderSummary> {
        self.providers.iter().find(|p| p.path == path)
    }

    pub fn failures_with(&self, reason: FailureReason) -> impl Iterator<Item = &ProviderFailure> {
        self.failed_providers.iter().filter(move |f| f.reason == reason)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

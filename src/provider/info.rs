//! Provider descriptors and the immutable registration info built from them.

use super::ResourceProvider;
use crate::error::DescriptorError;
use crate::path::normalize_mount_path;
use crate::types::{ProviderId, Ranking};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Whether resolving resources from the provider requires authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    None,
    Required,
}

impl FromStr for AuthType {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" | "no" => Ok(AuthType::None),
            "required" => Ok(AuthType::Required),
            other => Err(DescriptorError::UnknownAuthType(other.to_string())),
        }
    }
}

/// Raw descriptor fields announced by the provider source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub path: String,
    #[serde(default)]
    pub ranking: Ranking,
    #[serde(default = "default_auth_type")]
    pub auth_type: String,
    #[serde(default)]
    pub modifiable: bool,
    #[serde(default)]
    pub use_access_security: bool,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_auth_type() -> String {
    "none".to_string()
}

impl ProviderDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ranking: 0,
            auth_type: default_auth_type(),
            modifiable: false,
            use_access_security: false,
            name: None,
        }
    }

    pub fn ranking(mut self, ranking: Ranking) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.auth_type = auth_type.into();
        self
    }

    pub fn modifiable(mut self, modifiable: bool) -> Self {
        self.modifiable = modifiable;
        self
    }

    pub fn use_access_security(mut self, use_access_security: bool) -> Self {
        self.use_access_security = use_access_security;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Immutable description of one candidate provider.
///
/// Validity is decided once, at construction. An invalid info keeps the raw
/// path so introspection can still show what was announced.
#[derive(Clone)]
pub struct ProviderInfo {
    id: ProviderId,
    path: String,
    ranking: Ranking,
    auth_type: AuthType,
    modifiable: bool,
    use_access_security: bool,
    name: Option<String>,
    invalid: Option<DescriptorError>,
    service: Arc<dyn ResourceProvider>,
}

impl ProviderInfo {
    pub fn new(
        id: ProviderId,
        descriptor: ProviderDescriptor,
        service: Arc<dyn ResourceProvider>,
    ) -> Self {
        let path = normalize_mount_path(&descriptor.path);
        let auth_type = descriptor.auth_type.parse::<AuthType>();
        let invalid = match (&path, &auth_type) {
            (Err(e), _) | (Ok(_), Err(e)) => Some(e.clone()),
            _ => None,
        };
        Self {
            id,
            path: path.unwrap_or(descriptor.path),
            ranking: descriptor.ranking,
            auth_type: auth_type.unwrap_or_default(),
            modifiable: descriptor.modifiable,
            use_access_security: descriptor.use_access_security,
            name: descriptor.name,
            invalid,
            service,
        }
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn ranking(&self) -> Ranking {
        self.ranking
    }

    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    pub fn modifiable(&self) -> bool {
        self.modifiable
    }

    pub fn use_access_security(&self) -> bool {
        self.use_access_security
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_valid(&self) -> bool {
        self.invalid.is_none()
    }

    pub fn invalid_reason(&self) -> Option<&DescriptorError> {
        self.invalid.as_ref()
    }

    pub fn service(&self) -> &Arc<dyn ResourceProvider> {
        &self.service
    }
}

impl PartialEq for ProviderInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ProviderInfo {}

impl fmt::Debug for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInfo")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("ranking", &self.ranking)
            .field("auth_type", &self.auth_type)
            .field("name", &self.name)
            .field("invalid", &self.invalid)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[path={}, ranking={}]",
            self.name.as_deref().unwrap_or("provider"),
            self.path,
            self.ranking
        )?;
        write!(f, " ({})", self.id)
    }
}

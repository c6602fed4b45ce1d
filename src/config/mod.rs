//! Configuration
//!
//! Layered settings for logging and change observation, loaded through the
//! `config` crate by [`ConfigLoader`].

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use crate::observation::{ObserverConfiguration, PathMapping};
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrataConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observation: ObservationSettings,
}

/// How change events are scoped and addressed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSettings {
    /// Prepended to every reported path; empty or `/` leaves paths unchanged
    #[serde(default)]
    pub mount_prefix: String,
    /// Namespace to native prefix rewrites
    #[serde(default)]
    pub path_mappings: Vec<PathMapping>,
    #[serde(default)]
    pub observers: Vec<ObserverConfiguration>,
}

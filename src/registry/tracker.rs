//! Provider tracker: source events keyed by identity -> registry calls.

use super::MountRegistry;
use crate::provider::{ProviderDescriptor, ProviderInfo, ResourceProvider};
use crate::types::ProviderId;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// A provider as announced by the provider source.
#[derive(Clone)]
pub struct ProviderRegistration {
    pub id: ProviderId,
    pub descriptor: ProviderDescriptor,
    pub service: Arc<dyn ResourceProvider>,
}

impl ProviderRegistration {
    pub fn new(
        id: ProviderId,
        descriptor: ProviderDescriptor,
        service: Arc<dyn ResourceProvider>,
    ) -> Self {
        Self {
            id,
            descriptor,
            service,
        }
    }

    fn into_info(self) -> ProviderInfo {
        ProviderInfo::new(self.id, self.descriptor, self.service)
    }
}

/// Lifecycle notification from the provider source.
#[derive(Clone)]
pub enum ProviderEvent {
    Appeared(ProviderRegistration),
    Disappeared(ProviderId),
    Modified(ProviderRegistration),
}

/// Feeds provider source events into a [`MountRegistry`].
pub struct ProviderTracker {
    registry: Arc<MountRegistry>,
    infos: Mutex<HashMap<ProviderId, ProviderInfo>>,
    running: RwLock<bool>,
}

impl ProviderTracker {
    pub fn new(registry: Arc<MountRegistry>) -> Self {
        Self {
            registry,
            infos: Mutex::new(HashMap::new()),
            running: RwLock::new(true),
        }
    }

    pub fn registry(&self) -> &Arc<MountRegistry> {
        &self.registry
    }

    /// Number of providers currently tracked, valid or not.
    pub fn tracked(&self) -> usize {
        self.infos.lock().len()
    }

    /// The identity map stays locked across the registry call, so a
    /// concurrent withdrawal of the same identity is ordered strictly before
    /// or after it. Lock order: identity map, then mount table.
    pub fn provider_appeared(&self, registration: ProviderRegistration) {
        let mut infos = self.infos.lock();
        self.appear_locked(&mut infos, registration);
    }

    pub fn provider_disappeared(&self, id: ProviderId) {
        let mut infos = self.infos.lock();
        self.disappear_locked(&mut infos, id);
    }

    /// Descriptor changes are handled as withdrawal followed by registration.
    pub fn provider_modified(&self, registration: ProviderRegistration) {
        let mut infos = self.infos.lock();
        self.disappear_locked(&mut infos, registration.id);
        self.appear_locked(&mut infos, registration);
    }

    fn appear_locked(
        &self,
        infos: &mut HashMap<ProviderId, ProviderInfo>,
        registration: ProviderRegistration,
    ) {
        if !*self.running.read() {
            debug!(provider = %registration.id, "Tracker closed, ignoring appeared provider");
            return;
        }
        let info = registration.into_info();
        if infos.contains_key(&info.id()) {
            warn!(provider = %info, "Provider appeared twice, ignoring");
            return;
        }
        infos.insert(info.id(), info.clone());
        self.registry.register(info);
    }

    fn disappear_locked(
        &self,
        infos: &mut HashMap<ProviderId, ProviderInfo>,
        id: ProviderId,
    ) {
        match infos.remove(&id) {
            Some(info) => self.registry.unregister(&info),
            None => debug!(provider = %id, "Unknown provider disappeared"),
        }
    }

    pub fn handle(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::Appeared(registration) => self.provider_appeared(registration),
            ProviderEvent::Disappeared(id) => self.provider_disappeared(id),
            ProviderEvent::Modified(registration) => self.provider_modified(registration),
        }
    }

    /// Drain `events` on a dedicated thread until the sender side is dropped
    /// or the tracker is closed.
    pub fn spawn(self: Arc<Self>, events: mpsc::Receiver<ProviderEvent>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("strata-provider-tracker".to_string())
            .spawn(move || {
                info!("Provider tracker started");
                for event in events {
                    if !*self.running.read() {
                        break;
                    }
                    self.handle(event);
                }
                info!("Provider tracker stopped");
            })
    }

    /// Withdraw every tracked provider and shut the registry down.
    pub fn close(&self) {
        *self.running.write() = false;
        let mut infos = self.infos.lock();
        let withdrawn = infos.len();
        for (_, info) in infos.drain() {
            self.registry.unregister(&info);
        }
        self.registry.shutdown();
        info!(withdrawn, "Provider tracker closed");
    }
}

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod startup;

use config::{SessionSettings, Settings};
use metrics_exporter_prometheus::PrometheusHandle;
use services::{
    BusyRegistry, ClientStorage, DemoRoleInference, FixtureCatalog, RequestedRole, RoleResolver,
    SessionStore,
};
use std::sync::Arc;

/// Shared application state handed to every handler and guard.
#[derive(Clone)]
pub struct AppState {
    pub fixtures: Arc<FixtureCatalog>,
    pub role_resolver: Arc<dyn RoleResolver>,
    pub session: SessionSettings,
    pub metrics: PrometheusHandle,
    /// In-flight sign-in/sign-up flags, keyed by browser session id.
    pub busy: BusyRegistry,
}

impl AppState {
    pub fn new(settings: &Settings, fixtures: FixtureCatalog, metrics: PrometheusHandle) -> Self {
        let role_resolver: Arc<dyn RoleResolver> = if settings.session.demo_role_inference {
            Arc::new(DemoRoleInference)
        } else {
            Arc::new(RequestedRole)
        };

        Self {
            fixtures: Arc::new(fixtures),
            role_resolver,
            session: settings.session.clone(),
            metrics,
            busy: BusyRegistry::default(),
        }
    }

    /// A signed-out store over `storage`, configured from settings. The
    /// caller restores it.
    pub fn session_store<S: ClientStorage>(&self, storage: S) -> SessionStore<S> {
        SessionStore::new(storage)
            .with_role_resolver(self.role_resolver.clone())
            .with_auth_delay(self.session.auth_delay())
    }
}

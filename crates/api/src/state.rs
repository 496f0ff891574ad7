use std::sync::Arc;

use hearme_domain::services::{session::InMemorySessionStore, telemetry::TelemetryGuard};
use hearme_storage::SeaOrmStorage;

use crate::auth::IdentityProvider;

/// Cookie and redirect settings used by the sign-in flow.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub public_base_url: String,
    pub cookie_secure: bool,
}

#[derive(Clone)]
pub struct AppState {
    storage: SeaOrmStorage,
    sessions: Arc<InMemorySessionStore>,
    identity: Arc<dyn IdentityProvider>,
    telemetry: TelemetryGuard,
    auth: AuthSettings,
}

impl AppState {
    pub fn new(
        storage: SeaOrmStorage,
        sessions: Arc<InMemorySessionStore>,
        identity: Arc<dyn IdentityProvider>,
        telemetry: TelemetryGuard,
        auth: AuthSettings,
    ) -> Self {
        Self {
            storage,
            sessions,
            identity,
            telemetry,
            auth,
        }
    }

    pub fn storage(&self) -> &SeaOrmStorage {
        &self.storage
    }

    pub fn sessions(&self) -> &InMemorySessionStore {
        self.sessions.as_ref()
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    pub fn telemetry(&self) -> &TelemetryGuard {
        &self.telemetry
    }

    pub fn auth(&self) -> &AuthSettings {
        &self.auth
    }
}

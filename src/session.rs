use std::collections::HashMap;

use tracing::info;

use crate::surface::{SurfaceId, SurfaceRegistry};

/// Reacts to tracking-session (re)starts.
///
/// Identities from a previous session are meaningless in the next one, so a
/// restart disposes every surface and forgets per-identity state.
#[derive(Debug, Default)]
pub struct SessionLifecycle {
    sessions_started: u64,
}

impl SessionLifecycle {
    /// Clears the registry and the synchronizer's per-identity sequence cache.
    pub fn on_session_init(
        &mut self,
        registry: &mut SurfaceRegistry,
        identity_cache: &mut HashMap<SurfaceId, u64>,
    ) {
        let dropped = registry.len();
        registry.clear();
        identity_cache.clear();
        self.sessions_started += 1;
        info!(session = self.sessions_started, dropped, "tracking session started");
    }

    /// Number of session starts seen so far.
    #[must_use]
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }
}

use crate::config::Config;
use crate::optimizer::SharedOptimizer;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Pluggable optimizer. Default: GeminiOptimizer; tests use a stub.
    pub optimizer: SharedOptimizer,
    pub config: Config,
}

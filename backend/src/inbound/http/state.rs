//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they stay testable with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{AuthService, TranscriptionService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthService>,
    pub transcriptions: Arc<dyn TranscriptionService>,
}

impl HttpState {
    /// Bundle the driving ports used by the handlers.
    pub fn new(auth: Arc<dyn AuthService>, transcriptions: Arc<dyn TranscriptionService>) -> Self {
        Self {
            auth,
            transcriptions,
        }
    }
}

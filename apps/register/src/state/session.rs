//! # Session State
//!
//! The logged-in cashier and the gateway bound to their token. Both are
//! fixed for the life of the register process; logging out means building
//! a new `SessionState`.

use std::sync::Arc;

use sabores_core::Session;
use sabores_gateway::OrderGateway;

pub struct SessionState {
    session: Session,
    gateway: Arc<dyn OrderGateway>,
}

impl SessionState {
    pub fn new(session: Session, gateway: Arc<dyn OrderGateway>) -> Self {
        SessionState { session, gateway }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn gateway(&self) -> &dyn OrderGateway {
        self.gateway.as_ref()
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("terminal_id", &self.session.terminal_id)
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

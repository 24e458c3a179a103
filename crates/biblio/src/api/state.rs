//! Application state shared across handlers.

use std::sync::Arc;

use crate::admin::AdminService;
use crate::auth::{AuthState, LoginThrottle};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Administrator account service (the credential store).
    pub admins: Arc<AdminService>,
    /// Authentication state: token issuance, verification, revocation.
    pub auth: AuthState,
    /// Per-address login throttle.
    pub throttle: Arc<LoginThrottle>,
}

impl AppState {
    /// Create new application state.
    pub fn new(admins: AdminService, auth: AuthState, throttle: LoginThrottle) -> Self {
        Self {
            admins: Arc::new(admins),
            auth,
            throttle: Arc::new(throttle),
        }
    }
}

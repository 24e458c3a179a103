//! Test utilities and common setup.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::connect_info::MockConnectInfo;

use biblio::admin::{AdminRepository, AdminService};
use biblio::api::{self, AppState};
use biblio::auth::{AuthConfig, AuthState, LoginThrottle};
use biblio::db::Database;

pub const TEST_USERNAME: &str = "admin";
pub const TEST_PASSWORD: &str = "devpassword123";

/// Create a test AuthConfig with a JWT secret for testing.
fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some("test-secret-for-integration-tests-minimum-32-chars".to_string()),
        ..AuthConfig::default()
    }
}

async fn build_state() -> AppState {
    // In-memory database per test for isolation
    let db = Database::in_memory().await.unwrap();

    let auth_state = AuthState::new(test_auth_config()).unwrap();

    let admin_service = AdminService::new(AdminRepository::new(db.pool().clone()));
    admin_service
        .create_admin(TEST_USERNAME, TEST_PASSWORD)
        .await
        .unwrap();

    let throttle = LoginThrottle::new(5, 15);

    AppState::new(admin_service, auth_state, throttle)
}

/// Create a test application with a seeded administrator account.
///
/// All requests appear to come from the same client address; state is fresh
/// per app, so throttle windows do not leak between tests.
pub async fn test_app() -> Router {
    let state = build_state().await;
    api::create_router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 52100))))
}

/// Create a test application and a valid session token for the seeded admin.
pub async fn test_app_with_token() -> (Router, String) {
    let state = build_state().await;

    let admin = state
        .admins
        .get_by_username(TEST_USERNAME)
        .await
        .unwrap()
        .unwrap();
    let token = state.auth.issue_token(admin.id, &admin.username).unwrap();

    let app =
        api::create_router(state).layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 52100))));
    (app, token)
}

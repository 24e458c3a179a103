//! HTTP API module.
//!
//! REST endpoints for administrator authentication and session control.

mod error;
pub mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;

//! Administrator accounts (the credential store).

mod models;
mod repository;
mod service;

pub use models::{Admin, AdminInfo};
pub use repository::AdminRepository;
pub use service::AdminService;

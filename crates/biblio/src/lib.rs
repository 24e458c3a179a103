//! Digital Library Backend Library
//!
//! Core components for the library catalog backend: administrator
//! authentication and session control, plus the HTTP API that exposes them.

pub mod admin;
pub mod api;
pub mod auth;
pub mod db;

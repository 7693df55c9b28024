//! Authenticated artist favorites gateway
//!
//! An HTTP service that proxies an external art catalog and keeps a
//! per-user favorites list behind email/password accounts. Identity is
//! carried by a signed, time-limited token in an HTTP-only cookie.

pub mod accounts;
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;

pub use state::AppState;

//! HTTP handlers. Thin adapters between axum extractors and the services:
//! parse and validate input, call one service method, wrap the result in the
//! response envelope.

pub mod auth;
pub mod contacts;
pub mod content;
pub mod health;
pub mod reviews;
pub mod users;

pub use health::{health, not_found};

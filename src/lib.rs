pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod resources;
pub mod routes;
pub mod services;
pub mod state;
pub mod types;
pub mod utils;

pub use routes::app;
pub use state::AppState;

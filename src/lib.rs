//! Perpus Library Borrowing Service
//!
//! A Rust implementation of the Perpus library server, providing a REST JSON
//! API for browsing the book catalog and running the borrow/return/fine
//! workflow, with ratings and an admin dashboard.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

//! Contest Judge - programming contest judging service
//!
//! This library provides the core functionality of a contest judge: it
//! accepts source submissions, judges them asynchronously against a
//! test-case corpus, and keeps live standings and submission lists flowing to
//! connected clients.
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Submission lifecycle, standings and contest management
//! - **Judge**: Compile/run pipeline over an external sandbox
//! - **Realtime**: Topic broker and server-sent event streams
//! - **Repositories**: Database access behind the `Store` port
//! - **Models**: Domain models

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod judge;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

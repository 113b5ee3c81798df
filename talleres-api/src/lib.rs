//! # Talleres API Server Library
//!
//! Core functionality for the workshops REST API: session management,
//! the workshop catalog, enrollments, and editable homepage content.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Access gate and security headers
//! - `routes`: API route handlers
//! - `uploads`: Image upload persistence

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod uploads;

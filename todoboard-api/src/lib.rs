//! # Todoboard API Server Library
//!
//! HTTP surface of the multi-user to-do board: session login, owner-scoped
//! to-do operations and optional static file serving for the browser client.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Session gate and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

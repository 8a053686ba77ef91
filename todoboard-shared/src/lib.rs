//! # Todoboard Shared Library
//!
//! Domain types, storage backends and authentication primitives used by the
//! Todoboard API server.
//!
//! ## Module Organization
//!
//! - `models`: To-do items, users and the due-date calculator
//! - `store`: Storage traits with in-memory and PostgreSQL backends
//! - `auth`: Password hashing and login sessions
//! - `db`: PostgreSQL pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Todoboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

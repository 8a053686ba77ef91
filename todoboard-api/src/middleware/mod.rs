/// Middleware modules for the API server
///
/// - `security`: Security response headers
/// - `session`: Session cookie resolution and the login gate

pub mod security;
pub mod session;

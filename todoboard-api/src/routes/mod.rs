/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Login and logout
/// - `pages`: Login and app pages for the browser client
/// - `todos`: Owner-scoped to-do list operations

pub mod auth;
pub mod health;
pub mod pages;
pub mod todos;

//! Bookshelf application library
//!
//! Hosts the `books` and `token` modules and the bootstrap that wires them
//! to the database, the token authority and the HTTP server.

pub mod app;
pub mod modules;

/// Re-export commonly used types
pub use modules::*;

//! Public library modules for the CLI crate
pub mod handlers;
pub mod server;

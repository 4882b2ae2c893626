/// Database configuration and connection management
pub mod database;

/// Catalog seed loading from catalog.toml
pub mod catalog;

/// HTTP listener settings from environment variables
pub mod server;

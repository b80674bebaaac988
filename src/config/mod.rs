/// Database connection and schema management
pub mod database;

/// Mail settings loaded from environment variables
pub mod mail;

/// Application settings and seed data loaded from config.toml
pub mod settings;

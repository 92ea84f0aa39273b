//! SQLite storage implementation for PromptDeck.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `promptdeck-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for prompts, conversations and messages
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! All other crates (`core`, `ai`) are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)          ai (relay)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```
//!
//! Writes are funnelled through a single writer actor (`WriteHandle`), each
//! job running inside an immediate transaction. Reads use pooled connections.

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod conversations;
pub mod prompts;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from promptdeck-core for convenience
pub use promptdeck_core::errors::{DatabaseError, Error, Result};

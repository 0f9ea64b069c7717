//! # Dashboard Database Crate
//!
//! This crate is the dashboard's data source: a thin, application-specific
//! interface to the SQLite file that stores the raw tables.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All SQL lives here. The rest of the workspace sees plain
//!   `core-types` records and never touches a query.
//! - **Explicit Ownership:** There is no global session. Callers create a pool with
//!   `connect`, wrap it in a `DbRepository`, and pass the repository to whatever
//!   needs data access.
//! - **Asynchronous & Pooled:** All operations are asynchronous over an `SqlitePool`.
//!
//! ## Public API
//!
//! - `connect`: Opens (and if needed creates) the database and returns a pool.
//! - `run_migrations`: Applies the embedded schema migrations.
//! - `DbRepository`: `fetch_all(table)`, range queries, and snapshot save/load.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;

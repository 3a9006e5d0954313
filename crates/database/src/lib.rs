//! # Tickerboard Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! market data store: company listings and their daily OHLCV history.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all storage-specific logic behind
//!   the `MarketRepository` trait. Callers never see SQL.
//! - **Swappable Backends:** `DbRepository` talks to PostgreSQL; `InMemoryRepository`
//!   serves a JSON fixture for demos and tests.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and the PostgreSQL
//!   backend uses a connection pool (`PgPool`) for concurrent access.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: Applies the embedded migrations, ensuring the schema is up-to-date.
//! - `MarketRepository`: The data access trait shared by both backends.
//! - `DbRepository` / `InMemoryRepository`: The two implementations.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::{Fixture, InMemoryRepository};
pub use repository::DbRepository;
pub use store::MarketRepository;

//! # Tickerboard Core Types
//!
//! Layer 0 of the workspace: the records every other crate talks about.
//! Companies and daily price bars are owned by the data layer; everything
//! else only reads them.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Exchange, MarketStatus};
pub use error::CoreError;
pub use structs::{Company, PriceBar};

//! # Tickerboard Analytics Engine
//!
//! The market metrics layer of the dashboard: pure functions that turn raw
//! company records and daily OHLCV bars into the figures shown by the API and CLI.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** Every function takes its full input as arguments and keeps
//!   no hidden state, so results depend on nothing but the inputs.
//! - **Neutral Defaults:** Missing or zero prices never raise. They degrade to a defined
//!   neutral value (see [`PriceChange::NEUTRAL`]).
//!
//! ## Public API
//!
//! - [`price_change`], [`market_summary`], [`market_snapshot`], [`sector_performance`]
//! - [`moving_average`] / [`moving_average_iter`], [`technical_indicators`], [`range_stats`], [`latest_quote`]
//! - [`format`]: display formatters for currency, percentages, volumes, dates and durations.

// Declare the modules that constitute this crate.
pub mod change;
pub mod error;
pub mod format;
pub mod moving_average;
pub mod stats;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use change::{price_change, round_change, PriceChange};
pub use error::AnalyticsError;
pub use moving_average::{
    moving_average, moving_average_iter, technical_indicators, technical_indicators_with,
    MovingAveragePoint, PriceField, TechnicalIndicators,
};
pub use stats::{latest_quote, range_stats, LatestQuote, RangeStats};
pub use summary::{
    market_snapshot, market_summary, sector_performance, CompanySnapshot, MarketSummary,
    SectorPerformance,
};

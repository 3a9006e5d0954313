use crate::error::DbError;
use async_trait::async_trait;
use core_types::{Company, PriceBar};

/// Read/write access to company listings and their daily price history.
///
/// The web server and CLI only talk to this trait, so the same handlers run
/// against PostgreSQL (`DbRepository`) or a fixture-backed store
/// (`InMemoryRepository`).
#[async_trait]
pub trait MarketRepository: Send + Sync {
    /// All companies ordered by name, with `current_price`, `previous_close`,
    /// `volume` and `last_update` taken from the two most recent bars.
    async fn list_companies(&self) -> Result<Vec<Company>, DbError>;

    /// A single company, enriched like `list_companies`. `DbError::NotFound` when absent.
    async fn get_company(&self, id: i32) -> Result<Company, DbError>;

    /// Case-insensitive substring match on name, symbol or sector.
    async fn search_companies(&self, query: &str) -> Result<Vec<Company>, DbError>;

    /// The most recent `days` bars for a company in ascending date order.
    /// Unknown companies yield an empty history.
    async fn price_history(&self, company_id: i32, days: u32) -> Result<Vec<PriceBar>, DbError>;

    /// The latest two bars, oldest first.
    async fn latest_bars(&self, company_id: i32) -> Result<Vec<PriceBar>, DbError> {
        self.price_history(company_id, 2).await
    }

    /// Inserts a bar, replacing any existing bar for the same date.
    /// `DbError::NotFound` when the company does not exist.
    async fn upsert_price_bar(&self, company_id: i32, bar: &PriceBar) -> Result<PriceBar, DbError>;
}

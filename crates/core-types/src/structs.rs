use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::CoreError;

/// A listed company together with its most recent pricing information.
///
/// `current_price` and `previous_close` come from the two most recent daily bars
/// and are `None` when the company has no (or only one) recorded trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: i32,
    pub symbol: String,
    pub name: String,
    pub sector: String,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    /// Market capitalization in whole currency units.
    #[serde(default)]
    pub market_cap: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub previous_close: Option<Decimal>,
    /// Volume traded on the most recent day.
    #[serde(default)]
    pub volume: Option<i64>,
    /// Date of the most recent bar.
    #[serde(default)]
    pub last_update: Option<NaiveDate>,
}

fn default_exchange() -> String {
    crate::Exchange::default().code().to_string()
}

/// One calendar day's OHLCV record for a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl PriceBar {
    /// Checks the OHLC envelope: every price is positive, `high` is at least
    /// `max(open, close)`, `low` is at most `min(open, close)` and volume is not negative.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if value <= Decimal::ZERO {
                return Err(CoreError::InvalidInput(
                    field.to_string(),
                    "price must be greater than zero".to_string(),
                ));
            }
        }

        if self.volume < 0 {
            return Err(CoreError::InvalidInput(
                "volume".to_string(),
                "volume must not be negative".to_string(),
            ));
        }

        if self.high < self.open.max(self.close) || self.low > self.open.min(self.close) {
            return Err(CoreError::InvalidInput(
                "ohlc".to_string(),
                "high must be >= open/close, low must be <= open/close".to_string(),
            ));
        }

        Ok(())
    }
}

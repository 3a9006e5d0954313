use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The stock exchanges a listed company can trade on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    #[default]
    Nse,
    Bse,
    Mcx,
}

impl Exchange {
    /// The short code used in the database and the API (e.g. "NSE").
    pub fn code(&self) -> &'static str {
        match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
            Exchange::Mcx => "MCX",
        }
    }

    /// The human readable name of the exchange.
    pub fn full_name(&self) -> &'static str {
        match self {
            Exchange::Nse => "National Stock Exchange",
            Exchange::Bse => "Bombay Stock Exchange",
            Exchange::Mcx => "Multi Commodity Exchange",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Exchange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NSE" => Ok(Exchange::Nse),
            "BSE" => Ok(Exchange::Bse),
            "MCX" => Ok(Exchange::Mcx),
            other => Err(CoreError::InvalidInput(
                "exchange".to_string(),
                format!("unknown exchange code '{other}'"),
            )),
        }
    }
}

/// Trading session state of the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Open,
    Closed,
    PreOpen,
    PostClose,
}

impl MarketStatus {
    pub fn code(&self) -> &'static str {
        match self {
            MarketStatus::Open => "OPEN",
            MarketStatus::Closed => "CLOSED",
            MarketStatus::PreOpen => "PRE_OPEN",
            MarketStatus::PostClose => "POST_CLOSE",
        }
    }
}

impl FromStr for MarketStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(MarketStatus::Open),
            "CLOSED" => Ok(MarketStatus::Closed),
            "PRE_OPEN" => Ok(MarketStatus::PreOpen),
            "POST_CLOSE" => Ok(MarketStatus::PostClose),
            other => Err(CoreError::InvalidInput(
                "market_status".to_string(),
                format!("unknown market status '{other}'"),
            )),
        }
    }
}

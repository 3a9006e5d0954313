use chrono::NaiveDate;
use core_types::PriceBar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::change::{price_change, round_change};

/// High/low/volume statistics over a window of bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeStats {
    pub high: Decimal,
    pub low: Decimal,
    pub average_volume: Decimal,
    /// `high - low`.
    pub range: Decimal,
}

/// Period high, low and mean volume. `None` for an empty series.
pub fn range_stats(series: &[PriceBar]) -> Option<RangeStats> {
    let first = series.first()?;

    let (high, low, volume_total) = series.iter().fold(
        (first.high, first.low, Decimal::ZERO),
        |(high, low, volume), bar| {
            (high.max(bar.high), low.min(bar.low), volume + Decimal::from(bar.volume))
        },
    );

    Some(RangeStats {
        high,
        low,
        average_volume: volume_total / Decimal::from(series.len()),
        range: high - low,
    })
}

/// The most recent closing price and its change against the prior session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestQuote {
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub date: NaiveDate,
    pub volume: i64,
}

impl LatestQuote {
    /// Rounds the change figures to two decimals for presentation.
    pub fn rounded(self) -> Self {
        Self {
            change: round_change(self.change),
            change_percent: round_change(self.change_percent),
            ..self
        }
    }
}

/// Builds a quote from the last two bars of a chronologically ordered series.
///
/// With a single bar the previous close is taken to be the bar itself, so the
/// change is zero. `None` for an empty series.
pub fn latest_quote(series: &[PriceBar]) -> Option<LatestQuote> {
    let latest = series.last()?;
    let previous = series.len().checked_sub(2).map_or(latest, |i| &series[i]);

    let change = price_change(Some(latest.close), Some(previous.close));
    Some(LatestQuote {
        price: latest.close,
        change: change.absolute,
        change_percent: change.percentage,
        date: latest.date,
        volume: latest.volume,
    })
}

use chrono::NaiveDate;
use core_types::PriceBar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;

/// The bar field a moving average is computed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
    Volume,
}

impl PriceField {
    pub fn value_of(&self, bar: &PriceBar) -> Decimal {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
            PriceField::Volume => Decimal::from(bar.volume),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::Volume => "volume",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            "volume" => Ok(PriceField::Volume),
            _ => Err(AnalyticsError::UnknownField(s.to_string())),
        }
    }
}

/// The average of one trailing window, stamped with the date of its last bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Lazily yields the simple moving average of `field` over `series`.
///
/// `series` must be ordered oldest first. One point is produced per complete
/// window, so the iterator is empty when the series is shorter than `period`
/// or `period` is zero.
pub fn moving_average_iter(
    series: &[PriceBar],
    period: usize,
    field: PriceField,
) -> impl Iterator<Item = MovingAveragePoint> + '_ {
    // `windows` panics on a zero size; an empty slice of windows is the same answer.
    let empty: &[PriceBar] = &[];
    let windows = if period == 0 { empty.windows(1) } else { series.windows(period) };
    let divisor = Decimal::from(period.max(1));

    windows.map(move |window| {
        let sum: Decimal = window.iter().map(|bar| field.value_of(bar)).sum();
        MovingAveragePoint {
            // A window is never empty here.
            date: window[window.len() - 1].date,
            value: sum / divisor,
        }
    })
}

/// Materialized form of [`moving_average_iter`].
pub fn moving_average(series: &[PriceBar], period: usize, field: PriceField) -> Vec<MovingAveragePoint> {
    moving_average_iter(series, period, field).collect()
}

/// Latest short and long simple moving averages of the closing price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalIndicators {
    pub sma_20: Option<Decimal>,
    pub sma_50: Option<Decimal>,
}

/// SMA-20 and SMA-50 as of the last bar; each is `None` until enough bars exist.
pub fn technical_indicators(series: &[PriceBar]) -> TechnicalIndicators {
    technical_indicators_with(series, 20, 50)
}

/// Like [`technical_indicators`] with custom short and long periods.
pub fn technical_indicators_with(
    series: &[PriceBar],
    short_period: usize,
    long_period: usize,
) -> TechnicalIndicators {
    TechnicalIndicators {
        sma_20: latest_average(series, short_period),
        sma_50: latest_average(series, long_period),
    }
}

fn latest_average(series: &[PriceBar], period: usize) -> Option<Decimal> {
    if period == 0 || series.len() < period {
        return None;
    }
    moving_average_iter(&series[series.len() - period..], period, PriceField::Close)
        .last()
        .map(|point| point.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn series(closes: &[Decimal]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar {
                date: start + chrono::Days::new(i as u64),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1_000 * (i as i64 + 1),
            })
            .collect()
    }

    #[test]
    fn three_period_average_of_one_to_five() {
        let bars = series(&[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
        let points = moving_average(&bars, 3, PriceField::Close);

        let values: Vec<Decimal> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![dec!(2), dec!(3), dec!(4)]);
        assert_eq!(points[0].date, bars[2].date);
        assert_eq!(points[2].date, bars[4].date);
    }

    #[test]
    fn short_series_and_zero_period_give_nothing() {
        let bars = series(&[dec!(1), dec!(2)]);
        assert!(moving_average(&bars, 3, PriceField::Close).is_empty());
        assert!(moving_average(&bars, 0, PriceField::Close).is_empty());
        assert!(moving_average(&[], 1, PriceField::Close).is_empty());
    }

    #[test]
    fn period_one_reproduces_the_field() {
        let bars = series(&[dec!(7.5), dec!(8.25)]);
        let points = moving_average(&bars, 1, PriceField::Close);
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].value, dec!(8.25));
    }

    #[test]
    fn volume_field_is_averaged() {
        let bars = series(&[dec!(1), dec!(1), dec!(1)]);
        let points = moving_average(&bars, 2, PriceField::Volume);
        assert_eq!(points[0].value, dec!(1500));
        assert_eq!(points[1].value, dec!(2500));
    }

    #[test]
    fn iterator_is_restartable() {
        let bars = series(&[dec!(3), dec!(6), dec!(9), dec!(12)]);
        let first: Vec<_> = moving_average_iter(&bars, 2, PriceField::Close).collect();
        let second: Vec<_> = moving_average_iter(&bars, 2, PriceField::Close).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn fields_parse_from_text() {
        assert_eq!("Close".parse::<PriceField>().unwrap(), PriceField::Close);
        assert_eq!("volume".parse::<PriceField>().unwrap(), PriceField::Volume);
        assert!(matches!(
            "adj_close".parse::<PriceField>(),
            Err(AnalyticsError::UnknownField(f)) if f == "adj_close"
        ));
    }

    #[test]
    fn indicators_need_enough_bars() {
        let closes: Vec<Decimal> = (1..=19).map(Decimal::from).collect();
        assert_eq!(technical_indicators(&series(&closes)), TechnicalIndicators::default());

        let closes: Vec<Decimal> = (1..=30).map(Decimal::from).collect();
        let indicators = technical_indicators(&series(&closes));
        // Mean of 11..=30.
        assert_eq!(indicators.sma_20, Some(dec!(20.5)));
        assert_eq!(indicators.sma_50, None);

        let closes: Vec<Decimal> = (1..=50).map(Decimal::from).collect();
        let indicators = technical_indicators(&series(&closes));
        assert_eq!(indicators.sma_20, Some(dec!(40.5)));
        assert_eq!(indicators.sma_50, Some(dec!(25.5)));
    }

    #[test]
    fn indicators_serialize_with_camel_case_keys() {
        let indicators = TechnicalIndicators {
            sma_20: Some(dec!(20.5)),
            sma_50: None,
        };
        let json = serde_json::to_value(indicators).unwrap();
        assert_eq!(json, serde_json::json!({"sma20": 20.5, "sma50": null}));
    }
}

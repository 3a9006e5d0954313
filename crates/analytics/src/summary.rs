use chrono::NaiveDate;
use core_types::Company;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::change::{price_change, round_change};

/// Market-wide counts and totals over a list of companies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub total_market_cap: i64,
    pub gainers: usize,
    pub losers: usize,
    pub unchanged: usize,
}

impl MarketSummary {
    pub fn total_companies(&self) -> usize {
        self.gainers + self.losers + self.unchanged
    }
}

/// One row of the market overview table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySnapshot {
    pub id: i32,
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub market_cap: Option<i64>,
    pub current_price: Option<Decimal>,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub volume: Option<i64>,
    pub last_update: Option<NaiveDate>,
}

/// Aggregate figures for all companies in one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorPerformance {
    pub sector: String,
    pub company_count: usize,
    /// Mean current price over the companies that have one.
    pub average_price: Option<Decimal>,
    /// `None` when no company in the sector reports a market cap.
    pub total_market_cap: Option<i64>,
}

/// Reduces `companies` into gainer/loser/unchanged counts and the total market cap.
///
/// A company is a gainer or loser by the sign of `current_price - previous_close`.
/// A missing price on either side, or a zero previous close, counts as unchanged;
/// a zero current price against a positive close is a loser. An empty list gives
/// the zero-valued summary.
pub fn market_summary(companies: &[Company]) -> MarketSummary {
    let summary = companies.iter().fold(MarketSummary::default(), |mut acc, company| {
        acc.total_market_cap = acc
            .total_market_cap
            .saturating_add(company.market_cap.unwrap_or(0));

        match classify(company) {
            Ordering::Greater => acc.gainers += 1,
            Ordering::Less => acc.losers += 1,
            Ordering::Equal => acc.unchanged += 1,
        }
        acc
    });

    tracing::debug!(
        companies = companies.len(),
        gainers = summary.gainers,
        losers = summary.losers,
        unchanged = summary.unchanged,
        "Computed market summary."
    );
    summary
}

fn classify(company: &Company) -> Ordering {
    match (company.current_price, company.previous_close) {
        (Some(current), Some(previous)) if !previous.is_zero() => current.cmp(&previous),
        _ => Ordering::Equal,
    }
}

/// Builds one overview row per company, largest market cap first.
/// Change figures are rounded to two decimals.
/// Companies without a market cap are listed last, in their input order.
pub fn market_snapshot(companies: &[Company]) -> Vec<CompanySnapshot> {
    let mut rows: Vec<CompanySnapshot> = companies
        .iter()
        .map(|company| {
            let change = price_change(company.current_price, company.previous_close);
            CompanySnapshot {
                id: company.id,
                symbol: company.symbol.clone(),
                name: company.name.clone(),
                sector: company.sector.clone(),
                market_cap: company.market_cap,
                current_price: company.current_price,
                change: round_change(change.absolute),
                change_percent: round_change(change.percentage),
                volume: company.volume,
                last_update: company.last_update,
            }
        })
        .collect();

    rows.sort_by(|a, b| descending_nulls_last(a.market_cap, b.market_cap));
    rows
}

/// Groups companies by sector and aggregates price and market cap per group.
pub fn sector_performance(companies: &[Company]) -> Vec<SectorPerformance> {
    #[derive(Default)]
    struct Acc {
        count: usize,
        price_sum: Decimal,
        priced: usize,
        cap_total: Option<i64>,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for company in companies {
        let acc = groups.entry(company.sector.as_str()).or_default();
        acc.count += 1;
        if let Some(price) = company.current_price {
            acc.price_sum += price;
            acc.priced += 1;
        }
        if let Some(cap) = company.market_cap {
            acc.cap_total = Some(acc.cap_total.unwrap_or(0).saturating_add(cap));
        }
    }

    let mut sectors: Vec<SectorPerformance> = groups
        .into_iter()
        .map(|(sector, acc)| SectorPerformance {
            sector: sector.to_string(),
            company_count: acc.count,
            average_price: (acc.priced > 0).then(|| acc.price_sum / Decimal::from(acc.priced)),
            total_market_cap: acc.cap_total,
        })
        .collect();

    // Stable sort keeps the alphabetical order from the BTreeMap for ties.
    sectors.sort_by(|a, b| descending_nulls_last(a.total_market_cap, b.total_market_cap));
    sectors
}

fn descending_nulls_last(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

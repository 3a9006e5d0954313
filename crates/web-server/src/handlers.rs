use crate::{error::AppError, AppState};
use analytics::{
    latest_quote, market_snapshot, market_summary, moving_average, range_stats, sector_performance,
    technical_indicators_with, CompanySnapshot, LatestQuote, MarketSummary, MovingAveragePoint,
    PriceField, RangeStats, SectorPerformance, TechnicalIndicators,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use core_types::{Company, PriceBar};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

const COMPANY_NOT_FOUND: &str = "Company not found";

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MovingAverageQuery {
    #[serde(default = "default_period")]
    pub period: usize,
    pub field: Option<String>,
    pub days: Option<u32>,
}
fn default_period() -> usize { 20 }

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Body of `POST /api/companies/:id/stock-data`. Every field is required.
#[derive(Debug, Deserialize)]
pub struct PriceBarInput {
    pub date: Option<NaiveDate>,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub volume: Option<i64>,
}

impl PriceBarInput {
    pub fn into_bar(self) -> Result<PriceBar, AppError> {
        match self {
            PriceBarInput {
                date: Some(date),
                open: Some(open),
                high: Some(high),
                low: Some(low),
                close: Some(close),
                volume: Some(volume),
            } => {
                let bar = PriceBar { date, open, high, low, close, volume };
                bar.validate()?;
                Ok(bar)
            }
            _ => Err(AppError::BadRequest("Missing required fields".to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndicatorsResponse {
    pub indicators: TechnicalIndicators,
    pub range: Option<RangeStats>,
}

#[derive(Debug, Serialize)]
pub struct MarketSummaryResponse {
    pub summary: MarketSummary,
    pub companies: Vec<CompanySnapshot>,
}

/// # GET /api/companies
pub async fn get_companies(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Company>>, AppError> {
    let companies = state.repo.list_companies().await?;
    Ok(Json(companies))
}

/// # GET /api/companies/:id
pub async fn get_company(
    Path(id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Company>, AppError> {
    let company = state
        .repo
        .get_company(id)
        .await
        .map_err(AppError::not_found_as(COMPANY_NOT_FOUND))?;
    Ok(Json(company))
}

/// # GET /api/companies/:id/stock-data
/// Daily bars, oldest first. Unknown companies simply have no history.
pub async fn get_stock_data(
    Path(id): Path<i32>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PriceBar>>, AppError> {
    let days = state.market.history_days(query.days);
    let bars = state.repo.price_history(id, days).await?;
    Ok(Json(bars))
}

/// # POST /api/companies/:id/stock-data
pub async fn add_stock_data(
    Path(id): Path<i32>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<PriceBarInput>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let bar = input.into_bar()?;
    let saved = state
        .repo
        .upsert_price_bar(id, &bar)
        .await
        .map_err(AppError::not_found_as(COMPANY_NOT_FOUND))?;

    tracing::info!(company_id = id, date = %saved.date, "Stock data recorded.");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Stock data added successfully", "data": saved })),
    ))
}

/// # GET /api/companies/:id/latest-price
pub async fn get_latest_price(
    Path(id): Path<i32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LatestQuote>, AppError> {
    let bars = state.repo.latest_bars(id).await?;
    let quote = latest_quote(&bars)
        .ok_or_else(|| AppError::NotFound("No stock data found".to_string()))?;
    Ok(Json(quote.rounded()))
}

/// # GET /api/companies/:id/moving-average
pub async fn get_moving_average(
    Path(id): Path<i32>,
    Query(query): Query<MovingAverageQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MovingAveragePoint>>, AppError> {
    if query.period == 0 {
        return Err(AppError::BadRequest("period must be at least 1".to_string()));
    }
    let field = match query.field.as_deref() {
        Some(raw) => raw
            .parse::<PriceField>()
            .map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => PriceField::default(),
    };

    // Fetch at least one full window unless the caller asked otherwise.
    let period_days = u32::try_from(query.period).unwrap_or(u32::MAX);
    let days = state.market.history_days(
        query
            .days
            .or(Some(state.market.default_history_days.max(period_days))),
    );
    let bars = state.repo.price_history(id, days).await?;
    Ok(Json(moving_average(&bars, query.period, field)))
}

/// # GET /api/companies/:id/indicators
pub async fn get_indicators(
    Path(id): Path<i32>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<IndicatorsResponse>, AppError> {
    let market = &state.market;
    let long_days = u32::try_from(market.sma_long_period).unwrap_or(u32::MAX);
    let days = market.history_days(query.days.or(Some(market.default_history_days.max(long_days))));
    let bars = state.repo.price_history(id, days).await?;

    Ok(Json(IndicatorsResponse {
        indicators: technical_indicators_with(
            &bars,
            market.sma_short_period,
            market.sma_long_period,
        ),
        range: range_stats(&bars),
    }))
}

/// # GET /api/market-summary
pub async fn get_market_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MarketSummaryResponse>, AppError> {
    let companies = state.repo.list_companies().await?;
    Ok(Json(MarketSummaryResponse {
        summary: market_summary(&companies),
        companies: market_snapshot(&companies),
    }))
}

/// # GET /api/market/sectors
pub async fn get_sectors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SectorPerformance>>, AppError> {
    let companies = state.repo.list_companies().await?;
    Ok(Json(sector_performance(&companies)))
}

/// # GET /api/search/companies
pub async fn search_companies(
    Query(query): Query<SearchQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Company>>, AppError> {
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(AppError::BadRequest("Search query required".to_string()));
    }
    let companies = state.repo.search_companies(term).await?;
    Ok(Json(companies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input() -> PriceBarInput {
        PriceBarInput {
            date: NaiveDate::from_ymd_opt(2024, 6, 3),
            open: Some(dec!(100)),
            high: Some(dec!(105)),
            low: Some(dec!(98)),
            close: Some(dec!(103)),
            volume: Some(1_000),
        }
    }

    #[test]
    fn complete_input_becomes_a_bar() {
        let bar = input().into_bar().unwrap();
        assert_eq!(bar.close, dec!(103));
        assert_eq!(bar.volume, 1_000);
    }

    #[test]
    fn missing_field_is_a_bad_request() {
        let result = PriceBarInput { volume: None, ..input() }.into_bar();
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Missing required fields"));
    }

    #[test]
    fn inconsistent_ohlc_is_a_validation_error() {
        let result = PriceBarInput { high: Some(dec!(99)), ..input() }.into_bar();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

//! Drives the full router against an in-memory repository.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use configuration::MarketSettings;
use database::{Fixture, InMemoryRepository};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use web_server::{app, AppState};

fn fixture() -> Fixture {
    serde_json::from_value(json!({
        "companies": [
            {"id": 1, "symbol": "TCS.NS", "name": "Tata Consultancy Services", "sector": "IT",
             "market_cap": 1300000000000i64},
            {"id": 2, "symbol": "INFY.NS", "name": "Infosys Limited", "sector": "IT",
             "market_cap": 700000000000i64},
            {"id": 3, "symbol": "NEWCO.NS", "name": "Newly Listed Co", "sector": "Retail"}
        ],
        "price_history": {
            "1": [
                {"date": "2024-06-03", "open": 3750, "high": 3810, "low": 3740, "close": 3800, "volume": 1000},
                {"date": "2024-06-04", "open": 3800, "high": 3830, "low": 3780, "close": 3820, "volume": 1200},
                {"date": "2024-06-05", "open": 3800, "high": 3850, "low": 3790, "close": 3840, "volume": 1400}
            ],
            "2": [
                {"date": "2024-06-04", "open": 1500, "high": 1510, "low": 1490, "close": 1500, "volume": 900},
                {"date": "2024-06-05", "open": 1500, "high": 1505, "low": 1480, "close": 1485, "volume": 800}
            ]
        }
    }))
    .expect("fixture is valid")
}

fn router() -> Router {
    let repo = Arc::new(InMemoryRepository::from_parts(fixture()));
    app(AppState::new(repo, MarketSettings::default()))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

#[tokio::test]
async fn health_check_responds_ok() {
    let response = router()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn companies_are_listed_with_latest_prices() {
    let (status, body) = get(router(), "/api/companies").await;
    assert_eq!(status, StatusCode::OK);

    let companies = body.as_array().unwrap();
    assert_eq!(companies.len(), 3);
    assert_eq!(companies[0]["symbol"], "INFY.NS");
    assert_eq!(companies[2]["current_price"], json!(3840.0));
    assert_eq!(companies[2]["previous_close"], json!(3820.0));
}

#[tokio::test]
async fn unknown_company_is_404() {
    let (status, body) = get(router(), "/api/companies/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Company not found");
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let (status, _) = get(router(), "/api/companies/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stock_data_honours_days() {
    let (status, body) = get(router(), "/api/companies/1/stock-data?days=2").await;
    assert_eq!(status, StatusCode::OK);
    let dates: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|bar| bar["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-06-04", "2024-06-05"]);
}

#[tokio::test]
async fn latest_price_reports_rounded_change() {
    let (status, body) = get(router(), "/api/companies/2/latest-price").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], json!(1485.0));
    assert_eq!(body["change"], json!(-15.0));
    assert_eq!(body["changePercent"], json!(-1.0));
    assert_eq!(body["date"], "2024-06-05");

    let (status, body) = get(router(), "/api/companies/3/latest-price").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No stock data found");
}

#[tokio::test]
async fn moving_average_uses_requested_field_and_period() {
    let (status, body) = get(router(), "/api/companies/1/moving-average?period=2&field=close").await;
    assert_eq!(status, StatusCode::OK);
    let values: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![3810.0, 3830.0]);

    let (status, _) = get(router(), "/api/companies/1/moving-average?period=2&field=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(router(), "/api/companies/1/moving-average?period=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn indicators_include_range_statistics() {
    let (status, body) = get(router(), "/api/companies/1/indicators").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["indicators"]["sma20"], Value::Null);
    assert_eq!(body["indicators"]["sma50"], Value::Null);
    assert_eq!(body["range"]["high"], json!(3850.0));
    assert_eq!(body["range"]["low"], json!(3740.0));
    assert_eq!(body["range"]["averageVolume"], json!(1200.0));

    let (_, body) = get(router(), "/api/companies/3/indicators").await;
    assert_eq!(body["range"], Value::Null);
}

#[tokio::test]
async fn market_summary_counts_gainers_and_losers() {
    let (status, body) = get(router(), "/api/market-summary").await;
    assert_eq!(status, StatusCode::OK);

    let summary = &body["summary"];
    assert_eq!(summary["gainers"], 1);
    assert_eq!(summary["losers"], 1);
    assert_eq!(summary["unchanged"], 1);
    assert_eq!(summary["totalMarketCap"], json!(2_000_000_000_000i64));

    let symbols: Vec<&str> = body["companies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols, vec!["TCS.NS", "INFY.NS", "NEWCO.NS"]);

    // (3840 - 3820) / 3820 * 100 = 0.52356...
    let tcs = &body["companies"][0];
    assert_eq!(tcs["change"], json!(20.0));
    assert_eq!(tcs["changePercent"], json!(0.52));
}

#[tokio::test]
async fn sectors_are_grouped() {
    let (status, body) = get(router(), "/api/market/sectors").await;
    assert_eq!(status, StatusCode::OK);
    let sectors = body.as_array().unwrap();
    assert_eq!(sectors.len(), 2);
    assert_eq!(sectors[0]["sector"], "IT");
    assert_eq!(sectors[0]["companyCount"], 2);
}

#[tokio::test]
async fn search_requires_a_query() {
    let (status, body) = get(router(), "/api/search/companies?q=%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Search query required");

    let (status, body) = get(router(), "/api/search/companies?q=infy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn posted_bar_is_stored_and_becomes_latest() {
    let router = router();
    let (status, body) = post_json(
        router.clone(),
        "/api/companies/3/stock-data",
        json!({"date": "2024-06-05", "open": 50, "high": 55, "low": 49, "close": 54, "volume": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Stock data added successfully");
    assert_eq!(body["data"]["close"], json!(54.0));

    let (status, body) = get(router, "/api/companies/3/latest-price").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], json!(54.0));
}

#[tokio::test]
async fn invalid_bars_are_rejected() {
    let (status, body) = post_json(
        router(),
        "/api/companies/1/stock-data",
        json!({"date": "2024-06-06", "open": 100, "close": 101, "volume": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = post_json(
        router(),
        "/api/companies/1/stock-data",
        json!({"date": "2024-06-06", "open": 100, "high": 99, "low": 98, "close": 101, "volume": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid ohlc"));

    let (status, _) = post_json(
        router(),
        "/api/companies/99/stock-data",
        json!({"date": "2024-06-06", "open": 1, "high": 1, "low": 1, "close": 1, "volume": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

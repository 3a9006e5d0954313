use crate::error::DbError;
use crate::store::MarketRepository;
use async_trait::async_trait;
use chrono::NaiveDate;
use core_types::{Company, PriceBar};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tokio::sync::RwLock;

/// On-disk layout of a fixture file.
///
/// ```json
/// { "companies": [ ... ], "price_history": { "1": [ ... ] } }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    pub companies: Vec<Company>,
    #[serde(default)]
    pub price_history: HashMap<i32, Vec<PriceBar>>,
}

#[derive(Debug, Default)]
struct Store {
    companies: BTreeMap<i32, Company>,
    bars: HashMap<i32, BTreeMap<NaiveDate, PriceBar>>,
}

impl Store {
    /// Overlays the latest two bars onto a company record.
    fn enriched(&self, company: &Company) -> Company {
        let mut company = company.clone();
        if let Some(bars) = self.bars.get(&company.id) {
            let mut recent = bars.values().rev();
            if let Some(latest) = recent.next() {
                company.current_price = Some(latest.close);
                company.volume = Some(latest.volume);
                company.last_update = Some(latest.date);
                company.previous_close = recent.next().map(|bar| bar.close);
            }
        }
        company
    }

    fn sorted_by_name(&self, mut companies: Vec<Company>) -> Vec<Company> {
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        companies
    }
}

/// A fixture-backed `MarketRepository` for running without PostgreSQL.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(fixture: Fixture) -> Self {
        let companies = fixture
            .companies
            .into_iter()
            .map(|company| (company.id, company))
            .collect();
        let bars = fixture
            .price_history
            .into_iter()
            .map(|(id, bars)| (id, bars.into_iter().map(|bar| (bar.date, bar)).collect()))
            .collect();
        Self {
            store: RwLock::new(Store { companies, bars }),
        }
    }

    /// Loads companies and price history from a JSON fixture file.
    pub async fn from_fixture(path: &Path) -> Result<Self, DbError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let fixture: Fixture = serde_json::from_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            companies = fixture.companies.len(),
            "Loaded market fixture."
        );
        Ok(Self::from_parts(fixture))
    }
}

#[async_trait]
impl MarketRepository for InMemoryRepository {
    async fn list_companies(&self) -> Result<Vec<Company>, DbError> {
        let store = self.store.read().await;
        let companies = store.companies.values().map(|c| store.enriched(c)).collect();
        Ok(store.sorted_by_name(companies))
    }

    async fn get_company(&self, id: i32) -> Result<Company, DbError> {
        let store = self.store.read().await;
        store
            .companies
            .get(&id)
            .map(|c| store.enriched(c))
            .ok_or(DbError::NotFound)
    }

    async fn search_companies(&self, query: &str) -> Result<Vec<Company>, DbError> {
        let needle = query.trim().to_lowercase();
        let store = self.store.read().await;
        let companies = store
            .companies
            .values()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.symbol.to_lowercase().contains(&needle)
                    || c.sector.to_lowercase().contains(&needle)
            })
            .map(|c| store.enriched(c))
            .collect();
        Ok(store.sorted_by_name(companies))
    }

    async fn price_history(&self, company_id: i32, days: u32) -> Result<Vec<PriceBar>, DbError> {
        let store = self.store.read().await;
        let Some(bars) = store.bars.get(&company_id) else {
            return Ok(Vec::new());
        };
        let mut recent: Vec<PriceBar> = bars.values().rev().take(days as usize).cloned().collect();
        recent.reverse();
        Ok(recent)
    }

    async fn upsert_price_bar(&self, company_id: i32, bar: &PriceBar) -> Result<PriceBar, DbError> {
        let mut store = self.store.write().await;
        if !store.companies.contains_key(&company_id) {
            return Err(DbError::NotFound);
        }
        store
            .bars
            .entry(company_id)
            .or_default()
            .insert(bar.date, bar.clone());
        tracing::debug!(company_id, date = %bar.date, "Upserted price bar.");
        Ok(bar.clone())
    }
}

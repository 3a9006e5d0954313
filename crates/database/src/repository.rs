use crate::error::DbError;
use crate::store::MarketRepository;
use async_trait::async_trait;
use core_types::{Company, PriceBar};
use sqlx::postgres::PgPool;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

// Prices are derived from the two most recent `stock_data` rows of each company.
const COMPANY_SELECT: &str = r#"
    SELECT
        c.id, c.symbol, c.name, c.sector,
        COALESCE(c.exchange, 'NSE') AS exchange,
        c.market_cap, c.description, c.website,
        latest.close_price AS current_price,
        prev.close_price AS previous_close,
        latest.volume AS volume,
        latest.date AS last_update
    FROM companies AS c
    LEFT JOIN LATERAL (
        SELECT close_price, volume, date FROM stock_data
        WHERE company_id = c.id ORDER BY date DESC LIMIT 1
    ) AS latest ON TRUE
    LEFT JOIN LATERAL (
        SELECT close_price FROM stock_data
        WHERE company_id = c.id ORDER BY date DESC OFFSET 1 LIMIT 1
    ) AS prev ON TRUE
"#;

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn company_exists(&self, id: i32) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM companies WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

/// Escapes LIKE wildcards so user input is matched literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl MarketRepository for DbRepository {
    async fn list_companies(&self) -> Result<Vec<Company>, DbError> {
        let sql = format!("{COMPANY_SELECT} ORDER BY c.name");
        let companies = sqlx::query_as::<_, Company>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    async fn get_company(&self, id: i32) -> Result<Company, DbError> {
        let sql = format!("{COMPANY_SELECT} WHERE c.id = $1");
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| if let sqlx::Error::RowNotFound = e { DbError::NotFound } else { e.into() })?;
        Ok(company)
    }

    async fn search_companies(&self, query: &str) -> Result<Vec<Company>, DbError> {
        let sql = format!(
            "{COMPANY_SELECT} WHERE c.name ILIKE $1 OR c.symbol ILIKE $1 OR c.sector ILIKE $1 ORDER BY c.name"
        );
        let companies = sqlx::query_as::<_, Company>(&sql)
            .bind(like_pattern(query.trim()))
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    async fn price_history(&self, company_id: i32, days: u32) -> Result<Vec<PriceBar>, DbError> {
        let bars = sqlx::query_as::<_, PriceBar>(
            r#"
            SELECT date, open, high, low, close, volume FROM (
                SELECT date, open_price AS open, high_price AS high, low_price AS low,
                       close_price AS close, volume
                FROM stock_data
                WHERE company_id = $1
                ORDER BY date DESC
                LIMIT $2
            ) AS recent
            ORDER BY date ASC
            "#,
        )
        .bind(company_id)
        .bind(i64::from(days))
        .fetch_all(&self.pool)
        .await?;
        Ok(bars)
    }

    async fn upsert_price_bar(&self, company_id: i32, bar: &PriceBar) -> Result<PriceBar, DbError> {
        if !self.company_exists(company_id).await? {
            return Err(DbError::NotFound);
        }

        let saved = sqlx::query_as::<_, PriceBar>(
            r#"
            INSERT INTO stock_data (company_id, date, open_price, high_price, low_price, close_price, volume)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (company_id, date) DO UPDATE SET
                open_price = EXCLUDED.open_price,
                high_price = EXCLUDED.high_price,
                low_price = EXCLUDED.low_price,
                close_price = EXCLUDED.close_price,
                volume = EXCLUDED.volume
            RETURNING date, open_price AS open, high_price AS high, low_price AS low,
                      close_price AS close, volume
            "#,
        )
        .bind(company_id)
        .bind(bar.date)
        .bind(bar.open)
        .bind(bar.high)
        .bind(bar.low)
        .bind(bar.close)
        .bind(bar.volume)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(company_id, date = %saved.date, "Upserted price bar.");
        Ok(saved)
    }
}

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::models::{Airport, Benefit, FlightOption, FlightOptionFilter, NodeId};
use crate::services::store::{ContentStore, StoreError};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

/// PostgreSQL-backed content store
///
/// Flight options live in `flight_options`; airport and benefit references
/// are kept in ordered join tables (`delta` is the position within the field)
/// and file fields point at `files`, whose `uri` is returned as-is.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL content store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    async fn query_ids(&self, filter: &FlightOptionFilter) -> Result<Vec<NodeId>, PostgresError> {
        let query = r#"
            SELECT id
            FROM flight_options
            WHERE market_code = $1
              AND region_code = $2
              AND ($3::BOOLEAN IS NULL OR published = $3)
            ORDER BY id
        "#;

        let rows = sqlx::query(query)
            .bind(&filter.market_code)
            .bind(&filter.region_code)
            .bind(filter.status.published())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("id").map_err(PostgresError::from).and_then(to_node_id))
            .collect()
    }

    async fn load(&self, id: NodeId) -> Result<Option<FlightOption>, PostgresError> {
        let db_id = i64::try_from(id).map_err(|_| PostgresError::InvalidId(id.to_string()))?;

        let query = r#"
            SELECT fo.id, fo.title, fo.is_recommend, fo.tags, fo.market_code,
                   fo.region_code, fo.published, f.uri AS icon, c.label AS currency
            FROM flight_options fo
            LEFT JOIN files f ON f.id = fo.icon_file_id
            LEFT JOIN currencies c ON c.id = fo.currency_id
            WHERE fo.id = $1
        "#;

        let row = match sqlx::query(query).bind(db_id).fetch_optional(&self.pool).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        let airports = self.load_airports(db_id).await?;
        let benefits = self.load_benefits(db_id).await?;

        Ok(Some(FlightOption {
            id,
            title: row.try_get("title")?,
            icon: optional_text(&row, "icon")?,
            is_recommend: row.try_get("is_recommend")?,
            tags: optional_text(&row, "tags")?,
            currency: optional_text(&row, "currency")?,
            market_code: row.try_get("market_code")?,
            region_code: row.try_get("region_code")?,
            published: row.try_get("published")?,
            airports,
            benefits,
        }))
    }

    async fn load_airports(&self, flight_option_id: i64) -> Result<Vec<Airport>, PostgresError> {
        let query = r#"
            SELECT a.title, f.uri AS icon, a.city, a.code, a.wifi
            FROM flight_option_airports r
            JOIN airports a ON a.id = r.airport_id
            LEFT JOIN files f ON f.id = a.icon_file_id
            WHERE r.flight_option_id = $1
            ORDER BY r.delta
        "#;

        let rows = sqlx::query(query).bind(flight_option_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok::<_, PostgresError>(Airport {
                    title: row.try_get("title")?,
                    icon: optional_text(row, "icon")?,
                    city: optional_text(row, "city")?,
                    code: optional_text(row, "code")?,
                    wifi: row.try_get("wifi")?,
                })
            })
            .collect()
    }

    async fn load_benefits(&self, flight_option_id: i64) -> Result<Vec<Benefit>, PostgresError> {
        let query = r#"
            SELECT b.title, b.sub_title, b.is_available, f.uri AS image, b.tooltip_text
            FROM flight_option_benefits r
            JOIN benefits b ON b.id = r.benefit_id
            LEFT JOIN files f ON f.id = b.image_file_id
            WHERE r.flight_option_id = $1
            ORDER BY r.delta
        "#;

        let rows = sqlx::query(query).bind(flight_option_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| {
                Ok::<_, PostgresError>(Benefit {
                    title: row.try_get("title")?,
                    sub_title: optional_text(row, "sub_title")?,
                    is_available: row.try_get("is_available")?,
                    image: optional_text(row, "image")?,
                    tooltip_text: optional_text(row, "tooltip_text")?,
                })
            })
            .collect()
    }
}

fn to_node_id(id: i64) -> Result<NodeId, PostgresError> {
    NodeId::try_from(id).map_err(|_| PostgresError::InvalidId(id.to_string()))
}

/// Nullable text column, read as an empty string when NULL
fn optional_text(row: &PgRow, column: &str) -> Result<String, PostgresError> {
    let value: Option<String> = row.try_get(column)?;
    Ok(value.unwrap_or_default())
}

#[async_trait]
impl ContentStore for PostgresStore {
    async fn find_flight_options(&self, filter: &FlightOptionFilter) -> Result<Vec<NodeId>, StoreError> {
        let ids = self.query_ids(filter).await?;
        tracing::debug!(
            "PostgreSQL matched {} flight options for {}/{} ({})",
            ids.len(),
            filter.market_code,
            filter.region_code,
            filter.status.as_str()
        );
        Ok(ids)
    }

    async fn load_flight_option(&self, id: NodeId) -> Result<Option<FlightOption>, StoreError> {
        Ok(self.load(id).await?)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| StoreError::Postgres(e.into()))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

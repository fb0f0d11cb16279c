use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use crate::config::Config;
use crate::product::ProductRecord;
use crate::sink::{RecordSink, SinkError};

const CREATE_PRODUCTS: &str = "CREATE TABLE IF NOT EXISTS products (
    id SERIAL PRIMARY KEY,
    name VARCHAR NOT NULL,
    price DOUBLE PRECISION NOT NULL,
    rating DOUBLE PRECISION,
    review_count INTEGER,
    url VARCHAR NOT NULL
)";

// The price travels as text and is converted by the database, so a missing
// price fails on the NOT NULL constraint instead of becoming 0.
const INSERT_PRODUCT: &str = "INSERT INTO products (name, price, rating, review_count, url)
    VALUES ($1, CAST($2 AS DOUBLE PRECISION), $3, $4, $5)";

/// Stores records in the `products` table of a PostgreSQL database.
///
/// Every `save` checks a connection out of the pool, runs one insert inside
/// its own transaction and hands the connection back. There is no unique key
/// on `url`: saving the same page twice gives two rows.
#[derive(Debug, Clone)]
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, SinkError> {
        let options = PgConnectOptions::new()
            .host(&config.db_host)
            .port(config.db_port)
            .username(&config.db_user)
            .password(&config.db_password)
            .database(&config.db_name);

        info!(
            "Connecting to database {} at {}:{}",
            config.db_name, config.db_host, config.db_port
        );
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect_with(options)
            .await?;
        info!("Database connection established");
        Ok(Self::new(pool))
    }

    /// Creates the `products` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), SinkError> {
        sqlx::query(CREATE_PRODUCTS).execute(&self.pool).await?;
        info!("Table 'products' is ready");
        Ok(())
    }

    pub async fn count_by_url(&self, url: &str) -> Result<i64, SinkError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE url = $1")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl RecordSink for PgSink {
    async fn save(&self, record: &ProductRecord) -> Result<(), SinkError> {
        if self.pool.is_closed() {
            return Err(SinkError::Unavailable("connection pool is closed".into()));
        }
        let mut tx = self.pool.begin().await?;
        sqlx::query(INSERT_PRODUCT)
            .bind(&record.name)
            .bind(record.price.as_deref())
            .bind(f64::from(record.rating))
            .bind(record.review_count)
            .bind(&record.url)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

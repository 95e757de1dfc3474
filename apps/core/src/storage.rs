//! SQLite review store.
//!
//! Two tables: `banks` (one row per bank, resolved by name) and `reviews`
//! (one row per analyzed review). Themes are stored as an ordered JSON
//! array of strings.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{info, warn};

use crate::analysis::AnalyzedRecord;
use crate::error::AppError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS banks (
        bank_id INTEGER PRIMARY KEY AUTOINCREMENT,
        bank_name TEXT NOT NULL UNIQUE,
        app_name TEXT,
        created_at INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        review_id INTEGER PRIMARY KEY AUTOINCREMENT,
        bank_id INTEGER NOT NULL,
        review_text TEXT,
        rating INTEGER CHECK (rating BETWEEN 1 AND 5),
        review_date TEXT,
        sentiment_label TEXT NOT NULL,
        sentiment_score REAL NOT NULL,
        source TEXT,
        language TEXT NOT NULL,
        themes TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        FOREIGN KEY(bank_id) REFERENCES banks(bank_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_reviews_bank ON reviews(bank_id)",
];

/// A review row as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredReview {
    pub review_id: i64,
    pub bank_name: String,
    pub review_text: Option<String>,
    pub rating: Option<i64>,
    pub review_date: Option<String>,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub source: Option<String>,
    pub language: String,
    pub themes: Json<Vec<String>>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BankReviewCount {
    pub bank_name: String,
    pub review_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BankRating {
    pub bank_name: String,
    /// `None` when the bank has no rated review.
    pub avg_rating: Option<f64>,
    pub rated_reviews: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SentimentShare {
    pub bank_name: String,
    pub sentiment_label: String,
    pub count: i64,
    /// Share of the bank's reviews, in percent, rounded to two decimals.
    pub percentage: f64,
}

/// Outcome of `store_batch`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreReport {
    pub stored: usize,
    pub failed: usize,
}

/// Review store backed by a SQLite pool.
#[derive(Clone)]
pub struct ReviewStore {
    pool: SqlitePool,
}

impl ReviewStore {
    /// Opens (creating if missing) the database at `url` and applies the
    /// schema.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        info!("Opening review store at: {}", url);
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Private in-memory store. Every pooled connection would get its own
    /// database, so the pool holds exactly one.
    pub async fn in_memory() -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, AppError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Review store schema applied.");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Returns the id of `bank_name`, creating the bank on first use.
    pub async fn ensure_bank(&self, bank_name: &str) -> Result<i64, AppError> {
        sqlx::query(
            r#"
            INSERT INTO banks (bank_name, app_name, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(bank_name) DO NOTHING
            "#,
        )
        .bind(bank_name)
        .bind(bank_name)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        let bank_id: i64 = sqlx::query_scalar("SELECT bank_id FROM banks WHERE bank_name = ?")
            .bind(bank_name)
            .fetch_one(&self.pool)
            .await?;
        Ok(bank_id)
    }

    /// Inserts one analyzed review, resolving its bank first. Returns the new
    /// review id.
    pub async fn insert_review(&self, record: &AnalyzedRecord) -> Result<i64, AppError> {
        let review = record.review();
        if review.bank.trim().is_empty() {
            return Err(AppError::Validation("review has no bank".to_string()));
        }
        let bank_id = self.ensure_bank(&review.bank).await?;

        let review_date = Some(review.date.as_str()).filter(|d| !d.is_empty());
        let source = Some(review.source.as_str()).filter(|s| !s.is_empty());

        let result = sqlx::query(
            r#"
            INSERT INTO reviews (
                bank_id, review_text, rating, review_date,
                sentiment_label, sentiment_score, source, language, themes, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(bank_id)
        .bind(review.text())
        .bind(review.rating.map(i64::from))
        .bind(review_date)
        .bind(record.sentiment_label().as_str())
        .bind(f64::from(record.sentiment_score()))
        .bind(source)
        .bind(record.language().code())
        .bind(Json(record.themes().to_vec()))
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Inserts every record. A row that fails is logged and skipped.
    pub async fn store_batch(&self, records: &[AnalyzedRecord]) -> StoreReport {
        let mut report = StoreReport::default();

        for (index, record) in records.iter().enumerate() {
            match self.insert_review(record).await {
                Ok(_) => report.stored += 1,
                Err(e) => {
                    warn!(index, bank = %record.review().bank, "Error inserting review: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Stored {} reviews ({} failed)",
            report.stored, report.failed
        );
        report
    }

    pub async fn fetch_review(&self, review_id: i64) -> Result<StoredReview, AppError> {
        let review = sqlx::query_as::<_, StoredReview>(
            r#"
            SELECT r.review_id, b.bank_name, r.review_text, r.rating, r.review_date,
                   r.sentiment_label, r.sentiment_score, r.source, r.language,
                   r.themes, r.created_at
            FROM reviews r
            JOIN banks b ON b.bank_id = r.bank_id
            WHERE r.review_id = ?
            "#,
        )
        .bind(review_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    // --- Verification queries ---

    pub async fn reviews_per_bank(&self) -> Result<Vec<BankReviewCount>, AppError> {
        let rows = sqlx::query_as::<_, BankReviewCount>(
            r#"
            SELECT b.bank_name, COUNT(r.review_id) AS review_count
            FROM banks b
            LEFT JOIN reviews r ON r.bank_id = b.bank_id
            GROUP BY b.bank_id, b.bank_name
            ORDER BY review_count DESC, b.bank_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn average_rating_by_bank(&self) -> Result<Vec<BankRating>, AppError> {
        let rows = sqlx::query_as::<_, BankRating>(
            r#"
            SELECT b.bank_name,
                   AVG(r.rating) AS avg_rating,
                   COUNT(r.rating) AS rated_reviews
            FROM banks b
            LEFT JOIN reviews r ON r.bank_id = b.bank_id
            GROUP BY b.bank_id, b.bank_name
            ORDER BY b.bank_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn sentiment_distribution(&self) -> Result<Vec<SentimentShare>, AppError> {
        let rows = sqlx::query_as::<_, SentimentShare>(
            r#"
            SELECT b.bank_name,
                   r.sentiment_label,
                   COUNT(*) AS count,
                   ROUND(COUNT(*) * 100.0 / SUM(COUNT(*)) OVER (PARTITION BY b.bank_name), 2)
                       AS percentage
            FROM reviews r
            JOIN banks b ON b.bank_id = r.bank_id
            GROUP BY b.bank_name, r.sentiment_label
            ORDER BY b.bank_name, count DESC, r.sentiment_label
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

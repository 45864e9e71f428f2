//! Club reviews — pluggable storage behind the `ReviewStore` trait.
//!
//! `PgReviewStore` is used when `DATABASE_URL` is configured; otherwise reviews
//! live in `MemoryReviewStore` for the lifetime of the process.

pub mod handlers;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::review::Review;

/// Review storage. Callers validate the club id and rating before `add`.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Reviews for one club, newest first.
    async fn list_for_club(&self, club_id: i64) -> Result<Vec<Review>, AppError>;

    async fn add(&self, club_id: i64, rating: i32, comment: &str) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres
// ────────────────────────────────────────────────────────────────────────────

pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn list_for_club(&self, club_id: i64) -> Result<Vec<Review>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT rating, comment, date_created FROM reviews WHERE club_id = $1 ORDER BY date_created DESC, review_id DESC",
        )
        .bind(club_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn add(&self, club_id: i64, rating: i32, comment: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO reviews (club_id, rating, comment) VALUES ($1, $2, $3)")
            .bind(club_id)
            .bind(rating)
            .bind(comment)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryReviewStore {
    // (club_id, review) in insertion order
    reviews: RwLock<Vec<(i64, Review)>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn list_for_club(&self, club_id: i64) -> Result<Vec<Review>, AppError> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .iter()
            .rev()
            .filter(|(id, _)| *id == club_id)
            .map(|(_, review)| review.clone())
            .collect())
    }

    async fn add(&self, club_id: i64, rating: i32, comment: &str) -> Result<(), AppError> {
        self.reviews.write().await.push((
            club_id,
            Review {
                rating,
                comment: comment.to_string(),
                date_created: Utc::now(),
            },
        ));
        Ok(())
    }
}

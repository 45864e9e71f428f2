use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the reviews table if it does not exist yet.
/// Club ids are not foreign keys: clubs live in the corpus file, and the
/// review handlers check ids against it before inserting.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            review_id    BIGSERIAL PRIMARY KEY,
            club_id      BIGINT NOT NULL,
            rating       INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
            comment      TEXT NOT NULL,
            date_created TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS reviews_club_id_idx ON reviews (club_id)")
        .execute(pool)
        .await?;

    info!("Reviews schema ready");
    Ok(())
}

//! Club directory — read-only browsing endpoints over the in-memory corpus.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::club::{Club, ClubRecord};
use crate::state::AppState;

/// Page size for the random listing and for search results.
const PAGE_SIZE: usize = 50;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct RandomIdResponse {
    pub id: i64,
}

fn to_clubs(matches: Vec<(i64, &ClubRecord)>) -> Vec<Club> {
    matches
        .into_iter()
        .map(|(id, record)| Club::new(id, record))
        .collect()
}

/// GET /api/club/:id
pub async fn handle_get_club(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Club>, AppError> {
    let record = state
        .corpus
        .get(id)
        .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;
    Ok(Json(Club::new(id, record)))
}

/// GET /api/clubs/random
pub async fn handle_random_clubs(State(state): State<AppState>) -> Json<Vec<Club>> {
    Json(to_clubs(state.corpus.sample(PAGE_SIZE)))
}

/// GET /api/clubs/random-id
pub async fn handle_random_id(
    State(state): State<AppState>,
) -> Result<Json<RandomIdResponse>, AppError> {
    let id = state
        .corpus
        .random_id()
        .ok_or_else(|| AppError::NotFound("No clubs available".to_string()))?;
    Ok(Json(RandomIdResponse { id }))
}

/// GET /api/clubs/search?q=
///
/// Blank queries return an empty list rather than the whole directory.
pub async fn handle_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Club>> {
    Json(to_clubs(state.corpus.search(&query.q, PAGE_SIZE)))
}

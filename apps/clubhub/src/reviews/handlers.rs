use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::review::Review;
use crate::state::AppState;

const MIN_RATING: i32 = 1;
const MAX_RATING: i32 = 5;

#[derive(Debug, Deserialize)]
pub struct NewReview {
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// GET /api/club/:id/reviews
pub async fn handle_list_reviews(
    State(state): State<AppState>,
    Path(club_id): Path<i64>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = state.reviews.list_for_club(club_id).await?;
    Ok(Json(reviews))
}

/// POST /api/club/:id/reviews
pub async fn handle_add_review(
    State(state): State<AppState>,
    Path(club_id): Path<i64>,
    payload: Result<Json<NewReview>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(review) = payload?;
    let rating = review.rating.filter(|r| *r != 0);
    let comment = review
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let (Some(rating), Some(comment)) = (rating, comment) else {
        return Err(AppError::Validation(
            "Missing rating or comment".to_string(),
        ));
    };
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    if state.corpus.get(club_id).is_none() {
        return Err(AppError::Validation("Club ID does not exist".to_string()));
    }

    state.reviews.add(club_id, rating, comment).await?;

    Ok((StatusCode::CREATED, Json(json!({ "status": "success" }))))
}

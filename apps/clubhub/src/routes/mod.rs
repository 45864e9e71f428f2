pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers::handle_chat;
use crate::directory;
use crate::reviews::handlers::{handle_add_review, handle_list_reviews};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Chat assistant
        .route("/api/chat", post(handle_chat))
        // Directory
        .route("/api/club/:id", get(directory::handle_get_club))
        .route("/api/clubs/random", get(directory::handle_random_clubs))
        .route("/api/clubs/random-id", get(directory::handle_random_id))
        .route("/api/clubs/search", get(directory::handle_search))
        // Reviews
        .route(
            "/api/club/:id/reviews",
            get(handle_list_reviews).post(handle_add_review),
        )
        .with_state(state)
}

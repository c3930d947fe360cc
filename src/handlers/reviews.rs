use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::{coerce, NewReview, Review},
    AppState,
};

const FETCH_ERROR: &str = "Error fetching documents";
const INSERT_ERROR: &str = "Error inserting review";

// ── GET /fetchReviews ─────────────────────────────────────────────────────────

pub async fn fetch_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<Review>>> {
    let reviews = state
        .store
        .reviews()
        .await
        .map_err(|e| AppError::internal(FETCH_ERROR, e))?;

    info!(count = reviews.len(), "Listed reviews");
    Ok(Json(reviews))
}

// ── GET /fetchReviews/dealer/:id ──────────────────────────────────────────────

pub async fn fetch_dealer_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Review>>> {
    let Some(number) = coerce::cast_number(&id) else {
        return Err(AppError::internal(
            FETCH_ERROR,
            format!("cast to number failed for dealer id \"{}\"", id),
        ));
    };
    // Casts fine but is fractional or infinite: no integer id can equal it.
    let Some(dealership) = coerce::whole(number) else {
        debug!(id = %id, "Dealer id is not a whole number, no reviews can match");
        return Ok(Json(Vec::new()));
    };

    let reviews = state
        .store
        .reviews_for_dealer(dealership)
        .await
        .map_err(|e| AppError::internal(FETCH_ERROR, e))?;

    info!(dealership, count = reviews.len(), "Listed reviews for dealer");
    Ok(Json(reviews))
}

// ── POST /insert_review ───────────────────────────────────────────────────────

/// Accepts any content type: the raw body must be a JSON review. A body that
/// fails to parse is reported exactly like a store failure.
pub async fn insert_review(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Review>> {
    let payload: NewReview =
        serde_json::from_slice(&body).map_err(|e| AppError::internal(INSERT_ERROR, e))?;

    let review = state
        .store
        .insert_review(payload)
        .await
        .map_err(|e| AppError::internal(INSERT_ERROR, e))?;

    info!(id = review.id, dealership = review.dealership, "Inserted review");
    Ok(Json(review))
}

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{normalize_state, Dealership},
    AppState,
};

// ── GET /fetchDealers ─────────────────────────────────────────────────────────

pub async fn fetch_dealers(State(state): State<AppState>) -> AppResult<Json<Vec<Dealership>>> {
    let dealers = state
        .store
        .dealerships()
        .await
        .map_err(|e| AppError::internal("Error fetching documents", e))?;

    info!(count = dealers.len(), "Listed dealerships");
    Ok(Json(dealers))
}

// ── GET /fetchDealers/:state ──────────────────────────────────────────────────

pub async fn fetch_dealers_by_state(
    State(state): State<AppState>,
    Path(raw_state): Path<String>,
) -> AppResult<Json<Vec<Dealership>>> {
    let dealers = state
        .store
        .dealerships_in_state(&normalize_state(&raw_state))
        .await
        .map_err(|e| AppError::internal("Error fetching dealers by state", e))?;

    if dealers.is_empty() {
        return Err(AppError::NotFound(format!(
            "No dealerships found in state '{}'",
            raw_state
        )));
    }

    info!(state = %raw_state, count = dealers.len(), "Listed dealerships by state");
    Ok(Json(dealers))
}

// ── GET /fetchDealer/:id ──────────────────────────────────────────────────────

pub async fn fetch_dealer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<Dealership>> {
    let Some(id) = parse_leading_int(&raw_id) else {
        return Err(AppError::NotFound("Dealer with id NaN not found".to_string()));
    };

    let dealer = state
        .store
        .dealership(id)
        .await
        .map_err(|e| AppError::internal("Error fetching dealer by id", e))?
        .ok_or_else(|| AppError::NotFound(format!("Dealer with id {} not found", id)))?;

    info!(id, "Fetched dealership");
    Ok(Json(dealer))
}

/// Integer prefix parse: leading whitespace and an optional sign, then as many
/// digits as follow (`"12abc"` is 12). `None` when no digit is present.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let value: i64 = rest[..digits].parse().ok()?;
    Some(if negative { -value } else { value })
}

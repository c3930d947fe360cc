pub mod dealers;
pub mod reviews;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::AppState;

pub async fn welcome() -> &'static str {
    "Welcome to the Dealership Reviews API"
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let seed = state.seed.read().await.clone();
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "dealership-reviews", "seed": seed })),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    use crate::{
        build_router,
        db::{MemoryStore, Store},
        seed::{self, Fixtures, SeedState},
        AppState,
    };

    const REVIEWS: &str = r#"{ "reviews": [
        { "id": 1, "name": "Berkly Shepley", "dealership": 7, "review": "Total grid-enabled service-desk",
          "purchase": true, "purchase_date": "07/11/2020", "car_make": "Audi", "car_model": "A6", "car_year": 2010 }
    ] }"#;

    const DEALERSHIPS: &str = r#"{ "dealerships": [
        { "id": 7, "city": "Sacramento", "state": "California", "address": "1 Main St", "zip": "94203",
          "short_name": "Capital", "full_name": "Capital Car Dealership" },
        { "id": 8, "city": "Austin", "state": "Texas", "address": "2 Elm St", "zip": "73301",
          "short_name": "Lone", "full_name": "Lone Star Motors" },
        { "id": 9, "city": "Fresno", "state": "california", "address": "3 Oak St", "zip": "93650",
          "short_name": "Valley", "full_name": "Valley Autos" },
        { "id": 10, "city": "Nowhere", "state": "CA.", "address": "4 Pine St", "zip": "00000",
          "short_name": "Dot", "full_name": "Dot Motors" }
    ] }"#;

    const NEW_REVIEW: &str = r#"{ "dealership": 7, "name": "X", "review": "Y", "purchase": true,
        "purchase_date": "2024-01-01", "car_make": "Toyota", "car_model": "Corolla", "car_year": 2022 }"#;

    fn state_with(store: Store) -> AppState {
        AppState {
            store,
            seed: Arc::new(RwLock::new(SeedState::pending())),
        }
    }

    async fn seeded_app() -> Router {
        let store = Store::Memory(MemoryStore::default());
        let fixtures = Fixtures::from_json(REVIEWS, DEALERSHIPS).unwrap();
        seed::populate(&store, &fixtures).await.unwrap();
        build_router(state_with(store))
    }

    fn empty_app() -> Router {
        build_router(state_with(Store::Memory(MemoryStore::default())))
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        call(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(app: Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
        call(app, Request::post(uri).body(Body::from(body)).unwrap()).await
    }

    fn ids(value: &Value) -> Vec<i64> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_i64().unwrap())
            .collect()
    }

    // ── Root / health ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn root_returns_plain_text() {
        let response = empty_app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Welcome to the Dealership Reviews API");
    }

    #[tokio::test]
    async fn health_reports_seed_phase() {
        let (status, body) = get(empty_app(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["seed"]["phase"], "pending");
    }

    // ── Reviews ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn fetch_reviews_returns_seeded_fixture() {
        let (status, body) = get(seeded_app().await, "/fetchReviews").await;
        assert_eq!(status, StatusCode::OK);

        let reviews = body.as_array().unwrap();
        assert_eq!(reviews.len(), 1);
        let review = &reviews[0];
        assert_eq!(review["id"], 1);
        assert_eq!(review["name"], "Berkly Shepley");
        assert_eq!(review["car_model"], "A6");
        assert_eq!(review["purchase_date"], "07/11/2020");
        assert!(review["_id"].is_string());
    }

    #[tokio::test]
    async fn fetch_reviews_on_unseeded_store_is_empty() {
        let (status, body) = get(empty_app(), "/fetchReviews").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn fetch_reviews_for_dealer_filters() {
        let app = seeded_app().await;
        let (status, body) = get(app.clone(), "/fetchReviews/dealer/7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![1]);

        let (status, body) = get(app.clone(), "/fetchReviews/dealer/8").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = get(app, "/fetchReviews/dealer/7.5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn fetch_reviews_for_dealer_casts_id_like_a_number() {
        let app = seeded_app().await;
        for uri in ["/fetchReviews/dealer/7.0", "/fetchReviews/dealer/0x7", "/fetchReviews/dealer/%207%20"] {
            let (status, body) = get(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(ids(&body), vec![1], "{}", uri);
        }

        let (status, body) = get(app, "/fetchReviews/dealer/abc").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Error fetching documents" }));
    }

    #[tokio::test]
    async fn insert_review_assigns_next_id() {
        let app = seeded_app().await;
        let (status, body) = post(app.clone(), "/insert_review", NEW_REVIEW).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 2);
        assert_eq!(body["dealership"], 7);
        assert_eq!(body["car_make"], "Toyota");
        assert_eq!(body["car_year"], 2022);
        assert!(body["_id"].is_string());

        let (_, all) = get(app, "/fetchReviews").await;
        assert_eq!(ids(&all), vec![1, 2]);
    }

    #[tokio::test]
    async fn insert_review_into_empty_collection_gets_id_one() {
        let (status, body) = post(empty_app(), "/insert_review", NEW_REVIEW).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
    }

    #[tokio::test]
    async fn insert_review_ignores_content_type() {
        let request = Request::post("/insert_review")
            .header("content-type", "text/plain")
            .body(Body::from(NEW_REVIEW))
            .unwrap();
        let (status, body) = call(empty_app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "X");
    }

    #[tokio::test]
    async fn malformed_body_is_a_500_and_server_keeps_serving() {
        let app = seeded_app().await;
        let (status, body) = post(app.clone(), "/insert_review", "{ not json").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Error inserting review" }));

        let (status, body) = get(app, "/fetchReviews").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![1]);
    }

    // ── Dealerships ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn fetch_dealers_returns_all() {
        let (status, body) = get(seeded_app().await, "/fetchDealers").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![7, 8, 9, 10]);
        assert_eq!(body[0]["full_name"], "Capital Car Dealership");
    }

    #[tokio::test]
    async fn fetch_dealers_by_state_is_case_insensitive() {
        let app = seeded_app().await;
        let mut results = Vec::new();
        for uri in [
            "/fetchDealers/california",
            "/fetchDealers/CALIFORNIA",
            "/fetchDealers/%20California%20",
        ] {
            let (status, body) = get(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{}", uri);
            results.push(ids(&body));
        }
        assert!(results.iter().all(|r| r == &vec![7, 9]));
    }

    #[tokio::test]
    async fn fetch_dealers_by_state_matches_whole_value_only() {
        let app = seeded_app().await;
        let (status, body) = get(app.clone(), "/fetchDealers/Calif").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No dealerships found in state 'Calif'");

        let (status, body) = get(app, "/fetchDealers/ca.").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body), vec![10]);
    }

    #[tokio::test]
    async fn fetch_dealer_by_id() {
        let app = seeded_app().await;
        let (status, body) = get(app.clone(), "/fetchDealer/7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 7);
        assert_eq!(body["state"], "California");

        let (status, body) = get(app.clone(), "/fetchDealer/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Dealer with id 42 not found");

        let (status, body) = get(app, "/fetchDealer/abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Dealer with id NaN not found");
    }
}

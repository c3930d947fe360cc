use serde::{Deserialize, Serialize};

use super::coerce;

/// A customer review of a dealership visit.
///
/// `id` is the public sequential identifier; `object_id` is the store's own
/// key, present only once the document has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(deserialize_with = "coerce::int")]
    pub id: i64,
    pub name: String,
    /// References `Dealership::id`. Not checked against the dealerships collection.
    #[serde(deserialize_with = "coerce::int")]
    pub dealership: i64,
    pub review: String,
    #[serde(default, deserialize_with = "coerce::boolean")]
    pub purchase: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,
    #[serde(
        default,
        deserialize_with = "coerce::opt_int",
        skip_serializing_if = "Option::is_none"
    )]
    pub car_year: Option<i64>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Body of `POST /insert_review`. Any `id` sent by the client is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub name: String,
    #[serde(deserialize_with = "coerce::int")]
    pub dealership: i64,
    pub review: String,
    #[serde(default, deserialize_with = "coerce::boolean")]
    pub purchase: bool,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub car_make: Option<String>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_int")]
    pub car_year: Option<i64>,
}

impl NewReview {
    pub fn into_review(self, id: i64) -> Review {
        Review {
            object_id: None,
            id,
            name: self.name,
            dealership: self.dealership,
            review: self.review,
            purchase: self.purchase,
            purchase_date: self.purchase_date,
            car_make: self.car_make,
            car_model: self.car_model,
            car_year: self.car_year,
        }
    }
}

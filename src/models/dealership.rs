use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce;

/// A dealership record. Only `id` and `state` are interpreted; everything
/// else in the fixture (address, coordinates, names) is carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dealership {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(deserialize_with = "coerce::int")]
    pub id: i64,
    #[serde(default)]
    pub state: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Dealership {
    /// Case-insensitive exact match against an already normalized state.
    pub fn in_state(&self, normalized: &str) -> bool {
        self.state.to_lowercase() == normalized
    }
}

/// Trim and lowercase a state path segment before matching.
pub fn normalize_state(raw: &str) -> String {
    raw.trim().to_lowercase()
}

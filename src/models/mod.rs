pub mod coerce;
pub mod dealership;
pub mod review;

pub use dealership::{normalize_state, Dealership};
pub use review::{NewReview, Review};

//! Document store access.
//!
//! `Store` is the handle injected into every handler. It dispatches to the
//! MongoDB backend in production or to in-process collections when the
//! service runs without a database.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::models::{Dealership, NewReview, Review};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] mongodb::bson::ser::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[from] mongodb::bson::de::Error),

    #[error("review id counter returned no value")]
    Counter,

    #[error("review id sequence exhausted after {0}")]
    IdExhausted(i64),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Clone)]
pub enum Store {
    Mongo(MongoStore),
    Memory(MemoryStore),
}

impl Store {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        match config.store_backend {
            StoreBackend::MongoDb => {
                info!(db = %config.database_name, "Connecting to MongoDB...");
                let store = MongoStore::connect(&config.mongodb_uri, &config.database_name).await?;
                info!("MongoDB connection established.");
                Ok(Self::Mongo(store))
            }
            StoreBackend::Memory => {
                info!("Using in-memory document store.");
                Ok(Self::Memory(MemoryStore::default()))
            }
        }
    }

    // ── Reviews ──────────────────────────────────────────────────────────────

    pub async fn reviews(&self) -> StoreResult<Vec<Review>> {
        match self {
            Store::Mongo(s) => s.reviews().await,
            Store::Memory(s) => Ok(s.reviews().await),
        }
    }

    pub async fn reviews_for_dealer(&self, dealership: i64) -> StoreResult<Vec<Review>> {
        match self {
            Store::Mongo(s) => s.reviews_for_dealer(dealership).await,
            Store::Memory(s) => Ok(s.reviews_for_dealer(dealership).await),
        }
    }

    /// Persist a new review under the next free sequential id.
    pub async fn insert_review(&self, payload: NewReview) -> StoreResult<Review> {
        match self {
            Store::Mongo(s) => s.insert_review(payload).await,
            Store::Memory(s) => s.insert_review(payload).await,
        }
    }

    /// Delete every review, insert `reviews` in order and reset the id
    /// sequence to the largest id among them.
    pub async fn replace_reviews(&self, reviews: &[Review]) -> StoreResult<usize> {
        match self {
            Store::Mongo(s) => s.replace_reviews(reviews).await,
            Store::Memory(s) => Ok(s.replace_reviews(reviews).await),
        }
    }

    // ── Dealerships ──────────────────────────────────────────────────────────

    pub async fn dealerships(&self) -> StoreResult<Vec<Dealership>> {
        match self {
            Store::Mongo(s) => s.dealerships().await,
            Store::Memory(s) => Ok(s.dealerships().await),
        }
    }

    /// `state` must already be trimmed and lowercased.
    pub async fn dealerships_in_state(&self, state: &str) -> StoreResult<Vec<Dealership>> {
        match self {
            Store::Mongo(s) => s.dealerships_in_state(state).await,
            Store::Memory(s) => Ok(s.dealerships_in_state(state).await),
        }
    }

    pub async fn dealership(&self, id: i64) -> StoreResult<Option<Dealership>> {
        match self {
            Store::Mongo(s) => s.dealership(id).await,
            Store::Memory(s) => Ok(s.dealership(id).await),
        }
    }

    pub async fn replace_dealerships(&self, dealerships: &[Dealership]) -> StoreResult<usize> {
        match self {
            Store::Mongo(s) => s.replace_dealerships(dealerships).await,
            Store::Memory(s) => Ok(s.replace_dealerships(dealerships).await),
        }
    }
}

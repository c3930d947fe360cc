use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult};
use crate::models::{Dealership, NewReview, Review};

#[derive(Debug, Default)]
struct Collections {
    reviews: Vec<Review>,
    dealerships: Vec<Dealership>,
}

/// In-process collections with the same observable behavior as the
/// MongoDB backend. Documents keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub async fn reviews(&self) -> Vec<Review> {
        self.inner.read().await.reviews.clone()
    }

    pub async fn reviews_for_dealer(&self, dealership: i64) -> Vec<Review> {
        self.inner
            .read()
            .await
            .reviews
            .iter()
            .filter(|r| r.dealership == dealership)
            .cloned()
            .collect()
    }

    /// Id assignment and the push happen under one write lock, so
    /// concurrent inserts never share an id.
    pub async fn insert_review(&self, payload: NewReview) -> StoreResult<Review> {
        let mut collections = self.inner.write().await;
        let max_id = collections.reviews.iter().map(|r| r.id).max().unwrap_or(0);
        let next_id = max_id
            .checked_add(1)
            .ok_or(StoreError::IdExhausted(max_id))?;

        let mut review = payload.into_review(next_id);
        review.object_id = Some(ObjectId::new().to_hex());
        collections.reviews.push(review.clone());
        Ok(review)
    }

    pub async fn replace_reviews(&self, reviews: &[Review]) -> usize {
        let mut collections = self.inner.write().await;
        collections.reviews = reviews.iter().cloned().map(with_object_id).collect();
        collections.reviews.len()
    }

    pub async fn dealerships(&self) -> Vec<Dealership> {
        self.inner.read().await.dealerships.clone()
    }

    pub async fn dealerships_in_state(&self, state: &str) -> Vec<Dealership> {
        self.inner
            .read()
            .await
            .dealerships
            .iter()
            .filter(|d| d.in_state(state))
            .cloned()
            .collect()
    }

    pub async fn dealership(&self, id: i64) -> Option<Dealership> {
        self.inner
            .read()
            .await
            .dealerships
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub async fn replace_dealerships(&self, dealerships: &[Dealership]) -> usize {
        let mut collections = self.inner.write().await;
        collections.dealerships = dealerships
            .iter()
            .cloned()
            .map(|mut d| {
                d.object_id.get_or_insert_with(|| ObjectId::new().to_hex());
                d
            })
            .collect();
        collections.dealerships.len()
    }
}

fn with_object_id(mut review: Review) -> Review {
    review.object_id.get_or_insert_with(|| ObjectId::new().to_hex());
    review
}

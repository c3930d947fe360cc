use anyhow::Context;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, Cursor, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StoreError, StoreResult};
use crate::models::{Dealership, NewReview, Review};

const REVIEWS: &str = "reviews";
const DEALERSHIPS: &str = "dealerships";
const COUNTERS: &str = "counters";
/// Key of the review id sequence inside the counters collection.
const REVIEW_SEQUENCE: &str = "reviews";

#[derive(Clone)]
pub struct MongoStore {
    reviews: Collection<Document>,
    dealerships: Collection<Document>,
    counters: Collection<Document>,
}

impl MongoStore {
    /// Connect, ping, and prepare the review id sequence. Any failure here is
    /// fatal for startup.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("Failed to connect to MongoDB")?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to ping MongoDB")?;

        let db = client.database(db_name);
        let store = Self {
            reviews: db.collection(REVIEWS),
            dealerships: db.collection(DEALERSHIPS),
            counters: db.collection(COUNTERS),
        };

        store.ensure_review_index().await;

        let max_id = store.max_review_id().await?;
        store
            .counters
            .update_one(
                doc! { "_id": REVIEW_SEQUENCE },
                doc! { "$max": { "seq": max_id } },
            )
            .upsert(true)
            .await
            .context("Failed to initialise review id sequence")?;
        debug!(max_id, "Review id sequence ready");

        Ok(store)
    }

    // ── Reviews ──────────────────────────────────────────────────────────────

    pub async fn reviews(&self) -> StoreResult<Vec<Review>> {
        collect(self.reviews.find(doc! {}).await?).await
    }

    pub async fn reviews_for_dealer(&self, dealership: i64) -> StoreResult<Vec<Review>> {
        collect(self.reviews.find(doc! { "dealership": dealership }).await?).await
    }

    pub async fn insert_review(&self, payload: NewReview) -> StoreResult<Review> {
        let id = self.next_review_id().await?;
        let mut review = payload.into_review(id);

        let result = self.reviews.insert_one(encode(&review)?).await?;
        review.object_id = result.inserted_id.as_object_id().map(|oid| oid.to_hex());
        Ok(review)
    }

    pub async fn replace_reviews(&self, reviews: &[Review]) -> StoreResult<usize> {
        let docs = reviews.iter().map(encode).collect::<StoreResult<Vec<_>>>()?;
        let inserted = replace_all(&self.reviews, docs).await?;

        let max_id = reviews.iter().map(|r| r.id).max().unwrap_or(0);
        self.counters
            .update_one(
                doc! { "_id": REVIEW_SEQUENCE },
                doc! { "$set": { "seq": max_id } },
            )
            .upsert(true)
            .await?;
        info!(max_id, "Review id sequence reset");

        // Legacy duplicates may have blocked the index at connect time.
        self.ensure_review_index().await;

        Ok(inserted)
    }

    /// Unique index on `reviews.id`. Existing duplicate ids make this fail;
    /// that is logged and retried on the next reset.
    async fn ensure_review_index(&self) -> bool {
        let unique_id = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match self.reviews.create_index(unique_id).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Could not create unique index on reviews.id");
                false
            }
        }
    }

    async fn max_review_id(&self) -> StoreResult<i64> {
        let top = self
            .reviews
            .find_one(doc! {})
            .sort(doc! { "id": -1 })
            .projection(doc! { "id": 1 })
            .await?;
        Ok(top.and_then(|d| as_i64(d.get("id"))).unwrap_or(0))
    }

    /// Atomically bump and read the review sequence. Two concurrent callers
    /// always observe different values.
    async fn next_review_id(&self) -> StoreResult<i64> {
        let counter = self
            .counters
            .find_one_and_update(
                doc! { "_id": REVIEW_SEQUENCE },
                doc! { "$inc": { "seq": 1_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        counter
            .and_then(|d| as_i64(d.get("seq")))
            .ok_or(StoreError::Counter)
    }

    // ── Dealerships ──────────────────────────────────────────────────────────

    pub async fn dealerships(&self) -> StoreResult<Vec<Dealership>> {
        collect(self.dealerships.find(doc! {}).await?).await
    }

    pub async fn dealerships_in_state(&self, state: &str) -> StoreResult<Vec<Dealership>> {
        let filter = doc! {
            "state": {
                "$regex": format!("^{}$", escape_regex(state)),
                "$options": "i",
            }
        };
        collect(self.dealerships.find(filter).await?).await
    }

    pub async fn dealership(&self, id: i64) -> StoreResult<Option<Dealership>> {
        self.dealerships
            .find_one(doc! { "id": id })
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn replace_dealerships(&self, dealerships: &[Dealership]) -> StoreResult<usize> {
        let docs = dealerships.iter().map(encode).collect::<StoreResult<Vec<_>>>()?;
        replace_all(&self.dealerships, docs).await
    }
}

async fn replace_all(collection: &Collection<Document>, docs: Vec<Document>) -> StoreResult<usize> {
    let deleted = collection.delete_many(doc! {}).await?;
    debug!(
        collection = collection.name(),
        deleted = deleted.deleted_count,
        "Cleared collection"
    );

    // insert_many rejects an empty batch
    if docs.is_empty() {
        return Ok(0);
    }
    let result = collection.insert_many(docs).await?;
    Ok(result.inserted_ids.len())
}

async fn collect<T: DeserializeOwned>(cursor: Cursor<Document>) -> StoreResult<Vec<T>> {
    let docs: Vec<Document> = cursor.try_collect().await?;
    docs.into_iter().map(decode).collect()
}

/// Store documents keep `_id` as an ObjectId; the models carry its hex form.
fn decode<T: DeserializeOwned>(mut doc: Document) -> StoreResult<T> {
    if let Ok(oid) = doc.get_object_id("_id") {
        doc.insert("_id", oid.to_hex());
    }
    Ok(bson::from_document(doc)?)
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Document> {
    let mut doc = bson::to_document(value)?;
    let oid = doc
        .get_str("_id")
        .ok()
        .and_then(|hex| ObjectId::parse_str(hex).ok());
    if let Some(oid) = oid {
        doc.insert("_id", oid);
    }
    Ok(doc)
}

fn as_i64(value: Option<&Bson>) -> Option<i64> {
    match value? {
        Bson::Int64(n) => Some(*n),
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Double(f) if f.is_finite() => Some(*f as i64),
        _ => None,
    }
}

/// Escape regex metacharacters so a path segment matches literally.
fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

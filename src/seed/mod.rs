mod fixtures;

pub use fixtures::Fixtures;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::db::{Store, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedPhase {
    Pending,
    Complete,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub reviews: usize,
    pub dealerships: usize,
}

/// Progress of the startup seeding, shared with the health endpoint.
///
/// Request handlers never wait on this: until seeding completes they serve
/// whatever the store currently holds.
#[derive(Debug, Clone, Serialize)]
pub struct SeedState {
    pub phase: SeedPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SeedSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl SeedState {
    pub fn pending() -> Self {
        Self {
            phase: SeedPhase::Pending,
            summary: None,
            finished_at: None,
        }
    }

    fn finish(&mut self, phase: SeedPhase, summary: Option<SeedSummary>) {
        self.phase = phase;
        self.summary = summary;
        self.finished_at = Some(Utc::now());
    }
}

/// Reset both collections to exactly the fixture contents.
pub async fn populate(store: &Store, fixtures: &Fixtures) -> StoreResult<SeedSummary> {
    let reviews = store.replace_reviews(&fixtures.reviews).await?;
    info!("  Seeded {} reviews", reviews);

    let dealerships = store.replace_dealerships(&fixtures.dealerships).await?;
    info!("  Seeded {} dealerships", dealerships);

    Ok(SeedSummary {
        reviews,
        dealerships,
    })
}

/// Run `populate` and record the outcome. Failures are logged only; the
/// collections are left in whatever state the failed step produced.
pub async fn run(store: Store, fixtures: Fixtures, state: Arc<RwLock<SeedState>>) {
    info!("Populating database from fixtures...");
    match populate(&store, &fixtures).await {
        Ok(summary) => {
            info!(
                reviews = summary.reviews,
                dealerships = summary.dealerships,
                "Database populated successfully."
            );
            state.write().await.finish(SeedPhase::Complete, Some(summary));
        }
        Err(e) => {
            error!(error = %e, "Error populating database");
            state.write().await.finish(SeedPhase::Failed, None);
        }
    }
}

pub async fn mark_skipped(state: &RwLock<SeedState>) {
    info!("Seeding disabled; serving existing store contents.");
    state.write().await.finish(SeedPhase::Skipped, None);
}

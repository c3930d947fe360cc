use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize};

use crate::models::{Dealership, Review};

#[derive(Debug, Deserialize)]
struct ReviewsFile {
    reviews: Vec<Review>,
}

#[derive(Debug, Deserialize)]
struct DealershipsFile {
    dealerships: Vec<Dealership>,
}

/// Seed data read once at startup.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub reviews: Vec<Review>,
    pub dealerships: Vec<Dealership>,
}

impl Fixtures {
    /// Read both fixture files. A missing or malformed file is a startup error.
    pub fn load(reviews_path: &Path, dealerships_path: &Path) -> anyhow::Result<Self> {
        let reviews = fs::read_to_string(reviews_path)
            .with_context(|| format!("reading {}", reviews_path.display()))?;
        let dealerships = fs::read_to_string(dealerships_path)
            .with_context(|| format!("reading {}", dealerships_path.display()))?;
        Self::from_json(&reviews, &dealerships)
    }

    pub fn from_json(reviews: &str, dealerships: &str) -> anyhow::Result<Self> {
        let ReviewsFile { reviews } = parse(reviews, "reviews")?;
        let DealershipsFile { dealerships } = parse(dealerships, "dealerships")?;
        Ok(Self {
            reviews,
            dealerships,
        })
    }
}

fn parse<T: DeserializeOwned>(raw: &str, what: &str) -> anyhow::Result<T> {
    serde_json::from_str(raw).with_context(|| format!("parsing {} fixture", what))
}

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ServiceResult;
use crate::database::ContentStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
}

/// Aggregate over a product's approved reviews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStats {
    pub total: i64,
    /// Mean rating rounded to one decimal; 0 when there are no reviews
    pub average: f64,
    pub distribution: Vec<RatingBucket>,
}

impl RatingStats {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        let total = ratings.len() as i64;
        let average = if total > 0 {
            let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
            (sum as f64 / total as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };
        let distribution = (1..=5)
            .map(|rating| RatingBucket {
                rating,
                count: ratings.iter().filter(|r| **r == rating).count() as i64,
            })
            .collect();
        Self { total, average, distribution }
    }
}

#[derive(Clone)]
pub struct ReviewStatsService {
    store: Arc<dyn ContentStore>,
}

impl ReviewStatsService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn for_product(&self, product_id: Uuid) -> ServiceResult<RatingStats> {
        let ratings = self.store.approved_ratings(product_id).await?;
        Ok(RatingStats::from_ratings(&ratings))
    }
}

use serde::{Deserialize, Serialize};

use crate::EngagementRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementWeights {
    pub like: f64,
    pub share: f64,
    pub comment: f64,
    pub click: f64,
    /// Share of the final score taken by the weighted action total.
    pub weighted_share: f64,
    /// Share of the final score taken by the engagement rate.
    pub rate_share: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            like: 1.0,
            share: 3.0,
            comment: 2.0,
            click: 1.5,
            weighted_share: 0.7,
            rate_share: 0.3,
        }
    }
}

/// Raw counters the scorer looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
    pub clicks: u64,
    pub impressions: u64,
}

impl EngagementCounts {
    pub fn new(likes: u64, shares: u64, comments: u64, clicks: u64, impressions: u64) -> Self {
        Self {
            likes,
            shares,
            comments,
            clicks,
            impressions,
        }
    }

    pub fn engagement(&self) -> u64 {
        self.likes + self.shares + self.comments + self.clicks
    }
}

impl From<&EngagementRecord> for EngagementCounts {
    fn from(record: &EngagementRecord) -> Self {
        Self {
            likes: record.likes,
            shares: record.shares,
            comments: record.comments,
            clicks: record.clicks,
            impressions: record.impressions,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngagementScorer {
    weights: EngagementWeights,
}

impl EngagementScorer {
    pub fn new(weights: EngagementWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &EngagementWeights {
        &self.weights
    }

    pub fn score(&self, counts: &EngagementCounts) -> f64 {
        let weighted = self.weighted_total(counts);
        let rate = crate::percent_of(counts.engagement(), counts.impressions);

        weighted * self.weights.weighted_share + rate * self.weights.rate_share
    }

    pub fn score_record(&self, record: &EngagementRecord) -> f64 {
        self.score(&EngagementCounts::from(record))
    }

    fn weighted_total(&self, counts: &EngagementCounts) -> f64 {
        let mut total = 0.0;

        total += counts.likes as f64 * self.weights.like;
        total += counts.shares as f64 * self.weights.share;
        total += counts.comments as f64 * self.weights.comment;
        total += counts.clicks as f64 * self.weights.click;

        total
    }
}

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::scoring::{EngagementCounts, EngagementScorer};
use crate::EngagementRecord;

/// Aggregated engagement of one post on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPerformance {
    pub post_id: String,
    pub platform: String,
    pub samples: usize,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
    pub clicks: u64,
    pub impressions: u64,
    pub reach: u64,
    pub engagement_rate: f64,
    pub score: f64,
}

impl PostPerformance {
    fn empty(post_id: &str, platform: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            platform: platform.to_string(),
            samples: 0,
            likes: 0,
            shares: 0,
            comments: 0,
            clicks: 0,
            impressions: 0,
            reach: 0,
            engagement_rate: 0.0,
            score: 0.0,
        }
    }

    fn counts(&self) -> EngagementCounts {
        EngagementCounts::new(
            self.likes,
            self.shares,
            self.comments,
            self.clicks,
            self.impressions,
        )
    }
}

/// Sums records per (post, platform), scores the totals and sorts best first.
pub fn rank_posts(records: &[EngagementRecord], scorer: &EngagementScorer) -> Vec<PostPerformance> {
    let mut totals: HashMap<(&str, &str), PostPerformance> = HashMap::new();

    for record in records {
        let entry = totals
            .entry((record.post_id.as_str(), record.platform.as_str()))
            .or_insert_with(|| PostPerformance::empty(&record.post_id, &record.platform));
        entry.samples += 1;
        entry.likes += record.likes;
        entry.shares += record.shares;
        entry.comments += record.comments;
        entry.clicks += record.clicks;
        entry.impressions += record.impressions;
        entry.reach += record.reach;
    }

    let mut ranked: Vec<PostPerformance> = totals
        .into_values()
        .map(|mut performance| {
            let counts = performance.counts();
            performance.engagement_rate = crate::percent_of(counts.engagement(), counts.impressions);
            performance.score = scorer.score(&counts);
            performance
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.post_id.cmp(&b.post_id))
            .then_with(|| a.platform.cmp(&b.platform))
    });

    ranked
}

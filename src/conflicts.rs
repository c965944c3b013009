//! Collision checks between scheduled posts.
//!
//! Scheduled posts are sorted by date and only neighbours in that order are
//! compared, so the scan is linear. A conflict between post `i` and post
//! `i + 2` is not reported when post `i + 1` sits between them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::similarity::{TopicSimilarity, WordOverlap};
use crate::{Post, PostStatus};

pub const MULTIPLE_PLATFORMS: &str = "multiple";
pub const NO_CONFLICTS_MESSAGE: &str =
    "No scheduling conflicts detected. Your content calendar looks well balanced.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    pub timing_window_hours: f64,
    pub topic_window_hours: f64,
    pub audience_window_hours: f64,
    /// High-severity conflicts at or above this count add a frequency hint.
    pub crowded_threshold: usize,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            timing_window_hours: 2.0,
            topic_window_hours: 24.0,
            audience_window_hours: 12.0,
            crowded_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    Timing,
    Topic,
    Audience,
}

impl ConflictType {
    pub fn label(self) -> &'static str {
        match self {
            ConflictType::Timing => "timing",
            ConflictType::Topic => "topic",
            ConflictType::Audience => "audience",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

impl ConflictSeverity {
    pub fn label(self) -> &'static str {
        match self {
            ConflictSeverity::Low => "low",
            ConflictSeverity::Medium => "medium",
            ConflictSeverity::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentConflict {
    pub post_id1: String,
    pub post_id2: String,
    pub platform: String,
    pub conflict_type: ConflictType,
    pub severity: ConflictSeverity,
    pub resolution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: Vec<ContentConflict>,
    pub suggestions: Vec<String>,
}

#[derive(Clone)]
pub struct ConflictDetector {
    config: ConflictConfig,
    similarity: Arc<dyn TopicSimilarity>,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(ConflictConfig::default())
    }
}

impl std::fmt::Debug for ConflictDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConflictDetector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConflictDetector {
    pub fn new(config: ConflictConfig) -> Self {
        Self {
            config,
            similarity: Arc::new(WordOverlap::default()),
        }
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn TopicSimilarity>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn detect(&self, posts: &[Post]) -> ConflictReport {
        let mut scheduled: Vec<&Post> = posts
            .iter()
            .filter(|post| post.status == PostStatus::Scheduled && post.schedule_date.is_some())
            .collect();
        scheduled.sort_by_key(|post| post.schedule_date);

        let mut conflicts = Vec::new();
        for pair in scheduled.windows(2) {
            self.check_pair(pair[0], pair[1], &mut conflicts);
        }

        let suggestions = self.build_suggestions(&conflicts);
        ConflictReport {
            conflicts,
            suggestions,
        }
    }

    fn check_pair(&self, first: &Post, second: &Post, conflicts: &mut Vec<ContentConflict>) {
        let (Some(a), Some(b)) = (first.schedule_date, second.schedule_date) else {
            return;
        };
        let hours = (b - a).num_milliseconds().abs() as f64 / 3_600_000.0;
        let platform = shared_platform(first, second);

        let mut push = |conflict_type, severity, resolution: String| {
            conflicts.push(ContentConflict {
                post_id1: first.id.clone(),
                post_id2: second.id.clone(),
                platform: platform.clone(),
                conflict_type,
                severity,
                resolution,
            });
        };

        if hours < self.config.timing_window_hours {
            push(
                ConflictType::Timing,
                ConflictSeverity::High,
                format!(
                    "Posts are {:.1} hours apart; move one at least {} hours away.",
                    hours, self.config.timing_window_hours
                ),
            );
        }

        if hours < self.config.topic_window_hours
            && self.similarity.is_similar(&first.topic, &second.topic)
        {
            push(
                ConflictType::Topic,
                ConflictSeverity::Medium,
                "Similar topics within a day; vary the angle or spread them further apart."
                    .to_string(),
            );
        }

        if hours < self.config.audience_window_hours {
            if let (Some(left), Some(right)) =
                (&first.audience_profile_id, &second.audience_profile_id)
            {
                if left == right {
                    push(
                        ConflictType::Audience,
                        ConflictSeverity::Low,
                        format!(
                            "Both posts target audience {}; consider a different segment for one of them.",
                            left
                        ),
                    );
                }
            }
        }
    }

    fn build_suggestions(&self, conflicts: &[ContentConflict]) -> Vec<String> {
        if conflicts.is_empty() {
            return vec![NO_CONFLICTS_MESSAGE.to_string()];
        }

        let count = |kind: ConflictType| conflicts.iter().filter(|c| c.conflict_type == kind).count();
        let timing = count(ConflictType::Timing);
        let topic = count(ConflictType::Topic);
        let audience = count(ConflictType::Audience);
        let high = conflicts
            .iter()
            .filter(|c| c.severity == ConflictSeverity::High)
            .count();

        let mut suggestions = Vec::new();
        if timing > 0 {
            suggestions.push(format!(
                "Space posts at least {} hours apart to avoid audience fatigue ({} timing conflict{}).",
                self.config.timing_window_hours,
                timing,
                plural(timing)
            ));
        }
        if topic > 0 {
            suggestions.push(format!(
                "Vary content topics to keep the feed fresh ({} topic overlap{}).",
                topic,
                plural(topic)
            ));
        }
        if audience > 0 {
            suggestions.push(format!(
                "Diversify target audiences for posts scheduled close together ({} audience overlap{}).",
                audience,
                plural(audience)
            ));
        }
        if high >= self.config.crowded_threshold {
            suggestions.push(
                "Consider reducing posting frequency; the calendar has several back-to-back posts."
                    .to_string(),
            );
        }

        suggestions
    }
}

fn shared_platform(first: &Post, second: &Post) -> String {
    first
        .platforms()
        .find(|platform| second.platform_payloads.contains_key(*platform))
        .map(str::to_string)
        .unwrap_or_else(|| MULTIPLE_PLATFORMS.to_string())
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

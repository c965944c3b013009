use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timing::TimeSlotAnalyzer;
use crate::{day_name, format_float, EngagementRecord};

/// Platforms below this mean engagement rate (percent) get a warning.
const LOW_ENGAGEMENT_RATE: f64 = 1.0;
/// A platform needs more than this many samples before it is warned about.
const LOW_ENGAGEMENT_MIN_SAMPLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Timing,
    Platform,
    Engagement,
    Hashtags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn label(self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
        }
    }

    pub fn impact_weight(self) -> u8 {
        match self {
            Level::High => 3,
            Level::Medium => 2,
            Level::Low => 1,
        }
    }

    /// Low effort is worth the most.
    pub fn effort_weight(self) -> u8 {
        match self {
            Level::Low => 3,
            Level::Medium => 2,
            Level::High => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub suggestion_type: SuggestionType,
    pub title: String,
    pub description: String,
    pub impact: Level,
    pub effort: Level,
}

impl OptimizationSuggestion {
    pub fn new(
        suggestion_type: SuggestionType,
        title: impl Into<String>,
        description: impl Into<String>,
        impact: Level,
        effort: Level,
    ) -> Self {
        Self {
            suggestion_type,
            title: title.into(),
            description: description.into(),
            impact,
            effort,
        }
    }

    pub fn priority(&self) -> u8 {
        self.impact.impact_weight() + self.effort.effort_weight()
    }
}

#[derive(Default)]
struct PlatformStats {
    engagement: u64,
    rate_sum: f64,
    samples: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    analyzer: TimeSlotAnalyzer,
}

impl RecommendationEngine {
    pub fn new(analyzer: TimeSlotAnalyzer) -> Self {
        Self { analyzer }
    }

    pub fn recommend(&self, records: &[EngagementRecord]) -> Vec<OptimizationSuggestion> {
        let mut suggestions = Vec::new();

        let analysis = self.analyzer.analyze(records, None, None);
        if analysis.sufficient_data {
            if let Some(best) = analysis.top() {
                suggestions.push(OptimizationSuggestion::new(
                    SuggestionType::Timing,
                    "Post at your peak engagement time",
                    format!(
                        "{} at {} averages {} engagements per post across {} samples. Schedule key content there.",
                        day_name(best.day_of_week),
                        best.time,
                        format_float(best.engagement_score, 1),
                        best.sample_count
                    ),
                    Level::High,
                    Level::Low,
                ));
            }
        }

        let stats = platform_stats(records);

        if stats.len() >= 2 {
            let leader = stats
                .iter()
                .max_by(|a, b| a.1.engagement.cmp(&b.1.engagement).then_with(|| b.0.cmp(a.0)));
            if let Some((platform, stat)) = leader {
                suggestions.push(OptimizationSuggestion::new(
                    SuggestionType::Platform,
                    format!("Focus on {}", platform),
                    format!(
                        "{} drives the most engagement ({} interactions). Prioritise it for new content.",
                        platform, stat.engagement
                    ),
                    Level::Medium,
                    Level::Medium,
                ));
            }
        }

        for (platform, stat) in &stats {
            if stat.samples <= LOW_ENGAGEMENT_MIN_SAMPLES {
                continue;
            }
            let average_rate = stat.rate_sum / stat.samples as f64;
            if average_rate < LOW_ENGAGEMENT_RATE {
                suggestions.push(OptimizationSuggestion::new(
                    SuggestionType::Engagement,
                    format!("Improve engagement on {}", platform),
                    format!(
                        "Average engagement rate on {} is {}%. Try stronger hooks, questions and platform-native formats.",
                        platform,
                        format_float(average_rate, 2)
                    ),
                    Level::High,
                    Level::Medium,
                ));
            }
        }

        suggestions.push(OptimizationSuggestion::new(
            SuggestionType::Hashtags,
            "Refine your hashtag strategy",
            "Mix two or three broad hashtags with niche ones and rotate them to reach new audiences.",
            Level::Medium,
            Level::Low,
        ));

        rank(&mut suggestions);
        suggestions
    }
}

/// Stable sort by priority, best first.
pub fn rank(suggestions: &mut [OptimizationSuggestion]) {
    suggestions.sort_by(|a, b| b.priority().cmp(&a.priority()));
}

fn platform_stats(records: &[EngagementRecord]) -> BTreeMap<&str, PlatformStats> {
    let mut stats: BTreeMap<&str, PlatformStats> = BTreeMap::new();
    for record in records {
        let entry = stats.entry(record.platform.as_str()).or_default();
        entry.engagement += record.engagement();
        entry.rate_sum += record.engagement_rate();
        entry.samples += 1;
    }
    stats
}

pub mod bulk;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod recommendations;
pub mod scoring;
pub mod service;
pub mod similarity;
pub mod store;
pub mod synthetic;
pub mod timing;
pub mod trends;

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub use bulk::{BulkScheduleOptions, BulkScheduler, SpacingStrategy};
pub use config::SchedulerConfig;
pub use conflicts::{ConflictDetector, ConflictReport, ConflictSeverity, ConflictType, ContentConflict};
pub use error::{SchedulerError, StoreError};
pub use recommendations::{Level, OptimizationSuggestion, RecommendationEngine, SuggestionType};
pub use scoring::{EngagementScorer, EngagementWeights, PostPerformance};
pub use service::{SchedulingService, TimingRefresh};
pub use similarity::{TopicSimilarity, WordOverlap};
pub use store::{JsonFileStore, MemoryStore, Store};
pub use timing::{TimeSlot, TimeSlotAnalysis, TimeSlotAnalyzer, TimezoneAdjuster};
pub use trends::{PerformanceTrend, TrendCalculator, TrendDirection};

/// One engagement snapshot for a post on a platform, as synced from the
/// platform APIs. Records are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub post_id: String,
    pub platform: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub reach: u64,
    pub recorded_at: DateTime<Utc>,
}

impl EngagementRecord {
    pub fn engagement(&self) -> u64 {
        self.likes + self.shares + self.comments + self.clicks
    }

    /// Engagement as a percentage of impressions; zero when nothing was shown.
    pub fn engagement_rate(&self) -> f64 {
        percent_of(self.engagement(), self.impressions)
    }

    /// Day of week with Sunday as 0.
    pub fn day_of_week(&self) -> u8 {
        self.recorded_at.weekday().num_days_from_sunday() as u8
    }

    pub fn hour(&self) -> u8 {
        self.recorded_at.hour() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }

    /// Transitions the publishing pipeline is allowed to make. The core never
    /// mutates posts itself; callers use this to validate their own updates.
    pub fn can_transition_to(self, next: PostStatus) -> bool {
        matches!(
            (self, next),
            (PostStatus::Draft, PostStatus::Scheduled)
                | (PostStatus::Scheduled, PostStatus::Published)
                | (PostStatus::Scheduled, PostStatus::Failed)
                | (PostStatus::Failed, PostStatus::Scheduled)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub topic: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub schedule_date: Option<DateTime<Utc>>,
    pub status: PostStatus,
    #[serde(default)]
    pub platform_payloads: BTreeMap<String, String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub audience_profile_id: Option<String>,
}

impl Post {
    pub fn new(id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            content: String::new(),
            tags: BTreeSet::new(),
            schedule_date: None,
            status: PostStatus::Draft,
            platform_payloads: BTreeMap::new(),
            campaign_id: None,
            audience_profile_id: None,
        }
    }

    /// A scheduled post must carry a schedule date.
    pub fn is_consistent(&self) -> bool {
        self.status != PostStatus::Scheduled || self.schedule_date.is_some()
    }

    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.platform_payloads.keys().map(String::as_str)
    }
}

/// Per-platform engagement multipliers for a target audience segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudienceProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub engagement_patterns: HashMap<String, f64>,
}

impl AudienceProfile {
    /// Missing or unusable entries fall back to a neutral multiplier.
    pub fn multiplier_for(&self, platform: &str) -> f64 {
        match self.engagement_patterns.get(platform) {
            Some(value) if value.is_finite() && *value >= 0.0 => *value,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingSuggestion {
    pub post_id: String,
    pub platform: String,
    pub suggested_time: DateTime<Utc>,
    pub reason: String,
    pub confidence: f64,
}

pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn day_name(day_of_week: u8) -> &'static str {
    DAY_NAMES[(day_of_week % 7) as usize]
}

pub fn format_hour(hour: u8) -> String {
    format!("{:02}:00", hour.min(23))
}

pub(crate) fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `time` moved back by `days`, or `None` outside chrono's range.
pub(crate) fn days_before(time: DateTime<Utc>, days: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(days).and_then(|delta| time.checked_sub_signed(delta))
}

pub(crate) fn hours_after(time: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_hours(hours).and_then(|delta| time.checked_add_signed(delta))
}

pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(0.0).min(1.0)
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

/// `value` is already a percentage (20.0 prints as "20.0%").
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

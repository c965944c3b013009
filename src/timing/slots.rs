use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{clamp01, format_hour, EngagementRecord};

/// Day and hour used when there is no history at all: Tuesday to Thursday at 10:00.
pub const FALLBACK_DAYS: [u8; 3] = [2, 3, 4];
pub const FALLBACK_HOUR: u8 = 10;
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    pub max_slots: usize,
    /// Below this many samples the analysis is flagged as insufficient.
    pub min_samples: usize,
    /// Bucket size at which confidence reaches 1.
    pub full_confidence_samples: usize,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            max_slots: 10,
            min_samples: 10,
            full_confidence_samples: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: String,
    pub day_of_week: u8,
    pub hour: u8,
    pub engagement_score: f64,
    pub confidence: f64,
    pub sample_count: usize,
}

impl TimeSlot {
    pub fn new(day_of_week: u8, hour: u8, engagement_score: f64, confidence: f64) -> Self {
        Self {
            time: format_hour(hour),
            day_of_week: day_of_week % 7,
            hour: hour.min(23),
            engagement_score,
            confidence: clamp01(confidence),
            sample_count: 0,
        }
    }

    pub fn matches(&self, day_of_week: u8, hour: u8) -> bool {
        self.day_of_week == day_of_week && self.hour == hour
    }

    /// First instant strictly after `after` that falls on this slot.
    pub fn next_occurrence(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let today = after.weekday().num_days_from_sunday() as i64;
        let mut days_ahead = (self.day_of_week as i64 - today).rem_euclid(7);
        let time = NaiveTime::from_hms_opt(self.hour as u32, 0, 0).unwrap_or(NaiveTime::MIN);
        let mut candidate = (after.date_naive() + Duration::days(days_ahead))
            .and_time(time)
            .and_utc();
        if candidate <= after {
            days_ahead += 7;
            candidate = (after.date_naive() + Duration::days(days_ahead))
                .and_time(time)
                .and_utc();
        }
        candidate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlotAnalysis {
    pub slots: Vec<TimeSlot>,
    pub total_samples: usize,
    pub sufficient_data: bool,
}

impl TimeSlotAnalysis {
    pub fn top(&self) -> Option<&TimeSlot> {
        self.slots.first()
    }

    /// Top slot, or the documented fallback when the history is empty.
    pub fn best_slot(&self) -> TimeSlot {
        self.top()
            .cloned()
            .unwrap_or_else(|| fallback_slots().remove(0))
    }
}

pub fn fallback_slots() -> Vec<TimeSlot> {
    FALLBACK_DAYS
        .iter()
        .map(|day| TimeSlot::new(*day, FALLBACK_HOUR, 0.0, FALLBACK_CONFIDENCE))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct TimeSlotAnalyzer {
    config: SlotConfig,
}

#[derive(Default)]
struct Bucket {
    engagement: u64,
    count: usize,
}

impl TimeSlotAnalyzer {
    pub fn new(config: SlotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn confidence(&self, sample_count: usize) -> f64 {
        let full = self.config.full_confidence_samples.max(1) as f64;
        (sample_count as f64 / full).min(1.0)
    }

    pub fn analyze(
        &self,
        records: &[EngagementRecord],
        platform: Option<&str>,
        audience_multiplier: Option<f64>,
    ) -> TimeSlotAnalysis {
        let mut buckets: HashMap<(u8, u8), Bucket> = HashMap::new();
        let mut total_samples = 0usize;

        for record in records {
            if let Some(platform) = platform {
                if record.platform != platform {
                    continue;
                }
            }
            let bucket = buckets
                .entry((record.day_of_week(), record.hour()))
                .or_default();
            bucket.engagement += record.engagement();
            bucket.count += 1;
            total_samples += 1;
        }

        let mut slots: Vec<TimeSlot> = buckets
            .into_iter()
            .map(|((day, hour), bucket)| {
                let score = bucket.engagement as f64 / bucket.count as f64;
                let mut slot = TimeSlot::new(day, hour, score, self.confidence(bucket.count));
                slot.sample_count = bucket.count;
                slot
            })
            .collect();

        sort_slots(&mut slots);

        if let Some(multiplier) = audience_multiplier {
            let multiplier = if multiplier.is_finite() && multiplier >= 0.0 {
                multiplier
            } else {
                1.0
            };
            for slot in slots.iter_mut() {
                slot.engagement_score *= multiplier;
            }
            sort_slots(&mut slots);
        }

        slots.truncate(self.config.max_slots);

        TimeSlotAnalysis {
            slots,
            total_samples,
            sufficient_data: total_samples >= self.config.min_samples,
        }
    }
}

fn sort_slots(slots: &mut [TimeSlot]) {
    slots.sort_by(|a, b| {
        b.engagement_score
            .partial_cmp(&a.engagement_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.day_of_week.cmp(&b.day_of_week))
            .then_with(|| a.hour.cmp(&b.hour))
    });
}

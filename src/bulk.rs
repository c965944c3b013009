use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{SchedulerError, SchedulerResult};
use crate::timing::{SlotConfig, TimeSlot, TimeSlotAnalyzer, TimezoneAdjuster};
use crate::{day_name, format_hour, hours_after, EngagementRecord, Post, SchedulingSuggestion};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    pub slot_hours: Vec<u8>,
    pub default_confidence: f64,
    pub fallback_confidence: f64,
    pub default_custom_spacing_hours: i64,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            slot_hours: vec![9, 11, 13, 15, 17],
            default_confidence: 0.8,
            fallback_confidence: 0.5,
            default_custom_spacing_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacingStrategy {
    Optimal,
    Even,
    Custom,
}

impl SpacingStrategy {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "optimal" => Some(SpacingStrategy::Optimal),
            "even" => Some(SpacingStrategy::Even),
            "custom" => Some(SpacingStrategy::Custom),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkScheduleOptions {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub platforms: Vec<String>,
    pub spacing: SpacingStrategy,
    #[serde(default)]
    pub custom_spacing_hours: Option<i64>,
    #[serde(default)]
    pub respect_optimal_times: bool,
    #[serde(default)]
    pub avoid_weekends: bool,
    #[serde(default)]
    pub target_timezones: Vec<String>,
    #[serde(default = "default_primary_timezone")]
    pub primary_timezone: String,
}

fn default_primary_timezone() -> String {
    "UTC".to_string()
}

impl BulkScheduleOptions {
    pub fn new(
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        platforms: Vec<String>,
        spacing: SpacingStrategy,
    ) -> Self {
        Self {
            start_date,
            end_date,
            platforms,
            spacing,
            custom_spacing_hours: None,
            respect_optimal_times: false,
            avoid_weekends: false,
            target_timezones: Vec::new(),
            primary_timezone: default_primary_timezone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BulkScheduler {
    config: BulkConfig,
    analyzer: TimeSlotAnalyzer,
}

impl BulkScheduler {
    pub fn new(config: BulkConfig, slots: SlotConfig) -> Self {
        Self {
            config,
            analyzer: TimeSlotAnalyzer::new(slots),
        }
    }

    /// Candidate publish times, in order, for every day of the range.
    pub fn available_slots(&self, options: &BulkScheduleOptions) -> Vec<DateTime<Utc>> {
        let mut slots = Vec::new();
        let last_day = options.end_date.date_naive();
        let mut day = options.start_date.date_naive();

        while day <= last_day {
            let weekend = matches!(day.weekday(), Weekday::Sat | Weekday::Sun);
            if !(options.avoid_weekends && weekend) {
                for hour in &self.config.slot_hours {
                    if let Some(time) = NaiveTime::from_hms_opt(*hour as u32, 0, 0) {
                        slots.push(day.and_time(time).and_utc());
                    }
                }
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        slots
    }

    /// One suggestion per (post, platform), posts in the outer loop. `history`
    /// is only consulted when the options ask to respect optimal times.
    /// Fails when custom spacing walks out of the representable date range.
    pub fn schedule(
        &self,
        posts: &[Post],
        options: &BulkScheduleOptions,
        history: &[EngagementRecord],
    ) -> SchedulerResult<Vec<SchedulingSuggestion>> {
        let available = self.available_slots(options);

        let mut optimal: HashMap<&str, Vec<TimeSlot>> = HashMap::new();
        if options.respect_optimal_times {
            for platform in &options.platforms {
                let analysis = self.analyzer.analyze(history, Some(platform.as_str()), None);
                optimal.insert(platform.as_str(), analysis.slots);
            }
        }

        let spacing_hours = options
            .custom_spacing_hours
            .unwrap_or(self.config.default_custom_spacing_hours);

        let mut cursor = 0usize;
        let mut previous: Option<DateTime<Utc>> = None;
        let mut suggestions = Vec::with_capacity(posts.len() * options.platforms.len());

        for post in posts {
            for platform in &options.platforms {
                let slots = optimal
                    .get(platform.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                let (time, reason, confidence) = match options.spacing {
                    SpacingStrategy::Optimal => {
                        self.place_optimal(&available, &mut cursor, slots, options)
                    }
                    SpacingStrategy::Even => {
                        let time = slot_at(&available, cursor).unwrap_or(options.start_date);
                        cursor += 1;
                        (
                            time,
                            "Evenly distributed across the selected date range".to_string(),
                            self.config.default_confidence,
                        )
                    }
                    SpacingStrategy::Custom => {
                        let from = previous.unwrap_or(options.start_date);
                        let time = hours_after(from, spacing_hours).ok_or_else(|| {
                            SchedulerError::InvalidInput(format!(
                                "custom spacing of {} hours after {} is out of range",
                                spacing_hours,
                                from.to_rfc3339()
                            ))
                        })?;
                        (
                            time,
                            format!("Custom spacing of {} hours between posts", spacing_hours),
                            self.config.default_confidence,
                        )
                    }
                };
                previous = Some(time);

                let (time, reason) = adjust_for_timezones(time, reason, options);

                suggestions.push(SchedulingSuggestion {
                    post_id: post.id.clone(),
                    platform: platform.clone(),
                    suggested_time: time,
                    reason,
                    confidence,
                });
            }
        }

        Ok(suggestions)
    }

    fn place_optimal(
        &self,
        available: &[DateTime<Utc>],
        cursor: &mut usize,
        slots: &[TimeSlot],
        options: &BulkScheduleOptions,
    ) -> (DateTime<Utc>, String, f64) {
        let hit = available
            .iter()
            .enumerate()
            .skip(*cursor)
            .find_map(|(index, time)| {
                let day = time.weekday().num_days_from_sunday() as u8;
                let hour = time.hour() as u8;
                slots
                    .iter()
                    .find(|slot| slot.matches(day, hour))
                    .map(|slot| (index, *time, slot))
            });

        if let Some((index, time, slot)) = hit {
            *cursor = index + 1;
            return (
                time,
                format!(
                    "Optimal time based on historical engagement ({} at {})",
                    day_name(slot.day_of_week),
                    format_hour(slot.hour)
                ),
                slot.confidence,
            );
        }

        let time = slot_at(available, *cursor).unwrap_or(options.start_date);
        *cursor += 1;
        let confidence = slots
            .first()
            .map(|slot| slot.confidence)
            .unwrap_or(self.config.fallback_confidence);
        (
            time,
            "Next available slot; no historical peak left in range".to_string(),
            confidence,
        )
    }
}

fn slot_at(available: &[DateTime<Utc>], cursor: usize) -> Option<DateTime<Utc>> {
    if available.is_empty() {
        return None;
    }
    available.get(cursor.min(available.len() - 1)).copied()
}

fn adjust_for_timezones(
    time: DateTime<Utc>,
    reason: String,
    options: &BulkScheduleOptions,
) -> (DateTime<Utc>, String) {
    let adjusted = TimezoneAdjuster::adjust(time, &options.primary_timezone, &options.target_timezones);
    match adjusted.into_iter().next() {
        Some(zoned) => (
            zoned.time,
            format!("{} (adjusted for {})", reason, zoned.timezone),
        ),
        None => (time, reason),
    }
}

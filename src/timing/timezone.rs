use chrono::{DateTime, Utc};

use crate::hours_after;
use serde::Serialize;

/// Whole-hour offsets from UTC. Daylight saving is not modelled: a label
/// always maps to the same offset regardless of date.
const ZONE_OFFSETS: &[(&str, i64)] = &[
    ("UTC", 0),
    ("GMT", 0),
    ("BST", 1),
    ("CET", 1),
    ("CEST", 2),
    ("EET", 2),
    ("MSK", 3),
    ("GST", 4),
    ("SGT", 8),
    ("JST", 9),
    ("AEST", 10),
    ("AEDT", 11),
    ("NZST", 12),
    ("EST", -5),
    ("EDT", -4),
    ("CST", -6),
    ("CDT", -5),
    ("MST", -7),
    ("MDT", -6),
    ("PST", -8),
    ("PDT", -7),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonedTime {
    pub timezone: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimezoneAdjuster;

impl TimezoneAdjuster {
    /// Offset in hours for a zone label; unknown labels are treated as UTC.
    pub fn offset_hours(zone: &str) -> i64 {
        let zone = zone.trim();
        ZONE_OFFSETS
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(zone))
            .map(|(_, offset)| *offset)
            .unwrap_or(0)
    }

    pub fn is_known(zone: &str) -> bool {
        let zone = zone.trim();
        ZONE_OFFSETS
            .iter()
            .any(|(label, _)| label.eq_ignore_ascii_case(zone))
    }

    /// Shifts `base` by the offset difference between `primary` and each target.
    /// Within a day of the end of the supported range the time is left as is.
    pub fn adjust(base: DateTime<Utc>, primary: &str, targets: &[String]) -> Vec<ZonedTime> {
        let primary_offset = Self::offset_hours(primary);
        targets
            .iter()
            .map(|target| {
                let delta = Self::offset_hours(target) - primary_offset;
                ZonedTime {
                    timezone: target.clone(),
                    time: hours_after(base, delta).unwrap_or(base),
                }
            })
            .collect()
    }
}

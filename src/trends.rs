use serde::{Deserialize, Serialize};

use crate::EngagementRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            TrendDirection::Up
        } else if change < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTrend {
    pub metric: String,
    pub direction: TrendDirection,
    /// Absolute percentage change between the two periods.
    pub percentage: f64,
    pub timeframe: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    pub engagement: u64,
    pub reach: u64,
    pub impressions: u64,
}

impl PeriodTotals {
    pub fn from_records(records: &[EngagementRecord]) -> Self {
        records.iter().fold(Self::default(), |mut totals, record| {
            totals.engagement += record.engagement();
            totals.reach += record.reach;
            totals.impressions += record.impressions;
            totals
        })
    }

    pub fn engagement_rate(&self) -> f64 {
        crate::percent_of(self.engagement, self.impressions)
    }
}

/// Signed change from `previous` to `current` in percent. A zero baseline
/// reports 100 for any growth and 0 otherwise.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TrendCalculator;

impl TrendCalculator {
    pub fn trend(metric: &str, current: f64, previous: f64, timeframe: &str) -> PerformanceTrend {
        let change = percentage_change(current, previous);
        PerformanceTrend {
            metric: metric.to_string(),
            direction: TrendDirection::from_change(change),
            percentage: change.abs(),
            timeframe: timeframe.to_string(),
        }
    }

    pub fn calculate(
        current: &[EngagementRecord],
        previous: &[EngagementRecord],
        timeframe: &str,
    ) -> Vec<PerformanceTrend> {
        let now = PeriodTotals::from_records(current);
        let before = PeriodTotals::from_records(previous);

        vec![
            Self::trend(
                "Total Engagement",
                now.engagement as f64,
                before.engagement as f64,
                timeframe,
            ),
            Self::trend("Total Reach", now.reach as f64, before.reach as f64, timeframe),
            Self::trend(
                "Engagement Rate",
                now.engagement_rate(),
                before.engagement_rate(),
                timeframe,
            ),
        ]
    }
}

use chrono::{DateTime, Duration, TimeZone, Utc};
use content_scheduler::bulk::BulkConfig;
use content_scheduler::timing::SlotConfig;
use content_scheduler::{
    BulkScheduleOptions, BulkScheduler, EngagementRecord, Post, SchedulerError, SpacingStrategy,
};

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

fn posts(count: usize) -> Vec<Post> {
    (0..count)
        .map(|idx| Post::new(format!("post_{}", idx), format!("Topic {}", idx)))
        .collect()
}

fn platforms(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn wednesday_history(samples: usize) -> Vec<EngagementRecord> {
    (0..samples)
        .map(|week| EngagementRecord {
            post_id: "old".to_string(),
            platform: "twitter".to_string(),
            likes: 40,
            shares: 4,
            comments: 2,
            clicks: 1,
            impressions: 1_000,
            reach: 700,
            // 2023-12-27 is a Wednesday.
            recorded_at: at(2023, 12, 27, 13) - Duration::weeks(week as i64),
        })
        .collect()
}

#[test]
fn calendar_has_five_slots_per_day_inclusive() {
    let options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 3, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Even,
    );

    let slots = BulkScheduler::default().available_slots(&options);

    assert_eq!(slots.len(), 15);
    assert_eq!(slots[0], at(2024, 1, 1, 9));
    assert_eq!(slots[14], at(2024, 1, 3, 17));
}

#[test]
fn even_spacing_walks_the_calendar_in_order() {
    let options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 1, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Even,
    );

    let suggestions = BulkScheduler::default().schedule(&posts(3), &options, &[]).unwrap();

    let times: Vec<DateTime<Utc>> = suggestions.iter().map(|s| s.suggested_time).collect();
    assert_eq!(times, vec![at(2024, 1, 1, 9), at(2024, 1, 1, 11), at(2024, 1, 1, 13)]);
    assert!(suggestions.iter().all(|s| (s.confidence - 0.8).abs() < 1e-6));
}

#[test]
fn even_spacing_clamps_to_last_slot_when_overbooked() {
    let options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 1, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Even,
    );

    let suggestions = BulkScheduler::default().schedule(&posts(7), &options, &[]).unwrap();

    assert_eq!(suggestions.len(), 7);
    assert!(suggestions
        .windows(2)
        .all(|pair| pair[0].suggested_time <= pair[1].suggested_time));
    assert_eq!(suggestions[6].suggested_time, at(2024, 1, 1, 17));
}

#[test]
fn posts_are_outer_loop_and_platforms_inner() {
    let options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 2, 0),
        platforms(&["twitter", "linkedin"]),
        SpacingStrategy::Even,
    );

    let suggestions = BulkScheduler::default().schedule(&posts(2), &options, &[]).unwrap();

    let order: Vec<(&str, &str)> = suggestions
        .iter()
        .map(|s| (s.post_id.as_str(), s.platform.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("post_0", "twitter"),
            ("post_0", "linkedin"),
            ("post_1", "twitter"),
            ("post_1", "linkedin"),
        ]
    );
}

#[test]
fn weekends_are_skipped_when_requested() {
    // 2024-01-06 is a Saturday.
    let mut options = BulkScheduleOptions::new(
        at(2024, 1, 6, 0),
        at(2024, 1, 8, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Even,
    );
    options.avoid_weekends = true;

    let scheduler = BulkScheduler::default();
    let slots = scheduler.available_slots(&options);
    let suggestions = scheduler.schedule(&posts(1), &options, &[]).unwrap();

    assert_eq!(slots.len(), 5);
    assert_eq!(suggestions[0].suggested_time, at(2024, 1, 8, 9));
}

#[test]
fn empty_calendar_falls_back_to_start_date() {
    let mut options = BulkScheduleOptions::new(
        at(2024, 1, 6, 8),
        at(2024, 1, 7, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Even,
    );
    options.avoid_weekends = true;

    let suggestions = BulkScheduler::default().schedule(&posts(2), &options, &[]).unwrap();

    assert!(suggestions
        .iter()
        .all(|s| s.suggested_time == at(2024, 1, 6, 8)));
}

#[test]
fn custom_spacing_chains_from_start() {
    let mut options = BulkScheduleOptions::new(
        at(2024, 1, 1, 8),
        at(2024, 1, 5, 0),
        platforms(&["twitter", "linkedin"]),
        SpacingStrategy::Custom,
    );
    options.custom_spacing_hours = Some(6);

    let suggestions = BulkScheduler::default().schedule(&posts(2), &options, &[]).unwrap();

    let times: Vec<DateTime<Utc>> = suggestions.iter().map(|s| s.suggested_time).collect();
    assert_eq!(
        times,
        vec![
            at(2024, 1, 1, 14),
            at(2024, 1, 1, 20),
            at(2024, 1, 2, 2),
            at(2024, 1, 2, 8),
        ]
    );
    assert_eq!(suggestions[0].reason, "Custom spacing of 6 hours between posts");
}

#[test]
fn custom_spacing_defaults_from_config() {
    let config = BulkConfig {
        default_custom_spacing_hours: 12,
        ..BulkConfig::default()
    };
    let options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 5, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Custom,
    );

    let suggestions = BulkScheduler::new(config, SlotConfig::default())
        .schedule(&posts(2), &options, &[])
        .unwrap();

    assert_eq!(suggestions[0].suggested_time, at(2024, 1, 1, 12));
    assert_eq!(suggestions[1].suggested_time, at(2024, 1, 2, 0));
}

#[test]
fn optimal_spacing_lands_on_historical_peak() {
    let mut options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 5, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Optimal,
    );
    options.respect_optimal_times = true;

    let suggestions = BulkScheduler::default()
        .schedule(&posts(2), &options, &wednesday_history(5))
        .unwrap();

    // Wednesday 13:00 is taken first; nothing later matches so the next slot follows.
    assert_eq!(suggestions[0].suggested_time, at(2024, 1, 3, 13));
    assert!((suggestions[0].confidence - 0.5).abs() < 1e-6);
    assert!(suggestions[0].reason.contains("Wednesday at 13:00"));
    assert_eq!(suggestions[1].suggested_time, at(2024, 1, 3, 15));
    assert!(suggestions[1].reason.starts_with("Next available slot"));
}

#[test]
fn optimal_without_history_uses_fallback_confidence() {
    let options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 2, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Optimal,
    );

    let suggestions = BulkScheduler::default()
        .schedule(&posts(2), &options, &wednesday_history(5))
        .unwrap();

    assert_eq!(suggestions[0].suggested_time, at(2024, 1, 1, 9));
    assert_eq!(suggestions[1].suggested_time, at(2024, 1, 1, 11));
    assert!(suggestions.iter().all(|s| (s.confidence - 0.5).abs() < 1e-6));
}

#[test]
fn first_target_timezone_shifts_time_and_notes_reason() {
    let mut options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 1, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Even,
    );
    options.target_timezones = vec!["EST".to_string(), "JST".to_string()];

    let suggestions = BulkScheduler::default().schedule(&posts(1), &options, &[]).unwrap();

    assert_eq!(suggestions[0].suggested_time, at(2024, 1, 1, 4));
    assert!(suggestions[0].reason.ends_with("(adjusted for EST)"));
}

#[test]
fn spacing_parses_case_insensitively() {
    assert_eq!(SpacingStrategy::from_str("Even"), Some(SpacingStrategy::Even));
    assert_eq!(SpacingStrategy::from_str(" optimal "), Some(SpacingStrategy::Optimal));
    assert_eq!(SpacingStrategy::from_str("random"), None);
}

#[test]
fn oversized_custom_spacing_is_an_error() {
    let mut options = BulkScheduleOptions::new(
        at(2024, 1, 1, 0),
        at(2024, 1, 2, 0),
        platforms(&["twitter"]),
        SpacingStrategy::Custom,
    );
    options.custom_spacing_hours = Some(10_000_000_000);

    let err = BulkScheduler::default()
        .schedule(&posts(1), &options, &[])
        .unwrap_err();

    assert!(matches!(err, SchedulerError::InvalidInput(_)));
}

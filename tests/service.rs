use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use content_scheduler::store::{Dataset, StoreResult};
use content_scheduler::{
    AudienceProfile, BulkScheduleOptions, EngagementRecord, JsonFileStore, MemoryStore, Post,
    PostStatus, SchedulerConfig, SchedulerError, SchedulingService, SpacingStrategy, Store,
    StoreError, TimeSlot,
};
use std::collections::HashMap;
use std::sync::Arc;

fn now() -> DateTime<Utc> {
    // Monday.
    Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
}

fn record(post_id: &str, platform: &str, recorded_at: DateTime<Utc>, likes: u64) -> EngagementRecord {
    EngagementRecord {
        post_id: post_id.to_string(),
        platform: platform.to_string(),
        likes,
        shares: 0,
        comments: 0,
        clicks: 0,
        impressions: 100,
        reach: 50,
        recorded_at,
    }
}

/// Records every Tuesday 10:00 going back `weeks` from `now()`.
fn tuesday_history(platform: &str, weeks: i64) -> Vec<EngagementRecord> {
    let last_tuesday = Utc.with_ymd_and_hms(2024, 2, 27, 10, 0, 0).unwrap();
    (0..weeks)
        .map(|week| record("post_a", platform, last_tuesday - Duration::weeks(week), 20))
        .collect()
}

fn post(id: &str) -> Post {
    let mut post = Post::new(id, format!("Topic for {}", id));
    post.platform_payloads.insert("twitter".to_string(), "copy".to_string());
    post
}

fn service(posts: Vec<Post>, analytics: Vec<EngagementRecord>) -> SchedulingService<MemoryStore> {
    SchedulingService::new(
        Arc::new(MemoryStore::new(posts, analytics)),
        SchedulerConfig::default(),
    )
}

struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn analytics_by_timeframe(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> StoreResult<Vec<EngagementRecord>> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn posts(&self) -> StoreResult<Vec<Post>> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn post_analytics(&self, _post_id: &str) -> StoreResult<Vec<EngagementRecord>> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

#[tokio::test]
async fn optimal_times_reads_history_window() {
    let mut analytics = tuesday_history("twitter", 12);
    // Outside the 90 day window.
    analytics.push(record("post_a", "twitter", now() - Duration::days(120), 500));

    let analysis = service(vec![], analytics)
        .optimal_times(Some("twitter"), None, now())
        .await
        .unwrap();

    assert_eq!(analysis.total_samples, 12);
    assert!(analysis.sufficient_data);
    let top = analysis.top().unwrap();
    assert!(top.matches(2, 10));
    assert!((top.engagement_score - 20.0).abs() < 1e-6);
}

#[tokio::test]
async fn audience_pattern_scales_platform_scores() {
    let audience = AudienceProfile {
        id: "core".to_string(),
        name: "Core".to_string(),
        engagement_patterns: HashMap::from([("twitter".to_string(), 2.0)]),
    };
    let svc = service(vec![], tuesday_history("twitter", 3));

    let boosted = svc
        .optimal_times(Some("twitter"), Some(&audience), now())
        .await
        .unwrap();
    let neutral = svc
        .optimal_times(None, Some(&audience), now())
        .await
        .unwrap();

    assert!((boosted.slots[0].engagement_score - 40.0).abs() < 1e-6);
    assert!((neutral.slots[0].engagement_score - 20.0).abs() < 1e-6);
}

#[tokio::test]
async fn store_failures_carry_operation_context() {
    let svc = SchedulingService::new(Arc::new(FailingStore), SchedulerConfig::default());

    let err = svc.optimal_times(None, None, now()).await.unwrap_err();
    assert!(matches!(err, SchedulerError::Store { .. }));
    assert!(err
        .to_string()
        .starts_with("Failed to analyze optimal posting times"));
    assert!(err.to_string().contains("database offline"));

    let err = svc.detect_conflicts().await.unwrap_err();
    assert!(err.to_string().starts_with("Failed to detect content conflicts"));
}

#[tokio::test]
async fn detect_conflicts_uses_stored_posts() {
    let mut first = post("a");
    first.status = PostStatus::Scheduled;
    first.schedule_date = Some(now() + Duration::hours(24));
    let mut second = post("b");
    second.status = PostStatus::Scheduled;
    second.schedule_date = Some(now() + Duration::hours(25));

    let report = service(vec![first, second], vec![])
        .detect_conflicts()
        .await
        .unwrap();

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].platform, "twitter");
}

#[tokio::test]
async fn bulk_schedule_rejects_unknown_posts() {
    let options = BulkScheduleOptions::new(
        now(),
        now() + Duration::days(2),
        vec!["twitter".to_string()],
        SpacingStrategy::Even,
    );

    let err = service(vec![post("a")], vec![])
        .bulk_schedule(&["a".to_string(), "missing".to_string()], &options)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulerError::PostNotFound(ref id) if id == "missing"));
}

#[tokio::test]
async fn bulk_schedule_keeps_requested_order() {
    let options = BulkScheduleOptions::new(
        now(),
        now() + Duration::days(2),
        vec!["twitter".to_string()],
        SpacingStrategy::Even,
    );

    let suggestions = service(vec![post("a"), post("b")], vec![])
        .bulk_schedule(&["b".to_string(), "a".to_string()], &options)
        .await
        .unwrap();

    assert_eq!(suggestions[0].post_id, "b");
    assert_eq!(suggestions[1].post_id, "a");
    assert!(suggestions[0].suggested_time <= suggestions[1].suggested_time);
}

#[tokio::test]
async fn suggest_times_without_history_uses_default_slot() {
    let suggestions = service(vec![post("a")], vec![])
        .suggest_times("a", &["twitter".to_string()], now())
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 1);
    assert_eq!(
        suggestions[0].suggested_time,
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()
    );
    assert!((suggestions[0].confidence - 0.5).abs() < 1e-6);
}

#[tokio::test]
async fn suggest_times_for_unknown_post_fails() {
    let err = service(vec![], vec![])
        .suggest_times("ghost", &["twitter".to_string()], now())
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulerError::PostNotFound(_)));
}

#[tokio::test]
async fn performance_trends_compare_adjacent_periods() {
    let analytics = vec![
        record("a", "twitter", now() - Duration::days(3), 30),
        record("a", "twitter", now() - Duration::days(10), 10),
    ];

    let trends = service(vec![], analytics)
        .performance_trends(now(), 7)
        .await
        .unwrap();

    assert_eq!(trends[0].metric, "Total Engagement");
    assert!((trends[0].percentage - 200.0).abs() < 1e-9);
    assert_eq!(trends[0].timeframe, "7d");
}

#[tokio::test]
async fn refresh_reports_changes_in_top_slots() {
    let svc = service(vec![], tuesday_history("twitter", 4));

    let first = svc.refresh_timing_recommendations(&[], now()).await.unwrap();
    assert!(first.changed);

    let second = svc
        .refresh_timing_recommendations(&first.analysis.slots, now())
        .await
        .unwrap();
    assert!(!second.changed);

    let stale = vec![TimeSlot::new(5, 18, 1.0, 1.0)];
    let third = svc.refresh_timing_recommendations(&stale, now()).await.unwrap();
    assert!(third.changed);
}

#[tokio::test]
async fn top_posts_are_limited_and_ranked() {
    let analytics = vec![
        record("a", "twitter", now() - Duration::days(1), 5),
        record("b", "twitter", now() - Duration::days(1), 50),
        record("c", "twitter", now() - Duration::days(1), 20),
    ];

    let top = service(vec![], analytics).top_posts(now(), 2).await.unwrap();

    let ids: Vec<&str> = top.iter().map(|p| p.post_id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[tokio::test]
async fn json_store_persists_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("content.json");

    let store = JsonFileStore::load(path.clone()).await.unwrap();
    assert!(store.posts().await.unwrap().is_empty());

    let dataset = Dataset {
        posts: vec![post("a")],
        analytics: tuesday_history("twitter", 2),
        audiences: vec![AudienceProfile {
            id: "core".to_string(),
            ..AudienceProfile::default()
        }],
    };
    store.replace(dataset).await.unwrap();

    let reloaded = JsonFileStore::load(path).await.unwrap();
    assert_eq!(reloaded.posts().await.unwrap(), vec![post("a")]);
    assert_eq!(reloaded.post_analytics("post_a").await.unwrap().len(), 2);
    assert!(reloaded.audience("core").await.is_some());
}

#[tokio::test]
async fn json_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("content.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonFileStore::load(path).await.err().unwrap();

    assert!(matches!(err, StoreError::Parse(_)));
}

#[tokio::test]
async fn memory_store_timeframe_is_half_open() {
    let store = MemoryStore::default();
    let start = now() - Duration::days(1);
    store.record(record("a", "twitter", start, 1)).await;
    store.record(record("a", "twitter", now(), 1)).await;

    let records = store.analytics_by_timeframe(start, now()).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].recorded_at, start);
}

#[test]
fn config_parses_partial_toml() {
    let config = SchedulerConfig::from_toml(
        r#"
log_level = "debug"

[slots]
min_samples = 4

[conflicts]
timing_window_hours = 3.0
"#,
    )
    .unwrap();

    assert_eq!(config.log_level, "debug");
    assert_eq!(config.slots.min_samples, 4);
    assert_eq!(config.slots.max_slots, 10);
    assert!((config.conflicts.timing_window_hours - 3.0).abs() < 1e-9);
    assert!((config.conflicts.topic_window_hours - 24.0).abs() < 1e-9);
    assert_eq!(config.service.history_days, 90);
}

#[test]
fn config_rejects_bad_toml() {
    let err = SchedulerConfig::from_toml("log_level = [").unwrap_err();

    assert!(matches!(err, SchedulerError::Config(_)));
}

#[test]
fn config_write_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("scheduler.toml");
    let mut config = SchedulerConfig::default();
    config.bulk.slot_hours = vec![8, 12];

    config.write(&path).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    let parsed = SchedulerConfig::from_toml(&contents).unwrap();

    assert_eq!(parsed.bulk.slot_hours, vec![8, 12]);
}

#[tokio::test]
async fn oversized_trend_period_is_an_error() {
    let err = service(vec![], vec![])
        .performance_trends(now(), 100_000_000)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulerError::InvalidInput(_)));
}

#[tokio::test]
async fn oversized_history_window_is_an_error() {
    let mut config = SchedulerConfig::default();
    config.service.history_days = i64::MAX;
    let svc = SchedulingService::new(Arc::new(MemoryStore::default()), config);

    let err = svc.optimal_times(None, None, now()).await.unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidInput(_)));

    let err = svc.top_posts(now(), 5).await.unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidInput(_)));
}

#[tokio::test]
async fn bulk_schedule_surfaces_spacing_overflow() {
    let mut options = BulkScheduleOptions::new(
        now(),
        now() + Duration::days(1),
        vec!["twitter".to_string()],
        SpacingStrategy::Custom,
    );
    options.custom_spacing_hours = Some(10_000_000_000);

    let err = service(vec![post("a")], vec![])
        .bulk_schedule(&["a".to_string()], &options)
        .await
        .unwrap_err();

    assert!(matches!(err, SchedulerError::InvalidInput(_)));
}

#[tokio::test]
async fn memory_store_add_post_replaces_by_id() {
    let store = MemoryStore::default();
    store.add_post(post("a")).await;
    let mut updated = post("a");
    updated.topic = "Rewritten".to_string();
    store.add_post(updated).await;
    store.add_post(post("b")).await;

    let posts = store.posts().await.unwrap();

    assert_eq!(posts.len(), 2);
    assert!(posts.iter().any(|p| p.id == "a" && p.topic == "Rewritten"));
}

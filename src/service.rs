use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bulk::{BulkScheduleOptions, BulkScheduler};
use crate::config::SchedulerConfig;
use crate::conflicts::{ConflictDetector, ConflictReport};
use crate::error::{SchedulerError, SchedulerResult};
use crate::recommendations::{OptimizationSuggestion, RecommendationEngine};
use crate::scoring::{rank_posts, EngagementScorer, PostPerformance};
use crate::similarity::TopicSimilarity;
use crate::store::Store;
use crate::timing::{TimeSlot, TimeSlotAnalysis, TimeSlotAnalyzer};
use crate::trends::{PerformanceTrend, TrendCalculator};
use crate::{day_name, days_before, AudienceProfile, Post, SchedulingSuggestion};

const OPTIMAL_TIMES_FAILED: &str = "Failed to analyze optimal posting times";
const CONFLICTS_FAILED: &str = "Failed to detect content conflicts";
const BULK_FAILED: &str = "Failed to bulk schedule posts";
const SUGGEST_FAILED: &str = "Failed to suggest posting times";
const TRENDS_FAILED: &str = "Failed to calculate performance trends";
const RECOMMENDATIONS_FAILED: &str = "Failed to generate optimization suggestions";
const REFRESH_FAILED: &str = "Failed to refresh timing recommendations";
const PERFORMANCE_FAILED: &str = "Failed to load post performance";

/// Number of leading slots compared when refreshing timing recommendations.
const REFRESH_COMPARE_TOP: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRefresh {
    pub analysis: TimeSlotAnalysis,
    /// Whether the leading slots differ from the previous set.
    pub changed: bool,
}

/// Async entry points: each call reads one snapshot from the store and runs
/// the pure analysis over it. Nothing is cached between calls.
pub struct SchedulingService<S: Store> {
    store: Arc<S>,
    config: SchedulerConfig,
    analyzer: TimeSlotAnalyzer,
    scorer: EngagementScorer,
    conflicts: ConflictDetector,
    bulk: BulkScheduler,
    recommendations: RecommendationEngine,
}

impl<S: Store> SchedulingService<S> {
    pub fn new(store: Arc<S>, config: SchedulerConfig) -> Self {
        let analyzer = TimeSlotAnalyzer::new(config.slots.clone());
        Self {
            store,
            scorer: EngagementScorer::new(config.engagement.clone()),
            conflicts: ConflictDetector::new(config.conflicts.clone()),
            bulk: BulkScheduler::new(config.bulk.clone(), config.slots.clone()),
            recommendations: RecommendationEngine::new(analyzer.clone()),
            analyzer,
            config,
        }
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn TopicSimilarity>) -> Self {
        self.conflicts = self.conflicts.with_similarity(similarity);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    fn history_start(&self, now: DateTime<Utc>) -> SchedulerResult<DateTime<Utc>> {
        window_start(now, self.config.service.history_days)
    }

    pub async fn optimal_times(
        &self,
        platform: Option<&str>,
        audience: Option<&AudienceProfile>,
        now: DateTime<Utc>,
    ) -> SchedulerResult<TimeSlotAnalysis> {
        let records = self
            .store
            .analytics_by_timeframe(self.history_start(now)?, now)
            .await
            .map_err(log_failure(OPTIMAL_TIMES_FAILED))?;
        debug!(records = records.len(), platform = ?platform, "loaded engagement history");

        let multiplier = audience.map(|audience| {
            platform
                .map(|platform| audience.multiplier_for(platform))
                .unwrap_or(1.0)
        });
        let analysis = self.analyzer.analyze(&records, platform, multiplier);

        if !analysis.sufficient_data {
            warn!(
                samples = analysis.total_samples,
                "not enough engagement history; slot confidence will be low"
            );
        }
        info!(slots = analysis.slots.len(), "analyzed optimal posting times");
        Ok(analysis)
    }

    pub async fn detect_conflicts(&self) -> SchedulerResult<ConflictReport> {
        let posts = self
            .store
            .posts()
            .await
            .map_err(log_failure(CONFLICTS_FAILED))?;

        let report = self.conflicts.detect(&posts);
        info!(
            posts = posts.len(),
            conflicts = report.conflicts.len(),
            "checked schedule for conflicts"
        );
        Ok(report)
    }

    /// Suggestions for the given posts, in the order of `post_ids`.
    pub async fn bulk_schedule(
        &self,
        post_ids: &[String],
        options: &BulkScheduleOptions,
    ) -> SchedulerResult<Vec<SchedulingSuggestion>> {
        let history_start = self.history_start(options.start_date)?;
        let (posts, history) = tokio::try_join!(
            self.store.posts(),
            self.store
                .analytics_by_timeframe(history_start, options.start_date)
        )
        .map_err(log_failure(BULK_FAILED))?;

        let selected = select_posts(&posts, post_ids)?;
        let suggestions = self.bulk.schedule(&selected, options, &history)?;
        info!(
            posts = selected.len(),
            platforms = options.platforms.len(),
            suggestions = suggestions.len(),
            spacing = ?options.spacing,
            "bulk schedule computed"
        );
        Ok(suggestions)
    }

    /// Next best time for one post on each platform.
    pub async fn suggest_times(
        &self,
        post_id: &str,
        platforms: &[String],
        now: DateTime<Utc>,
    ) -> SchedulerResult<Vec<SchedulingSuggestion>> {
        let history_start = self.history_start(now)?;
        let (posts, history) = tokio::try_join!(
            self.store.posts(),
            self.store.analytics_by_timeframe(history_start, now)
        )
        .map_err(log_failure(SUGGEST_FAILED))?;

        let post = posts
            .iter()
            .find(|post| post.id == post_id)
            .ok_or_else(|| SchedulerError::PostNotFound(post_id.to_string()))?;

        let suggestions = platforms
            .iter()
            .map(|platform| {
                let analysis = self.analyzer.analyze(&history, Some(platform.as_str()), None);
                let best = analysis.best_slot();
                let (reason, confidence) = match analysis.top() {
                    Some(slot) if analysis.sufficient_data => (
                        format!(
                            "Best historical slot on {}: {} at {}",
                            platform,
                            day_name(slot.day_of_week),
                            slot.time
                        ),
                        slot.confidence,
                    ),
                    Some(slot) => (
                        format!(
                            "Limited history on {} ({} samples); leaning on {} at {}",
                            platform,
                            analysis.total_samples,
                            day_name(slot.day_of_week),
                            slot.time
                        ),
                        slot.confidence,
                    ),
                    None => (
                        format!(
                            "No history on {}; using the default {} at {} slot",
                            platform,
                            day_name(best.day_of_week),
                            best.time
                        ),
                        best.confidence,
                    ),
                };
                SchedulingSuggestion {
                    post_id: post.id.clone(),
                    platform: platform.clone(),
                    suggested_time: best.next_occurrence(now),
                    reason,
                    confidence,
                }
            })
            .collect();

        Ok(suggestions)
    }

    /// Compares the last `period_days` with the period just before it.
    pub async fn performance_trends(
        &self,
        now: DateTime<Utc>,
        period_days: i64,
    ) -> SchedulerResult<Vec<PerformanceTrend>> {
        let period_days = period_days.max(1);
        let current_start = window_start(now, period_days)?;
        let previous_start = window_start(current_start, period_days)?;

        let (current, previous) = tokio::try_join!(
            self.store.analytics_by_timeframe(current_start, now),
            self.store.analytics_by_timeframe(previous_start, current_start)
        )
        .map_err(log_failure(TRENDS_FAILED))?;
        debug!(
            current = current.len(),
            previous = previous.len(),
            "loaded trend periods"
        );

        let timeframe = format!("{}d", period_days);
        Ok(TrendCalculator::calculate(&current, &previous, &timeframe))
    }

    pub async fn optimization_suggestions(
        &self,
        now: DateTime<Utc>,
    ) -> SchedulerResult<Vec<OptimizationSuggestion>> {
        let records = self
            .store
            .analytics_by_timeframe(self.history_start(now)?, now)
            .await
            .map_err(log_failure(RECOMMENDATIONS_FAILED))?;

        let suggestions = self.recommendations.recommend(&records);
        info!(
            records = records.len(),
            suggestions = suggestions.len(),
            "generated optimization suggestions"
        );
        Ok(suggestions)
    }

    /// Recomputes slots over the refresh window and reports whether the top
    /// slots moved. The previous set is only compared, never merged.
    pub async fn refresh_timing_recommendations(
        &self,
        previous: &[TimeSlot],
        now: DateTime<Utc>,
    ) -> SchedulerResult<TimingRefresh> {
        let start = window_start(now, self.config.service.refresh_days)?;
        let records = self
            .store
            .analytics_by_timeframe(start, now)
            .await
            .map_err(log_failure(REFRESH_FAILED))?;

        let analysis = self.analyzer.analyze(&records, None, None);
        let changed = top_keys(previous) != top_keys(&analysis.slots);
        if changed {
            info!(
                previous = ?top_keys(previous),
                current = ?top_keys(&analysis.slots),
                "timing recommendations changed"
            );
        } else {
            debug!("timing recommendations unchanged");
        }

        Ok(TimingRefresh { analysis, changed })
    }

    pub async fn post_performance(&self, post_id: &str) -> SchedulerResult<Vec<PostPerformance>> {
        let records = self
            .store
            .post_analytics(post_id)
            .await
            .map_err(log_failure(PERFORMANCE_FAILED))?;
        Ok(rank_posts(&records, &self.scorer))
    }

    /// Every post with history in the window, best first.
    pub async fn top_posts(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> SchedulerResult<Vec<PostPerformance>> {
        let records = self
            .store
            .analytics_by_timeframe(self.history_start(now)?, now)
            .await
            .map_err(log_failure(PERFORMANCE_FAILED))?;
        let mut ranked = rank_posts(&records, &self.scorer);
        ranked.truncate(limit);
        Ok(ranked)
    }
}

fn select_posts(posts: &[Post], post_ids: &[String]) -> SchedulerResult<Vec<Post>> {
    post_ids
        .iter()
        .map(|id| {
            posts
                .iter()
                .find(|post| &post.id == id)
                .cloned()
                .ok_or_else(|| SchedulerError::PostNotFound(id.clone()))
        })
        .collect()
}

fn window_start(end: DateTime<Utc>, days: i64) -> SchedulerResult<DateTime<Utc>> {
    days_before(end, days).ok_or_else(|| {
        SchedulerError::InvalidInput(format!(
            "a {} day window before {} is out of range",
            days,
            end.to_rfc3339()
        ))
    })
}

fn top_keys(slots: &[TimeSlot]) -> Vec<(u8, u8)> {
    slots
        .iter()
        .take(REFRESH_COMPARE_TOP)
        .map(|slot| (slot.day_of_week, slot.hour))
        .collect()
}

fn log_failure(context: &'static str) -> impl FnOnce(crate::StoreError) -> SchedulerError {
    move |err| {
        warn!(error = %err, "{}", context);
        SchedulerError::store(context)(err)
    }
}

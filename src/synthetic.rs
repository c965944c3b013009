use chrono::{DateTime, Timelike, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{SchedulerError, SchedulerResult};
use crate::store::Dataset;
use crate::{days_before, hours_after, AudienceProfile, EngagementRecord, Post, PostStatus};

pub const DEFAULT_PLATFORMS: [&str; 3] = ["twitter", "linkedin", "instagram"];

const TOPICS: [&str; 8] = [
    "Product launch announcement",
    "Customer success story",
    "Weekly marketing tips",
    "Behind the scenes at the studio",
    "Industry trends roundup",
    "Product launch recap",
    "Hiring update for engineering",
    "Webinar replay and highlights",
];

#[derive(Debug, Clone)]
pub struct SyntheticOptions {
    pub seed: u64,
    pub posts: usize,
    pub days: i64,
    pub records_per_post: usize,
    pub platforms: Vec<String>,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            posts: 24,
            days: 60,
            records_per_post: 6,
            platforms: DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Builds a reproducible dataset ending at `now`: published posts with
/// engagement history, a handful of scheduled posts in the coming days, and
/// one audience profile. Fails when the requested history does not fit in
/// the supported date range.
pub fn generate_dataset(options: &SyntheticOptions, now: DateTime<Utc>) -> SchedulerResult<Dataset> {
    let out_of_range = || {
        SchedulerError::InvalidInput(format!(
            "{} days of synthetic history around {} is out of range",
            options.days,
            now.to_rfc3339()
        ))
    };
    let days = options.days.max(2);
    days_before(now, days).ok_or_else(out_of_range)?;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let platforms = if options.platforms.is_empty() {
        DEFAULT_PLATFORMS.iter().map(|p| p.to_string()).collect()
    } else {
        options.platforms.clone()
    };

    let mut posts = Vec::with_capacity(options.posts);
    let mut analytics = Vec::new();
    let now = now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    for idx in 0..options.posts {
        let mut post = Post::new(format!("post_{}", idx), TOPICS[idx % TOPICS.len()]);
        post.content = format!("{} #{}", post.topic, idx);
        post.tags = BTreeSet::from(["marketing".to_string()]);
        post.campaign_id = Some(format!("campaign_{}", idx % 3));
        if idx % 4 == 0 {
            post.audience_profile_id = Some("audience_core".to_string());
        }

        let mut payloads = BTreeMap::new();
        for platform in &platforms {
            if rng.gen::<f64>() < 0.7 || payloads.is_empty() {
                payloads.insert(platform.clone(), post.content.clone());
            }
        }
        post.platform_payloads = payloads;

        if idx % 5 == 4 {
            let hours_ahead = rng.gen_range(1..(24 * 7));
            post.status = PostStatus::Scheduled;
            post.schedule_date = Some(hours_after(now, hours_ahead).ok_or_else(out_of_range)?);
        } else if idx % 7 == 6 {
            post.status = PostStatus::Draft;
        } else {
            let days_ago = rng.gen_range(1..days);
            let peak = peak_hour(&mut rng) as i64;
            let published_at = hours_after(now, -(now.hour() as i64))
                .and_then(|day_start| days_before(day_start, days_ago))
                .and_then(|day| hours_after(day, peak))
                .ok_or_else(out_of_range)?;
            post.status = PostStatus::Published;
            post.schedule_date = Some(published_at);

            for platform in post.platform_payloads.keys() {
                for sample in 0..options.records_per_post {
                    let recorded_at = hours_after(published_at, sample as i64 * 24 * 7)
                        .ok_or_else(out_of_range)?;
                    if recorded_at >= now {
                        break;
                    }
                    analytics.push(sample_record(&mut rng, &post.id, platform, published_at, recorded_at));
                }
            }
        }

        posts.push(post);
    }

    let engagement_patterns: HashMap<String, f64> = platforms
        .iter()
        .enumerate()
        .map(|(idx, platform)| (platform.clone(), 1.0 + idx as f64 * 0.1))
        .collect();

    Ok(Dataset {
        posts,
        analytics,
        audiences: vec![AudienceProfile {
            id: "audience_core".to_string(),
            name: "Core followers".to_string(),
            engagement_patterns,
        }],
    })
}

fn peak_hour(rng: &mut StdRng) -> u32 {
    let hours = [9, 10, 10, 11, 13, 15, 17, 19];
    hours[rng.gen_range(0..hours.len())]
}

fn sample_record(
    rng: &mut StdRng,
    post_id: &str,
    platform: &str,
    published_at: DateTime<Utc>,
    recorded_at: DateTime<Utc>,
) -> EngagementRecord {
    // Mid-morning posts do better.
    let boost = if (9..=11).contains(&published_at.hour()) { 1.6 } else { 1.0 };
    let impressions = rng.gen_range(200..5_000u64);
    let base = impressions as f64 * rng.gen_range(0.005..0.06) * boost;

    EngagementRecord {
        post_id: post_id.to_string(),
        platform: platform.to_string(),
        likes: (base * 0.6) as u64,
        shares: (base * 0.1) as u64,
        comments: (base * 0.15) as u64,
        clicks: (base * 0.15) as u64,
        impressions,
        reach: (impressions as f64 * rng.gen_range(0.5..0.9)) as u64,
        recorded_at,
    }
}

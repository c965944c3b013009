use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use content_scheduler::store::Dataset;
use content_scheduler::synthetic::{generate_dataset, SyntheticOptions};
use content_scheduler::{
    day_name, format_float, format_number, format_percent, BulkScheduleOptions, JsonFileStore,
    SchedulerConfig, SchedulingService, SpacingStrategy,
};

#[derive(Parser)]
#[command(name = "content-scheduler", about = "Posting-time analysis and scheduling")]
struct Cli {
    /// JSON dataset with posts, analytics and audiences.
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Reference time (RFC 3339 or YYYY-MM-DD); defaults to now.
    #[arg(long, global = true)]
    now: Option<String>,
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank (day, hour) slots by historical engagement.
    Slots(SlotsArgs),
    /// Check scheduled posts for timing, topic and audience collisions.
    Conflicts,
    /// Assign publish times to a batch of posts.
    Schedule(ScheduleArgs),
    /// Suggest the next best time for one post.
    Suggest(SuggestArgs),
    /// Compare the latest period with the one before it.
    Trends(TrendsArgs),
    /// Ranked optimization suggestions.
    Recommend,
    /// Best performing posts by engagement score.
    Top(TopArgs),
    /// Write a synthetic dataset to the data path.
    Seed(SeedArgs),
}

#[derive(Args, Debug, Clone)]
struct SlotsArgs {
    #[arg(long)]
    platform: Option<String>,
    #[arg(long)]
    audience: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct ScheduleArgs {
    #[arg(long, value_delimiter = ',', required = true)]
    posts: Vec<String>,
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    #[arg(long, value_delimiter = ',', required = true)]
    platforms: Vec<String>,
    #[arg(long, default_value = "optimal")]
    spacing: String,
    #[arg(long)]
    spacing_hours: Option<i64>,
    #[arg(long)]
    respect_optimal: bool,
    #[arg(long)]
    avoid_weekends: bool,
    #[arg(long, value_delimiter = ',')]
    timezones: Vec<String>,
    #[arg(long, default_value = "UTC")]
    primary_timezone: String,
}

#[derive(Args, Debug, Clone)]
struct SuggestArgs {
    #[arg(long)]
    post: String,
    #[arg(long, value_delimiter = ',', required = true)]
    platforms: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct TrendsArgs {
    #[arg(long, default_value_t = 7)]
    days: i64,
}

#[derive(Args, Debug, Clone)]
struct TopArgs {
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[derive(Args, Debug, Clone)]
struct SeedArgs {
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 24)]
    posts: usize,
    #[arg(long, default_value_t = 60)]
    days: i64,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (mut config, _) = SchedulerConfig::load(cli.config.clone()).map_err(|err| err.to_string())?;
    init_tracing(&config.log_level);

    if let Some(path) = cli.data.clone() {
        config.data_path = path;
    }
    let now = match cli.now.as_deref() {
        Some(value) => parse_datetime(value)?,
        None => Utc::now(),
    };

    let store = Arc::new(
        JsonFileStore::load(config.data_path.clone())
            .await
            .map_err(|err| format!("failed to load dataset: {}", err))?,
    );
    let service = SchedulingService::new(store.clone(), config);

    match cli.command {
        Command::Slots(args) => run_slots(&service, &store, args, now, cli.json).await,
        Command::Conflicts => run_conflicts(&service, cli.json).await,
        Command::Schedule(args) => run_schedule(&service, args, cli.json).await,
        Command::Suggest(args) => run_suggest(&service, args, now, cli.json).await,
        Command::Trends(args) => run_trends(&service, args, now, cli.json).await,
        Command::Recommend => run_recommend(&service, now, cli.json).await,
        Command::Top(args) => run_top(&service, args, now, cli.json).await,
        Command::Seed(args) => run_seed(&store, args, now).await,
    }
}

type Service = SchedulingService<JsonFileStore>;

async fn run_slots(
    service: &Service,
    store: &JsonFileStore,
    args: SlotsArgs,
    now: DateTime<Utc>,
    json: bool,
) -> Result<(), String> {
    let audience = match args.audience.as_deref() {
        Some(id) => Some(
            store
                .audience(id)
                .await
                .ok_or_else(|| format!("unknown audience: {}", id))?,
        ),
        None => None,
    };
    let analysis = service
        .optimal_times(args.platform.as_deref(), audience.as_ref(), now)
        .await
        .map_err(|err| err.to_string())?;

    if json {
        return print_json(&analysis);
    }

    println!(
        "Samples: {}{}",
        analysis.total_samples,
        if analysis.sufficient_data {
            ""
        } else {
            " (insufficient data)"
        }
    );
    for slot in &analysis.slots {
        println!(
            "  {:<9} {}  score {}  confidence {}  ({} samples)",
            day_name(slot.day_of_week),
            slot.time,
            format_float(slot.engagement_score, 1),
            format_float(slot.confidence, 2),
            slot.sample_count
        );
    }
    if analysis.slots.is_empty() {
        let best = analysis.best_slot();
        println!(
            "No history yet; default slot is {} at {}",
            day_name(best.day_of_week),
            best.time
        );
    }
    Ok(())
}

async fn run_conflicts(service: &Service, json: bool) -> Result<(), String> {
    let report = service
        .detect_conflicts()
        .await
        .map_err(|err| err.to_string())?;

    if json {
        return print_json(&report);
    }

    for conflict in &report.conflicts {
        println!(
            "[{}] {} conflict: {} / {} on {}. {}",
            conflict.severity.label(),
            conflict.conflict_type.label(),
            conflict.post_id1,
            conflict.post_id2,
            conflict.platform,
            conflict.resolution
        );
    }
    println!("\nSuggestions:");
    for suggestion in &report.suggestions {
        println!("- {}", suggestion);
    }
    Ok(())
}

async fn run_schedule(service: &Service, args: ScheduleArgs, json: bool) -> Result<(), String> {
    let spacing = SpacingStrategy::from_str(&args.spacing)
        .ok_or_else(|| format!("invalid spacing strategy: {}", args.spacing))?;
    let mut options = BulkScheduleOptions::new(
        parse_datetime(&args.start)?,
        parse_datetime(&args.end)?,
        args.platforms,
        spacing,
    );
    if options.end_date < options.start_date {
        return Err("end date is before start date".to_string());
    }
    options.custom_spacing_hours = args.spacing_hours;
    options.respect_optimal_times = args.respect_optimal;
    options.avoid_weekends = args.avoid_weekends;
    options.target_timezones = args.timezones;
    options.primary_timezone = args.primary_timezone;

    let suggestions = service
        .bulk_schedule(&args.posts, &options)
        .await
        .map_err(|err| err.to_string())?;

    if json {
        return print_json(&suggestions);
    }

    for suggestion in &suggestions {
        println!(
            "{} on {}: {} (confidence {}) {}",
            suggestion.post_id,
            suggestion.platform,
            suggestion.suggested_time.to_rfc3339(),
            format_float(suggestion.confidence, 2),
            suggestion.reason
        );
    }
    Ok(())
}

async fn run_suggest(
    service: &Service,
    args: SuggestArgs,
    now: DateTime<Utc>,
    json: bool,
) -> Result<(), String> {
    let suggestions = service
        .suggest_times(&args.post, &args.platforms, now)
        .await
        .map_err(|err| err.to_string())?;

    if json {
        return print_json(&suggestions);
    }

    for suggestion in &suggestions {
        println!(
            "{}: {} (confidence {})\n  {}",
            suggestion.platform,
            suggestion.suggested_time.to_rfc3339(),
            format_float(suggestion.confidence, 2),
            suggestion.reason
        );
    }
    Ok(())
}

async fn run_trends(
    service: &Service,
    args: TrendsArgs,
    now: DateTime<Utc>,
    json: bool,
) -> Result<(), String> {
    let trends = service
        .performance_trends(now, args.days)
        .await
        .map_err(|err| err.to_string())?;

    if json {
        return print_json(&trends);
    }

    for trend in &trends {
        println!(
            "{} ({}): {} {}",
            trend.metric,
            trend.timeframe,
            trend.direction.label(),
            format_percent(trend.percentage)
        );
    }
    Ok(())
}

async fn run_recommend(service: &Service, now: DateTime<Utc>, json: bool) -> Result<(), String> {
    let suggestions = service
        .optimization_suggestions(now)
        .await
        .map_err(|err| err.to_string())?;

    if json {
        return print_json(&suggestions);
    }

    for suggestion in &suggestions {
        println!(
            "{} [impact {} | effort {}]\n  {}",
            suggestion.title,
            suggestion.impact.label(),
            suggestion.effort.label(),
            suggestion.description
        );
    }
    Ok(())
}

async fn run_top(
    service: &Service,
    args: TopArgs,
    now: DateTime<Utc>,
    json: bool,
) -> Result<(), String> {
    let ranked = service
        .top_posts(now, args.limit)
        .await
        .map_err(|err| err.to_string())?;

    if json {
        return print_json(&ranked);
    }

    for (rank, performance) in ranked.iter().enumerate() {
        println!(
            "{:>2}. {} on {}: score {} | impressions {} | rate {}",
            rank + 1,
            performance.post_id,
            performance.platform,
            format_float(performance.score, 1),
            format_number(performance.impressions as f64),
            format_percent(performance.engagement_rate)
        );
    }
    Ok(())
}

async fn run_seed(store: &JsonFileStore, args: SeedArgs, now: DateTime<Utc>) -> Result<(), String> {
    let options = SyntheticOptions {
        seed: args.seed,
        posts: args.posts,
        days: args.days,
        ..SyntheticOptions::default()
    };
    let dataset: Dataset = generate_dataset(&options, now).map_err(|err| err.to_string())?;
    let summary = format!(
        "Wrote {} posts and {} engagement records to {}",
        dataset.posts.len(),
        dataset.analytics.len(),
        store.path().display()
    );
    store
        .replace(dataset)
        .await
        .map_err(|err| format!("failed to write dataset: {}", err))?;
    println!("{}", summary);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize output: {}", err))?;
    println!("{}", payload);
    Ok(())
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date (use RFC 3339 or YYYY-MM-DD): {}", value))
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}

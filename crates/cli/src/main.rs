use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{CatalogStore, DataIndex, MovieAccessor, MovieId, RatingsAccessor, UserId};
use rand::seq::IndexedRandom;
use serde::Serialize;
use server::{
    EngineConfig, MovieRecommendation, RecommendationOrchestrator, SimilarMovie, UserProfile,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(about = "Movie recommendations from genre profiles, rating history and item similarity", long_about = None)]
struct Cli {
    /// Catalog snapshot directory (genres.dat, movies.dat, ratings.dat, similarity.json)
    #[arg(short, long, env = "REEL_RECS_DATA_DIR", default_value = "data/catalog")]
    data_dir: PathBuf,

    /// Engine configuration file (TOML)
    #[arg(short, long, env = "REEL_RECS_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Content-based recommendations from the user's genre profile
    Content {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Collaborative filtering recommendations
    Collaborative {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "20")]
        limit: usize,

        /// "user" (similar users) or "item" (similar movies)
        #[arg(long, default_value = "user")]
        mode: String,
    },

    /// Weighted blend of content, user CF and item CF
    Hybrid {
        #[arg(long)]
        user_id: UserId,

        #[arg(long, default_value = "20")]
        limit: usize,

        /// JSON override of the configured weights, e.g. '{"content": 0.6}'
        #[arg(long)]
        weights: Option<String>,
    },

    /// Movies most similar to a seed movie
    Similar {
        #[arg(long)]
        movie_id: MovieId,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Globally popular movies
    Popular {
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Movies for a named taste preset
    Profile {
        /// Preset name, e.g. action_fan
        name: String,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show a user's rating history and genre profile
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Run concurrent hybrid requests and report latencies
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Maximum requests in flight
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[derive(Serialize)]
struct HistoryEntry {
    movie_id: MovieId,
    title: Option<String>,
    rating: u8,
}

#[derive(Serialize)]
struct UserReport {
    history: Vec<HistoryEntry>,
    profile: UserProfile,
}

#[derive(Serialize)]
struct BenchmarkReport {
    requests: usize,
    concurrent: usize,
    wall_time_ms: f64,
    mean_ms: f64,
    p50_ms: f64,
    p95_ms: f64,
    p99_ms: f64,
    throughput_rps: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    // Load the catalog snapshot (this may take a moment)
    let start = Instant::now();
    let index = Arc::new(
        DataIndex::load_from_files(&cli.data_dir).with_context(|| {
            format!("Failed to load catalog from {}", cli.data_dir.display())
        })?,
    );
    let (movies, genres, ratings) = index.counts();
    eprintln!(
        "{} Loaded {} movies, {} genres, {} ratings in {:?}",
        "✓".green(),
        movies,
        genres,
        ratings,
        start.elapsed()
    );

    let store: Arc<dyn CatalogStore> = index.clone();
    let orchestrator =
        RecommendationOrchestrator::new(store, config).context("Invalid engine configuration")?;
    let json = cli.json;

    match cli.command {
        Commands::Content { user_id, limit } => {
            let recs = orchestrator
                .get_content_recommendations(user_id, limit)
                .await?;
            emit(json, &recs, || print_recommendations("Content-based", &recs))?;
        }
        Commands::Collaborative {
            user_id,
            limit,
            mode,
        } => {
            let recs = orchestrator
                .get_collaborative_recommendations(user_id, limit, &mode)
                .await
                .with_context(|| format!("Collaborative request for user {} failed", user_id))?;
            let header = format!("Collaborative ({})", mode);
            emit(json, &recs, || print_recommendations(&header, &recs))?;
        }
        Commands::Hybrid {
            user_id,
            limit,
            weights,
        } => {
            let recs = orchestrator
                .get_hybrid_recommendations(user_id, limit, weights.as_deref())
                .await
                .with_context(|| format!("Hybrid request for user {} failed", user_id))?;
            emit(json, &recs, || print_recommendations("Hybrid", &recs))?;
        }
        Commands::Similar { movie_id, limit } => {
            let similar = orchestrator.get_similar_movies(movie_id, limit).await?;
            emit(json, &similar, || print_similar(&*index, movie_id, &similar))?;
        }
        Commands::Popular { limit } => {
            let recs = orchestrator.get_popular_movies(limit).await?;
            emit(json, &recs, || print_recommendations("Popular", &recs))?;
        }
        Commands::Profile { name, limit } => {
            let recs = orchestrator
                .get_profile_recommendations(&name, limit)
                .await?;
            let header = format!("Preset {}", name);
            emit(json, &recs, || print_recommendations(&header, &recs))?;
        }
        Commands::User { user_id } => handle_user(&index, &orchestrator, user_id, json).await?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&index, orchestrator, requests, concurrent, json).await?,
    }

    Ok(())
}

/// Print `value` as JSON, or fall back to the human-readable printer
fn emit<T: Serialize + ?Sized>(json: bool, value: &T, human: impl FnOnce()) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human();
    }
    Ok(())
}

/// Handle the 'user' command
async fn handle_user(
    index: &DataIndex,
    orchestrator: &RecommendationOrchestrator,
    user_id: UserId,
    json: bool,
) -> Result<()> {
    let history: Vec<HistoryEntry> = index
        .ratings_for_user(user_id)
        .into_iter()
        .map(|(movie_id, rating)| HistoryEntry {
            movie_id,
            title: index.movie_brief(movie_id).map(|m| m.title),
            rating,
        })
        .collect();
    let profile = orchestrator.get_user_profile(user_id).await?;
    let report = UserReport { history, profile };

    emit(json, &report, || print_user(&report))
}

fn print_user(report: &UserReport) {
    let profile = &report.profile;
    println!("{}", format!("User {}", profile.user_id).bold().blue());
    println!("{}Ratings: {}", "• ".cyan(), report.history.len());

    if report.history.is_empty() {
        println!("  (no rating history, recommendations fall back to popularity)");
    }

    let mut top_rated: Vec<&HistoryEntry> = report.history.iter().collect();
    top_rated.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.movie_id.cmp(&b.movie_id)));
    if !top_rated.is_empty() {
        println!("Top rated movies:");
    }
    for entry in top_rated.iter().take(10) {
        let title = entry.title.as_deref().unwrap_or("<not in catalog>");
        println!("  - {} ({}/10)", title, entry.rating);
    }

    println!("Genre profile:");
    let mut axes: Vec<(&String, f64)> = profile
        .genres
        .iter()
        .zip(profile.weights.iter().copied())
        .filter(|(_, w)| *w != 0.0)
        .collect();
    axes.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (genre, weight) in axes {
        let value = format!("{:+.3}", weight);
        let value = if weight > 0.0 { value.green() } else { value.red() };
        println!("  - {:<12} {}", genre, value);
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    index: &DataIndex,
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    concurrent: usize,
    json: bool,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }
    let users = index.get_all_user_ids();
    if users.is_empty() {
        bail!("Catalog has no rating history to sample users from");
    }

    // Random users drawn from those with history
    let user_ids: Vec<UserId> = {
        let mut rng = rand::rng();
        (0..requests)
            .filter_map(|_| users.choose(&mut rng).copied())
            .collect()
    };

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall = Instant::now();

    let mut handles = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        let orchestrator = orchestrator.clone();
        let permits = Arc::clone(&permits);
        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            orchestrator
                .get_hybrid_recommendations(user_id, 20, None)
                .await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let wall_time = wall.elapsed();
    timings.sort();

    let total: Duration = timings.iter().sum();
    let report = BenchmarkReport {
        requests,
        concurrent,
        wall_time_ms: millis(wall_time),
        mean_ms: millis(total) / timings.len() as f64,
        p50_ms: millis(percentile(&timings, 0.50)),
        p95_ms: millis(percentile(&timings, 0.95)),
        p99_ms: millis(percentile(&timings, 0.99)),
        throughput_rps: requests as f64 / wall_time.as_secs_f64(),
    };

    emit(json, &report, || {
        println!("{}", "Benchmark results:".bold().blue());
        println!("Requests: {} ({} in flight)", report.requests, report.concurrent);
        println!("Wall time: {:.2} ms", report.wall_time_ms);
        println!("Average latency: {:.2} ms", report.mean_ms);
        println!("P50 latency: {:.2} ms", report.p50_ms);
        println!("P95 latency: {:.2} ms", report.p95_ms);
        println!("P99 latency: {:.2} ms", report.p99_ms);
        println!("Throughput: {:.2} requests/second", report.throughput_rps);
    })
}

/// Nearest-rank percentile over sorted timings
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let rank = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn print_recommendations(header: &str, recommendations: &[MovieRecommendation]) {
    println!("{}", format!("{} recommendations:", header).bold().blue());
    if recommendations.is_empty() {
        println!("  (none)");
    }
    for (i, movie) in recommendations.iter().enumerate() {
        println!(
            "{}. {} ({}) - {:.1}/10 - Score: {:.3} [{}]",
            (i + 1).to_string().green(),
            movie.title,
            release_year(movie.release_date.as_deref()),
            movie.vote_average,
            movie.score,
            movie.method
        );
    }
}

fn print_similar(index: &DataIndex, seed: MovieId, similar: &[SimilarMovie]) {
    let seed_title = index
        .movie_brief(seed)
        .map(|m| m.title)
        .unwrap_or_else(|| format!("movie {}", seed));
    println!("{}", format!("Movies similar to {}:", seed_title).bold().blue());
    if similar.is_empty() {
        println!("  (none, the movie is not in the similarity artifact)");
    }
    for (i, movie) in similar.iter().enumerate() {
        println!(
            "{}. {} ({}) - Similarity: {:.3}",
            (i + 1).to_string().green(),
            movie.title,
            release_year(movie.release_date.as_deref()),
            movie.similarity
        );
    }
}

fn release_year(release_date: Option<&str>) -> &str {
    release_date
        .and_then(|d| d.get(..4))
        .unwrap_or("----")
}

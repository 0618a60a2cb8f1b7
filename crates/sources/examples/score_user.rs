//! Example: Score movies for one user with every source
//!
//! Run with: cargo run --package sources --example score_user -- data/catalog 1
//!
//! This example shows how to:
//! 1. Load a catalog snapshot
//! 2. Build the user's context and genre profile
//! 3. Run content, user CF and item CF scoring
//! 4. Compare the lists

use anyhow::Context;
use data_loader::{CatalogStore, DataIndex, MovieAccessor};
use sources::{
    build_user_context, CollaborativeMode, CollaborativeSource, ContentSource, Recommendation,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

fn print_top(store: &dyn CatalogStore, label: &str, recs: &[Recommendation]) {
    println!("\nTop 5 {}:", label);
    for (i, rec) in recs.iter().take(5).enumerate() {
        if let Some(movie) = store.movie_brief(rec.movie_id) {
            println!("  {}. {} (Score: {:.3}, {})", i + 1, movie.title, rec.score, rec.method);
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut args = std::env::args().skip(1);
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/catalog"));
    let user_id: u32 = args
        .next()
        .map(|s| s.parse())
        .transpose()
        .context("user id must be a number")?
        .unwrap_or(1);

    println!("=== ReelRecs Scoring Example ===\n");

    let start = Instant::now();
    let store: Arc<dyn CatalogStore> = Arc::new(DataIndex::load_from_files(&data_dir)?);
    println!("Loaded snapshot in {:?}", start.elapsed());

    let context = build_user_context(&*store, user_id);
    println!("Target user {}: {} rated movies", user_id, context.ratings.len());

    let content = ContentSource::new(Arc::clone(&store));
    let profile = content.user_profile(user_id);
    for (genre, weight) in profile.genres.iter().zip(&profile.weights) {
        if *weight != 0.0 {
            println!("  {:<14} {:+.3}", genre, weight);
        }
    }

    let start = Instant::now();
    let by_content = content.get_recommendations(user_id, 50);
    let content_time = start.elapsed();

    let collaborative = CollaborativeSource::new(Arc::clone(&store));
    let start = Instant::now();
    let by_users = collaborative.get_recommendations(user_id, 50, CollaborativeMode::User);
    let user_time = start.elapsed();

    let start = Instant::now();
    let by_items = collaborative.get_recommendations(user_id, 50, CollaborativeMode::Item);
    let item_time = start.elapsed();

    print_top(&*store, "content", &by_content);
    print_top(&*store, "user-based", &by_users);
    print_top(&*store, "item-based", &by_items);

    println!("\n=== Summary ===");
    println!("Content:    {} in {:?}", by_content.len(), content_time);
    println!("User CF:    {} in {:?}", by_users.len(), user_time);
    println!("Item CF:    {} in {:?}", by_items.len(), item_time);

    let content_ids: HashSet<_> = by_content.iter().map(|r| r.movie_id).collect();
    let user_ids: HashSet<_> = by_users.iter().map(|r| r.movie_id).collect();
    println!(
        "Overlap between content and user CF: {} movies",
        content_ids.intersection(&user_ids).count()
    );

    Ok(())
}

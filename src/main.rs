use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tubestats::api::create_router;
use tubestats::config::Config;
use tubestats::data_models::DEFAULT_RESULTS;
use tubestats::{Pipeline, ResultSet, SafeSearch, SearchOrder, SearchRequest};

#[derive(Parser)]
#[command(name = "tubestats", about = "Search videos and rank them by their statistics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search and print the ranked records
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_RESULTS)]
        max_results: u32,
        #[arg(long, default_value = "relevance")]
        order: SearchOrder,
        #[arg(long, default_value = "moderate")]
        safe_search: SafeSearch,
        /// Print the result set as JSON
        #[arg(long)]
        json: bool,
    },
    /// Serve the search API over HTTP
    Serve {
        /// Overrides TUBESTATS_BIND_ADDR
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pipeline = Arc::new(Pipeline::from_config(&config)?);

    match cli.command {
        Command::Search {
            query,
            max_results,
            order,
            safe_search,
            json,
        } => {
            let request = SearchRequest::new(query, max_results, order, safe_search)?;
            let result = pipeline.run(&request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(result.as_ref())?);
            } else {
                print_summary(&result);
            }
        }
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.bind_addr.clone());
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            tracing::info!("listening on {addr}");
            axum::serve(listener, create_router(pipeline)).await?;
        }
    }
    Ok(())
}

fn print_summary(result: &ResultSet) {
    if result.is_empty() {
        println!("No videos found for '{}'", result.query);
        return;
    }
    println!("Found {} videos for '{}'", result.len(), result.query);
    println!(
        "total views: {}  avg views: {:.1}  avg likes: {:.1}  channels: {}  top channel: {}",
        result.total_views,
        result.avg_views,
        result.avg_likes,
        result.distinct_channel_count,
        result.top_channel.as_deref().unwrap_or("-"),
    );
    for (rank, record) in result.records.iter().enumerate() {
        let published = record
            .published_at
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}. {:>12} views {:>9} likes  {}  {} [{}]",
            rank + 1,
            record.view_count,
            record.like_count,
            published,
            record.title,
            record.channel,
        );
    }
}

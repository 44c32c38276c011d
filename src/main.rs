use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flickpick::{
    config::Config,
    models::{
        decade_catalog, DecadeRange, DetailedMovie, FilterSet, GenreId, Mood, SortOption,
        NO_RUNTIME_LIMIT,
    },
    services::{providers::tmdb::ImageSize, PipelineContext, RecommendationPipeline, TmdbProvider},
    session::RecommendationSession,
};

/// Command-line arguments for flickpick
#[derive(Parser, Debug)]
#[command(name = "flickpick")]
#[command(about = "Movie recommendations from genre, decade, country, mood and people filters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend movies for a set of filters
    Recommend(RecommendArgs),
    /// List every movie genre with its id
    Genres,
    /// List the mood ids accepted by --mood
    Moods,
    /// List the decades offered as filters
    Decades,
    /// Search people for the actor and director filters
    Person {
        /// Name or part of a name, at least two characters
        query: String,
    },
}

#[derive(Args, Debug)]
struct RecommendArgs {
    /// Genre id; repeat for "any of" several genres
    #[arg(long = "genre")]
    genres: Vec<GenreId>,

    /// First year of a decade, e.g. 1990; repeatable
    #[arg(long = "decade", value_parser = parse_decade)]
    decades: Vec<DecadeRange>,

    /// ISO 3166-1 origin country code; repeatable
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Mood id; run `flickpick moods` for the list
    #[arg(long = "mood", value_parser = parse_mood)]
    moods: Vec<Mood>,

    /// Exact name of a cast member
    #[arg(long)]
    actor: Option<String>,

    /// Exact name of a director
    #[arg(long)]
    director: Option<String>,

    /// Runtime ceiling in minutes; 240 means no limit
    #[arg(long, default_value_t = NO_RUNTIME_LIMIT)]
    max_runtime: u32,

    /// Display order
    #[arg(long, default_value = "rating-desc", value_parser = parse_sort)]
    sort: SortOption,

    /// Result page, 1-based
    #[arg(long, default_value_t = 1)]
    page: usize,
}

fn parse_mood(s: &str) -> std::result::Result<Mood, String> {
    s.parse().map_err(|e: flickpick::error::AppError| e.to_string())
}

fn parse_decade(s: &str) -> std::result::Result<DecadeRange, String> {
    let start_year: i32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a year", s))?;
    DecadeRange::starting(start_year).map_err(|e| e.to_string())
}

fn parse_sort(s: &str) -> std::result::Result<SortOption, String> {
    s.parse().map_err(|e: flickpick::error::AppError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flickpick=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Moods => {
            for mood in Mood::ALL {
                println!("{:<11} {}", mood.id(), mood.label());
            }
            return Ok(());
        }
        Command::Decades => {
            for decade in decade_catalog() {
                println!("{:<6} {}", decade.start_year(), decade.label());
            }
            return Ok(());
        }
        _ => {}
    }

    let config = Config::from_env()?;

    let provider = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
    )
    .context("Failed to build TMDB client")?;

    let ctx = PipelineContext::new(
        Arc::new(provider.clone()),
        config.gateway_settings(),
        config.enrichment_policy,
    );
    let pipeline = RecommendationPipeline::new(ctx);
    let session = RecommendationSession::new(pipeline, config.items_per_page);

    match cli.command {
        Command::Recommend(args) => recommend(&session, &provider, args).await,
        Command::Genres => {
            let genres = session.pipeline().genres().await?;
            for genre in genres {
                println!("{:>6}  {}", genre.id, genre.name);
            }
            Ok(())
        }
        Command::Person { query } => {
            let people = session.pipeline().search_people(&query).await?;
            if people.is_empty() {
                println!("No people found for '{}'", query.trim());
            }
            for person in people {
                println!("{:>8}  {}", person.id, person.name);
            }
            Ok(())
        }
        Command::Moods | Command::Decades => Ok(()),
    }
}

async fn recommend(
    session: &RecommendationSession,
    provider: &TmdbProvider,
    args: RecommendArgs,
) -> Result<()> {
    let filters = FilterSet::default()
        .with_genres(args.genres)
        .with_decades(args.decades)
        .with_countries(args.countries)
        .with_moods(args.moods)
        .with_actor(args.actor.unwrap_or_default())
        .with_director(args.director.unwrap_or_default())
        .with_max_runtime(args.max_runtime);

    session.set_filters(filters).await;
    session.set_sort(args.sort).await;

    if session.search().await.is_err() {
        if let Some(message) = session.error().await {
            println!("{}", message);
        }
        return Ok(());
    }

    session.set_page(args.page).await;
    let page = session.paginated_recommendations().await;

    println!(
        "Page {}/{} ({} movies, sorted by {})",
        page.page,
        page.total_pages,
        page.total_items,
        args.sort.label()
    );
    let offset = (page.page - 1) * session.items_per_page();
    for (i, movie) in page.items.iter().enumerate() {
        print_movie(offset + i + 1, movie, provider);
    }

    Ok(())
}

fn print_movie(rank: usize, movie: &DetailedMovie, provider: &TmdbProvider) {
    let year = movie
        .candidate
        .release_day()
        .map(|d| d.format("%Y").to_string())
        .unwrap_or_else(|| "----".to_string());
    let runtime = movie
        .runtime
        .map(|r| format!("{} min", r))
        .unwrap_or_else(|| "? min".to_string());
    let genres: Vec<&str> = movie.genres.iter().map(|g| g.name.as_str()).collect();

    println!(
        "{:>3}. {} ({}) {:.1}  {}  [{}]",
        rank,
        movie.title(),
        year,
        movie.vote_average(),
        runtime,
        genres.join(", ")
    );
    if let Some(poster) = &movie.candidate.poster_path {
        println!("     {}", provider.image_url(poster, ImageSize::W500));
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fpl_analytics::api::{build_router, state::AppState};
use fpl_analytics::calculate::{
    self, DifficultyCalculator, FixtureFilter, PlayerQuery, SummaryOptions, SummaryScope,
};
use fpl_analytics::config::AppConfig;
use fpl_analytics::export::Tabular;
use fpl_analytics::fetch::{Fetcher, FetcherConfig, FplClient, SnapshotSource, SnapshotStore};
use fpl_analytics::models::{
    FixtureId, PlayerMetric, Position, SkipReport, TeamId, TeamSummary, Venue,
};
use fpl_analytics::parse_duration;

#[derive(Parser)]
#[command(name = "fpl-analytics")]
#[command(about = "Fantasy Premier League fixture difficulty and player statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// FPL API base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Snapshot freshness, e.g. "5m" or "300s" (overrides config)
    #[arg(long)]
    ttl: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        /// Directory of static dashboard files to serve at /
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Fetch the latest data into the disk cache and print a summary
    Fetch {
        /// Ignore any cached copy
        #[arg(long)]
        force: bool,
    },

    /// Print fixture difficulty as CSV
    Difficulty {
        /// Only this team's fixtures
        #[arg(long)]
        team: Option<TeamId>,

        /// Score a single fixture (requires --team)
        #[arg(long)]
        fixture: Option<FixtureId>,

        /// Venue for --fixture; inferred when omitted
        #[arg(long)]
        venue: Option<Venue>,
    },

    /// Print rolling average difficulty as CSV, one column per team
    Rolling {
        /// Comma-separated team ids
        #[arg(long, value_delimiter = ',', required = true)]
        teams: Vec<TeamId>,

        /// Window size (1-10)
        #[arg(long)]
        window: Option<usize>,

        /// First gameweek
        #[arg(long)]
        from: Option<u32>,

        /// Last gameweek
        #[arg(long)]
        to: Option<u32>,

        /// Skip finished fixtures
        #[arg(long)]
        upcoming_only: bool,
    },

    /// Print the fixture comparison for several teams as CSV
    Compare {
        #[arg(long, value_delimiter = ',', required = true)]
        teams: Vec<TeamId>,

        /// Include gameweeks up to this one
        #[arg(long)]
        gameweeks: Option<u32>,
    },

    /// Print per-team player summaries as CSV
    Teams {
        /// Only this team
        #[arg(long)]
        team: Option<TeamId>,

        #[arg(long)]
        top_n: Option<usize>,

        /// Metric for the top-N list, e.g. total_points, form, value_score
        #[arg(long)]
        rank_by: Option<PlayerMetric>,

        /// Print raw strength ratings instead of player summaries
        #[arg(long)]
        strengths: bool,
    },

    /// Print the player table as CSV
    Players {
        #[arg(long, value_delimiter = ',')]
        position: Vec<Position>,

        #[arg(long, value_delimiter = ',')]
        team: Vec<TeamId>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long)]
        min_points: Option<f64>,

        #[arg(long)]
        search: Option<String>,

        #[arg(long, default_value = "total_points")]
        sort_by: PlayerMetric,

        /// Sort ascending
        #[arg(long)]
        asc: bool,

        /// Stop after this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    apply_overrides(&cli, &mut config)?;

    // Initialize tracing; logs go to stderr so CSV output stays clean
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::info!("Starting fpl-analytics v{}", env!("CARGO_PKG_VERSION"));

    let client = Arc::new(build_client(&config)?);

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if static_dir.is_some() {
                config.server.static_dir = static_dir;
            }
            config.validate()?;

            let store = Arc::new(SnapshotStore::new(client, config.fpl.cache_ttl()));
            if store.current().await.is_none() {
                tracing::warn!("No data loaded at startup; will retry on first request");
            }

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let state = AppState::new(store, config.analysis, config.server);
            let app = build_router(state);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {}", addr))?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Commands::Fetch { force } => {
            let snapshot = client.load(force).await?;
            println!("Fetched at: {}", snapshot.fetched_at);
            println!("Teams:      {}", snapshot.teams.len());
            println!("Fixtures:   {}", snapshot.fixtures.len());
            println!("Players:    {}", snapshot.players.len());
            let unscheduled = snapshot
                .fixtures
                .iter()
                .filter(|f| f.gameweek.is_none())
                .count();
            if unscheduled > 0 {
                println!("Unscheduled fixtures: {}", unscheduled);
            }
        }
        Commands::Difficulty {
            team,
            fixture,
            venue,
        } => {
            let snapshot = client.load(false).await?;
            let calc = DifficultyCalculator::new(&snapshot)?;

            match (fixture, team) {
                (Some(fixture_id), Some(team)) => {
                    let fixture = snapshot
                        .fixture(fixture_id)
                        .ok_or(calculate::CalcError::UnknownFixture(fixture_id))?;
                    let Some(venue) = venue.or_else(|| fixture.venue_of(team)) else {
                        bail!("Team {} does not play in fixture {}", team, fixture_id);
                    };
                    let score = calc.score(team, fixture_id, venue)?;
                    println!("{:.2}", score);
                }
                (Some(_), None) => bail!("--fixture requires --team"),
                (None, Some(team)) => {
                    if snapshot.team(team).is_none() {
                        return Err(calculate::CalcError::UnknownTeam(team).into());
                    }
                    let derived = calc.score_team(team);
                    print_csv(derived.value.as_slice(), derived.skipped)?;
                }
                (None, None) => {
                    let derived = calc.score_all();
                    print_csv(derived.value.as_slice(), derived.skipped)?;
                }
            }
        }
        Commands::Rolling {
            teams,
            window,
            from,
            to,
            upcoming_only,
        } => {
            let snapshot = client.load(false).await?;
            let filter = FixtureFilter {
                from_gameweek: from,
                to_gameweek: to,
                upcoming_only,
            };
            let window = window.unwrap_or(config.analysis.default_window);
            let derived = calculate::rolling(&snapshot, &teams, window, &filter)?;
            print_csv(&derived.value, derived.skipped)?;
        }
        Commands::Compare { teams, gameweeks } => {
            let snapshot = client.load(false).await?;
            let gameweeks = gameweeks.unwrap_or(config.analysis.default_gameweeks);
            let derived = calculate::compare_fixtures(&snapshot, &teams, gameweeks)?;
            print_csv(&derived.value, derived.skipped)?;
        }
        Commands::Teams {
            team,
            top_n,
            rank_by,
            strengths,
        } => {
            let snapshot = client.load(false).await?;
            if strengths {
                calculate::require(Some(&snapshot))?;
                print_csv(&snapshot, SkipReport::default())?;
                return Ok(());
            }
            let options = SummaryOptions {
                top_n: top_n.unwrap_or(config.analysis.default_top_n),
                rank_by: rank_by.unwrap_or(config.analysis.default_rank_by),
            };
            let derived = calculate::summarize(&snapshot, SummaryScope::from(team), &options)?;
            let summaries: Vec<TeamSummary> = derived.value.into_values().collect();
            print_csv(summaries.as_slice(), derived.skipped)?;
        }
        Commands::Players {
            position,
            team,
            min_price,
            max_price,
            min_points,
            search,
            sort_by,
            asc,
            limit,
        } => {
            let snapshot = client.load(false).await?;
            let query = PlayerQuery {
                positions: position,
                teams: team,
                min_price,
                max_price,
                min_points,
                search,
                sort_by,
                descending: !asc,
            };
            let mut derived = calculate::query_players(&snapshot, &query)?;
            if let Some(limit) = limit {
                derived.value.truncate(limit);
            }
            print_csv(derived.value.as_slice(), derived.skipped)?;
        }
    }

    Ok(())
}

fn apply_overrides(cli: &Cli, config: &mut AppConfig) -> Result<()> {
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(url) = &cli.base_url {
        config.fpl.base_url = url.clone();
    }
    if let Some(ttl) = &cli.ttl {
        let Some(ttl) = parse_duration(ttl) else {
            bail!("Invalid --ttl '{}' (expected e.g. 5m, 300s, 1h)", ttl);
        };
        config.fpl.cache_ttl_seconds = ttl.as_secs();
    }
    config.validate()?;
    Ok(())
}

fn build_client(config: &AppConfig) -> Result<FplClient> {
    let fetcher = Fetcher::new(FetcherConfig {
        cache_dir: config.raw_cache_dir(),
        cache_ttl: config.fpl.cache_ttl(),
        timeout: config.fpl.timeout(),
        user_agent: config.fpl.user_agent.clone(),
        ..FetcherConfig::default()
    })?;
    Ok(FplClient::new(fetcher, &config.fpl.base_url)?)
}

fn print_csv<T: Tabular + ?Sized>(value: &T, skipped: SkipReport) -> Result<()> {
    if skipped.total() > 0 {
        tracing::warn!(
            "Skipped {} records with unknown teams and {} unscheduled fixtures",
            skipped.unknown_team,
            skipped.unscheduled
        );
    }
    print!("{}", value.to_table().to_csv()?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info};

use newsspace::api::{NewsApi, NewsClient};
use newsspace::app::{respond, Explorer, FilterArgs, TabArg};
use newsspace::config::Config;
use newsspace::render::{self, DEFAULT_PAGE_SIZE, PAGE_SIZES};
use newsspace::{logging, MAX_DRILLDOWN_IDS};

#[derive(Parser)]
#[clap(
    name = "newsspace",
    about = "Browse news events aggregated by country, region and city"
)]
struct Cli {
    /// Base URL of the news API (overrides NEWS_API_BASE_URL)
    #[clap(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds (overrides NEWS_API_TIMEOUT_SECS)
    #[clap(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load grouped results for a set of filters
    Search {
        #[clap(flatten)]
        filters: FilterArgs,

        /// Result tab to print
        #[clap(long, value_enum, default_value = "country")]
        tab: TabArg,

        /// Rows per table (5, 10, 25 or 50)
        #[clap(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,

        /// Show the events of this group from the selected tab
        #[clap(short, long)]
        open: Option<i64>,
    },

    /// List actor filter options
    Actors,

    /// List event type filter options
    Types,

    /// Fetch events by id (at most 200 are requested)
    Events {
        #[clap(required = true, num_args = 1..)]
        ids: Vec<String>,

        /// Rows per table
        #[clap(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: usize,
    },

    /// Fetch a single event by id
    Event { id: String },

    /// Start an interactive explorer session
    Explore,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config = Config::from_env()?
        .with_base_url(args.base_url)
        .with_timeout(args.timeout);
    logging::configure_logging(&config.log_dir);
    info!("Using news API at {}", config.base_url);

    let client = NewsClient::from_config(&config)?;

    match args.command {
        Commands::Search {
            filters,
            tab,
            limit,
            open,
        } => search(client, &filters, tab, limit, open).await?,
        Commands::Actors => {
            let actors = client.actors(&config.actors_window).await?;
            print!("{}", render::actor_catalog_table(&actors));
        }
        Commands::Types => {
            let types = client.types(&config.types_window).await?;
            print!("{}", render::type_catalog_table(&types));
        }
        Commands::Events { ids, limit } => {
            check_limit(limit)?;
            let ids: Vec<String> = ids.into_iter().take(MAX_DRILLDOWN_IDS).collect();
            let events = client.events(&ids).await?;
            print!("{}", render::event_table(&events, limit));
        }
        Commands::Event { id } => match client.event(&id).await? {
            Some(event) => print!("{}", render::event_table(&[event], 1)),
            None => println!("{}", format!("No event with id {}", id).dimmed()),
        },
        Commands::Explore => explore(client, &config).await?,
    }

    Ok(())
}

fn check_limit(limit: usize) -> Result<()> {
    if PAGE_SIZES.contains(&limit) {
        Ok(())
    } else {
        Err(anyhow!("--limit must be one of {:?}", PAGE_SIZES))
    }
}

async fn search(
    client: NewsClient,
    filters: &FilterArgs,
    tab: TabArg,
    limit: usize,
    open: Option<i64>,
) -> Result<()> {
    check_limit(limit)?;
    let form = filters.to_form()?;
    let explorer = Explorer::new(client);

    let params = explorer.submit(&form).await;
    info!("Loaded groups for {:?}", params);
    explorer.select_tab(tab.into()).await;
    print!("{}", render::render_results(&explorer.snapshot().await, limit));

    if let Some(group_id) = open {
        explorer.open_group_id(group_id).await?;
        print!("{}", render::render_detail(&explorer.snapshot().await, limit));
    }

    Ok(())
}

async fn explore(client: NewsClient, config: &Config) -> Result<()> {
    let mut explorer = Explorer::new(client);
    if let Err(err) = explorer
        .load_catalogs(&config.actors_window, &config.types_window)
        .await
    {
        error!("Failed to load filter options: {}", err);
        eprintln!("{} {}", "Could not load filter options:".bright_red(), err);
    }

    println!("{}", "News In Time And Space".bright_blue().bold());
    println!(
        "{}",
        "Commands: submit [filters], tab <country|region|city>, show, open <id>, close, actors, types, limit <n>, quit"
            .dimmed()
    );

    let mut limit = DEFAULT_PAGE_SIZE;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let line = tokio::select! {
            _ = signal::ctrl_c() => {
                info!("Ctrl-C received, leaving explorer.");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &explorer, &mut limit, &mut stdout).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(err) => {
                writeln!(stdout, "{}", err.to_string().bright_red())?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_flag_rejects_zero() {
        assert!(Cli::try_parse_from(["newsspace", "--timeout", "0", "actors"]).is_err());
        let cli = Cli::try_parse_from(["newsspace", "actors", "--timeout", "3"]).unwrap();
        assert_eq!(cli.timeout, Some(3));
    }
}

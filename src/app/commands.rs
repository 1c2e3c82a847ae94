//! Filter arguments shared by the CLI and the interactive explorer.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::Write;

use super::explorer::Explorer;
use crate::api::{GroupBy, NewsApi};
use crate::query::{encode_query, FilterForm, ScoreRange};
use crate::render;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TabArg {
    Country,
    Region,
    City,
}

impl From<TabArg> for GroupBy {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Country => GroupBy::Country,
            TabArg::Region => GroupBy::Region,
            TabArg::City => GroupBy::City,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Actor name to filter by (repeatable)
    #[clap(short, long = "actor")]
    pub actors: Vec<String>,

    /// Event type code to filter by (repeatable)
    #[clap(short = 't', long = "type")]
    pub types: Vec<String>,

    /// Tone range as MIN MAX (defaults to -10 10)
    #[clap(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub tone: Option<Vec<f64>>,

    /// Goldstein scale range as LOW HIGH (defaults to -10 10)
    #[clap(long, num_args = 2, value_names = ["LOW", "HIGH"], allow_negative_numbers = true)]
    pub goldstein: Option<Vec<f64>>,

    /// Start date (yyyy-mm-dd)
    #[clap(short, long)]
    pub start: Option<NaiveDate>,

    /// End date (yyyy-mm-dd)
    #[clap(short, long)]
    pub end: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn to_form(&self) -> Result<FilterForm> {
        let defaults = FilterForm::default();
        let tone = match &self.tone {
            Some(values) => Some(
                ScoreRange::from_values(values).ok_or_else(|| anyhow!("--tone needs MIN MAX"))?,
            ),
            None => defaults.tone,
        };
        let goldstein_scale = match &self.goldstein {
            Some(values) => Some(
                ScoreRange::from_values(values)
                    .ok_or_else(|| anyhow!("--goldstein needs LOW HIGH"))?,
            ),
            None => defaults.goldstein_scale,
        };
        Ok(FilterForm {
            actors: self.actors.clone(),
            types: self.types.clone(),
            tone,
            goldstein_scale,
            start_time: self.start,
            end_time: self.end,
        })
    }
}

#[derive(Parser)]
#[clap(name = "explore", no_binary_name = true)]
struct ReplCli {
    #[clap(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand)]
enum ReplCommand {
    /// Submit filters and load country, region and city groups
    Submit(FilterArgs),
    /// Switch the result tab
    Tab {
        #[clap(value_enum)]
        tab: TabArg,
    },
    /// Print the current result table
    Show,
    /// Open the events of a group in the current tab
    Open { group_id: i64 },
    /// Close the event view
    Close,
    /// List actor options
    Actors,
    /// List event type options
    Types,
    /// Set the number of rows shown per table
    Limit { rows: usize },
    /// Leave the explorer
    #[clap(alias = "exit")]
    Quit,
}

/// Executes one explorer command line. Returns `true` when the session should end.
pub async fn respond<A, W>(
    line: &str,
    explorer: &Explorer<A>,
    limit: &mut usize,
    out: &mut W,
) -> Result<bool>
where
    A: NewsApi,
    W: Write,
{
    let args = shlex::split(line).ok_or_else(|| anyhow!("error: Invalid quoting"))?;
    let cli = ReplCli::try_parse_from(args).map_err(|e| anyhow!(e.to_string()))?;

    match cli.command {
        ReplCommand::Submit(filters) => {
            let form = filters.to_form()?;
            let params = explorer.submit(&form).await;
            writeln!(out, "query: {}", encode_query(&params))?;
            let state = explorer.snapshot().await;
            write!(out, "{}", render::render_results(&state, *limit))?;
        }
        ReplCommand::Tab { tab } => {
            explorer.select_tab(tab.into()).await;
            let state = explorer.snapshot().await;
            write!(out, "{}", render::render_results(&state, *limit))?;
        }
        ReplCommand::Show => {
            let state = explorer.snapshot().await;
            write!(out, "{}", render::render_results(&state, *limit))?;
            write!(out, "{}", render::render_detail(&state, *limit))?;
        }
        ReplCommand::Open { group_id } => {
            explorer.open_group_id(group_id).await?;
            let state = explorer.snapshot().await;
            write!(out, "{}", render::render_detail(&state, *limit))?;
        }
        ReplCommand::Close => {
            explorer.close_detail().await;
        }
        ReplCommand::Actors => {
            write!(out, "{}", render::actor_catalog_table(explorer.actors()))?;
        }
        ReplCommand::Types => {
            write!(out, "{}", render::type_catalog_table(explorer.types()))?;
        }
        ReplCommand::Limit { rows } => {
            if !render::PAGE_SIZES.contains(&rows) {
                return Err(anyhow!("rows must be one of {:?}", render::PAGE_SIZES));
            }
            *limit = rows;
        }
        ReplCommand::Quit => return Ok(true),
    }
    out.flush()?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::explorer::tests::{group, Call, MockApi};
    use crate::render::DEFAULT_PAGE_SIZE;

    fn explorer() -> Explorer<MockApi> {
        Explorer::new(MockApi {
            countries: vec![group(42, 2)],
            regions: vec![group(7, 1)],
            cities: vec![group(9, 1)],
            ..Default::default()
        })
    }

    async fn run(explorer: &Explorer<MockApi>, line: &str) -> (bool, String) {
        let mut limit = DEFAULT_PAGE_SIZE;
        let mut out = Vec::new();
        let quit = respond(line, explorer, &mut limit, &mut out).await.unwrap();
        (quit, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_filter_args_defaults() {
        let form = FilterArgs::default().to_form().unwrap();
        assert_eq!(form, FilterForm::default());
    }

    #[test]
    fn test_filter_args_rejects_single_bound() {
        let args = FilterArgs {
            tone: Some(vec![1.0]),
            ..Default::default()
        };
        assert!(args.to_form().is_err());
    }

    #[tokio::test]
    async fn test_submit_command_parses_filters() {
        let explorer = explorer();
        let (quit, output) = run(
            &explorer,
            "submit --tone -5 5 --start 2024-01-01 --end 2024-01-31 -a 'UNITED STATES' -a CHINA",
        )
        .await;
        assert!(!quit);
        assert!(output.contains("ToneMax=5&ToneMin=-5&startTime=2024-01-01&endTime=2024-01-31"));
        assert!(output.contains("actor=UNITED+STATES&actor=CHINA"));
        assert!(output.contains("Country 42"));
    }

    #[tokio::test]
    async fn test_tab_and_open_commands() {
        let explorer = explorer();
        run(&explorer, "submit").await;
        let (_, output) = run(&explorer, "tab region").await;
        assert!(output.contains("Region 7"));
        assert_eq!(explorer.api().calls().len(), 3);

        run(&explorer, "tab country").await;
        let (_, output) = run(&explorer, "open 42").await;
        assert!(output.contains("Events of group 42"));
        assert_eq!(
            explorer.api().calls().last(),
            Some(&Call::Events(vec!["1".to_string(), "2".to_string()]))
        );

        run(&explorer, "close").await;
        assert!(!explorer.snapshot().await.modal_open);
    }

    #[tokio::test]
    async fn test_quit_and_bad_input() {
        let explorer = explorer();
        assert!(run(&explorer, "quit").await.0);
        let mut limit = DEFAULT_PAGE_SIZE;
        let mut out = Vec::new();
        assert!(respond("tab nowhere", &explorer, &mut limit, &mut out).await.is_err());
        assert!(respond("limit 7", &explorer, &mut limit, &mut out).await.is_err());
        respond("limit 5", &explorer, &mut limit, &mut out).await.unwrap();
        assert_eq!(limit, 5);
    }
}

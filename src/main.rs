//! Terminal dashboard for exploring the popularity of first names in the US,
//! based on the Social Security Administration's baby names dataset.

mod config;
mod render;

use crate::config::{Config, Filters};
use anyhow::Context;
use clap::Parser;
use dialoguer::Select;
use log::LevelFilter;
use name_trends::{
    cache::{Dataset, DatasetCache},
    loader, ohw,
    progress::ProgressReport,
    query, Year, DATASET_URL, FIRST_YEAR, LAST_YEAR,
};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Explore the popularity of US first names since 1880
///
/// Shows the yearly births of a name, the most given names of a year, and the
/// one-hit wonders of a year (names that were only ever given on that year).
/// Filters that are not specified on the command line are asked for
/// interactively.
#[derive(Parser, Debug)]
#[command(version, author)]
pub(crate) struct Args {
    /// URL of the zip archive of yearly name files
    #[arg(long, default_value = DATASET_URL)]
    dataset_url: Box<str>,

    /// Name whose popularity over time should be shown (case-sensitive)
    #[arg(short, long)]
    name: Option<Box<str>>,

    /// Year whose most given names should be shown
    #[arg(short, long, value_parser = year_parser())]
    year: Option<Year>,

    /// Number of top names to show per sex
    #[arg(short, long, value_parser = config::parse_top_n)]
    top: Option<usize>,

    /// Year whose one-hit wonders should be shown
    ///
    /// Defaults to the same year as the top names.
    #[arg(short, long, value_parser = year_parser())]
    ohw_year: Option<Year>,

    /// Render the dashboard once and exit instead of offering to change
    /// filters afterwards
    #[arg(long, default_value_t = false)]
    once: bool,
}

/// Accept the years covered by the dataset
fn year_parser() -> impl clap::builder::TypedValueParser<Value = Year> {
    clap::value_parser!(Year).range(i64::from(FIRST_YEAR)..=i64::from(LAST_YEAR))
}

/// What to do once the dashboard has been displayed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum NextStep {
    ChangeFilters,
    Reload,
    Quit,
}
//
impl NextStep {
    /// Ask the user
    fn prompt() -> dialoguer::Result<Self> {
        const STEPS: [(&str, NextStep); 3] = [
            ("Change filters", NextStep::ChangeFilters),
            ("Download the dataset again", NextStep::Reload),
            ("Quit", NextStep::Quit),
        ];
        let labels = STEPS.map(|(label, _step)| label);
        let step_idx = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;
        Ok(STEPS[step_idx].1)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    if let Err(e) = setup_logging() {
        eprintln!("Could not connect to syslog, running without logs: {e}");
    }

    // Decode CLI arguments and ask for missing filters
    let mut config = Config::new(Args::parse())?;

    // Render the dashboard until the user is done
    let client = reqwest::Client::new();
    let report = ProgressReport::new();
    let mut cache = DatasetCache::new();
    loop {
        let dataset = cache
            .get_or_load(&config.source, |source| {
                loader::load(client.clone(), source, report.clone())
            })
            .await
            .with_context(|| format!("loading the name dataset from {}", config.source.url))?;
        display(&dataset, &config.filters).await?;
        if config.once {
            return Ok(());
        }
        match NextStep::prompt()? {
            NextStep::ChangeFilters => config.filters = config.filters.prompt()?,
            NextStep::Reload => {
                cache.invalidate(&config.source);
            }
            NextStep::Quit => return Ok(()),
        }
    }
}

/// Run the queries for the current filters and print the results
async fn display(dataset: &Dataset, filters: &Filters) -> Result<()> {
    let series = query::time_series(&dataset.names, &filters.name);
    let top = query::top_n_by_year(&dataset.names, filters.year, filters.top_n)?;
    let wonders = ohw::one_hit_wonders_by_year(&dataset.one_hit_wonders, filters.ohw_year);

    let mut text = String::new();
    render::names(&mut text, &filters.name, &series)?;
    render::year(&mut text, filters.top_n, &top)?;
    render::one_hit_wonders(&mut text, &wonders)?;

    let mut stdout = BufWriter::new(tokio::io::stdout());
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}

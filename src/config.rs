//! Dashboard configuration

use crate::{Args, Result};
use dialoguer::{Input, Select};
use name_trends::{loader::DatasetSource, Year, FIRST_YEAR, LAST_YEAR};

/// Number of top names per sex that the user can pick from
pub const TOP_N_CHOICES: [usize; 5] = [3, 4, 5, 6, 10];

/// Year that is suggested when none was specified
const DEFAULT_YEAR: Year = 2000;

/// Final dashboard configuration
///
/// This is the result of combining [`Args`] with interactively selected
/// filters. Please refer to [`Args`] to know more about individual fields.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Where the dataset is loaded from
    pub source: DatasetSource,

    /// Current query parameters
    pub filters: Filters,

    /// Render once and exit
    pub once: bool,
}
//
impl Config {
    /// Determine the configuration, asking the user for filters that were
    /// not specified on the command line
    pub fn new(args: Args) -> Result<Self> {
        let Args {
            dataset_url,
            name,
            year,
            top,
            ohw_year,
            once,
        } = args;
        let name = match name {
            Some(name) => name,
            None => prompt_name("")?,
        };
        let year = match year {
            Some(year) => year,
            None => prompt_year("Select a year", DEFAULT_YEAR)?,
        };
        let top_n = match top {
            Some(top_n) => top_n,
            None => prompt_top_n(TOP_N_CHOICES[0])?,
        };
        Ok(Self {
            source: DatasetSource { url: dataset_url },
            filters: Filters {
                name,
                year,
                top_n,
                ohw_year: ohw_year.unwrap_or(year),
            },
            once,
        })
    }
}

/// Query parameters selected by the user
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Filters {
    pub name: Box<str>,
    pub year: Year,
    pub top_n: usize,
    pub ohw_year: Year,
}
//
impl Filters {
    /// Ask the user for new filters, suggesting the current ones
    pub fn prompt(&self) -> Result<Self> {
        Ok(Self {
            name: prompt_name(&self.name)?,
            year: prompt_year("Select a year", self.year)?,
            top_n: prompt_top_n(self.top_n)?,
            ohw_year: prompt_year("Select a year for one-hit wonders", self.ohw_year)?,
        })
    }
}

/// Decode a number of top names per sex from the command line
pub fn parse_top_n(s: &str) -> Result<usize, String> {
    let top_n = s.parse::<usize>().map_err(|e| e.to_string())?;
    if TOP_N_CHOICES.contains(&top_n) {
        Ok(top_n)
    } else {
        Err(format!("should be one of {TOP_N_CHOICES:?}"))
    }
}

/// Check that a year is covered by the dataset
fn check_year(year: Year) -> Result<(), String> {
    if (FIRST_YEAR..=LAST_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(format!("the dataset covers {FIRST_YEAR} to {LAST_YEAR}"))
    }
}

/// Ask the user for a name
fn prompt_name(initial: &str) -> dialoguer::Result<Box<str>> {
    let name = Input::<String>::new()
        .with_prompt("Enter a name")
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;
    Ok(name.into())
}

/// Ask the user for a year
fn prompt_year(prompt: &str, default: Year) -> dialoguer::Result<Year> {
    Input::<Year>::new()
        .with_prompt(format!("{prompt} ({FIRST_YEAR}-{LAST_YEAR})"))
        .default(default)
        .validate_with(|year: &Year| check_year(*year))
        .interact_text()
}

/// Ask the user for a number of top names per sex
fn prompt_top_n(default: usize) -> dialoguer::Result<usize> {
    let default_idx = (TOP_N_CHOICES.iter())
        .position(|&top_n| top_n == default)
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt("Number of names per sex")
        .items(&TOP_N_CHOICES)
        .default(default_idx)
        .interact()?;
    Ok(TOP_N_CHOICES[choice])
}

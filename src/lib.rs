//! Name statistics pipeline for the US Social Security Administration baby
//! names dataset, whose general documentation you can find at
//! <https://www.ssa.gov/oact/babynames/limits.html>.
//!
//! The dataset is loaded once into a flat [`NameTable`], annotated with each
//! name's share of same-sex births for its year, and then explored through a
//! few read-only query views.

pub mod cache;
pub mod error;
pub mod loader;
pub mod ohw;
pub mod progress;
pub mod query;
pub mod table;

pub use crate::{
    error::{Error, Result},
    table::{NameRecord, NameTable, Sex},
};

/// Location of the dataset archive published by the SSA
pub const DATASET_URL: &str = "https://www.ssa.gov/oact/babynames/names.zip";

/// First year covered by the dataset
pub const FIRST_YEAR: Year = 1880;

/// Last year covered by the dataset at the time of writing
pub const LAST_YEAR: Year = 2023;

/// Year of Gregorian Calendar
pub type Year = i16;

/// Case-sensitive first name
pub type Name = Box<str>;

/// Number of births recorded for a name over a single year
///
/// Per-name yearly counts fit comfortably in a u32, but per-year totals are
/// accumulated in this type too, so we use u64 to stay clear of overflow.
pub type NameCount = u64;

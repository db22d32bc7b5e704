//! One-hit wonders: names that were only ever given in a single year

use crate::{
    table::{NameRecord, NameTable, Sex},
    Name, Year,
};
use std::collections::{hash_map, HashMap};

/// Records of every (name, sex) pair that appears in exactly one year
///
/// If a pair has several records within its only year, which would denote a
/// malformed source file, all of them are kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OneHitWonderTable(Vec<NameRecord>);
//
impl OneHitWonderTable {
    /// Access the records
    pub fn records(&self) -> &[NameRecord] {
        &self.0[..]
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that there is no one-hit wonder at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Years in which a (name, sex) pair was seen so far
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Years {
    Single(Year),
    Several,
}

/// Select the records whose (name, sex) pair occurs in a single distinct year
pub fn extract(table: &NameTable) -> OneHitWonderTable {
    // Count distinct years per (name, sex) pair, stopping at two
    let mut years = HashMap::<(&str, Sex), Years>::new();
    for record in table.records() {
        match years.entry((&*record.name, record.sex)) {
            hash_map::Entry::Occupied(mut o) => {
                if *o.get() != Years::Single(record.year) {
                    o.insert(Years::Several);
                }
            }
            hash_map::Entry::Vacant(v) => {
                v.insert(Years::Single(record.year));
            }
        }
    }

    // Keep the records of pairs that were only seen once, in table order
    let wonders = (table.records().iter())
        .filter(|record| matches!(years.get(&(&*record.name, record.sex)), Some(Years::Single(_))))
        .cloned()
        .collect::<Vec<_>>();
    log::info!(
        "Found {} one-hit wonder records out of {} (name, sex) pairs",
        wonders.len(),
        years.len()
    );
    OneHitWonderTable(wonders)
}

/// One-hit wonder summary for a single year
#[derive(Clone, Debug, PartialEq)]
pub struct OneHitWonderResult {
    /// Year that the summary is about
    pub year: Year,

    /// Human-readable status message
    pub message: String,

    /// Number of female one-hit wonder records on that year
    pub female_count: usize,

    /// Number of male one-hit wonder records on that year
    pub male_count: usize,

    /// Female one-hit wonder with the most births, if any
    pub most_common_female: Option<Name>,

    /// Male one-hit wonder with the most births, if any
    pub most_common_male: Option<Name>,

    /// Every one-hit wonder record of that year, or `None` if there are none
    pub data: Option<Vec<NameRecord>>,
}
//
impl OneHitWonderResult {
    /// Truth that no one-hit wonder was found for this year
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }
}

/// Summarize the one-hit wonders of a given year
///
/// Ties for the most common name go to the record that comes first in table
/// order.
pub fn one_hit_wonders_by_year(table: &OneHitWonderTable, year: Year) -> OneHitWonderResult {
    let data = (table.records().iter())
        .filter(|record| record.year == year)
        .cloned()
        .collect::<Vec<_>>();
    if data.is_empty() {
        return OneHitWonderResult {
            year,
            message: format!("No one-hit wonders found for {year}"),
            female_count: 0,
            male_count: 0,
            most_common_female: None,
            most_common_male: None,
            data: None,
        };
    }

    let (female_count, most_common_female) = sex_summary(&data, Sex::Female);
    let (male_count, most_common_male) = sex_summary(&data, Sex::Male);
    let plural = if data.len() == 1 { "" } else { "s" };
    OneHitWonderResult {
        year,
        message: format!("Found {} one-hit wonder{plural} for {year}", data.len()),
        female_count,
        male_count,
        most_common_female,
        most_common_male,
        data: Some(data),
    }
}

/// Number of records of some sex, and the name with the highest count
fn sex_summary(data: &[NameRecord], sex: Sex) -> (usize, Option<Name>) {
    let mut count = 0;
    let mut top: Option<&NameRecord> = None;
    for record in data.iter().filter(|record| record.sex == sex) {
        count += 1;
        if top.map_or(true, |top| record.count > top.count) {
            top = Some(record);
        }
    }
    (count, top.map(|record| record.name.clone()))
}

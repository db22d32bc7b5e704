//! Flat in-memory table of yearly name records, and its percentage annotation

use crate::{Name, NameCount, Year};
use rayon::prelude::*;
use serde::Deserialize;
use std::{collections::HashMap, fmt};

/// Sex of the babies that a record is about
///
/// The dataset only uses `F` and `M`, but other single-character tokens are
/// passed through as-is rather than rejected or coerced.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[serde(try_from = "String")]
pub enum Sex {
    Female,
    Male,
    Other(char),
}
//
impl Sex {
    /// Sexes that every per-sex query result reports on
    pub const KNOWN: [Sex; 2] = [Sex::Female, Sex::Male];
}
//
impl TryFrom<String> for Sex {
    type Error = String;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some('F'), None) => Ok(Self::Female),
            (Some('M'), None) => Ok(Self::Male),
            (Some(other), None) => Ok(Self::Other(other)),
            _ => Err(format!("expected a single-character sex token, got {token:?}")),
        }
    }
}
//
impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0; 4];
        f.pad(match self {
            Self::Female => "F",
            Self::Male => "M",
            Self::Other(c) => c.encode_utf8(&mut buf),
        })
    }
}

/// One row of the dataset: births of a given name and sex over one year
#[derive(Clone, Debug, PartialEq)]
pub struct NameRecord {
    /// Case-sensitive first name
    pub name: Name,

    /// Sex of the babies
    pub sex: Sex,

    /// Number of births
    pub count: NameCount,

    /// Year of birth
    pub year: Year,

    /// Share of all births of the same sex and year, in [0, 1]
    ///
    /// Zero until the table has gone through [`annotate()`].
    pub pct: f64,
}
//
impl NameRecord {
    /// Record that has not been annotated yet
    pub fn new(name: impl Into<Name>, sex: Sex, count: NameCount, year: Year) -> Self {
        Self {
            name: name.into(),
            sex,
            count,
            year,
            pct: 0.0,
        }
    }
}

/// Every record of the dataset, across all years and sexes
///
/// Row order carries no meaning beyond being deterministic for a given source
/// archive. Tie-breaks in query views follow it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NameTable(Vec<NameRecord>);
//
impl NameTable {
    /// Access the records
    pub fn records(&self) -> &[NameRecord] {
        &self.0[..]
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Truth that the table has no record
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
//
impl From<Vec<NameRecord>> for NameTable {
    fn from(records: Vec<NameRecord>) -> Self {
        Self(records)
    }
}
//
impl FromIterator<NameRecord> for NameTable {
    fn from_iter<I: IntoIterator<Item = NameRecord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Set each record's `pct` to its share of the (year, sex) group total
///
/// Groups whose total count is zero get `pct = 0` for every member rather
/// than a non-finite value.
pub fn annotate(table: NameTable) -> NameTable {
    let mut records = table.0;

    // Accumulate per-group birth totals
    let mut totals = HashMap::<(Year, Sex), NameCount>::new();
    for record in &records {
        *totals.entry((record.year, record.sex)).or_default() += record.count;
    }
    log::debug!(
        "Annotating {} records across {} (year, sex) groups",
        records.len(),
        totals.len()
    );

    // Turn counts into shares of their group
    records.par_iter_mut().for_each(|record| {
        let total = totals
            .get(&(record.year, record.sex))
            .copied()
            .unwrap_or_default();
        record.pct = if total == 0 {
            0.0
        } else {
            record.count as f64 / total as f64
        };
    });
    NameTable(records)
}

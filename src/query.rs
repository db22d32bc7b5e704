//! Read-only query views over the name table

use crate::{
    table::{NameRecord, NameTable, Sex},
    Error, Name, NameCount, Result, Year,
};
use std::{
    cmp::Reverse,
    collections::{BTreeMap, BinaryHeap, HashSet},
};

/// Yearly records of a single name, ordered by increasing year
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSeriesResult {
    /// Matching records, ordered by year then sex
    pub records: Vec<NameRecord>,
}
//
impl TimeSeriesResult {
    /// Truth that the name was never recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split the series into one (year, count) curve per sex
    pub fn by_sex(&self) -> BTreeMap<Sex, Vec<(Year, NameCount)>> {
        let mut curves = BTreeMap::<Sex, Vec<_>>::new();
        for record in &self.records {
            curves
                .entry(record.sex)
                .or_default()
                .push((record.year, record.count));
        }
        curves
    }
}

/// Every record of a name, as an exact case-sensitive match
///
/// An empty name yields an empty series.
pub fn time_series(table: &NameTable, name: &str) -> TimeSeriesResult {
    if name.is_empty() {
        return TimeSeriesResult::default();
    }
    let mut records = (table.records().iter())
        .filter(|record| &*record.name == name)
        .cloned()
        .collect::<Vec<_>>();
    records.sort_by_key(|record| (record.year, record.sex));
    log::debug!("Name {name:?} has {} yearly records", records.len());
    TimeSeriesResult { records }
}

/// Entry of a top-N ranking
#[derive(Clone, Debug, PartialEq)]
pub struct RankedName {
    /// Name
    pub name: Name,

    /// Number of births on the ranking's year
    pub count: NameCount,

    /// Share of same-sex births on the ranking's year
    pub pct: f64,
}

/// Most given names of a year, per sex
#[derive(Clone, Debug, PartialEq)]
pub struct TopNResult {
    /// Year of the ranking
    pub year: Year,

    /// Top names of each sex by decreasing count, at most N per sex
    ///
    /// Always has entries for [`Sex::KNOWN`], other sexes only appear if
    /// they have records on that year.
    pub top_names: BTreeMap<Sex, Vec<RankedName>>,

    /// Number of distinct names given on that year, per sex
    ///
    /// This is not limited to the top N. Same keys as `top_names`.
    pub unique_names: BTreeMap<Sex, usize>,
}

/// Rank names of a given year by decreasing count, keeping the top `n` of
/// each sex
///
/// Ties are broken in favor of the record that comes first in table order.
pub fn top_n_by_year(table: &NameTable, year: Year, n: usize) -> Result<TopNResult> {
    if n < 1 {
        return Err(Error::InvalidArgument(format!(
            "top-N ranking needs N >= 1, got {n}"
        )));
    }

    // Within each sex, keep the n best records in a min-heap, where the best
    // record has the highest count and then the lowest table position
    let mut heaps = BTreeMap::<Sex, BinaryHeap<Reverse<(NameCount, Reverse<usize>)>>>::new();
    let mut names = BTreeMap::<Sex, HashSet<&str>>::new();
    for sex in Sex::KNOWN {
        heaps.insert(sex, BinaryHeap::with_capacity(n + 1));
        names.insert(sex, HashSet::new());
    }
    let records = table.records();
    for (position, record) in records.iter().enumerate() {
        if record.year != year {
            continue;
        }
        names.entry(record.sex).or_default().insert(&*record.name);
        let heap = heaps.entry(record.sex).or_default();
        heap.push(Reverse((record.count, Reverse(position))));
        if heap.len() > n {
            heap.pop();
        }
    }

    // Emit the survivors by decreasing rank
    let top_names = (heaps.into_iter())
        .map(|(sex, heap)| {
            let ranking = (heap.into_sorted_vec().into_iter())
                .map(|Reverse((_count, Reverse(position)))| {
                    let record = &records[position];
                    RankedName {
                        name: record.name.clone(),
                        count: record.count,
                        pct: record.pct,
                    }
                })
                .collect();
            (sex, ranking)
        })
        .collect();
    let unique_names = (names.into_iter())
        .map(|(sex, names)| (sex, names.len()))
        .collect();
    Ok(TopNResult {
        year,
        top_names,
        unique_names,
    })
}

//! Plain-text rendering of query results

use name_trends::{
    ohw::OneHitWonderResult,
    query::{TimeSeriesResult, TopNResult},
    NameCount,
};
use std::fmt::{self, Write};

/// Width of the longest bar in bar charts
const BAR_WIDTH: NameCount = 40;

/// Section title
fn heading(out: &mut impl Write, title: &str) -> fmt::Result {
    writeln!(out, "\n{title}\n{}", "=".repeat(title.len()))
}

/// Horizontal bar of length proportional to `count / max`
fn bar(count: NameCount, max: NameCount) -> String {
    let len = if max == 0 { 0 } else { count * BAR_WIDTH / max };
    "#".repeat(len as usize)
}

/// Yearly births of a name, one bar chart per sex
pub fn names(out: &mut impl Write, name: &str, series: &TimeSeriesResult) -> fmt::Result {
    heading(out, "Names")?;
    if name.is_empty() {
        return writeln!(out, "Enter a name to see its popularity over time");
    }
    if series.is_empty() {
        return writeln!(out, "{name:?} does not appear in the dataset");
    }
    let max = (series.records.iter())
        .map(|record| record.count)
        .max()
        .unwrap_or(0);
    for (sex, curve) in series.by_sex() {
        writeln!(out, "{name} ({sex})")?;
        for (year, count) in curve {
            writeln!(out, "  {year} {count:>7} {}", bar(count, max))?;
        }
    }
    Ok(())
}

/// Top names of a year and unique names summary
pub fn year(out: &mut impl Write, top_n: usize, top: &TopNResult) -> fmt::Result {
    heading(out, "Year")?;
    for (sex, ranking) in &top.top_names {
        writeln!(out, "Top {top_n} names of {} ({sex})", top.year)?;
        if ranking.is_empty() {
            writeln!(out, "  (no records)")?;
        }
        let max = ranking.first().map_or(0, |ranked| ranked.count);
        for (rank, ranked) in ranking.iter().enumerate() {
            writeln!(
                out,
                "  {:>2}. {:<15} {:>7} {:>6.2}% {}",
                rank + 1,
                ranked.name,
                ranked.count,
                ranked.pct * 100.0,
                bar(ranked.count, max)
            )?;
        }
    }
    writeln!(out, "\nUnique names table")?;
    writeln!(out, "  sex  unique names")?;
    for (sex, unique) in &top.unique_names {
        writeln!(out, "  {sex:<4} {unique:>12}")?;
    }
    Ok(())
}

/// One-hit wonders of a year
pub fn one_hit_wonders(out: &mut impl Write, result: &OneHitWonderResult) -> fmt::Result {
    heading(out, "One Hit Wonders")?;
    writeln!(out, "{}", result.message)?;
    let Some(data) = &result.data else {
        return Ok(());
    };
    let or_none = |name: &Option<Box<str>>| name.as_deref().unwrap_or("none").to_owned();
    writeln!(out, "Number of female one-hit wonders: {}", result.female_count)?;
    writeln!(out, "Number of male one-hit wonders: {}", result.male_count)?;
    writeln!(
        out,
        "Most common female one-hit wonder: {}",
        or_none(&result.most_common_female)
    )?;
    writeln!(
        out,
        "Most common male one-hit wonder: {}",
        or_none(&result.most_common_male)
    )?;
    writeln!(out, "  {:<15} sex {:>7} {:>8}", "name", "count", "pct")?;
    for record in data {
        writeln!(
            out,
            "  {:<15} {:<3} {:>7} {:>7.4}%",
            record.name,
            record.sex,
            record.count,
            record.pct * 100.0
        )?;
    }
    Ok(())
}

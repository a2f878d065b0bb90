use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::expand::split_list;
use crate::models::{CategoryCount, Field, NormalizedRecord};

/// Each player's record with the greatest date. On equal dates the record
/// seen last wins.
pub fn latest_by_player<'a, I>(records: I) -> BTreeMap<&'a str, &'a NormalizedRecord>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut latest: BTreeMap<&'a str, &'a NormalizedRecord> = BTreeMap::new();
    for record in records {
        let entry = latest.entry(record.player.as_str()).or_insert(record);
        if record.date >= entry.date {
            *entry = record;
        }
    }
    latest
}

pub fn latest<'a>(
    records: &'a [NormalizedRecord],
    player: &str,
) -> Option<&'a NormalizedRecord> {
    latest_by_player(records.iter().filter(|record| record.player == player))
        .into_values()
        .next()
}

/// `field` from `player`'s latest record that has it, so a later reading
/// missing the field does not hide an earlier one.
pub fn latest_number(records: &[NormalizedRecord], player: &str, field: Field) -> Option<f64> {
    let with_value = records
        .iter()
        .filter(|record| record.player == player && record.number(field).is_some());
    latest_by_player(with_value)
        .into_values()
        .next()
        .and_then(|record| record.number(field))
}

/// Smallest non-missing `field` for `player`; `None` when there is none.
pub fn minimum(records: &[NormalizedRecord], player: &str, field: Field) -> Option<f64> {
    records
        .iter()
        .filter(|record| record.player == player)
        .filter_map(|record| record.number(field))
        .reduce(f64::min)
}

pub fn minimum_by_player(
    records: &[NormalizedRecord],
    field: Field,
) -> BTreeMap<String, Option<f64>> {
    let mut minimums: BTreeMap<String, Option<f64>> = BTreeMap::new();
    for record in records {
        let entry = minimums.entry(record.player.clone()).or_insert(None);
        if let Some(value) = record.number(field) {
            *entry = Some(entry.map_or(value, |current| current.min(value)));
        }
    }
    minimums
}

/// Mean of `field` over all players for each date. Missing values count
/// toward neither sum nor divisor, and dates with no values are left out.
pub fn mean_by_date(records: &[NormalizedRecord], field: Field) -> BTreeMap<NaiveDate, f64> {
    let mut totals: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(value) = record.number(field) {
            let entry = totals.entry(record.date).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    totals
        .into_iter()
        .map(|(date, (total, count))| (date, total / count as f64))
        .collect()
}

/// Occurrences per category, most frequent first, ties by name. Records
/// whose key is `None` are not counted.
pub fn count_by<F>(records: &[NormalizedRecord], key: F) -> Vec<CategoryCount>
where
    F: Fn(&NormalizedRecord) -> Option<String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        if let Some(category) = key(record) {
            *counts.entry(category).or_insert(0) += 1;
        }
    }

    let mut summaries: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();
    summaries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.category.cmp(&b.category))
    });
    summaries
}

pub fn count_by_player(records: &[NormalizedRecord]) -> Vec<CategoryCount> {
    count_by(records, |record| Some(record.player.clone()))
}

/// Blank cells are skipped.
pub fn count_by_field(records: &[NormalizedRecord], field: Field) -> Vec<CategoryCount> {
    count_by(records, |record| {
        let value = record.value(field);
        if value.is_blank() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

pub fn count_by_date(records: &[NormalizedRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.date).or_insert(0) += 1;
    }
    counts
}

/// Counts per (player, value of `field`), skipping blank values.
pub fn count_by_player_and(
    records: &[NormalizedRecord],
    field: Field,
) -> BTreeMap<(String, String), usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        let value = record.value(field);
        if value.is_blank() {
            continue;
        }
        *counts
            .entry((record.player.clone(), value.to_string()))
            .or_insert(0) += 1;
    }
    counts
}

/// Distinct workouts per player per day, each cell sorted. A cell holding
/// several workouts is split on the list delimiter.
pub fn calendar_grid(
    records: &[NormalizedRecord],
) -> BTreeMap<String, BTreeMap<NaiveDate, Vec<String>>> {
    let mut grid: BTreeMap<String, BTreeMap<NaiveDate, BTreeSet<String>>> = BTreeMap::new();
    for record in records {
        let day = grid
            .entry(record.player.clone())
            .or_default()
            .entry(record.date)
            .or_default();
        if let Some(cell) = record.text(Field::Workout) {
            day.extend(split_list(cell).into_iter().filter(|w| !w.is_empty()));
        }
    }

    grid.into_iter()
        .map(|(player, days)| {
            let days: BTreeMap<NaiveDate, Vec<String>> = days
                .into_iter()
                .map(|(date, workouts)| (date, workouts.into_iter().collect()))
                .collect();
            (player, days)
        })
        .collect()
}

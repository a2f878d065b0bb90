use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::coerce::coerce;
use crate::models::{Dataset, Field, NormalizedRecord, RawRow, Value};
use crate::schema::{self, FieldSpec};

/// Looks up a field's cell through its header aliases. Row headers are
/// compared trimmed.
fn lookup<'r>(cells: &HashMap<&str, &'r str>, spec: &FieldSpec) -> Option<&'r str> {
    spec.headers
        .iter()
        .find_map(|header| cells.get(header).copied())
}

/// Types a raw table against the dataset's schema. Rows whose date does not
/// parse are dropped; any other field may be individually missing.
pub fn normalize(dataset: Dataset, rows: &[RawRow]) -> Vec<NormalizedRecord> {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        match normalize_row(dataset, row) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::warn!(
            "{dataset:?}: dropped {dropped} of {} rows with an unparseable date",
            rows.len()
        );
    }
    log::debug!("{dataset:?}: normalized {} rows", records.len());
    records
}

pub fn normalize_row(dataset: Dataset, row: &RawRow) -> Option<NormalizedRecord> {
    let cells: HashMap<&str, &str> = row
        .iter()
        .map(|(header, cell)| (header.trim(), cell.as_str()))
        .collect();

    let mut player = String::new();
    let mut date = None;
    let mut values = BTreeMap::new();

    for spec in schema::fields(dataset) {
        let value = lookup(&cells, spec)
            .map_or(Value::Missing, |raw| coerce(raw, spec.kind));
        match (spec.field, value) {
            (Field::Player, Value::Text(name)) => player = name,
            (Field::Player, _) => {}
            (Field::Date, Value::Date(d)) => date = Some(d),
            (Field::Date, _) => return None,
            (field, value) => {
                values.insert(field, value);
            }
        }
    }

    Some(NormalizedRecord {
        dataset,
        player,
        date: date?,
        values,
    })
}

/// Writes records back as raw rows under each field's canonical header.
/// Missing values are left out of the row.
pub fn to_raw_rows(records: &[NormalizedRecord]) -> Vec<RawRow> {
    records.iter().map(to_raw_row).collect()
}

pub fn to_raw_row(record: &NormalizedRecord) -> RawRow {
    let mut row = RawRow::new();
    let mut put = |field: Field, value: &Value| {
        let header = schema::canonical_header(record.dataset, field);
        if let (Some(header), Some(cell)) = (header, value.to_cell()) {
            row.insert(header.to_string(), cell);
        }
    };

    put(Field::Player, &Value::Text(record.player.clone()));
    put(Field::Date, &Value::Date(record.date));
    for (field, value) in &record.values {
        put(*field, value);
    }
    row
}

/// Outer-joins weight and body-fat readings on (player, date). Weight comes
/// from the weight sheet and %Fat from the fat sheet; duplicate keys pair
/// every reading on one side with every reading on the other. Rows without
/// a player are dropped and the result is ordered by player, then date.
pub fn merge_weight_fat(
    weight: &[NormalizedRecord],
    fat: &[NormalizedRecord],
) -> Vec<NormalizedRecord> {
    let mut keyed: BTreeMap<(String, NaiveDate), (Vec<Value>, Vec<Value>)> = BTreeMap::new();

    for record in weight {
        keyed
            .entry((record.player.clone(), record.date))
            .or_default()
            .0
            .push(record.value(Field::Weight).clone());
    }
    for record in fat {
        keyed
            .entry((record.player.clone(), record.date))
            .or_default()
            .1
            .push(record.value(Field::Fat).clone());
    }

    let mut merged = Vec::new();
    for ((player, date), (weights, fats)) in keyed {
        if player.trim().is_empty() {
            continue;
        }

        let weights = or_missing(weights);
        let fats = or_missing(fats);

        for weight in &weights {
            for fat in &fats {
                merged.push(NormalizedRecord {
                    dataset: Dataset::WeightFat,
                    player: player.clone(),
                    date,
                    values: BTreeMap::from([
                        (Field::Weight, weight.clone()),
                        (Field::Fat, fat.clone()),
                    ]),
                });
            }
        }
    }

    log::debug!(
        "merged {} weight and {} fat readings into {} rows",
        weight.len(),
        fat.len(),
        merged.len()
    );
    merged
}

/// An absent side of the join still yields one row.
fn or_missing(values: Vec<Value>) -> Vec<Value> {
    if values.is_empty() {
        vec![Value::Missing]
    } else {
        values
    }
}

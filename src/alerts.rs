use crate::aggregate;
use crate::models::{AlertFlag, AlertKind, Field, NormalizedRecord, RatedRecord, Severity};

pub const URINE_COLOR_LIMIT: f64 = 4.0;
pub const BODY_FAT_LIMIT: f64 = 11.5;
pub const SHORT_SLEEP_BUCKETS: [&str; 2] = ["1-5", "5-7"];

/// 1-5 self-reported ratings.
pub const RATING_FIELDS: [Field; 4] = [
    Field::Fatigue,
    Field::SleepQuality,
    Field::MuscleDiscomfort,
    Field::Mood,
];

/// Band for a 1-5 rating: below 3 is low, exactly 3 is mid, above is high.
pub fn rating_severity(value: Option<f64>) -> Severity {
    match value {
        None => Severity::Unknown,
        Some(v) if v < 3.0 => Severity::Low,
        Some(v) if v == 3.0 => Severity::Mid,
        Some(_) => Severity::High,
    }
}

/// Band for the 0-10 recovery score: below 5 low, 5 to 7 mid, above 7 high.
pub fn recovery_severity(value: Option<f64>) -> Severity {
    match value {
        None => Severity::Unknown,
        Some(v) if v < 5.0 => Severity::Low,
        Some(v) if v <= 7.0 => Severity::Mid,
        Some(_) => Severity::High,
    }
}

pub fn severity(field: Field, value: Option<f64>) -> Severity {
    match field {
        Field::Recovery => recovery_severity(value),
        _ => rating_severity(value),
    }
}

pub fn rate<'a>(records: &'a [NormalizedRecord], field: Field) -> Vec<RatedRecord<'a>> {
    records
        .iter()
        .map(|record| {
            let value = record.number(field);
            RatedRecord {
                record,
                field,
                value,
                severity: severity(field, value),
            }
        })
        .collect()
}

pub fn is_triggered(record: &NormalizedRecord, kind: AlertKind) -> bool {
    match kind {
        AlertKind::UrineColor => record
            .number(Field::UrineColor)
            .is_some_and(|v| v > URINE_COLOR_LIMIT),
        AlertKind::BodyFat => record
            .number(Field::Fat)
            .is_some_and(|v| v > BODY_FAT_LIMIT),
        AlertKind::ShortSleep => record
            .text(Field::SleepHours)
            .is_some_and(|bucket| SHORT_SLEEP_BUCKETS.contains(&bucket)),
        AlertKind::DiscomfortArea => !record.value(Field::DiscomfortArea).is_blank(),
        AlertKind::Rating(field) => severity(field, record.number(field)) == Severity::Low,
    }
}

/// One flag per record, in input order.
pub fn classify<'a>(records: &'a [NormalizedRecord], kind: AlertKind) -> Vec<AlertFlag<'a>> {
    records
        .iter()
        .map(|record| AlertFlag {
            record,
            kind,
            triggered: is_triggered(record, kind),
        })
        .collect()
}

pub fn triggered<'a>(
    records: &'a [NormalizedRecord],
    kind: AlertKind,
) -> Vec<&'a NormalizedRecord> {
    classify(records, kind)
        .into_iter()
        .filter(|flag| flag.triggered)
        .map(|flag| flag.record)
        .collect()
}

/// Body-fat alert over each player's latest reading that has a %Fat value,
/// highest first.
pub fn body_fat_on_latest(records: &[NormalizedRecord]) -> Vec<&NormalizedRecord> {
    let with_fat: Vec<&NormalizedRecord> = records
        .iter()
        .filter(|record| record.number(Field::Fat).is_some())
        .collect();

    let mut over: Vec<&NormalizedRecord> = aggregate::latest_by_player(with_fat)
        .into_values()
        .filter(|record| is_triggered(record, AlertKind::BodyFat))
        .collect();
    over.sort_by(|a, b| {
        b.number(Field::Fat)
            .partial_cmp(&a.number(Field::Fat))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    over
}

/// Body-fat alert over every reading in the table.
pub fn body_fat_on_range(records: &[NormalizedRecord]) -> Vec<&NormalizedRecord> {
    triggered(records, AlertKind::BodyFat)
}

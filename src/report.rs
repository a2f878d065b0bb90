use std::fmt::Write;

use anyhow::Context;
use chrono::NaiveDate;

use crate::aggregate;
use crate::alerts::{self, RATING_FIELDS};
use crate::expand;
use crate::filter::{DateRange, PlayerFilter};
use crate::models::{AlertKind, Dataset, Field, NormalizedRecord, Severity};
use crate::{normalize, schema};

/// Every scored wellness metric, ratings then recovery.
const WELLNESS_METRICS: [Field; 5] = [
    RATING_FIELDS[0],
    RATING_FIELDS[1],
    RATING_FIELDS[2],
    RATING_FIELDS[3],
    Field::Recovery,
];

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "🔴",
        Severity::Mid => "🟠",
        Severity::High => "🟢",
        Severity::Unknown => "⚪",
    }
}

fn number(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "-".to_string(),
    }
}

fn range_line(output: &mut String, range: &DateRange) {
    let _ = writeln!(output, "Date range: {} to {}", range.start, range.end);
}

fn alert_section(
    output: &mut String,
    title: &str,
    hits: &[&NormalizedRecord],
    field: Field,
    with_date: bool,
    none: &str,
) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");
    if hits.is_empty() {
        let _ = writeln!(output, "{none}");
        return;
    }
    for record in hits {
        if with_date {
            let _ = writeln!(
                output,
                "- {} {}: {}",
                record.date,
                record.player,
                record.value(field)
            );
        } else {
            let _ = writeln!(output, "- {}: {}", record.player, record.value(field));
        }
    }
}

pub fn wellness_daily(date: NaiveDate, records: &[NormalizedRecord]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Wellness Daily Overview");
    let _ = writeln!(output, "Date: {date}");

    for field in WELLNESS_METRICS {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {field}");
        for rated in alerts::rate(records, field) {
            let _ = writeln!(
                output,
                "- {} {}: {}",
                marker(rated.severity),
                rated.record.player,
                rated.record.value(field)
            );
        }
    }

    alert_section(
        &mut output,
        "Urine Color Alert (> 4)",
        &alerts::triggered(records, AlertKind::UrineColor),
        Field::UrineColor,
        false,
        "No alerts today.",
    );
    alert_section(
        &mut output,
        "Muscle Discomfort Areas",
        &alerts::triggered(records, AlertKind::DiscomfortArea),
        Field::DiscomfortArea,
        false,
        "No muscle pain reported.",
    );
    alert_section(
        &mut output,
        "Hours of Sleep (1-5 or 5-7)",
        &alerts::triggered(records, AlertKind::ShortSleep),
        Field::SleepHours,
        false,
        "No short sleep reported.",
    );

    output
}

pub fn wellness_trend(
    players: &PlayerFilter,
    range: &DateRange,
    records: &[NormalizedRecord],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Wellness Trend");
    let _ = writeln!(output, "Player: {}", players.label());
    range_line(&mut output, range);

    for field in WELLNESS_METRICS {
        let _ = writeln!(output);
        let _ = writeln!(output, "## {field}");
        if *players == PlayerFilter::All {
            let means = aggregate::mean_by_date(records, field);
            if means.is_empty() {
                let _ = writeln!(output, "No values recorded.");
            }
            for (date, mean) in means {
                let band = alerts::severity(field, Some(mean));
                let _ = writeln!(output, "- {date}: {} average {mean:.2}", marker(band));
            }
        } else {
            for rated in alerts::rate(records, field) {
                let _ = writeln!(
                    output,
                    "- {}: {} {}",
                    rated.record.date,
                    marker(rated.severity),
                    rated.record.value(field)
                );
            }
        }
    }

    alert_section(
        &mut output,
        "Muscle Pain Area Report",
        &alerts::triggered(records, AlertKind::DiscomfortArea),
        Field::DiscomfortArea,
        true,
        "No muscle discomforts reported.",
    );
    alert_section(
        &mut output,
        "Urine Color Alert (> 4)",
        &alerts::triggered(records, AlertKind::UrineColor),
        Field::UrineColor,
        true,
        "No urine alerts in this period.",
    );
    alert_section(
        &mut output,
        "Short Sleep Hours (under 7h)",
        &alerts::triggered(records, AlertKind::ShortSleep),
        Field::SleepHours,
        true,
        "No short sleep entries.",
    );

    output
}

/// `records` are already expanded to one player per row.
pub fn calendar(
    players: &PlayerFilter,
    range: &DateRange,
    records: &[NormalizedRecord],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Activity Calendar");
    let _ = writeln!(output, "Player: {}", players.label());
    range_line(&mut output, range);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Calendar");
    for (player, days) in aggregate::calendar_grid(records) {
        let active: Vec<String> = days
            .iter()
            .filter(|(_, workouts)| !workouts.is_empty())
            .map(|(date, workouts)| format!("{} {}", date.format("%d-%b"), workouts.join(" + ")))
            .collect();
        let days = if active.is_empty() {
            "-".to_string()
        } else {
            active.join("; ")
        };
        let _ = writeln!(output, "- {player}: {days}");
    }

    let workouts = expand::expand(records, Field::Workout);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Activity Count per Player and Workout");
    for ((player, workout), count) in aggregate::count_by_player_and(&workouts, Field::Workout) {
        let _ = writeln!(output, "- {player} / {workout}: {count}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Total Activities by Type");
    for total in aggregate::count_by_field(&workouts, Field::Workout) {
        let _ = writeln!(output, "- {}: {}", total.category, total.count);
    }

    let mut details: Vec<&NormalizedRecord> = records
        .iter()
        .filter(|record| !record.value(Field::Details).is_blank())
        .collect();
    details.sort_by_key(|record| record.date);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Activity Details");
    if details.is_empty() {
        let _ = writeln!(output, "No details recorded.");
    }
    for record in details {
        let _ = writeln!(
            output,
            "- {} {}: {}",
            record.date,
            record.player,
            record.value(Field::Details)
        );
    }

    output
}

pub fn procedures(
    players: &PlayerFilter,
    range: &DateRange,
    records: &[NormalizedRecord],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Procedure Overview (Physiotherapy)");
    let _ = writeln!(output, "Player: {}", players.label());
    range_line(&mut output, range);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Procedures per Day");
    for (date, count) in aggregate::count_by_date(records) {
        let _ = writeln!(output, "- {date}: {count}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Total Procedures per Player");
    for summary in aggregate::count_by_player(records) {
        let _ = writeln!(output, "- {}: {}", summary.category, summary.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Places of Procedure");
    let places = aggregate::count_by_field(records, Field::Place);
    if places.is_empty() {
        let _ = writeln!(output, "No places recorded.");
    }
    for summary in places {
        let _ = writeln!(output, "- {}: {}", summary.category, summary.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reasons for Procedures");
    let reasons: Vec<&NormalizedRecord> = records
        .iter()
        .filter(|record| !record.value(Field::Reason).is_blank())
        .collect();
    if reasons.is_empty() {
        let _ = writeln!(output, "No reasons recorded.");
    }
    for record in reasons {
        let _ = writeln!(
            output,
            "- {} {}: {} (registered by {})",
            record.date,
            record.player,
            record.value(Field::Reason),
            record.value(Field::RegisteredBy)
        );
    }

    output
}

/// `filtered` is the selected players within the range; `all` is the full
/// merged table, used for best-ever readings and the latest-reading alert.
pub fn weight_fat(
    selected: &[String],
    range: &DateRange,
    filtered: &[NormalizedRecord],
    all: &[NormalizedRecord],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Weight & Body Fat Tracking");
    let _ = writeln!(output, "Players: {}", selected.join(", "));
    range_line(&mut output, range);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Latest Fat & Weight Record");
    for player in selected {
        if !filtered.iter().any(|record| record.player == *player) {
            let _ = writeln!(output, "- {player}: No data");
            continue;
        }
        let weight = aggregate::latest_number(filtered, player, Field::Weight);
        let fat = aggregate::latest_number(filtered, player, Field::Fat);
        let status = match fat {
            Some(fat) if fat > alerts::BODY_FAT_LIMIT => "🚨",
            Some(_) => "✅",
            None => "",
        };
        let _ = writeln!(
            output,
            "- {player}: {} kg / {}% {status}",
            number(weight, 1),
            number(fat, 1)
        );
    }

    let best = aggregate::minimum_by_player(all, Field::Fat);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Best % Fat per Player");
    for player in selected {
        if let Some(Some(fat)) = best.get(player) {
            let _ = writeln!(output, "- {player}: {fat:.2}%");
        }
    }

    let mut table: Vec<&NormalizedRecord> = filtered.iter().collect();
    table.sort_by(|a, b| a.player.cmp(&b.player).then(a.date.cmp(&b.date)));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Data Table");
    let _ = writeln!(output, "| Player | Date | Weight | % Fat |");
    let _ = writeln!(output, "|---|---|---|---|");
    for record in table {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            record.player,
            record.date,
            number(record.number(Field::Weight), 1),
            number(record.number(Field::Fat), 1)
        );
    }

    alert_section(
        &mut output,
        "Readings Over 11.5% Body Fat in Range",
        &alerts::body_fat_on_range(filtered),
        Field::Fat,
        true,
        "No readings over 11.5% in this range.",
    );
    alert_section(
        &mut output,
        "Players with Body Fat > 11.5% (Latest Record)",
        &alerts::body_fat_on_latest(all),
        Field::Fat,
        true,
        "All players are below 11.5% body fat.",
    );

    output
}

/// Normalized records as CSV under each field's canonical header, in
/// schema order. Missing values are written as empty cells.
pub fn export_csv(dataset: Dataset, records: &[NormalizedRecord]) -> anyhow::Result<String> {
    let headers: Vec<&str> = schema::fields(dataset)
        .iter()
        .filter_map(|spec| spec.headers.first().copied())
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in normalize::to_raw_rows(records) {
        let cells = headers
            .iter()
            .map(|header| row.get(*header).map_or("", String::as_str));
        writer.write_record(cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush CSV output: {}", err.error()))?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

pub fn export_json(records: &[NormalizedRecord]) -> anyhow::Result<String> {
    serde_json::to_string_pretty(records).context("failed to encode records as JSON")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::Value;
    use crate::source::read_rows;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn wellness(
        player: &str,
        date: NaiveDate,
        fatigue: f64,
        urine: f64,
        sleep: &str,
    ) -> NormalizedRecord {
        NormalizedRecord {
            dataset: Dataset::Wellness,
            player: player.to_string(),
            date,
            values: BTreeMap::from([
                (Field::Fatigue, Value::Number(fatigue)),
                (Field::UrineColor, Value::Number(urine)),
                (Field::SleepHours, Value::Text(sleep.to_string())),
            ]),
        }
    }

    fn reading(player: &str, date: NaiveDate, weight: f64, fat: Option<f64>) -> NormalizedRecord {
        NormalizedRecord {
            dataset: Dataset::WeightFat,
            player: player.to_string(),
            date,
            values: BTreeMap::from([
                (Field::Weight, Value::Number(weight)),
                (Field::Fat, fat.map_or(Value::Missing, Value::Number)),
            ]),
        }
    }

    /// One check-in with every text column filled and the mood unanswered.
    fn checkins() -> Vec<NormalizedRecord> {
        let data = format!(
            "Name,Timestamp,FATIGUE,MOOD,HOW MANY HOURS YOU SLEEP?,{}\n\
             Avery Lee,15/01/2024 08:00,2,n/a,5-7,Left hamstring M\n",
            schema::DISCOMFORT_AREA_HEADER
        );
        let rows = read_rows(data.as_bytes()).unwrap();
        normalize::normalize(Dataset::Wellness, &rows)
    }

    #[test]
    fn daily_report_lists_bands_and_alerts() {
        let day = ymd(2024, 1, 15);
        let records = vec![
            wellness("Avery Lee", day, 2.0, 5.0, "5-7"),
            wellness("Kiara Patel", day, 4.0, 3.0, "7-9"),
        ];
        let report = wellness_daily(day, &records);
        assert!(report.contains("Date: 2024-01-15"));
        assert!(report.contains("- 🔴 Avery Lee: 2"));
        assert!(report.contains("- 🟢 Kiara Patel: 4"));
        assert!(report.contains("## Urine Color Alert (> 4)\n- Avery Lee: 5"));
        let sleep = "## Hours of Sleep (1-5 or 5-7)\n- Avery Lee: 5-7";
        assert!(report.contains(sleep));
        assert!(report.contains("No muscle pain reported."));
    }

    #[test]
    fn trend_for_all_players_averages_per_day() {
        let day = ymd(2024, 1, 15);
        let records = vec![
            wellness("Avery Lee", day, 2.0, 3.0, "7-9"),
            wellness("Kiara Patel", day, 4.0, 3.0, "7-9"),
        ];
        let range = DateRange::day(day);
        let report = wellness_trend(&PlayerFilter::All, &range, &records);
        assert!(report.contains("- 2024-01-15: 🟠 average 3.00"));
        assert!(report.contains("No urine alerts in this period."));
    }

    #[test]
    fn weight_report_flags_latest_over_limit() {
        let records = vec![
            reading("Avery Lee", ymd(2024, 3, 1), 80.4, Some(10.8)),
            reading("Avery Lee", ymd(2024, 3, 8), 81.0, Some(11.9)),
            reading("Kiara Patel", ymd(2024, 3, 1), 61.0, None),
        ];
        let range = DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 31)).unwrap();
        let selected = vec!["Avery Lee".to_string(), "Jules Moreno".to_string()];
        let report = weight_fat(&selected, &range, &records, &records);

        assert!(report.contains("- Avery Lee: 81.0 kg / 11.9% 🚨"));
        assert!(report.contains("- Jules Moreno: No data"));
        assert!(report.contains("- Avery Lee: 10.80%"));
        assert!(report.contains("| Avery Lee | 2024-03-01 | 80.4 | 10.8 |"));
        let latest_alert = "(Latest Record)\n- 2024-03-08 Avery Lee: 11.9";
        assert!(report.contains(latest_alert));
    }

    #[test]
    fn latest_card_keeps_last_known_fat_after_weight_only_reading() {
        let records = vec![
            reading("Avery Lee", ymd(2024, 3, 1), 80.4, Some(11.9)),
            reading("Avery Lee", ymd(2024, 3, 8), 81.2, None),
        ];
        let range = DateRange::new(ymd(2024, 3, 1), ymd(2024, 3, 31)).unwrap();
        let selected = vec!["Avery Lee".to_string()];
        let report = weight_fat(&selected, &range, &records, &records);

        assert!(report.contains("- Avery Lee: 81.2 kg / 11.9% 🚨"));
    }

    #[test]
    fn csv_export_writes_schema_headers_and_empty_missing_cells() {
        let records = checkins();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value(Field::Mood), &Value::Missing);

        let csv = export_csv(Dataset::Wellness, &records).unwrap();
        let headers: Vec<&str> = schema::fields(Dataset::Wellness)
            .iter()
            .map(|spec| spec.headers[0])
            .collect();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(headers.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("Avery Lee,2024-01-15,2,,,,,,5-7,Left hamstring M")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_export_renormalizes_to_the_same_records() {
        let records = checkins();
        let csv = export_csv(Dataset::Wellness, &records).unwrap();
        let rows = read_rows(csv.as_bytes()).unwrap();
        assert_eq!(normalize::normalize(Dataset::Wellness, &rows), records);
    }

    #[test]
    fn json_export_keeps_missing_values_as_null() {
        let json = export_json(&checkins()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["player"], "Avery Lee");
        assert_eq!(parsed[0]["date"], "2024-01-15");
        assert_eq!(parsed[0]["dataset"], "wellness");
        assert_eq!(parsed[0]["values"]["fatigue"], 2.0);
        assert!(parsed[0]["values"]["mood"].is_null());
    }
}

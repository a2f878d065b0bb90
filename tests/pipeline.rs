use std::cell::Cell;
use std::rc::Rc;

use chrono::NaiveDate;

use wellness_hub::filter::{self, DateRange, PlayerFilter};
use wellness_hub::models::{AlertKind, Dataset, Field, RawRow, Sheet};
use wellness_hub::source::{read_rows, CachedSource, RowSource};
use wellness_hub::{aggregate, alerts, config};

const WELLNESS_CSV: &str = "\
Timestamp,Name,FATIGUE,SLEEP QUALITY,MUSCLE DISCOMFORT,MOOD,\
HOW HAVE YOU RECOVERED?,URINE COLOR,HOW MANY HOURS YOU SLEEP?
10/01/2024 08:01:00,Avery Lee,2 - Tired,4,3,4,6,5,5-7
10/01/2024 08:05:00,Kiara Patel,4,4,4,5,8,2,7-9
11/01/2024 07:55:00,Avery Lee,3,3,n/a,4,4,3,1-5
broken,Jules Moreno,1,1,1,1,1,8,1-5
";

const CALENDAR_CSV: &str = "\
Date,Player,Workout,Details
12/01/2024,\"Avery Lee, Kiara Patel\",\"Gym, Pool\",Recovery block
13/01/2024,Kiara Patel,Bike,
";

const WEIGHT_CSV: &str = "\
Player_name,Date,Weight
Avery Lee,01/03/2024,\"80,4\"
Avery Lee,08/03/2024,80.9 kg
";

const FAT_CSV: &str = "\
Full_Name ,Date, Faulker
Avery Lee,01/03/2024,\"11,2\"
Avery Lee,08/03/2024,11.5
Kiara Patel,08/03/2024,11.6
";

/// Serves the CSV fixtures above and counts how often it is asked to.
#[derive(Default)]
struct InMemory {
    fetches: Rc<Cell<usize>>,
}

impl RowSource for InMemory {
    fn fetch(&self, sheet: Sheet) -> anyhow::Result<Vec<RawRow>> {
        self.fetches.set(self.fetches.get() + 1);
        let data = match sheet {
            Sheet::Wellness => WELLNESS_CSV,
            Sheet::Calendar => CALENDAR_CSV,
            Sheet::Weight => WEIGHT_CSV,
            Sheet::BodyFat => FAT_CSV,
            Sheet::Procedures => anyhow::bail!("no procedures export"),
        };
        read_rows(data.as_bytes())
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn source() -> CachedSource<InMemory> {
    CachedSource::new(InMemory::default(), config::cache_ttls())
}

#[test]
fn wellness_rows_flow_through_to_alerts() {
    let records = wellness_hub::load(&mut source(), Dataset::Wellness).unwrap();
    assert_eq!(records.len(), 3, "the row with a broken timestamp is dropped");

    let first_day = DateRange::day(ymd(2024, 1, 10));
    let day = filter::filter(&records, &first_day, &PlayerFilter::All);
    assert_eq!(day.len(), 2);

    let urine: Vec<&str> = alerts::triggered(&day, AlertKind::UrineColor)
        .iter()
        .map(|r| r.player.as_str())
        .collect();
    assert_eq!(urine, vec!["Avery Lee"]);

    let low_fatigue = alerts::triggered(&day, AlertKind::Rating(Field::Fatigue));
    assert_eq!(low_fatigue.len(), 1);
    assert_eq!(low_fatigue[0].player, "Avery Lee");

    let range = DateRange::new(ymd(2024, 1, 10), ymd(2024, 1, 11)).unwrap();
    let avery = filter::filter(&records, &range, &PlayerFilter::parse(Some("Avery Lee")));
    assert_eq!(alerts::triggered(&avery, AlertKind::ShortSleep).len(), 2);
    let low_recovery = alerts::triggered(&avery, AlertKind::Rating(Field::Recovery));
    assert_eq!(low_recovery.len(), 1);

    let means = aggregate::mean_by_date(&records, Field::MuscleDiscomfort);
    assert!((means[&ymd(2024, 1, 10)] - 3.5).abs() < f64::EPSILON);
    assert!(!means.contains_key(&ymd(2024, 1, 11)));
}

#[test]
fn calendar_sessions_expand_per_player() {
    let records = wellness_hub::load(&mut source(), Dataset::Calendar).unwrap();
    let players: Vec<&str> = records.iter().map(|r| r.player.as_str()).collect();
    assert_eq!(players, vec!["Avery Lee", "Kiara Patel", "Kiara Patel"]);
    assert_eq!(records[0].values, records[1].values);

    let grid = aggregate::calendar_grid(&records);
    let kiara = &grid["Kiara Patel"];
    assert_eq!(kiara[&ymd(2024, 1, 12)], vec!["Gym", "Pool"]);
    assert_eq!(kiara[&ymd(2024, 1, 13)], vec!["Bike"]);

    let sessions = aggregate::count_by_player(&records);
    assert_eq!(sessions[0].category, "Kiara Patel");
    assert_eq!(sessions[0].count, 2);
}

#[test]
fn weight_and_fat_sheets_merge_before_alerting() {
    let records = wellness_hub::load(&mut source(), Dataset::WeightFat).unwrap();
    assert_eq!(records.len(), 3);

    let over: Vec<&str> = alerts::body_fat_on_latest(&records)
        .iter()
        .map(|r| r.player.as_str())
        .collect();
    assert_eq!(over, vec!["Kiara Patel"], "11.5 is not over the limit");

    let best = aggregate::minimum(&records, "Avery Lee", Field::Fat);
    assert_eq!(best, Some(11.2));
    let latest = aggregate::latest(&records, "Avery Lee").unwrap();
    assert_eq!(latest.number(Field::Weight), Some(80.9));
}

#[test]
fn fetch_errors_propagate() {
    assert!(wellness_hub::load(&mut source(), Dataset::Procedures).is_err());
}

#[test]
fn cached_sheets_are_reused() {
    let inner = InMemory::default();
    let fetches = Rc::clone(&inner.fetches);
    let mut source = CachedSource::new(inner, config::cache_ttls());

    let first = wellness_hub::load(&mut source, Dataset::Wellness).unwrap();
    let second = wellness_hub::load(&mut source, Dataset::Wellness).unwrap();
    assert_eq!(first, second);
    assert_eq!(fetches.get(), 1);

    wellness_hub::load(&mut source, Dataset::WeightFat).unwrap();
    assert_eq!(fetches.get(), 3);

    source.refresh();
    wellness_hub::load(&mut source, Dataset::Wellness).unwrap();
    assert_eq!(fetches.get(), 4);
}

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// One spreadsheet row as fetched: header -> raw cell text.
pub type RawRow = BTreeMap<String, String>;

/// The four dashboards' datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    Wellness,
    Calendar,
    Procedures,
    WeightFat,
}

/// A published sheet that rows are fetched from. Weight and body fat live
/// in separate sheets but normalize into the same dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sheet {
    Wellness,
    Calendar,
    Procedures,
    Weight,
    BodyFat,
}

impl Sheet {
    pub const ALL: [Sheet; 5] = [
        Sheet::Wellness,
        Sheet::Calendar,
        Sheet::Procedures,
        Sheet::Weight,
        Sheet::BodyFat,
    ];
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Sheet::Wellness => "wellness",
            Sheet::Calendar => "calendar",
            Sheet::Procedures => "procedures",
            Sheet::Weight => "weight",
            Sheet::BodyFat => "fat",
        };
        f.write_str(name)
    }
}

/// Semantic type a raw cell is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// First digit found in the cell, e.g. "4 - Good" -> 4.
    Rating,
    /// First signed decimal, decimal comma accepted, e.g. "72,5 kg" -> 72.5.
    Decimal,
    /// Day-first calendar date.
    Date,
    /// Passed through unchanged.
    Text,
}

/// Every column any dataset knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Player,
    Date,
    Fatigue,
    SleepQuality,
    MuscleDiscomfort,
    Mood,
    Recovery,
    UrineColor,
    SleepHours,
    DiscomfortArea,
    Workout,
    Details,
    Place,
    Reason,
    RegisteredBy,
    Weight,
    Fat,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Player => "Player",
            Field::Date => "Date",
            Field::Fatigue => "Fatigue",
            Field::SleepQuality => "Sleep quality",
            Field::MuscleDiscomfort => "Muscle discomfort",
            Field::Mood => "Mood",
            Field::Recovery => "Recovery",
            Field::UrineColor => "Urine color",
            Field::SleepHours => "Hours of sleep",
            Field::DiscomfortArea => "Discomfort area",
            Field::Workout => "Workout",
            Field::Details => "Details",
            Field::Place => "Place",
            Field::Reason => "Reason",
            Field::RegisteredBy => "Registered by",
            Field::Weight => "Weight (kg)",
            Field::Fat => "% Fat",
        };
        f.write_str(label)
    }
}

/// A coerced cell. `Missing` is distinct from a parsed zero and from an
/// empty `Text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Missing and empty text both mean "no value" downstream.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Raw cell text that coerces back to this value; `None` for missing.
    pub fn to_cell(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            Value::Number(n) => Some(n.to_string()),
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => f.write_str("-"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A typed row. Player and date are always present; the remaining fields
/// are exactly the dataset's declared schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub dataset: Dataset,
    pub player: String,
    pub date: NaiveDate,
    pub values: BTreeMap<Field, Value>,
}

impl NormalizedRecord {
    pub fn value(&self, field: Field) -> &Value {
        static MISSING: Value = Value::Missing;
        self.values.get(&field).unwrap_or(&MISSING)
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        self.value(field).as_number()
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.value(field).as_text()
    }
}

/// A record whose multi-value field now holds exactly one element.
pub type ExpandedRecord = NormalizedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    UrineColor,
    BodyFat,
    ShortSleep,
    DiscomfortArea,
    /// Scored metric; triggers when its band is `Severity::Low`.
    Rating(Field),
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::UrineColor => f.write_str("Urine color > 4"),
            AlertKind::BodyFat => f.write_str("Body fat > 11.5%"),
            AlertKind::ShortSleep => f.write_str("Short sleep (1-5 or 5-7)"),
            AlertKind::DiscomfortArea => f.write_str("Muscle discomfort area"),
            AlertKind::Rating(field) => write!(f, "Low {field}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Mid,
    High,
    Unknown,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "low",
            Severity::Mid => "mid",
            Severity::High => "high",
            Severity::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertFlag<'a> {
    pub record: &'a NormalizedRecord,
    pub kind: AlertKind,
    pub triggered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatedRecord<'a> {
    pub record: &'a NormalizedRecord,
    pub field: Field,
    pub value: Option<f64>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

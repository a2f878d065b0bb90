use crate::models::{Dataset, Field, FieldKind};

/// How one field is read from a sheet. The first header is canonical and
/// is used when a record is written back out.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub kind: FieldKind,
    pub headers: &'static [&'static str],
}

const fn spec(field: Field, kind: FieldKind, headers: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        field,
        kind,
        headers,
    }
}

pub const DISCOMFORT_AREA_HEADER: &str =
    "IF THE PREVIOUS ANSWER IS 1 OR 2. WHERE (LOW = L / MEDIUM = M /HIGH = H)";

const WELLNESS: &[FieldSpec] = &[
    spec(Field::Player, FieldKind::Text, &["Name", "PLAYER", "Player"]),
    spec(Field::Date, FieldKind::Date, &["Timestamp", "DATE", "Date"]),
    spec(Field::Fatigue, FieldKind::Rating, &["FATIGUE"]),
    spec(Field::SleepQuality, FieldKind::Rating, &["SLEEP QUALITY"]),
    spec(
        Field::MuscleDiscomfort,
        FieldKind::Rating,
        &["MUSCLE DISCOMFORT"],
    ),
    spec(Field::Mood, FieldKind::Rating, &["MOOD"]),
    spec(
        Field::Recovery,
        FieldKind::Decimal,
        &["HOW HAVE YOU RECOVERED?"],
    ),
    spec(Field::UrineColor, FieldKind::Decimal, &["URINE COLOR"]),
    spec(
        Field::SleepHours,
        FieldKind::Text,
        &["HOW MANY HOURS YOU SLEEP?"],
    ),
    spec(
        Field::DiscomfortArea,
        FieldKind::Text,
        &[DISCOMFORT_AREA_HEADER],
    ),
];

const CALENDAR: &[FieldSpec] = &[
    spec(Field::Player, FieldKind::Text, &["Player", "PLAYER"]),
    spec(Field::Date, FieldKind::Date, &["Date", "DATE"]),
    spec(Field::Workout, FieldKind::Text, &["Workout"]),
    spec(Field::Details, FieldKind::Text, &["Details"]),
];

const PROCEDURES: &[FieldSpec] = &[
    spec(Field::Player, FieldKind::Text, &["PLAYER", "Player"]),
    spec(Field::Date, FieldKind::Date, &["DATE", "Date"]),
    spec(Field::Place, FieldKind::Text, &["PLACE"]),
    spec(Field::Reason, FieldKind::Text, &["Why?"]),
    spec(Field::RegisteredBy, FieldKind::Text, &["REGISTERED BY:"]),
];

const WEIGHT_FAT: &[FieldSpec] = &[
    spec(
        Field::Player,
        FieldKind::Text,
        &["Player", "Player_name", "Full_Name"],
    ),
    spec(Field::Date, FieldKind::Date, &["Date", "DATE"]),
    spec(Field::Weight, FieldKind::Decimal, &["Weight"]),
    spec(Field::Fat, FieldKind::Decimal, &["%Fat", "Faulker"]),
];

/// Declared columns of a dataset, player and date first.
pub fn fields(dataset: Dataset) -> &'static [FieldSpec] {
    match dataset {
        Dataset::Wellness => WELLNESS,
        Dataset::Calendar => CALENDAR,
        Dataset::Procedures => PROCEDURES,
        Dataset::WeightFat => WEIGHT_FAT,
    }
}

pub fn field_spec(dataset: Dataset, field: Field) -> Option<&'static FieldSpec> {
    fields(dataset).iter().find(|spec| spec.field == field)
}

/// Header used when writing `field` back out.
pub fn canonical_header(dataset: Dataset, field: Field) -> Option<&'static str> {
    field_spec(dataset, field)
        .and_then(|spec| spec.headers.first().copied())
}

/// Columns other than player and date.
pub fn value_fields(dataset: Dataset) -> impl Iterator<Item = &'static FieldSpec> {
    fields(dataset)
        .iter()
        .filter(|spec| !matches!(spec.field, Field::Player | Field::Date))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Dataset; 4] = [
        Dataset::Wellness,
        Dataset::Calendar,
        Dataset::Procedures,
        Dataset::WeightFat,
    ];

    #[test]
    fn every_dataset_has_player_and_date_first() {
        for dataset in ALL {
            let specs = fields(dataset);
            assert_eq!(specs[0].field, Field::Player, "{dataset:?}");
            assert_eq!(specs[1].field, Field::Date, "{dataset:?}");
            assert_eq!(specs[1].kind, FieldKind::Date);
        }
    }

    #[test]
    fn every_field_has_a_header() {
        for dataset in ALL {
            for spec in fields(dataset) {
                assert!(!spec.headers.is_empty(), "{dataset:?} {:?}", spec.field);
            }
        }
    }

    #[test]
    fn wellness_headers_match_the_form() {
        assert_eq!(
            canonical_header(Dataset::Wellness, Field::Recovery),
            Some("HOW HAVE YOU RECOVERED?")
        );
        assert_eq!(
            canonical_header(Dataset::Wellness, Field::Player),
            Some("Name")
        );
        let fatigue = field_spec(Dataset::Wellness, Field::Fatigue);
        assert_eq!(fatigue.map(|s| s.kind), Some(FieldKind::Rating));
        assert!(field_spec(Dataset::Wellness, Field::Weight).is_none());
    }

    #[test]
    fn value_fields_skip_identity_columns() {
        let names: Vec<Field> = value_fields(Dataset::WeightFat).map(|s| s.field).collect();
        assert_eq!(names, vec![Field::Weight, Field::Fat]);
    }
}

use crate::models::{ExpandedRecord, Field, NormalizedRecord, Value};

pub const LIST_DELIMITER: &str = ", ";

/// Splits a ", "-delimited cell into trimmed elements, in list order.
/// Blank cells yield a single empty element so the row is never lost.
pub fn split_list(cell: &str) -> Vec<String> {
    if cell.trim().is_empty() {
        return vec![String::new()];
    }
    cell.split(LIST_DELIMITER)
        .map(|item| item.trim().to_string())
        .collect()
}

/// One output record per element of `field`; every other field is copied
/// unchanged.
pub fn expand_record(record: &NormalizedRecord, field: Field) -> Vec<ExpandedRecord> {
    let cell = match field {
        Field::Player => record.player.clone(),
        _ => record
            .value(field)
            .as_text()
            .unwrap_or_default()
            .to_string(),
    };

    split_list(&cell)
        .into_iter()
        .map(|item| {
            let mut expanded = record.clone();
            match field {
                Field::Player => expanded.player = item,
                _ => {
                    expanded.values.insert(field, Value::Text(item));
                }
            }
            expanded
        })
        .collect()
}

pub fn expand(records: &[NormalizedRecord], field: Field) -> Vec<ExpandedRecord> {
    let expanded: Vec<ExpandedRecord> = records
        .iter()
        .flat_map(|record| expand_record(record, field))
        .collect();
    log::debug!(
        "expanded {} records on {field:?} into {}",
        records.len(),
        expanded.len()
    );
    expanded
}

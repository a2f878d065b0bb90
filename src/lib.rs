//! Normalization, filtering, alerting and aggregation for the performance
//! and wellness dashboards' spreadsheet exports.

pub mod aggregate;
pub mod alerts;
pub mod coerce;
pub mod config;
pub mod expand;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod report;
pub mod schema;
pub mod source;

use models::{Dataset, Field, NormalizedRecord, Sheet};
use source::{CachedSource, RowSource};

/// Fetches and normalizes one dataset. Calendar rows come back expanded to
/// one player per record; weight and body fat come back merged.
pub fn load<S: RowSource>(
    source: &mut CachedSource<S>,
    dataset: Dataset,
) -> anyhow::Result<Vec<NormalizedRecord>> {
    let records = match dataset {
        Dataset::Wellness => normalize::normalize(dataset, source.fetch(Sheet::Wellness)?),
        Dataset::Procedures => normalize::normalize(dataset, source.fetch(Sheet::Procedures)?),
        Dataset::Calendar => {
            let sessions = normalize::normalize(dataset, source.fetch(Sheet::Calendar)?);
            expand::expand(&sessions, Field::Player)
        }
        Dataset::WeightFat => {
            let weight = normalize::normalize(dataset, source.fetch(Sheet::Weight)?);
            let fat = normalize::normalize(dataset, source.fetch(Sheet::BodyFat)?);
            normalize::merge_weight_fat(&weight, &fat)
        }
    };
    Ok(records)
}

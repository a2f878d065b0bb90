use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::models::Sheet;

/// Where each sheet's CSV export lives.
#[derive(Debug, Clone, Args)]
pub struct SourceConfig {
    /// Directory holding wellness.csv, calendar.csv, procedures.csv,
    /// weight.csv and fat.csv
    #[arg(
        long,
        global = true,
        env = "WELLNESS_HUB_DATA_DIR",
        default_value = "data"
    )]
    pub data_dir: PathBuf,
    #[arg(long, global = true, env = "WELLNESS_HUB_WELLNESS_CSV")]
    pub wellness_csv: Option<PathBuf>,
    #[arg(long, global = true, env = "WELLNESS_HUB_CALENDAR_CSV")]
    pub calendar_csv: Option<PathBuf>,
    #[arg(long, global = true, env = "WELLNESS_HUB_PROCEDURES_CSV")]
    pub procedures_csv: Option<PathBuf>,
    #[arg(long, global = true, env = "WELLNESS_HUB_WEIGHT_CSV")]
    pub weight_csv: Option<PathBuf>,
    #[arg(long, global = true, env = "WELLNESS_HUB_FAT_CSV")]
    pub fat_csv: Option<PathBuf>,
}

impl SourceConfig {
    fn override_for(&self, sheet: Sheet) -> Option<&PathBuf> {
        match sheet {
            Sheet::Wellness => self.wellness_csv.as_ref(),
            Sheet::Calendar => self.calendar_csv.as_ref(),
            Sheet::Procedures => self.procedures_csv.as_ref(),
            Sheet::Weight => self.weight_csv.as_ref(),
            Sheet::BodyFat => self.fat_csv.as_ref(),
        }
    }

    pub fn path(&self, sheet: Sheet) -> PathBuf {
        self.override_for(sheet)
            .cloned()
            .unwrap_or_else(|| self.data_dir.join(format!("{sheet}.csv")))
    }

    pub fn paths(&self) -> BTreeMap<Sheet, PathBuf> {
        Sheet::ALL
            .into_iter()
            .map(|sheet| (sheet, self.path(sheet)))
            .collect()
    }
}

/// How long a fetched sheet stays fresh.
pub fn cache_ttl(sheet: Sheet) -> Duration {
    match sheet {
        Sheet::Wellness | Sheet::Procedures => Duration::from_secs(300),
        Sheet::Calendar | Sheet::Weight | Sheet::BodyFat => Duration::from_secs(600),
    }
}

pub fn cache_ttls() -> HashMap<Sheet, Duration> {
    Sheet::ALL
        .into_iter()
        .map(|sheet| (sheet, cache_ttl(sheet)))
        .collect()
}

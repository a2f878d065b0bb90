use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::models::{RawRow, Sheet};

/// Something that can produce the raw rows of a sheet.
pub trait RowSource {
    fn fetch(&self, sheet: Sheet) -> anyhow::Result<Vec<RawRow>>;
}

/// Reads a CSV export with a header row. Short rows simply lack the
/// trailing cells; for repeated headers the first column wins.
pub fn read_rows<R: io::Read>(reader: R) -> anyhow::Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader
        .headers()
        .context("failed to read CSV header")?
        .clone();
    let mut rows = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("failed to read CSV record {}", index + 1))?;
        let mut row = RawRow::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.entry(header.to_string())
                .or_insert_with(|| cell.to_string());
        }
        rows.push(row);
    }

    Ok(rows)
}

/// One CSV file per sheet.
#[derive(Debug, Clone)]
pub struct CsvSource {
    paths: BTreeMap<Sheet, PathBuf>,
}

impl CsvSource {
    pub fn new(paths: BTreeMap<Sheet, PathBuf>) -> Self {
        Self { paths }
    }
}

impl RowSource for CsvSource {
    fn fetch(&self, sheet: Sheet) -> anyhow::Result<Vec<RawRow>> {
        let path = self
            .paths
            .get(&sheet)
            .with_context(|| format!("no CSV configured for the {sheet} sheet"))?;
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {} for the {sheet} sheet", path.display()))?;
        let rows = read_rows(file)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        log::info!(
            "loaded {} rows for the {sheet} sheet from {}",
            rows.len(),
            path.display()
        );
        Ok(rows)
    }
}

#[derive(Debug)]
struct CacheEntry {
    fetched_at: Instant,
    rows: Vec<RawRow>,
}

/// Keeps each sheet's rows until its time-to-live elapses or `refresh` is
/// called.
pub struct CachedSource<S> {
    inner: S,
    ttls: HashMap<Sheet, Duration>,
    entries: HashMap<Sheet, CacheEntry>,
}

impl<S: RowSource> CachedSource<S> {
    pub fn new(inner: S, ttls: HashMap<Sheet, Duration>) -> Self {
        Self {
            inner,
            ttls,
            entries: HashMap::new(),
        }
    }

    pub fn fetch(&mut self, sheet: Sheet) -> anyhow::Result<&[RawRow]> {
        self.fetch_at(sheet, Instant::now())
    }

    pub fn fetch_at(&mut self, sheet: Sheet, now: Instant) -> anyhow::Result<&[RawRow]> {
        let ttl = self.ttls.get(&sheet).copied().unwrap_or_default();
        let fresh = self
            .entries
            .get(&sheet)
            .is_some_and(|entry| now.saturating_duration_since(entry.fetched_at) < ttl);

        if fresh {
            log::debug!("cache hit for the {sheet} sheet");
        } else {
            log::debug!("cache miss for the {sheet} sheet");
            let entry = CacheEntry {
                fetched_at: now,
                rows: self.inner.fetch(sheet)?,
            };
            self.entries.insert(sheet, entry);
        }

        self.entries
            .get(&sheet)
            .map(|entry| entry.rows.as_slice())
            .with_context(|| format!("no cached rows for the {sheet} sheet"))
    }

    /// Drops every cached sheet.
    pub fn refresh(&mut self) {
        log::debug!("clearing {} cached sheets", self.entries.len());
        self.entries.clear();
    }
}

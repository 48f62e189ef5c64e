use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::pronunciation::{PronunciationError, Result};

const RAW_TABLES: &str = include_str!("../../../assets/visemes/tables.json");

/// Image shown whenever no mouth shape is known for a symbol.
pub const REST_IMAGE: &str = "rest.png";

/// Duration assumed for symbols missing from the duration table.
pub const DEFAULT_DURATION_MS: u64 = 200;

/// Shared table set parsed from the bundled JSON document.
pub static DEFAULT_TABLES: Lazy<Arc<VisemeTables>> = Lazy::new(|| {
    let tables = VisemeTables::from_json(RAW_TABLES)
        .unwrap_or_else(|err| panic!("failed to initialize viseme tables: {err}"));
    Arc::new(tables)
});

/// Order in which diphthong clusters are tried when searching inside a longer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatchOrder {
    /// Longer clusters first; equal lengths keep their declared order.
    #[default]
    LongestFirst,
    /// Clusters in the order they were declared.
    Declared,
}

/// Phoneme symbol to mouth image lookup.
#[derive(Debug, Clone, Default)]
pub struct VisemeTable {
    entries: HashMap<String, String>,
}

impl VisemeTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Image for `symbol`, or [`REST_IMAGE`] when the symbol is unknown.
    pub fn image_for(&self, symbol: &str) -> &str {
        self.entries
            .get(symbol)
            .map(String::as_str)
            .unwrap_or(REST_IMAGE)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Composite clusters and the constituent phonemes they expand to.
#[derive(Debug, Clone)]
pub struct DiphthongTable {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
    scan: Vec<usize>,
    order: MatchOrder,
}

impl DiphthongTable {
    /// Builds a table from clusters in declaration order.
    ///
    /// Clusters must be non-empty and unique, and every constituent must be a
    /// non-empty symbol without spaces since spaces delimit expansions.
    pub fn new(entries: Vec<(String, Vec<String>)>, order: MatchOrder) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, (cluster, phonemes)) in entries.iter().enumerate() {
            if cluster.is_empty() {
                return Err(PronunciationError::new(format!(
                    "diphthong entry {position} has an empty cluster"
                )));
            }
            if phonemes.is_empty() {
                return Err(PronunciationError::new(format!(
                    "diphthong \"{cluster}\" expands to no phonemes"
                )));
            }
            if let Some(bad) = phonemes
                .iter()
                .find(|symbol| symbol.is_empty() || symbol.contains(' '))
            {
                return Err(PronunciationError::new(format!(
                    "diphthong \"{cluster}\" has invalid constituent \"{bad}\""
                )));
            }
            if index.insert(cluster.clone(), position).is_some() {
                return Err(PronunciationError::new(format!(
                    "diphthong \"{cluster}\" declared more than once"
                )));
            }
        }
        let scan = scan_order(&entries, order);
        Ok(Self {
            entries,
            index,
            scan,
            order,
        })
    }

    /// Returns a copy of the table that scans clusters in `order`.
    pub fn with_order(mut self, order: MatchOrder) -> Self {
        self.scan = scan_order(&self.entries, order);
        self.order = order;
        self
    }

    pub fn order(&self) -> MatchOrder {
        self.order
    }

    /// Exact lookup of a cluster.
    pub fn get(&self, cluster: &str) -> Option<&[String]> {
        self.index
            .get(cluster)
            .map(|&position| self.entries[position].1.as_slice())
    }

    pub fn contains(&self, cluster: &str) -> bool {
        self.index.contains_key(cluster)
    }

    /// Clusters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(cluster, phonemes)| (cluster.as_str(), phonemes.as_slice()))
    }

    /// Clusters in the order substring matching tries them.
    pub fn scan(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.scan.iter().map(|&position| {
            let (cluster, phonemes) = &self.entries[position];
            (cluster.as_str(), phonemes.as_slice())
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn scan_order(entries: &[(String, Vec<String>)], order: MatchOrder) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..entries.len()).collect();
    if order == MatchOrder::LongestFirst {
        // stable sort keeps declaration order among equal lengths
        positions.sort_by_key(|&position| std::cmp::Reverse(entries[position].0.chars().count()));
    }
    positions
}

/// Typical spoken duration per symbol, in milliseconds.
#[derive(Debug, Clone, Default)]
pub struct DurationTable {
    entries: HashMap<String, u64>,
}

impl DurationTable {
    pub fn new(entries: HashMap<String, u64>) -> Self {
        Self { entries }
    }

    /// Duration for `symbol`, or [`DEFAULT_DURATION_MS`] when unknown.
    pub fn duration_for(&self, symbol: &str) -> u64 {
        self.entries
            .get(symbol)
            .copied()
            .unwrap_or(DEFAULT_DURATION_MS)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable bundle of the lookups a mapper needs.
#[derive(Debug, Clone)]
pub struct VisemeTables {
    pub visemes: VisemeTable,
    pub diphthongs: DiphthongTable,
    pub durations: DurationTable,
}

#[derive(Debug, Deserialize)]
struct RawTables {
    #[serde(default)]
    match_order: MatchOrder,
    visemes: HashMap<String, String>,
    #[serde(default)]
    diphthongs: Vec<RawDiphthong>,
    #[serde(default)]
    durations: HashMap<String, u64>,
}

#[derive(Debug, Deserialize)]
struct RawDiphthong {
    cluster: String,
    phonemes: Vec<String>,
}

impl VisemeTables {
    pub fn new(visemes: VisemeTable, diphthongs: DiphthongTable, durations: DurationTable) -> Self {
        Self {
            visemes,
            diphthongs,
            durations,
        }
    }

    /// Handle to the bundled default tables.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&DEFAULT_TABLES)
    }

    /// Parses tables from the JSON layout used by `assets/visemes/tables.json`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: RawTables = serde_json::from_str(raw)
            .map_err(|err| PronunciationError::new(format!("invalid viseme tables: {err}")))?;
        let diphthongs = parsed
            .diphthongs
            .into_iter()
            .map(|entry| (entry.cluster, entry.phonemes))
            .collect();
        Ok(Self {
            visemes: VisemeTable::new(parsed.visemes),
            diphthongs: DiphthongTable::new(diphthongs, parsed.match_order)?,
            durations: DurationTable::new(parsed.durations),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            PronunciationError::new(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Returns a copy whose diphthong table scans in `order`.
    pub fn with_match_order(mut self, order: MatchOrder) -> Self {
        self.diphthongs = self.diphthongs.with_order(order);
        self
    }

    /// Estimated spoken duration of `tokens` in milliseconds.
    ///
    /// Exact diphthong clusters are costed as the sum of their constituents,
    /// even when the duration table lists the cluster itself.
    pub fn estimate_duration<T: AsRef<str>>(&self, tokens: &[T]) -> u64 {
        tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                match self.diphthongs.get(token) {
                    Some(phonemes) => phonemes
                        .iter()
                        .map(|symbol| self.durations.duration_for(symbol))
                        .sum(),
                    None => self.durations.duration_for(token),
                }
            })
            .sum()
    }
}

//! Reading the filter-list dataset and selecting the lists to fetch.
//!
//! The dataset is a CSV table with a header row. Only two columns matter:
//! `tagIds`, a bracketed list of numeric tag identifiers such as `"[2, 5]"`,
//! and `primaryViewUrl`, the location of the list.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde::Deserialize;

use crate::{ErrorKind, Result};

/// Tag identifiers selected by default: ads, tracking and malware lists.
pub const DEFAULT_INTEREST: [u32; 3] = [2, 3, 6];

static TAG_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*)\]").expect("valid tag list regex"));

/// A single dataset row. Missing columns are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetRow {
    /// Raw tag list, e.g. `[2, 5]`
    #[serde(rename = "tagIds")]
    pub tag_ids: Option<String>,
    /// Location of the filter list
    #[serde(rename = "primaryViewUrl")]
    pub url: Option<String>,
}

impl DatasetRow {
    /// Parse the tag identifiers of this row.
    ///
    /// Items which are not numeric are ignored.
    #[must_use]
    pub fn tags(&self) -> Vec<u32> {
        let Some(raw) = &self.tag_ids else {
            return Vec::new();
        };
        let Some(list) = TAG_LIST.captures(raw).and_then(|caps| caps.get(1)) else {
            return Vec::new();
        };
        list.as_str()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .filter_map(|id| id.parse().ok())
            .collect()
    }

    /// Returns the URL of this row if it is a fetch candidate for `interest`
    #[must_use]
    pub fn candidate_url(&self, interest: &HashSet<u32>) -> Option<&str> {
        let url = self.url.as_deref()?;
        if !url.starts_with("http") {
            return None;
        }
        self.tags()
            .iter()
            .any(|tag| interest.contains(tag))
            .then_some(url)
    }
}

/// The parsed dataset
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<DatasetRow>,
}

impl Dataset {
    /// Read the dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns an `Err` if the file cannot be opened. Rows which cannot be
    /// parsed are skipped.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| ErrorKind::Dataset(path.to_path_buf(), e))?;
        Ok(Self::from_csv(reader))
    }

    /// Read the dataset from any reader, e.g. an in-memory string
    pub fn from_reader<R: io::Read>(reader: R) -> Self {
        Self::from_csv(csv::ReaderBuilder::new().flexible(true).from_reader(reader))
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Self {
        let rows = reader
            .deserialize::<DatasetRow>()
            .filter_map(|row| match row {
                Ok(row) => Some(row),
                Err(e) => {
                    debug!("Skipping malformed dataset row: {e}");
                    None
                }
            })
            .collect();
        Dataset { rows }
    }

    /// Number of rows in the dataset
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the dataset has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// URLs of all rows whose tags intersect `interest`, in dataset order
    #[must_use]
    pub fn urls(&self, interest: &HashSet<u32>) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.candidate_url(interest))
            .map(ToString::to_string)
            .collect()
    }
}

impl FromIterator<DatasetRow> for Dataset {
    fn from_iter<T: IntoIterator<Item = DatasetRow>>(iter: T) -> Self {
        Dataset {
            rows: iter.into_iter().collect(),
        }
    }
}

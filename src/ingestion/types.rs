//! Core data types for the ingestion pipeline
//! Pure data structures with no behavior beyond lookups

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

/// Supported cities - one upstream dataset each
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum City {
    #[default]
    Asheville,
    Austin,
    Boston,
    Chicago,
    Dallas,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Asheville,
        City::Austin,
        City::Boston,
        City::Chicago,
        City::Dallas,
    ];

    /// Key used in query strings and env overrides
    pub fn key(&self) -> &'static str {
        match self {
            City::Asheville => "asheville",
            City::Austin => "austin",
            City::Boston => "boston",
            City::Chicago => "chicago",
            City::Dallas => "dallas",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            City::Asheville => "Asheville, NC",
            City::Austin => "Austin, TX",
            City::Boston => "Boston, MA",
            City::Chicago => "Chicago, IL",
            City::Dallas => "Dallas, TX",
        }
    }

    /// Release-dated listing snapshot for this city
    pub fn default_url(&self) -> &'static str {
        match self {
            City::Asheville => "https://data.insideairbnb.com/united-states/nc/asheville/2025-06-17/visualisations/listings.csv.gz",
            City::Austin => "https://data.insideairbnb.com/united-states/tx/austin/2025-06-13/visualisations/listings.csv.gz",
            City::Boston => "https://data.insideairbnb.com/united-states/ma/boston/2025-06-19/visualisations/listings.csv.gz",
            City::Chicago => "https://data.insideairbnb.com/united-states/il/chicago/2025-06-17/visualisations/listings.csv.gz",
            City::Dallas => "https://data.insideairbnb.com/united-states/tx/dallas/2025-08-19/visualisations/listings.csv.gz",
        }
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for City {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        City::ALL
            .into_iter()
            .find(|city| city.key() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// One source listing: column name -> cell text.
/// Column sets drift between dataset releases, so nothing here is typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// Raw cell value, if the column exists in this release
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Trimmed cell value, treating blank cells as missing
    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).map(str::trim).filter(|v| !v.is_empty())
    }

    /// First non-blank value across `columns`, in order
    pub fn first_text(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|column| self.text(column))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Cached rows for one city. Rows are shared so responses read a snapshot.
#[derive(Debug, Clone)]
pub struct CityDataset {
    pub fetched_at: DateTime<Utc>,
    pub rows: Arc<Vec<RawRow>>,
}

/// HTTP response body plus the hints used to decide how to decode it
#[derive(Debug, Clone)]
pub struct Download {
    pub url: String,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub body: Bytes,
}

impl Download {
    /// Plain body with no header hints
    pub fn from_bytes(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.into(),
            content_type: None,
            content_encoding: None,
            body: body.into(),
        }
    }
}

/// Stable listing shape served by every property endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedProperty {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    pub location: String,
    pub accommodates: Option<i64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<f64>,
    pub property_type: String,
    pub room_type: String,
    pub host_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub picture_url: String,
    pub raw: RawRow,
}

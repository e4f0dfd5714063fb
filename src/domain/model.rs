use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
}

/// A hotel. `city` holds the id of a [`City`] but nothing guarantees that
/// such a city exists; resolving it is up to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hotel {
    pub id: i64,
    pub zone: String,
    pub name: String,
    pub city: i64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Text,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Static description of a record shape, consumed by boundary code
/// (conformance checks, CSV header checks). Declared order is significant.
pub trait Shape: Serialize + DeserializeOwned + Send + Sync + 'static {
    const ENTITY: &'static str;
    const FIELDS: &'static [FieldSpec];
}

impl Shape for City {
    const ENTITY: &'static str = "City";
    const FIELDS: &'static [FieldSpec] = &[
        field("id", FieldKind::Integer),
        field("name", FieldKind::Text),
    ];
}

impl Shape for Hotel {
    const ENTITY: &'static str = "Hotel";
    const FIELDS: &'static [FieldSpec] = &[
        field("id", FieldKind::Integer),
        field("zone", FieldKind::Text),
        field("name", FieldKind::Text),
        field("city", FieldKind::Integer),
        field("label", FieldKind::Text),
    ];
}

/// A candidate record that failed structural conformance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub entity: String,
    pub source: String,
    pub index: usize,
    pub reasons: Vec<String>,
}

/// Everything the extract phase produced.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub cities: Vec<City>,
    pub hotels: Vec<Hotel>,
    pub rejected: Vec<Rejection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub cities: usize,
    pub hotels: usize,
    pub rejected: usize,
    pub unresolved_references: Vec<i64>,
    pub duplicate_city_ids: Vec<i64>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct DirectoryReport {
    pub rows: Vec<HotelRow>,
    pub csv_output: String,
    pub tsv_output: String,
    pub summary: ReportSummary,
    pub rejected: Vec<Rejection>,
}

/// Flattened hotel joined with its city's name, one per report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelRow {
    pub hotel_id: i64,
    pub hotel_name: String,
    pub zone: String,
    pub label: String,
    pub city_id: i64,
    pub city_name: String,
}

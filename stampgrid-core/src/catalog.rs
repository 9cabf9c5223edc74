use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{LoadError, RecordError};
use crate::record::{record_from_value, StampRecord};

/// List field names tried, in order, before falling back to the first array.
const LIST_FIELDS: [&str; 3] = ["stamps", "records", "items"];

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Somewhere a catalog document can be fetched from.
pub trait CatalogSource {
    /// Human-readable name used in errors and logs.
    fn name(&self) -> String;

    /// Fetch the raw document text.
    fn fetch(&self) -> Result<String, LoadError>;
}

/// A catalog document on disk.
#[derive(Debug, Clone)]
pub struct FileSource(pub PathBuf);

impl CatalogSource for FileSource {
    fn name(&self) -> String {
        self.0.display().to_string()
    }

    fn fetch(&self) -> Result<String, LoadError> {
        std::fs::read_to_string(&self.0).map_err(|e| LoadError::Unreachable {
            source_name: self.name(),
            reason: e.to_string(),
        })
    }
}

/// A catalog document already held in memory.
#[derive(Debug, Clone, Copy)]
pub struct InlineSource<'a>(pub &'a str);

impl CatalogSource for InlineSource<'_> {
    fn name(&self) -> String {
        "<inline>".to_string()
    }

    fn fetch(&self) -> Result<String, LoadError> {
        Ok(self.0.to_string())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only, chronologically sorted set of stamp records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<StampRecord>,
    by_id: HashMap<String, usize>,
    skipped: Vec<RecordError>,
}

impl Catalog {
    /// Fetch and parse a catalog document.
    ///
    /// Individual malformed records are skipped and logged; only an
    /// unreachable source or a document without a record list is an error.
    pub fn load(source: &impl CatalogSource) -> Result<Self, LoadError> {
        let text = source.fetch()?;
        let catalog = Self::from_json(&text)?;
        info!(
            source = %source.name(),
            records = catalog.len(),
            skipped = catalog.skipped.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Parse a catalog document held in memory.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let document: Value = serde_json::from_str(text)?;
        let list = extract_list(document)?;

        let mut skipped = Vec::new();
        let mut records = Vec::with_capacity(list.len());
        for (position, value) in list.into_iter().enumerate() {
            match record_from_value(position, value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping catalog record: {e}");
                    skipped.push(e);
                }
            }
        }
        let mut catalog = Self::from_records(records);
        skipped.append(&mut catalog.skipped);
        catalog.skipped = skipped;
        Ok(catalog)
    }

    /// Build a catalog from already-validated records, sorting them into
    /// catalog order. Later duplicates of an id are dropped.
    pub fn from_records(mut records: Vec<StampRecord>) -> Self {
        records.sort_by(StampRecord::catalog_cmp);

        let mut seen = HashSet::new();
        let mut skipped = Vec::new();
        let mut kept = Vec::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            if seen.insert(record.id.clone()) {
                kept.push(record);
            } else {
                let err = RecordError::DuplicateId {
                    position,
                    id: record.id,
                };
                warn!("Skipping catalog record: {err}");
                skipped.push(err);
            }
        }

        let by_id = kept
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        Self {
            records: kept,
            by_id,
            skipped,
        }
    }

    /// Small built-in dataset shown when the real catalog cannot be loaded.
    pub fn sample() -> Self {
        Self::from_records(vec![
            StampRecord::new("1", 1840, "Queen Victoria")
                .with_sub_topic("Penny Black")
                .with_denomination("1d")
                .with_color("black"),
            StampRecord::new("2", 1840, "Queen Victoria")
                .with_sub_topic("Two Penny Blue")
                .with_denomination("2d")
                .with_color("blue"),
            StampRecord::new("3", 1851, "Beaver")
                .with_sub_topic("Three Penny Beaver")
                .with_denomination("3d")
                .with_color("red"),
            StampRecord::new("4", 1869, "Locomotive")
                .with_denomination("3c")
                .with_color("ultramarine"),
            StampRecord::new("5", 1898, "Map")
                .with_sub_topic("Imperial Penny Postage")
                .with_color("black, lavender and carmine")
                .with_notes("Christmas 1898"),
            StampRecord::new("6", 1912, "Ship")
                .with_sub_topic("Sailing vessel")
                .with_denomination("5c")
                .with_color("green"),
            StampRecord::new("7", 1935, "King George V")
                .with_sub_topic("Silver Jubilee")
                .with_denomination("10c")
                .with_color("green"),
            StampRecord::new("8", 1969, "Space")
                .with_sub_topic("Moon landing")
                .with_denomination("10c")
                .with_color("multicolored"),
        ])
    }

    /// Every record, in catalog order.
    pub fn all(&self) -> &[StampRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&StampRecord> {
        self.records.get(index)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&StampRecord> {
        self.index_of(id).map(|i| &self.records[i])
    }

    /// Position of `id` in catalog order.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct decades present, in catalog order.
    pub fn decades(&self) -> Vec<i32> {
        let mut out: Vec<i32> = Vec::new();
        for record in &self.records {
            let decade = record.decade();
            if out.last() != Some(&decade) {
                out.push(decade);
            }
        }
        out
    }

    /// Index of the first record of `decade`, if any record falls in it.
    pub fn first_index_in_decade(&self, decade: i32) -> Option<usize> {
        let pos = self.records.partition_point(|r| r.decade() < decade);
        self.records
            .get(pos)
            .filter(|r| r.decade() == decade)
            .map(|_| pos)
    }

    /// Records dropped during loading, with the reason for each.
    pub fn skipped(&self) -> &[RecordError] {
        &self.skipped
    }
}

fn extract_list(document: Value) -> Result<Vec<Value>, LoadError> {
    let Value::Object(mut map) = document else {
        return Err(LoadError::Malformed {
            reason: "document root is not an object".into(),
        });
    };
    for field in LIST_FIELDS {
        if let Some(Value::Array(list)) = map.remove(field) {
            return Ok(list);
        }
    }
    map.into_iter()
        .find_map(|(_, v)| match v {
            Value::Array(list) => Some(list),
            _ => None,
        })
        .ok_or_else(|| LoadError::Malformed {
            reason: "no record list found".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "title": "Test",
        "stamps": [
            {"id": "10", "year": 1935, "mainTopic": "King"},
            {"id": "2", "year": 1851, "mainTopic": "Beaver"},
            {"id": "9", "year": 1935, "mainTopic": "Jubilee"},
            {"id": "1", "year": 1852, "mainTopic": "Queen"},
            {"id": "x", "mainTopic": "No year"}
        ]
    }"#;

    #[test]
    fn sorts_by_year_then_natural_id() {
        let catalog = Catalog::from_json(DOC).unwrap();
        let ids: Vec<&str> = catalog.all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["2", "1", "9", "10"]);
    }

    #[test]
    fn record_without_year_is_skipped() {
        let catalog = Catalog::from_json(DOC).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.skipped().len(), 1);
        assert!(catalog.find_by_id("x").is_none());
    }

    #[test]
    fn clone_keeps_skipped_records() {
        let catalog = Catalog::from_json(DOC).unwrap();
        let copy = catalog.clone();
        assert_eq!(copy.all(), catalog.all());
        assert_eq!(copy.skipped(), catalog.skipped());
    }

    #[test]
    fn ordering_is_independent_of_input_order() {
        let a = Catalog::from_json(DOC).unwrap();
        let reversed = r#"{"stamps": [
            {"id": "1", "year": 1852, "mainTopic": "Queen"},
            {"id": "9", "year": 1935, "mainTopic": "Jubilee"},
            {"id": "2", "year": 1851, "mainTopic": "Beaver"},
            {"id": "10", "year": 1935, "mainTopic": "King"}
        ]}"#;
        let b = Catalog::from_json(reversed).unwrap();
        assert_eq!(a.all(), b.all());
    }

    #[test]
    fn find_and_index_agree() {
        let catalog = Catalog::from_json(DOC).unwrap();
        assert_eq!(catalog.index_of("9"), Some(2));
        assert_eq!(catalog.find_by_id("9").unwrap().main_topic, "Jubilee");
    }

    #[test]
    fn decades_and_first_index() {
        let catalog = Catalog::from_json(DOC).unwrap();
        assert_eq!(catalog.decades(), vec![1850, 1930]);
        assert_eq!(catalog.first_index_in_decade(1930), Some(2));
        assert_eq!(catalog.first_index_in_decade(1900), None);
    }

    #[test]
    fn falls_back_to_first_array_field() {
        let catalog = Catalog::from_json(r#"{"data": [{"id": "1", "year": 1900}]}"#).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn missing_list_is_malformed() {
        let err = Catalog::from_json(r#"{"title": "none"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
        let err = Catalog::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[test]
    fn invalid_json_is_a_load_error() {
        assert!(matches!(
            Catalog::from_json("{not json").unwrap_err(),
            LoadError::Json(_)
        ));
    }

    #[test]
    fn unreachable_file_is_a_load_error() {
        let source = FileSource(PathBuf::from("/definitely/not/here/catalog.json"));
        assert!(matches!(
            Catalog::load(&source).unwrap_err(),
            LoadError::Unreachable { .. }
        ));
    }

    #[test]
    fn duplicate_ids_keep_first_in_catalog_order() {
        let catalog = Catalog::from_json(
            r#"{"stamps": [
                {"id": "1", "year": 1900, "mainTopic": "Later"},
                {"id": "1", "year": 1890, "mainTopic": "Earlier"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find_by_id("1").unwrap().main_topic, "Earlier");
    }

    #[test]
    fn duplicate_ids_in_same_year_resolve_independent_of_input_order() {
        let forward = r#"{"stamps": [
            {"id": "1", "year": 1900, "mainTopic": "Ship", "image": "b.png"},
            {"id": "1", "year": 1900, "mainTopic": "Beaver", "image": "a.png"}
        ]}"#;
        let backward = r#"{"stamps": [
            {"id": "1", "year": 1900, "mainTopic": "Beaver", "image": "a.png"},
            {"id": "1", "year": 1900, "mainTopic": "Ship", "image": "b.png"}
        ]}"#;
        let a = Catalog::from_json(forward).unwrap();
        let b = Catalog::from_json(backward).unwrap();
        assert_eq!(a.all(), b.all());
        assert_eq!(a.find_by_id("1").unwrap().main_topic, "Beaver");
        assert_eq!(a.skipped().len(), 1);
    }

    #[test]
    fn empty_list_is_an_empty_catalog() {
        let catalog = Catalog::from_json(r#"{"stamps": []}"#).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.decades().is_empty());
    }

    #[test]
    fn sample_is_sorted_and_non_empty() {
        let sample = Catalog::sample();
        assert!(!sample.is_empty());
        assert!(sample
            .all()
            .windows(2)
            .all(|w| w[0].catalog_cmp(&w[1]).is_le()));
    }
}

//! Population table and schema metadata.
//!
//! K_i: The population is an ordered collection of uniquely keyed records
//! sharing one schema. Every partition handed to the linkage game is a
//! `Dataset` carved out of the loaded population; nothing mutates a dataset
//! after construction.

mod loader;

pub use loader::load_local;

use crate::models::{LinkriskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Unique record identifier within a population.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Attribute type and domain, as declared by the metadata file.
///
/// K_i: the metadata describes every attribute present in every record;
/// the loader rejects data that falls outside a declared domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColumnKind {
    /// Finite set of category labels
    Categorical { categories: Vec<String> },
    /// Integer range [min, max]
    Integer { min: i64, max: i64 },
    /// Continuous range [min, max]
    Float { min: f64, max: f64 },
}

/// One column of the shared schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

/// Schema descriptor shared by all records of a population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub columns: Vec<ColumnMeta>,
}

impl Metadata {
    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One population record: a unique key plus one value per schema column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub values: Vec<Value>,
}

/// Row-indexed table keyed by unique record identifier.
///
/// Row order is preserved from construction; `by_id` gives O(1) key lookup.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
    by_id: HashMap<RecordId, usize>,
}

impl Dataset {
    /// Build a dataset, enforcing key uniqueness.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (row, record) in records.iter().enumerate() {
            if record.values.len() != columns.len() {
                return Err(LinkriskError::data(format!(
                    "record '{}' has {} values but the schema has {} columns",
                    record.id,
                    record.values.len(),
                    columns.len()
                )));
            }
            if by_id.insert(record.id.clone(), row).is_some() {
                return Err(LinkriskError::data(format!(
                    "duplicate record identifier '{}'",
                    record.id
                )));
            }
        }
        Ok(Self {
            columns,
            records,
            by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.by_id.get(id).map(|&row| &self.records[row])
    }

    /// Record identifiers in row order.
    pub fn index(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Materialize the rows at `ids`, in the order given.
    ///
    /// B_i(every id present) → Result: a missing id is a data-consistency
    /// failure, never a silently shorter result.
    pub fn select(&self, ids: &[RecordId]) -> Result<Dataset> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let record = self.get(id).ok_or_else(|| {
                LinkriskError::data(format!("record '{id}' not in dataset index"))
            })?;
            records.push(record.clone());
        }
        Dataset::new(self.columns.clone(), records)
    }

    /// All rows except those at `ids`, preserving row order.
    pub fn drop_ids(&self, ids: &[RecordId]) -> Result<Dataset> {
        let dropped: HashSet<&RecordId> = ids.iter().collect();
        let records = self
            .records
            .iter()
            .filter(|r| !dropped.contains(&r.id))
            .cloned()
            .collect();
        Dataset::new(self.columns.clone(), records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: usize) -> Dataset {
        let records = (0..n)
            .map(|i| Record {
                id: RecordId::from(format!("r{i}")),
                values: vec![Value::Int(i as i64)],
            })
            .collect();
        Dataset::new(vec!["x".to_string()], records).unwrap()
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let records = vec![
            Record {
                id: RecordId::from("a"),
                values: vec![Value::Int(1)],
            },
            Record {
                id: RecordId::from("a"),
                values: vec![Value::Int(2)],
            },
        ];
        let err = Dataset::new(vec!["x".to_string()], records).unwrap_err();
        assert!(matches!(err, LinkriskError::DataConsistency(_)));
    }

    #[test]
    fn test_select_preserves_requested_order() {
        let ds = dataset(5);
        let picked = ds
            .select(&[RecordId::from("r3"), RecordId::from("r1")])
            .unwrap();
        assert_eq!(picked.index(), vec![RecordId::from("r3"), RecordId::from("r1")]);
    }

    #[test]
    fn test_select_missing_id_fails() {
        let ds = dataset(3);
        let err = ds.select(&[RecordId::from("nope")]).unwrap_err();
        assert!(matches!(err, LinkriskError::DataConsistency(_)));
    }

    #[test]
    fn test_drop_ids_is_complement() {
        let ds = dataset(5);
        let dropped = [RecordId::from("r0"), RecordId::from("r4")];
        let rest = ds.drop_ids(&dropped).unwrap();
        assert_eq!(rest.len(), 3);
        for id in &dropped {
            assert!(!rest.contains(id));
        }
    }
}

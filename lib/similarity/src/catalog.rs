//! Ordered, read-only entity catalog keyed by name

use crate::constants::NormalizationConstants;
use crate::record::EntityRecord;
use ahash::AHashMap;
use dexsim_core::{Error, Result};

/// The closed set of entities, in feed order
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<EntityRecord>,
    positions: AHashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, validating every record against `constants`
    pub fn new(records: Vec<EntityRecord>, constants: &NormalizationConstants) -> Result<Self> {
        let mut positions = AHashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            record.validate(constants)?;
            if positions.insert(record.name.clone(), position).is_some() {
                return Err(Error::DuplicateEntity(record.name.clone()));
            }
        }
        Ok(Self { records, positions })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EntityRecord> {
        self.position(name).map(|p| &self.records[p])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn records(&self) -> &[EntityRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.iter()
    }
}

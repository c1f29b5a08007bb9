//! Catalog entity records
//!
//! One [`EntityRecord`] per catalog entry, as produced by the offline parse
//! step. Records are validated once at load and never mutated afterwards.

use crate::constants::NormalizationConstants;
use dexsim_core::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of base stats every record carries
pub const STAT_COUNT: usize = 6;

/// A catalog entry with its raw attributes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityRecord {
    /// API id, used by the front end for sprites
    #[serde(default)]
    pub id: u32,
    /// Unique join key across catalog and embedding feeds
    pub name: String,
    #[serde(default)]
    pub species_name: String,
    pub order: i32,
    pub pokedex_number: u32,
    pub species_index: u32,
    /// Grams
    pub weight: u32,
    /// Decimeters
    pub height: u32,
    pub stats: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_total: Option<u32>,
    /// 1-indexed type ids, primary first
    pub types: Vec<usize>,
    pub generation: u32,
    /// Egg group ids, used directly as slot positions
    #[serde(alias = "eggGroups")]
    pub egg_groups: Vec<usize>,
    /// 0 means unknown
    pub color: usize,
    /// 0 means unknown
    #[serde(default)]
    pub habitat: usize,
    /// 0 means unknown
    #[serde(default)]
    pub shape: usize,
    #[serde(deserialize_with = "flag")]
    pub is_baby: bool,
    #[serde(deserialize_with = "flag")]
    pub is_legendary: bool,
    #[serde(deserialize_with = "flag")]
    pub is_mythical: bool,
    pub evolution_chain: u32,
    #[serde(default)]
    pub genus: String,
}

/// Accepts `true`/`false` as well as the `0`/`1` integers the parser emits
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

impl EntityRecord {
    /// Check the record against the category counts it will be vectorized with
    pub fn validate(&self, constants: &NormalizationConstants) -> Result<()> {
        let invalid = |reason: String| Error::InvalidRecord {
            name: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("empty name".to_string()));
        }
        if self.stats.len() != STAT_COUNT {
            return Err(invalid(format!(
                "expected {} stats, got {}",
                STAT_COUNT,
                self.stats.len()
            )));
        }
        if self.types.is_empty() || self.types.len() > 2 {
            return Err(invalid(format!("expected 1-2 types, got {}", self.types.len())));
        }
        if let Some(t) = self
            .types
            .iter()
            .find(|&&t| t == 0 || t > constants.n_types)
        {
            return Err(invalid(format!("type id {} out of range", t)));
        }
        if let Some(g) = self.egg_groups.iter().find(|&&g| g >= constants.n_egg_groups) {
            return Err(invalid(format!("egg group id {} out of range", g)));
        }

        let singles = [
            ("color", self.color, constants.n_colors),
            ("habitat", self.habitat, constants.n_habitats),
            ("shape", self.shape, constants.n_shapes),
        ];
        for (field, value, count) in singles {
            if value >= count {
                return Err(invalid(format!("{} id {} out of range", field, value)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Bulbasaur as emitted by the parser, legacy keys included
    pub(crate) fn bulbasaur_json() -> serde_json::Value {
        json!({
            "id": 1,
            "order": 1,
            "pokedex_number": 1,
            "species_index": 1,
            "name": "bulbasaur",
            "species_name": "bulbasaur",
            "weight": 69,
            "height": 7,
            "stats": [45, 49, 49, 65, 65, 45],
            "stat_total": 318,
            "types": [12, 4],
            "generation": 1,
            "eggGroups": [1, 7],
            "color": 5,
            "is_baby": 0,
            "is_legendary": 0,
            "is_mythical": 0,
            "evolution_chain": 1,
            "genus": "Seed Pokémon",
            "habitat": 3,
            "shape": 8
        })
    }

    pub(crate) fn bulbasaur() -> EntityRecord {
        serde_json::from_value(bulbasaur_json()).unwrap()
    }

    #[test]
    fn test_parses_parser_output() {
        let record = bulbasaur();
        assert_eq!(record.name, "bulbasaur");
        assert_eq!(record.egg_groups, vec![1, 7]);
        assert!(!record.is_baby);
        assert_eq!(record.types, vec![12, 4]);
        assert!(record.validate(&NormalizationConstants::reference()).is_ok());
    }

    #[test]
    fn test_flags_accept_booleans() {
        let mut value = bulbasaur_json();
        value["is_legendary"] = json!(true);
        value["is_mythical"] = json!(1);
        let record: EntityRecord = serde_json::from_value(value).unwrap();
        assert!(record.is_legendary);
        assert!(record.is_mythical);
        assert!(!record.is_baby);
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        let constants = NormalizationConstants::reference();

        let mut record = bulbasaur();
        record.types = vec![];
        assert!(matches!(record.validate(&constants), Err(Error::InvalidRecord { .. })));

        let mut record = bulbasaur();
        record.types = vec![0];
        assert!(record.validate(&constants).is_err());

        let mut record = bulbasaur();
        record.stats.pop();
        assert!(record.validate(&constants).is_err());

        let mut record = bulbasaur();
        record.color = constants.n_colors;
        let err = record.validate(&constants).unwrap_err();
        assert!(err.to_string().contains("color"));
    }
}

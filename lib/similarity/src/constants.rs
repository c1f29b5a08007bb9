//! Corpus-wide normalization constants and category labels
//!
//! The constants are computed once from the full catalog (or loaded from a
//! file) and passed to every vectorizer call of a deployment.

use crate::record::EntityRecord;
use dexsim_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Upper bound of a single base stat
pub const STAT_MAX: u32 = 255;

/// Maxima and category counts used to scale attribute vectors.
///
/// Category counts include the reserved `0` slot, so a category with ids
/// `1..=10` has a count of 11.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalizationConstants {
    pub max_order: u32,
    pub max_pokedex_number: u32,
    pub n_generations: u32,
    pub max_weight: u32,
    pub max_height: u32,
    pub n_types: usize,
    pub n_egg_groups: usize,
    pub n_colors: usize,
    pub n_habitats: usize,
    pub n_shapes: usize,
}

impl Default for NormalizationConstants {
    fn default() -> Self {
        Self::reference()
    }
}

impl NormalizationConstants {
    /// Values for the full national catalog
    pub const fn reference() -> Self {
        Self {
            max_order: 1109,
            max_pokedex_number: 1025,
            n_generations: 10,
            max_weight: 10000,
            max_height: 1000,
            n_types: 19,
            n_egg_groups: 16,
            n_colors: 11,
            n_habitats: 10,
            n_shapes: 15,
        }
    }

    /// Derive constants from a catalog.
    ///
    /// Maxima come straight from the records. Category counts are the largest
    /// id seen plus one, never smaller than the reference counts so that a
    /// partial catalog keeps the same vector layout.
    pub fn from_catalog(records: &[EntityRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::InvalidConfig(
                "cannot derive normalization constants from an empty catalog".to_string(),
            ));
        }

        let reference = Self::reference();
        let max_of = |f: fn(&EntityRecord) -> usize| records.iter().map(f).max().unwrap_or(0);

        let constants = Self {
            max_order: max_of(|r| r.order.max(0) as usize) as u32,
            max_pokedex_number: max_of(|r| r.pokedex_number as usize) as u32,
            n_generations: (max_of(|r| r.generation as usize) as u32 + 1)
                .max(reference.n_generations),
            max_weight: max_of(|r| r.weight as usize) as u32,
            max_height: max_of(|r| r.height as usize) as u32,
            n_types: (max_of(|r| r.types.iter().copied().max().unwrap_or(0)) + 1)
                .max(reference.n_types),
            n_egg_groups: (max_of(|r| r.egg_groups.iter().copied().max().unwrap_or(0)) + 1)
                .max(reference.n_egg_groups),
            n_colors: (max_of(|r| r.color) + 1).max(reference.n_colors),
            n_habitats: (max_of(|r| r.habitat) + 1).max(reference.n_habitats),
            n_shapes: (max_of(|r| r.shape) + 1).max(reference.n_shapes),
        };
        constants.validate()?;
        Ok(constants)
    }

    /// Every divisor must be non-zero
    pub fn validate(&self) -> Result<()> {
        let maxima = [
            ("max_order", self.max_order),
            ("max_pokedex_number", self.max_pokedex_number),
            ("n_generations", self.n_generations),
            ("max_weight", self.max_weight),
            ("max_height", self.max_height),
        ];
        for (name, value) in maxima {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be positive", name)));
            }
        }

        let counts = [
            ("n_types", self.n_types),
            ("n_egg_groups", self.n_egg_groups),
            ("n_colors", self.n_colors),
            ("n_habitats", self.n_habitats),
            ("n_shapes", self.n_shapes),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}

/// Human-readable names for each category id, index = id - 1
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryLabels {
    pub types: Vec<String>,
    pub egg_groups: Vec<String>,
    pub colors: Vec<String>,
    pub habitats: Vec<String>,
    pub shapes: Vec<String>,
}

impl Default for CategoryLabels {
    fn default() -> Self {
        Self::reference()
    }
}

impl CategoryLabels {
    pub fn reference() -> Self {
        let owned = |names: &[&str]| -> Vec<String> { names.iter().map(|s| s.to_string()).collect() };
        Self {
            types: owned(&[
                "normal", "fighting", "flying", "poison", "ground", "rock", "bug", "ghost",
                "steel", "fire", "water", "grass", "electric", "psychic", "ice", "dragon",
                "dark", "fairy",
            ]),
            egg_groups: owned(&[
                "monster", "water1", "bug", "flying", "ground", "fairy", "plant", "humanshape",
                "water3", "mineral", "indeterminate", "water2", "ditto", "dragon", "no-eggs",
            ]),
            colors: owned(&[
                "black", "blue", "brown", "gray", "green", "pink", "purple", "red", "white",
                "yellow",
            ]),
            habitats: owned(&[
                "cave", "forest", "grassland", "mountain", "rare", "rough-terrain", "sea",
                "urban", "waters-edge",
            ]),
            shapes: owned(&[
                "ball", "squiggle", "fish", "arms", "blob", "upright", "legs", "quadruped",
                "wings", "tentacles", "heads", "humanoid", "bug-wings", "armor",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::bulbasaur;

    #[test]
    fn test_reference_counts_match_labels() {
        let constants = NormalizationConstants::reference();
        let labels = CategoryLabels::reference();

        assert_eq!(constants.n_types, labels.types.len() + 1);
        assert_eq!(constants.n_egg_groups, labels.egg_groups.len() + 1);
        assert_eq!(constants.n_colors, labels.colors.len() + 1);
        assert_eq!(constants.n_habitats, labels.habitats.len() + 1);
        assert_eq!(constants.n_shapes, labels.shapes.len() + 1);
        assert!(constants.validate().is_ok());
    }

    #[test]
    fn test_from_catalog_takes_maxima() {
        let mut heavy = bulbasaur();
        heavy.name = "snorlax".to_string();
        heavy.weight = 4600;
        heavy.height = 21;
        heavy.order = 230;
        heavy.pokedex_number = 143;

        let constants = NormalizationConstants::from_catalog(&[bulbasaur(), heavy]).unwrap();
        assert_eq!(constants.max_weight, 4600);
        assert_eq!(constants.max_height, 21);
        assert_eq!(constants.max_order, 230);
        assert_eq!(constants.max_pokedex_number, 143);
        // Small catalogs keep the reference layout
        assert_eq!(constants.n_types, 19);
        assert_eq!(constants.n_generations, 10);
    }

    #[test]
    fn test_from_catalog_grows_category_counts() {
        let mut record = bulbasaur();
        record.types = vec![25];
        let constants = NormalizationConstants::from_catalog(&[record]).unwrap();
        assert_eq!(constants.n_types, 26);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(NormalizationConstants::from_catalog(&[]).is_err());
    }

    #[test]
    fn test_zero_maximum_rejected() {
        let mut constants = NormalizationConstants::reference();
        constants.max_height = 0;
        let err = constants.validate().unwrap_err();
        assert!(err.to_string().contains("max_height"));
    }
}

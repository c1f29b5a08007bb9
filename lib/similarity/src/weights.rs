//! Attribute groups and per-query group weights
//!
//! A [`GroupWeights`] value decides which groups take part in a composite
//! space and how strongly each one pulls. Groups with weight `<= 0` are left
//! out of the space entirely.

use dexsim_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One block of the composite vector.
///
/// Declaration order is the canonical concatenation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Image,
    Text,
    Pokedex,
    Size,
    Types,
    EggGroups,
    Color,
    Habitat,
    Shape,
    EvolutionChain,
    Booleans,
    Stats,
}

impl Group {
    /// Every group in canonical order
    pub const ALL: [Group; 12] = [
        Group::Image,
        Group::Text,
        Group::Pokedex,
        Group::Size,
        Group::Types,
        Group::EggGroups,
        Group::Color,
        Group::Habitat,
        Group::Shape,
        Group::EvolutionChain,
        Group::Booleans,
        Group::Stats,
    ];

    /// Groups computed from catalog attributes, in canonical order
    pub const ATTRIBUTES: [Group; 10] = [
        Group::Pokedex,
        Group::Size,
        Group::Types,
        Group::EggGroups,
        Group::Color,
        Group::Habitat,
        Group::Shape,
        Group::EvolutionChain,
        Group::Booleans,
        Group::Stats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Image => "image",
            Group::Text => "text",
            Group::Pokedex => "pokedex",
            Group::Size => "size",
            Group::Types => "types",
            Group::EggGroups => "egg_groups",
            Group::Color => "color",
            Group::Habitat => "habitat",
            Group::Shape => "shape",
            Group::EvolutionChain => "evolution_chain",
            Group::Booleans => "booleans",
            Group::Stats => "stats",
        }
    }

    /// True for groups backed by an external embedding feed
    pub fn is_embedding(&self) -> bool {
        matches!(self, Group::Image | Group::Text)
    }
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Group {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Group::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown group: {}", s)))
    }
}

/// Weight per group.
///
/// Deserializes from `{"image": 0.2, ...}` as well as the legacy
/// `{"image_strength": 0.2, ...}` request keys. Missing groups take the
/// baseline weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupWeights {
    #[serde(alias = "image_strength")]
    pub image: f32,
    #[serde(alias = "text_strength")]
    pub text: f32,
    #[serde(alias = "pokedex_strength")]
    pub pokedex: f32,
    #[serde(alias = "size_strength")]
    pub size: f32,
    #[serde(alias = "types_strength")]
    pub types: f32,
    #[serde(alias = "egg_groups_strength")]
    pub egg_groups: f32,
    #[serde(alias = "color_strength")]
    pub color: f32,
    #[serde(alias = "habitat_strength")]
    pub habitat: f32,
    #[serde(alias = "shape_strength")]
    pub shape: f32,
    #[serde(alias = "evolution_chain_strength")]
    pub evolution_chain: f32,
    #[serde(alias = "booleans_strength")]
    pub booleans: f32,
    #[serde(alias = "stats_strength")]
    pub stats: f32,
}

impl Default for GroupWeights {
    fn default() -> Self {
        Self {
            image: 0.2,
            text: 0.25,
            pokedex: 1.5,
            size: 1.0,
            types: 1.5,
            egg_groups: 1.0,
            color: 1.0,
            habitat: 1.0,
            shape: 1.0,
            evolution_chain: 1.5,
            booleans: 1.0,
            stats: 1.0,
        }
    }
}

impl GroupWeights {
    /// Every group at the same weight
    pub fn uniform(weight: f32) -> Self {
        let mut weights = Self::default();
        for group in Group::ALL {
            weights.set(group, weight);
        }
        weights
    }

    /// All groups disabled
    pub fn none() -> Self {
        Self::uniform(0.0)
    }

    /// A single group at `weight`, everything else disabled
    pub fn only(group: Group, weight: f32) -> Self {
        Self::none().with(group, weight)
    }

    #[must_use]
    pub fn with(mut self, group: Group, weight: f32) -> Self {
        self.set(group, weight);
        self
    }

    pub fn get(&self, group: Group) -> f32 {
        match group {
            Group::Image => self.image,
            Group::Text => self.text,
            Group::Pokedex => self.pokedex,
            Group::Size => self.size,
            Group::Types => self.types,
            Group::EggGroups => self.egg_groups,
            Group::Color => self.color,
            Group::Habitat => self.habitat,
            Group::Shape => self.shape,
            Group::EvolutionChain => self.evolution_chain,
            Group::Booleans => self.booleans,
            Group::Stats => self.stats,
        }
    }

    pub fn set(&mut self, group: Group, weight: f32) {
        let slot = match group {
            Group::Image => &mut self.image,
            Group::Text => &mut self.text,
            Group::Pokedex => &mut self.pokedex,
            Group::Size => &mut self.size,
            Group::Types => &mut self.types,
            Group::EggGroups => &mut self.egg_groups,
            Group::Color => &mut self.color,
            Group::Habitat => &mut self.habitat,
            Group::Shape => &mut self.shape,
            Group::EvolutionChain => &mut self.evolution_chain,
            Group::Booleans => &mut self.booleans,
            Group::Stats => &mut self.stats,
        };
        *slot = weight;
    }

    pub fn is_enabled(&self, group: Group) -> bool {
        self.get(group) > 0.0
    }

    /// Enabled groups with their weights, in canonical order
    pub fn enabled(&self) -> impl Iterator<Item = (Group, f32)> + '_ {
        Group::ALL
            .into_iter()
            .map(|g| (g, self.get(g)))
            .filter(|(_, w)| *w > 0.0)
    }

    pub fn any_enabled(&self) -> bool {
        self.enabled().next().is_some()
    }

    /// Reject NaN and infinite weights. Negative weights are allowed and disable the group.
    pub fn validate(&self) -> Result<()> {
        for group in Group::ALL {
            let weight = self.get(group);
            if !weight.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "weight for '{}' must be finite, got {}",
                    group, weight
                )));
            }
        }
        Ok(())
    }

    /// Bit pattern identifying the composite space these weights produce.
    ///
    /// All disabled weights collapse to the same key.
    pub fn cache_key(&self) -> [u32; 12] {
        Group::ALL.map(|g| {
            let w = self.get(g);
            if w > 0.0 {
                w.to_bits()
            } else {
                0
            }
        })
    }

    /// Weights as a group-name map
    pub fn to_map(&self) -> BTreeMap<Group, f32> {
        Group::ALL.into_iter().map(|g| (g, self.get(g))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_weights() {
        let weights = GroupWeights::default();
        assert_eq!(weights.get(Group::Image), 0.2);
        assert_eq!(weights.get(Group::Text), 0.25);
        assert_eq!(weights.get(Group::Pokedex), 1.5);
        assert_eq!(weights.get(Group::Types), 1.5);
        assert_eq!(weights.get(Group::EvolutionChain), 1.5);
        for group in [
            Group::Size,
            Group::EggGroups,
            Group::Color,
            Group::Habitat,
            Group::Shape,
            Group::Booleans,
            Group::Stats,
        ] {
            assert_eq!(weights.get(group), 1.0, "{}", group);
        }
    }

    #[test]
    fn test_enabled_skips_non_positive() {
        let weights = GroupWeights::none()
            .with(Group::Stats, 2.0)
            .with(Group::Image, 0.5)
            .with(Group::Color, -1.0);
        let enabled: Vec<Group> = weights.enabled().map(|(g, _)| g).collect();
        assert_eq!(enabled, vec![Group::Image, Group::Stats]);
        assert!(!GroupWeights::none().any_enabled());
    }

    #[test]
    fn test_deserialize_partial_and_legacy_keys() {
        let weights: GroupWeights =
            serde_json::from_str(r#"{"types": 3.0, "image_strength": 0.0}"#).unwrap();
        assert_eq!(weights.types, 3.0);
        assert_eq!(weights.image, 0.0);
        // Untouched groups keep the baseline
        assert_eq!(weights.text, 0.25);
    }

    #[test]
    fn test_serialize_uses_group_names() {
        let json = serde_json::to_value(GroupWeights::default()).unwrap();
        for group in Group::ALL {
            assert!(json.get(group.as_str()).is_some(), "missing {}", group);
        }
    }

    #[test]
    fn test_validate_rejects_nan() {
        let weights = GroupWeights::default().with(Group::Size, f32::NAN);
        assert!(matches!(weights.validate(), Err(Error::InvalidConfig(_))));
        assert!(GroupWeights::default().with(Group::Size, -3.0).validate().is_ok());
    }

    #[test]
    fn test_cache_key_collapses_disabled() {
        let a = GroupWeights::only(Group::Types, 1.0).with(Group::Color, -2.0);
        let b = GroupWeights::only(Group::Types, 1.0);
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), GroupWeights::only(Group::Types, 1.5).cache_key());
    }

    #[test]
    fn test_group_round_trip_through_str() {
        for group in Group::ALL {
            assert_eq!(group.as_str().parse::<Group>().unwrap(), group);
        }
        assert!("legs".parse::<Group>().is_err());
    }
}

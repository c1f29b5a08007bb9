//! Attribute vectorizer
//!
//! One pure function per attribute group, each mapping an [`EntityRecord`] to
//! a vector whose width depends only on the [`NormalizationConstants`].

use crate::constants::{NormalizationConstants, STAT_MAX};
use crate::record::{EntityRecord, STAT_COUNT};
use crate::weights::Group;
use dexsim_core::Vector;
use sha2::{Digest, Sha256};

pub const POKEDEX_DIM: usize = 3;
pub const SIZE_DIM: usize = 2;
pub const EVOLUTION_CHAIN_DIM: usize = 16;
pub const BOOLEANS_DIM: usize = 3;
pub const STATS_DIM: usize = STAT_COUNT;

/// `ln(value + 1) / ln(max + 1)`, in `[0, 1]` for `value` in `[0, max]`
#[inline]
pub fn log_normalize(value: u32, max: u32) -> f32 {
    ((f64::from(value) + 1.0).ln() / (f64::from(max) + 1.0).ln()) as f32
}

/// `[order, pokedex_number, generation]`, each divided by its corpus constant
pub fn pokedex_vector(record: &EntityRecord, constants: &NormalizationConstants) -> Vec<f32> {
    vec![
        (f64::from(record.order) / f64::from(constants.max_order)) as f32,
        (f64::from(record.pokedex_number) / f64::from(constants.max_pokedex_number)) as f32,
        (f64::from(record.generation) / f64::from(constants.n_generations)) as f32,
    ]
}

/// Log-normalized `[weight, height]`
pub fn size_vector(record: &EntityRecord, constants: &NormalizationConstants) -> Vec<f32> {
    vec![
        log_normalize(record.weight, constants.max_weight),
        log_normalize(record.height, constants.max_height),
    ]
}

/// Two one-hot blocks of `n_types`: primary type, then secondary (or zeros)
pub fn types_vector(record: &EntityRecord, constants: &NormalizationConstants) -> Vec<f32> {
    let n = constants.n_types;
    let mut v = vec![0.0; 2 * n];
    for (slot, &type_id) in record.types.iter().take(2).enumerate() {
        // ids are 1-indexed
        if let Some(position) = type_id.checked_sub(1).filter(|&p| p < n) {
            v[slot * n + position] = 1.0;
        }
    }
    v
}

/// Multi-hot over egg group ids
pub fn egg_groups_vector(record: &EntityRecord, constants: &NormalizationConstants) -> Vec<f32> {
    multi_hot(&record.egg_groups, constants.n_egg_groups)
}

pub fn color_vector(record: &EntityRecord, constants: &NormalizationConstants) -> Vec<f32> {
    multi_hot(&[record.color], constants.n_colors)
}

pub fn habitat_vector(record: &EntityRecord, constants: &NormalizationConstants) -> Vec<f32> {
    multi_hot(&[record.habitat], constants.n_habitats)
}

pub fn shape_vector(record: &EntityRecord, constants: &NormalizationConstants) -> Vec<f32> {
    multi_hot(&[record.shape], constants.n_shapes)
}

fn multi_hot(ids: &[usize], width: usize) -> Vec<f32> {
    let mut v = vec![0.0; width];
    for &id in ids {
        if let Some(slot) = v.get_mut(id) {
            *slot = 1.0;
        }
    }
    v
}

pub fn evolution_chain_vector(record: &EntityRecord) -> Vec<f32> {
    evolution_fingerprint(record.evolution_chain)
}

/// 16-bit fingerprint of an evolution chain id.
///
/// SHA-256 of the decimal id; the last two digest bytes form a big-endian
/// `u16` whose bits are emitted most significant first.
pub fn evolution_fingerprint(chain_id: u32) -> Vec<f32> {
    let digest = Sha256::digest(chain_id.to_string().as_bytes());
    let low = u16::from_be_bytes([digest[30], digest[31]]);
    (0..EVOLUTION_CHAIN_DIM)
        .rev()
        .map(|bit| f32::from((low >> bit) & 1))
        .collect()
}

/// `[is_legendary, is_mythical, is_baby]`
pub fn booleans_vector(record: &EntityRecord) -> Vec<f32> {
    let as_f32 = |b: bool| if b { 1.0 } else { 0.0 };
    vec![
        as_f32(record.is_legendary),
        as_f32(record.is_mythical),
        as_f32(record.is_baby),
    ]
}

/// Log-normalized base stats, one per stat the record carries
pub fn stats_vector(record: &EntityRecord) -> Vec<f32> {
    record
        .stats
        .iter()
        .map(|&stat| log_normalize(stat, STAT_MAX))
        .collect()
}

/// Width of an attribute group; `None` for embedding groups
pub fn attribute_width(group: Group, constants: &NormalizationConstants) -> Option<usize> {
    let width = match group {
        Group::Image | Group::Text => return None,
        Group::Pokedex => POKEDEX_DIM,
        Group::Size => SIZE_DIM,
        Group::Types => 2 * constants.n_types,
        Group::EggGroups => constants.n_egg_groups,
        Group::Color => constants.n_colors,
        Group::Habitat => constants.n_habitats,
        Group::Shape => constants.n_shapes,
        Group::EvolutionChain => EVOLUTION_CHAIN_DIM,
        Group::Booleans => BOOLEANS_DIM,
        Group::Stats => STATS_DIM,
    };
    Some(width)
}

/// Vectorize one attribute group; `None` for embedding groups
pub fn attribute_group_vector(
    group: Group,
    record: &EntityRecord,
    constants: &NormalizationConstants,
) -> Option<Vec<f32>> {
    let v = match group {
        Group::Image | Group::Text => return None,
        Group::Pokedex => pokedex_vector(record, constants),
        Group::Size => size_vector(record, constants),
        Group::Types => types_vector(record, constants),
        Group::EggGroups => egg_groups_vector(record, constants),
        Group::Color => color_vector(record, constants),
        Group::Habitat => habitat_vector(record, constants),
        Group::Shape => shape_vector(record, constants),
        Group::EvolutionChain => evolution_chain_vector(record),
        Group::Booleans => booleans_vector(record),
        Group::Stats => stats_vector(record),
    };
    Some(v)
}

/// Total width of [`attribute_vector`]
pub fn attribute_vector_dim(constants: &NormalizationConstants) -> usize {
    Group::ATTRIBUTES
        .iter()
        .filter_map(|&g| attribute_width(g, constants))
        .sum()
}

/// Every attribute group at unit weight, in canonical order
pub fn attribute_vector(record: &EntityRecord, constants: &NormalizationConstants) -> Vector {
    let mut v = Vector::with_capacity(attribute_vector_dim(constants));
    for group in Group::ATTRIBUTES {
        if let Some(part) = attribute_group_vector(group, record, constants) {
            v.extend_scaled(&part, 1.0);
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::bulbasaur;

    fn constants() -> NormalizationConstants {
        NormalizationConstants::reference()
    }

    fn ones(v: &[f32]) -> Vec<usize> {
        v.iter()
            .enumerate()
            .filter(|&(_, &x)| x == 1.0)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_widths_are_fixed() {
        let c = constants();
        let mut single_type = bulbasaur();
        single_type.types = vec![10];
        single_type.egg_groups = vec![];

        for record in [bulbasaur(), single_type] {
            for group in Group::ATTRIBUTES {
                let v = attribute_group_vector(group, &record, &c).unwrap();
                assert_eq!(Some(v.len()), attribute_width(group, &c), "{}", group);
            }
        }
        assert_eq!(attribute_width(Group::Types, &c), Some(38));
        assert_eq!(attribute_width(Group::Image, &c), None);
    }

    #[test]
    fn test_attribute_vector_dim() {
        let c = constants();
        // 3 + 2 + 38 + 16 + 11 + 10 + 15 + 16 + 3 + 6
        assert_eq!(attribute_vector_dim(&c), 120);
        assert_eq!(attribute_vector(&bulbasaur(), &c).dim(), 120);
    }

    #[test]
    fn test_pokedex_vector() {
        let v = pokedex_vector(&bulbasaur(), &constants());
        assert!((v[0] - 1.0 / 1109.0).abs() < 1e-7);
        assert!((v[1] - 1.0 / 1025.0).abs() < 1e-7);
        assert!((v[2] - 0.1).abs() < 1e-7);
    }

    #[test]
    fn test_size_vector_is_log_normalized() {
        let c = constants();
        let v = size_vector(&bulbasaur(), &c);
        let expected_weight = (70.0f64.ln() / 10001.0f64.ln()) as f32;
        let expected_height = (8.0f64.ln() / 1001.0f64.ln()) as f32;
        assert!((v[0] - expected_weight).abs() < 1e-6);
        assert!((v[1] - expected_height).abs() < 1e-6);

        assert_eq!(log_normalize(0, 100), 0.0);
        assert!((log_normalize(100, 100) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_types_vector_shifts_ids() {
        let c = constants();
        let v = types_vector(&bulbasaur(), &c);
        // grass (12) in the primary block, poison (4) in the secondary block
        assert_eq!(ones(&v), vec![11, 19 + 3]);

        let mut mono = bulbasaur();
        mono.types = vec![1];
        let v = types_vector(&mono, &c);
        assert_eq!(ones(&v), vec![0]);
        assert_eq!(v.len(), 38);
    }

    #[test]
    fn test_categorical_one_hots() {
        let c = constants();
        let record = bulbasaur();
        assert_eq!(ones(&egg_groups_vector(&record, &c)), vec![1, 7]);
        assert_eq!(ones(&color_vector(&record, &c)), vec![5]);
        assert_eq!(ones(&habitat_vector(&record, &c)), vec![3]);
        assert_eq!(ones(&shape_vector(&record, &c)), vec![8]);

        let mut unknown = record.clone();
        unknown.habitat = 0;
        assert_eq!(ones(&habitat_vector(&unknown, &c)), vec![0]);
    }

    #[test]
    fn test_out_of_range_ids_do_not_panic() {
        let c = constants();
        let mut record = bulbasaur();
        record.color = 99;
        record.types = vec![0, 200];
        assert!(ones(&color_vector(&record, &c)).is_empty());
        assert!(ones(&types_vector(&record, &c)).is_empty());
    }

    #[test]
    fn test_evolution_fingerprint_bits() {
        // sha256("1") ends in 0x5b4b
        let expected: Vec<f32> = [0, 1, 0, 1, 1, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1]
            .iter()
            .map(|&b| b as f32)
            .collect();
        assert_eq!(evolution_fingerprint(1), expected);
        assert_eq!(evolution_chain_vector(&bulbasaur()), expected);
    }

    #[test]
    fn test_evolution_fingerprint_is_deterministic() {
        for id in [1, 2, 67, 476, 549] {
            let first = evolution_fingerprint(id);
            assert_eq!(first, evolution_fingerprint(id));
            assert_eq!(first.len(), EVOLUTION_CHAIN_DIM);
            assert!(first.iter().all(|&b| b == 0.0 || b == 1.0));
        }
        assert_ne!(evolution_fingerprint(1), evolution_fingerprint(2));
    }

    #[test]
    fn test_booleans_order() {
        let mut record = bulbasaur();
        record.is_mythical = true;
        assert_eq!(booleans_vector(&record), vec![0.0, 1.0, 0.0]);
        record.is_baby = true;
        record.is_legendary = true;
        assert_eq!(booleans_vector(&record), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_stats_vector() {
        let mut record = bulbasaur();
        record.stats = vec![0, 255, 45, 49, 65, 45];
        let v = stats_vector(&record);
        assert_eq!(v.len(), 6);
        assert_eq!(v[0], 0.0);
        assert!((v[1] - 1.0).abs() < 1e-6);
        assert!(v[2] > 0.0 && v[2] < 1.0);

        // no padding: a short stat line keeps its own width
        record.stats.truncate(4);
        assert_eq!(stats_vector(&record).len(), 4);
    }
}

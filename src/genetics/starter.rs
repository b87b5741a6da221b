//! Founder genomes
//!
//! The canonical starter brain is hand-tuned so a lone founder on rich ground
//! eats, divides and spreads. Its genes read these senses:
//! 13 (mass ahead), 0 (food here), 11 (food beside), 50/51/55 (turns since
//! turning and mating), 57 (spawn mass), 58 (starvation margin).

use crate::core::constants::{N_DECISIONS, N_SENSE_CELLS, SENSE_SELF, SENSE_SPAWN_NORM, SENSE_STARVE_NORM};
use crate::core::rng::SimRng;
use crate::core::types::LineageId;
use crate::genetics::brain::{Brain, ChromosomePair, OriginTag};
use crate::genetics::gene::{GeneKind, GeneNode};
use crate::genetics::tree::{GeneTree, Link};

/// Parts a founder splits into when it divides
pub const FOUNDER_DIVIDE_COUNT: u8 = 3;

const MASS_AHEAD: usize = N_SENSE_CELLS + 1;
const SINCE_MATE: usize = SENSE_SELF + 7;

fn gene(kind: GeneKind, sense: usize, c1: i64, c2: i64) -> GeneNode {
    GeneNode::new(kind, sense, c1, c2)
}

fn single(kind: GeneKind, sense: usize, c1: i64, c2: i64) -> GeneTree {
    GeneTree::new(gene(kind, sense, c1, c2))
}

/// Allele pair for one decision slot of the founder
fn founder_slot(slot: usize) -> (GeneTree, GeneTree) {
    use GeneKind::*;
    match slot {
        // Eat: strongest while children would still be too light
        1 => (
            GeneTree::chain(
                gene(Constant, MASS_AHEAD, 1500, 1048),
                [
                    (Link::Scale, gene(Limit, SENSE_SPAWN_NORM, 1216, 1084)),
                    (Link::Add, gene(Match, SENSE_SPAWN_NORM, 1216, 1084)),
                ],
            ),
            GeneTree::chain(
                gene(Constant, MASS_AHEAD, 2000, 1048),
                [(Link::Scale, gene(Limit, SENSE_SPAWN_NORM, 1203, 1056))],
            ),
        ),
        2 => (
            single(Limit, SENSE_SELF + 2, 50, 1200),
            single(Limit, SENSE_SELF + 2, 760, 776),
        ),
        3 => (
            single(Limit, SENSE_SELF + 3, 100, 1000),
            single(Limit, SENSE_SELF + 3, 510, 514),
        ),
        // Move: when food here runs thin or the body is light
        4 => (
            GeneTree::chain(
                gene(Constant, MASS_AHEAD, 1500, 1048),
                [
                    (Link::Scale, gene(Limit, 0, 173, -53)),
                    (Link::Add, gene(Limit, SENSE_STARVE_NORM, 4274, 2187)),
                ],
            ),
            GeneTree::chain(
                gene(Constant, MASS_AHEAD, 2000, 1048),
                [
                    (Link::Scale, gene(Limit, 0, 226, -76)),
                    (Link::Add, gene(Limit, SENSE_STARVE_NORM, 3944, 2187)),
                ],
            ),
        ),
        5 => (
            GeneTree::chain(gene(Sense, SINCE_MATE, 1421, 456), [(Link::Scale, gene(Sense, MASS_AHEAD, 734, 101))]),
            GeneTree::chain(gene(Sense, SINCE_MATE, 1339, 567), [(Link::Scale, gene(Sense, MASS_AHEAD, 785, 101))]),
        ),
        // Divide: once the children would be heavy enough
        6 => (
            GeneTree::chain(
                gene(Constant, MASS_AHEAD, 3500, 1048),
                [(Link::Scale, gene(Limit, SENSE_SPAWN_NORM, 1200, 3000))],
            ),
            GeneTree::chain(
                gene(Constant, MASS_AHEAD, 4000, 1048),
                [(Link::Scale, gene(Limit, SENSE_SPAWN_NORM, 1800, 1850))],
            ),
        ),
        // Mate response
        7 => (
            single(Limit, 11, -50, 591),
            single(Limit, SENSE_SELF + 3, -79, 546),
        ),
        // Sleep, the fallback
        _ => (
            single(Constant, SINCE_MATE, 26, 363),
            single(Constant, SINCE_MATE, 63, 1530),
        ),
    }
}

/// The canonical starter brain with a random expression mask
pub fn founder_brain(uid: LineageId, rng: &mut SimRng) -> Brain {
    let origin = OriginTag::founder(uid);
    let slots = std::array::from_fn(|slot| {
        let (a, b) = founder_slot(slot);
        ChromosomePair::new(a, b, origin)
    });
    let expressed = rng.below(1 << N_DECISIONS) as u8;
    Brain::new(slots, origin, FOUNDER_DIVIDE_COUNT, expressed)
}

/// A brain where slot `i` is the single constant `weights[i]` in both alleles
///
/// Handy for driving the action machine deterministically. The mate-response
/// slot sums both alleles, so its response is `2 * weights[7]`.
pub fn fixed_weight_brain(weights: [i64; N_DECISIONS]) -> Brain {
    let origin = OriginTag::founder(LineageId(1));
    let slots = std::array::from_fn(|slot| {
        ChromosomePair::new(
            GeneTree::new(GeneNode::constant(weights[slot])),
            GeneTree::new(GeneNode::constant(weights[slot])),
            origin,
        )
    });
    Brain::new(slots, origin, FOUNDER_DIVIDE_COUNT, 0xFF)
}

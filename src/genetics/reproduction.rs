//! Reproduction - crossover of two genomes into a child's brain
//!
//! Each decision slot recombines independently: allele A comes from the
//! parent's own brain, allele B from the mate snapshot the parent carries.

use serde::{Deserialize, Serialize};

use crate::core::constants::{ETHNIC_WEIGHT, LINEAGE_DEPTH};
use crate::core::rng::SimRng;
use crate::core::types::{Allele, LineageId};
use crate::genetics::brain::{Brain, ChromosomePair, OriginTag};
use crate::genetics::mutation::mutate_brain;
use crate::genetics::tree::GeneError;

/// Chance (1 in n) that the child's own mate snapshot mutates
const SNAPSHOT_MUTATION_ODDS: i64 = 4;
/// Chance (1 in n) that the child's expressed brain mutates
const BRAIN_MUTATION_ODDS: i64 = 8;

/// Colour band a child is born in, by latitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorBand {
    /// Top third
    Blue,
    /// Middle third
    Red,
    /// Bottom third
    Green,
}

impl ColorBand {
    pub fn for_row(y: usize, height: usize) -> ColorBand {
        match (y * 3) / height.max(1) {
            0 => ColorBand::Blue,
            1 => ColorBand::Red,
            _ => ColorBand::Green,
        }
    }

    fn channel(self) -> usize {
        match self {
            ColorBand::Red => 0,
            ColorBand::Green => 1,
            ColorBand::Blue => 2,
        }
    }
}

/// Average two colours, then drift one step toward the local band
///
/// Each of the two other channels gives up one unit to the band channel if
/// it has any; the band channel then tops the total up to full weight.
pub fn assimilate_color(mom: [u8; 3], dad: [u8; 3], band: ColorBand) -> [u8; 3] {
    let mut color: [u8; 3] = std::array::from_fn(|i| ((mom[i] as u16 + dad[i] as u16) / 2) as u8);
    let home = band.channel();
    for other in (0..3).filter(|&c| c != home) {
        if color[other] > 0 {
            color[other] -= 1;
            color[home] = color[home].saturating_add(1);
        }
    }
    let total: u16 = color.iter().map(|&c| c as u16).sum();
    if total < ETHNIC_WEIGHT as u16 {
        color[home] = color[home].saturating_add((ETHNIC_WEIGHT as u16 - total) as u8);
    }
    color
}

/// The two genomes a newborn carries
#[derive(Debug, Clone)]
pub struct Offspring {
    pub brain: Brain,
    /// Asexual snapshot used as the second parent until the child mates
    pub mate_brain: Brain,
}

/// Build a child genome from a parent and the mate snapshot it carries
pub fn produce_offspring(
    parent: &Brain,
    mate: &Brain,
    child_uid: LineageId,
    band: ColorBand,
    rng: &mut SimRng,
) -> Result<Offspring, GeneError> {
    let slots: [ChromosomePair; crate::core::constants::N_DECISIONS] = std::array::from_fn(|i| {
        let from_parent = if rng.coin() { Allele::A } else { Allele::B };
        let (a, origin_a) = parent.slots[i].copy_allele(from_parent);
        let from_mate = if rng.coin() { Allele::A } else { Allele::B };
        let (b, origin_b) = mate.slots[i].copy_allele(from_mate);
        ChromosomePair { a, b, origin_a, origin_b }
    });

    let divide_count = if rng.coin() { parent.divide_count } else { mate.divide_count };
    let expressed = rng.below(256) as u8;
    let origin = OriginTag::new(child_uid, assimilate_color(parent.origin.color, mate.origin.color, band));

    let mut brain = Brain::new(slots, origin, divide_count, expressed);
    brain.generation = parent.generation.max(mate.generation) + 1;
    brain.lineage = inherit_lineage(parent, mate);

    let mut mate_brain = brain.duplicate();
    if rng.one_in(SNAPSHOT_MUTATION_ODDS) {
        mutate_brain(&mut mate_brain, rng)?;
    }
    if rng.one_in(BRAIN_MUTATION_ODDS) {
        mutate_brain(&mut brain, rng)?;
    }

    Ok(Offspring { brain, mate_brain })
}

/// Both parents up front, then each parent's ring interleaved one generation down
fn inherit_lineage(parent: &Brain, mate: &Brain) -> Vec<Option<LineageId>> {
    let mut ring = vec![None; LINEAGE_DEPTH];
    ring[0] = Some(parent.uid());
    ring[1] = Some(mate.uid());
    let mut j = 2;
    while j + 1 < LINEAGE_DEPTH {
        let from = j / 2 - 1;
        ring[j] = parent.lineage.get(from).copied().flatten();
        ring[j + 1] = mate.lineage.get(from).copied().flatten();
        j += 2;
    }
    ring
}

//! Brain - an agent's genome of chromosome pairs plus scalar traits
//!
//! Each decision slot holds two interchangeable gene trees (alleles A and B).
//! The expression mask picks which one speaks for the slot. The lineage ring
//! remembers ancestor ids for kinship estimates.

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    DIVIDE_MAX, DIVIDE_MIN, ETHNIC_WEIGHT, LINEAGE_DEPTH, MATE_RESPONSE_SLOT, N_DECISIONS,
};
use crate::core::fixed::Fixed;
use crate::core::types::{Allele, LineageId, SenseVector};
use crate::genetics::tree::GeneTree;

/// Who last touched a piece of genetic material, with their lineage colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginTag {
    pub uid: LineageId,
    /// Red, green, blue weights; a settled colour sums to 120
    pub color: [u8; 3],
}

impl OriginTag {
    pub fn new(uid: LineageId, color: [u8; 3]) -> Self {
        Self { uid, color }
    }

    /// Founder colour: pure red at full weight
    pub fn founder(uid: LineageId) -> Self {
        Self::new(uid, [ETHNIC_WEIGHT, 0, 0])
    }
}

/// Two alleles for one decision slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromosomePair {
    pub a: GeneTree,
    pub b: GeneTree,
    pub origin_a: OriginTag,
    pub origin_b: OriginTag,
}

impl ChromosomePair {
    pub fn new(a: GeneTree, b: GeneTree, origin: OriginTag) -> Self {
        Self {
            a,
            b,
            origin_a: origin,
            origin_b: origin,
        }
    }

    pub fn allele(&self, which: Allele) -> &GeneTree {
        match which {
            Allele::A => &self.a,
            Allele::B => &self.b,
        }
    }

    pub fn allele_mut(&mut self, which: Allele) -> &mut GeneTree {
        match which {
            Allele::A => &mut self.a,
            Allele::B => &mut self.b,
        }
    }

    pub fn origin(&self, which: Allele) -> OriginTag {
        match which {
            Allele::A => self.origin_a,
            Allele::B => self.origin_b,
        }
    }

    pub fn set_origin(&mut self, which: Allele, tag: OriginTag) {
        match which {
            Allele::A => self.origin_a = tag,
            Allele::B => self.origin_b = tag,
        }
    }

    /// Deep copy of one allele together with its origin
    pub fn copy_allele(&self, which: Allele) -> (GeneTree, OriginTag) {
        (self.allele(which).duplicate(), self.origin(which))
    }

    pub fn node_count(&self) -> usize {
        self.a.len() + self.b.len()
    }
}

/// An agent's complete genome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brain {
    pub slots: [ChromosomePair; N_DECISIONS],
    /// Ancestor ids, parents first: `[0..2]` parents, `[2..6]` grandparents,
    /// and so on, doubling per generation. `None` marks an unknown ancestor.
    pub lineage: Vec<Option<LineageId>>,
    /// Owner id and lineage colour
    pub origin: OriginTag,
    pub generation: u64,
    /// Number of parts a division splits mass into, in `[2, 7]`
    pub divide_count: u8,
    /// Bit `i` set means allele A is expressed in slot `i`
    pub expressed: u8,
    gene_count: usize,
}

impl Brain {
    pub fn new(slots: [ChromosomePair; N_DECISIONS], origin: OriginTag, divide_count: u8, expressed: u8) -> Self {
        let mut brain = Self {
            slots,
            lineage: vec![None; LINEAGE_DEPTH],
            origin,
            generation: 0,
            divide_count: divide_count.clamp(DIVIDE_MIN, DIVIDE_MAX),
            expressed,
            gene_count: 0,
        };
        brain.recount();
        brain
    }

    /// Id of the agent this genome belongs to (or was copied from)
    pub fn uid(&self) -> LineageId {
        self.origin.uid
    }

    pub fn gene_count(&self) -> usize {
        self.gene_count
    }

    /// Recompute the cached gene count from the trees
    pub fn recount(&mut self) -> usize {
        self.gene_count = self.slots.iter().map(ChromosomePair::node_count).sum();
        self.gene_count
    }

    /// Cached gene count matches the trees and every tree is well formed
    pub fn is_consistent(&self) -> bool {
        let live: usize = self.slots.iter().map(ChromosomePair::node_count).sum();
        live == self.gene_count
            && self.lineage.len() == LINEAGE_DEPTH
            && (DIVIDE_MIN..=DIVIDE_MAX).contains(&self.divide_count)
            && self.slots.iter().all(|p| p.a.validate().is_ok() && p.b.validate().is_ok())
    }

    pub fn expressed_allele(&self, slot: usize) -> Allele {
        Allele::expressed(self.expressed, slot)
    }

    pub fn expressed_tree(&self, slot: usize) -> &GeneTree {
        self.slots[slot].allele(self.expressed_allele(slot))
    }

    /// Value of the expressed allele of a decision slot
    pub fn evaluate_slot(&self, slot: usize, senses: &SenseVector) -> Fixed {
        self.expressed_tree(slot).evaluate(senses)
    }

    /// Sum of both mate-response alleles; positive means consent
    pub fn mate_response(&self, senses: &SenseVector) -> Fixed {
        let pair = &self.slots[MATE_RESPONSE_SLOT];
        pair.a.evaluate(senses) + pair.b.evaluate(senses)
    }

    /// Deep copy with fresh trees; the cached count is recomputed
    pub fn duplicate(&self) -> Brain {
        let slots = std::array::from_fn(|i| {
            let pair = &self.slots[i];
            ChromosomePair {
                a: pair.a.duplicate(),
                b: pair.b.duplicate(),
                origin_a: pair.origin_a,
                origin_b: pair.origin_b,
            }
        });
        let mut copy = Brain {
            slots,
            lineage: self.lineage.clone(),
            origin: self.origin,
            generation: self.generation,
            divide_count: self.divide_count,
            expressed: self.expressed,
            gene_count: 0,
        };
        copy.recount();
        copy
    }

    /// Relatedness estimate against another genome, 0..=1.0
    ///
    /// Ancestors are compared generation by generation: any id in one ring's
    /// range that appears anywhere in the same range of the other ring counts.
    /// `detail` limits how deep the rings are compared: 0 means the same
    /// agent, 3 compares parents only, 2 adds grandparents, anything else
    /// compares the whole ring.
    pub fn kinship(&self, other: &Brain, detail: u8) -> Fixed {
        if detail == 0 {
            return Fixed::ONE;
        }

        let mut score = self.shared_ancestors(other, 0..2) * 256;
        if score >= 512 {
            return Fixed::ONE;
        }
        if detail == 3 {
            return Fixed::from_raw(score);
        }

        score += self.shared_ancestors(other, 2..6) * 64;
        if detail == 2 {
            return Fixed::from_raw(score.min(Fixed::ONE.raw()));
        }

        score += self.shared_ancestors(other, 6..14) * 16;
        score += self.shared_ancestors(other, 14..30) * 4;
        score += self.shared_ancestors(other, 30..63);
        Fixed::from_raw(score.min(Fixed::ONE.raw()))
    }

    fn shared_ancestors(&self, other: &Brain, range: std::ops::Range<usize>) -> i64 {
        let theirs: Vec<LineageId> = other
            .lineage
            .get(range.clone())
            .unwrap_or_default()
            .iter()
            .flatten()
            .copied()
            .collect();
        self.lineage
            .get(range)
            .unwrap_or_default()
            .iter()
            .flatten()
            .map(|id| theirs.iter().filter(|t| *t == id).count() as i64)
            .sum()
    }
}

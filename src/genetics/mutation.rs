//! Mutation engine - value tweaks, grafts and prunes
//!
//! Both entry points draw their event count by successive halving, so one
//! change is the common case and long bursts are rare.

use serde::{Deserialize, Serialize};

use crate::core::constants::{DIVIDE_MAX, DIVIDE_MIN, N_DECISIONS, N_SENSES};
use crate::core::rng::SimRng;
use crate::core::types::Allele;
use crate::genetics::brain::Brain;
use crate::genetics::gene::{GeneNode, NodeIdx};
use crate::genetics::tree::{GeneError, GeneTree, Link, ROOT};

/// Bits of the halving draw for value tweaks (up to 8 adjustments)
const TWEAK_BITS: u32 = 8;
/// Bits of the halving draw for brain mutation (up to 14 events)
const MUTATION_BITS: u32 = 14;

/// What one `mutate_brain` call did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSummary {
    pub events: u32,
    pub tweaks: u32,
    pub grafts: u32,
    pub prunes: u32,
    /// Nodes freed by all prunes together
    pub genes_freed: usize,
    pub divide_changes: u32,
}

/// Apply a burst of small changes to one node's type and coefficients
///
/// Returns the number of adjustments made.
pub fn tweak_values(node: &mut GeneNode, rng: &mut SimRng) -> u32 {
    let steps = rng.burst(TWEAK_BITS);
    for _ in 0..steps {
        match rng.below(4) {
            0 => node.kind = node.kind.cycled(rng.below(4) as u8 + 1),
            1 => {
                // Small steps either way are likelier than a jump
                let mut step = rng.below(N_SENSES as i64 + 6) - 3;
                if step == 0 {
                    step = 6;
                }
                node.sense_index = (node.sense_index as i64 + step).rem_euclid(N_SENSES as i64) as i32;
            }
            2 => node.c1 = perturb(node.c1, rng),
            _ => node.c2 = perturb(node.c2, rng),
        }
    }
    steps
}

/// Noisy rescale of up to +/-12.5% plus a jitter of up to +/-64 raw units
fn perturb(value: i64, rng: &mut SimRng) -> i64 {
    let factor = 1024 + rng.below(256) - 128;
    value.saturating_mul(factor) / 1024 + rng.below(128) - 64
}

/// Walk down from the root on random links until one is empty
pub fn random_free_link(tree: &GeneTree, rng: &mut SimRng) -> (NodeIdx, Link) {
    let mut at = ROOT;
    loop {
        let link = if rng.coin() { Link::Scale } else { Link::Add };
        match tree.child(at, link) {
            Some(next) => at = next,
            None => return (at, link),
        }
    }
}

/// Copy node `template` to a fresh leaf, maybe tweaking the copy
///
/// The leaf hangs off the first empty link a random walk from the root finds.
/// Returns the new node's index.
pub fn graft(tree: &mut GeneTree, template: NodeIdx, rng: &mut SimRng) -> Result<NodeIdx, GeneError> {
    let copy = tree
        .node(template)
        .ok_or(GeneError::NodeOutOfRange(template))?
        .detached();
    let (parent, link) = random_free_link(tree, rng);
    let idx = tree.attach(parent, link, copy)?;
    if rng.coin() {
        if let Some(node) = tree.node_mut(idx) {
            tweak_values(node, rng);
        }
    }
    Ok(idx)
}

/// Cut one populated link of node `at`, freeing the whole subtree below it
///
/// A node with both links populated loses one of them at random. Returns the
/// number of nodes freed; zero for a leaf. The root itself is never removed.
pub fn prune(tree: &mut GeneTree, at: NodeIdx, rng: &mut SimRng) -> Result<usize, GeneError> {
    let link = match (tree.child(at, Link::Scale), tree.child(at, Link::Add)) {
        (Some(_), Some(_)) => {
            if rng.coin() {
                Link::Scale
            } else {
                Link::Add
            }
        }
        (Some(_), None) => Link::Scale,
        (None, Some(_)) => Link::Add,
        (None, None) => return Ok(0),
    };
    tree.prune_link(at, link)
}

/// Apply a burst of mutation events to a whole brain
///
/// The gene count is refreshed even when an event fails on a malformed tree.
pub fn mutate_brain(brain: &mut Brain, rng: &mut SimRng) -> Result<MutationSummary, GeneError> {
    let mut summary = MutationSummary {
        events: rng.burst(MUTATION_BITS),
        ..Default::default()
    };

    let applied = (0..summary.events).try_for_each(|_| mutation_event(brain, &mut summary, rng));
    brain.recount();
    applied?;

    debug_assert!(brain.is_consistent(), "mutation left the brain inconsistent");
    tracing::trace!(
        uid = %brain.uid(),
        events = summary.events,
        grafts = summary.grafts,
        freed = summary.genes_freed,
        "brain mutated"
    );
    Ok(summary)
}

fn mutation_event(brain: &mut Brain, summary: &mut MutationSummary, rng: &mut SimRng) -> Result<(), GeneError> {
    let pick = rng.below(N_DECISIONS as i64 + 1) as usize;
    if pick == N_DECISIONS {
        brain.divide_count = walk_divide_count(brain.divide_count, rng);
        summary.divide_changes += 1;
        return Ok(());
    }

    let allele = if rng.coin() { Allele::A } else { Allele::B };
    let origin = brain.origin;
    let pair = &mut brain.slots[pick];
    pair.set_origin(allele, origin);
    let tree = pair.allele_mut(allele);
    let at = rng.index(tree.len());

    if rng.coin() {
        if let Some(node) = tree.node_mut(at) {
            tweak_values(node, rng);
            summary.tweaks += 1;
        }
    } else if rng.below(4) != 0 {
        graft(tree, at, rng)?;
        summary.grafts += 1;
    } else {
        let freed = prune(tree, at, rng)?;
        if freed > 0 {
            summary.prunes += 1;
            summary.genes_freed += freed;
        }
    }
    Ok(())
}

/// Step the division count by -1, 0 or +1, reflecting off the limits
fn walk_divide_count(count: u8, rng: &mut SimRng) -> u8 {
    let next = count as i64 + rng.below(3) - 1;
    if next > DIVIDE_MAX as i64 {
        DIVIDE_MAX - 1
    } else if next < DIVIDE_MIN as i64 {
        DIVIDE_MIN + 1
    } else {
        next as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::starter::fixed_weight_brain;

    #[test]
    fn test_tweak_keeps_sense_in_range() {
        let mut rng = SimRng::new(3);
        let mut node = GeneNode::new(crate::genetics::gene::GeneKind::Sense, 59, 1024, 0);
        for _ in 0..500 {
            let n = tweak_values(&mut node, &mut rng);
            assert!((1..=8).contains(&n));
            assert!((0..N_SENSES as i32).contains(&node.sense_index));
        }
    }

    #[test]
    fn test_random_free_link_is_empty() {
        let mut rng = SimRng::new(11);
        let mut tree = GeneTree::new(GeneNode::constant(1));
        for _ in 0..40 {
            let (at, link) = random_free_link(&tree, &mut rng);
            assert_eq!(tree.child(at, link), None);
            tree.attach(at, link, GeneNode::constant(2)).unwrap();
        }
        assert_eq!(tree.len(), 41);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_graft_adds_one_node() {
        let mut rng = SimRng::new(5);
        let mut tree = GeneTree::new(GeneNode::constant(1));
        let idx = graft(&mut tree, ROOT, &mut rng).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_graft_copies_the_chosen_node() {
        let marked = GeneNode::new(crate::genetics::gene::GeneKind::Sense, 42, 5000, -3000);
        let mut untouched = 0;
        for seed in 0..40 {
            let mut rng = SimRng::new(seed);
            let mut tree = GeneTree::new(GeneNode::constant(1));
            tree.attach(ROOT, Link::Scale, marked.clone()).unwrap();
            let idx = graft(&mut tree, 1, &mut rng).unwrap();
            let grafted = tree.node(idx).unwrap();
            assert_ne!(grafted, &GeneNode::constant(1));
            assert_eq!((grafted.scale, grafted.add), (None, None));
            if grafted == &marked {
                untouched += 1;
            }
        }
        // Roughly half the copies skip the tweak
        assert!(untouched > 5, "only {} untweaked copies", untouched);
    }

    #[test]
    fn test_graft_rejects_missing_template() {
        let mut tree = GeneTree::new(GeneNode::constant(1));
        assert_eq!(graft(&mut tree, 3, &mut SimRng::new(1)), Err(GeneError::NodeOutOfRange(3)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_prune_leaf_is_noop() {
        let mut rng = SimRng::new(5);
        let mut tree = GeneTree::new(GeneNode::constant(1));
        assert_eq!(prune(&mut tree, ROOT, &mut rng), Ok(0));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_prune_frees_whole_subtree() {
        let mut rng = SimRng::new(5);
        let mut tree = GeneTree::new(GeneNode::constant(1));
        let child = tree.attach(ROOT, Link::Scale, GeneNode::constant(2)).unwrap();
        tree.attach(child, Link::Add, GeneNode::constant(3)).unwrap();
        tree.attach(child, Link::Scale, GeneNode::constant(4)).unwrap();
        assert_eq!(prune(&mut tree, ROOT, &mut rng), Ok(3));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_mutate_brain_keeps_count_consistent() {
        let mut rng = SimRng::new(99);
        let mut brain = fixed_weight_brain([1, 2, 3, 4, 5, 6, 7, 8]);
        for _ in 0..300 {
            let before = brain.gene_count();
            let summary = mutate_brain(&mut brain, &mut rng).unwrap();
            assert!(summary.events >= 1);
            assert_eq!(
                brain.gene_count(),
                before + summary.grafts as usize - summary.genes_freed
            );
            assert!(brain.is_consistent());
        }
    }

    #[test]
    fn test_divide_walk_stays_in_bounds() {
        let mut rng = SimRng::new(8);
        let mut count = DIVIDE_MIN;
        for _ in 0..1000 {
            count = walk_divide_count(count, &mut rng);
            assert!((DIVIDE_MIN..=DIVIDE_MAX).contains(&count));
        }
    }
}

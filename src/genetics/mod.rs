//! Genomes: gene trees, brains, mutation and crossover

pub mod brain;
pub mod gene;
pub mod mutation;
pub mod reproduction;
pub mod starter;
pub mod tree;

pub use brain::{Brain, ChromosomePair, OriginTag};
pub use gene::{GeneKind, GeneNode, NodeIdx};
pub use mutation::{mutate_brain, tweak_values, MutationSummary};
pub use reproduction::{assimilate_color, produce_offspring, ColorBand, Offspring};
pub use starter::{fixed_weight_brain, founder_brain};
pub use tree::{GeneError, GeneTree, Link};

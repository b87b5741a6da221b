//! Structural constants
//!
//! These shape data structures (array lengths, sense layout) and cannot change
//! at run time. Tunable numbers live in [`crate::core::config`].

/// Decision slots per brain (seven chosen actions plus the mate response)
pub const N_DECISIONS: usize = 8;

/// Slot evaluated by a prospective partner when asked to mate
pub const MATE_RESPONSE_SLOT: usize = 7;

/// Distinct action codes kept in position history
pub const N_ACTIONS: usize = 9;

/// Turns of position history kept per agent (current + 31 past)
pub const POS_HISTORY: usize = 32;

/// Ancestor entries in the lineage ring (2 + 4 + 8 + 16 + 32 + 64)
pub const LINEAGE_DEPTH: usize = 126;

/// Probe cells around an agent
pub const N_SENSE_CELLS: usize = 12;

/// First index of each per-cell sense block
pub const SENSE_FOOD: usize = 0;
pub const SENSE_MASS: usize = N_SENSE_CELLS;
pub const SENSE_FACING: usize = N_SENSE_CELLS * 2;
pub const SENSE_KINSHIP: usize = N_SENSE_CELLS * 3;

/// First index of the turns-since-action block
pub const SENSE_SELF: usize = N_SENSE_CELLS * 4;

/// Would-be child mass after division, relative to the starvation floor
pub const SENSE_SPAWN_NORM: usize = SENSE_SELF + N_ACTIONS;

/// Current mass relative to the starvation floor
pub const SENSE_STARVE_NORM: usize = SENSE_SPAWN_NORM + 1;

/// Age in turns
pub const SENSE_SELF_AGE: usize = SENSE_STARVE_NORM + 1;

/// Length of the sense vector
pub const N_SENSES: usize = SENSE_SELF_AGE + 1;

/// Turns of aggregate statistics retained
pub const STATS_HISTORY: usize = 1024;

/// Total colour weight of an origin tag after assimilation
pub const ETHNIC_WEIGHT: u8 = 120;

/// Bounds on the divide-count gene
pub const DIVIDE_MIN: u8 = 2;
pub const DIVIDE_MAX: u8 = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sense_layout() {
        assert_eq!(SENSE_SELF, 48);
        assert_eq!(SENSE_SPAWN_NORM, 57);
        assert_eq!(SENSE_STARVE_NORM, 58);
        assert_eq!(SENSE_SELF_AGE, 59);
        assert_eq!(N_SENSES, 60);
    }

    #[test]
    fn test_lineage_depth_covers_six_generations() {
        let total: usize = (1..=6).map(|g| 1usize << g).sum();
        assert_eq!(total, LINEAGE_DEPTH);
    }

    #[test]
    fn test_expression_mask_fits_a_byte() {
        assert!(N_DECISIONS <= 8);
    }
}

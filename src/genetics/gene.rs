//! Gene nodes - the typed leaves and operators of an expression tree
//!
//! A node computes a raw value from the sense vector according to its kind,
//! then the tree multiplies that by its `scale` child and adds its `add` child
//! (see [`crate::genetics::tree`]).

use serde::{Deserialize, Serialize};

use crate::core::constants::N_SENSES;
use crate::core::fixed::{Fixed, SCALE};
use crate::core::types::SenseVector;

/// Position of a node inside its tree's arena
pub type NodeIdx = usize;

/// Expression kinds, with their classic numeric codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GeneKind {
    /// `c1`
    Constant = 1,
    /// `sense * c1 + c2`
    Sense = 2,
    /// Clamped ramp of a sense between breakpoints `c1` and `c2`
    Limit = 3,
    /// `sense - other_sense(c1) + c2`
    Compare = 4,
    /// Similarity of two senses, sharpness `c1`
    Match = 5,
}

impl GeneKind {
    pub const ALL: [GeneKind; 5] = [
        GeneKind::Constant,
        GeneKind::Sense,
        GeneKind::Limit,
        GeneKind::Compare,
        GeneKind::Match,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<GeneKind> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }

    /// Advance `step` places around the five kinds; `step` in 1..=4 always
    /// yields a different kind
    pub fn cycled(self, step: u8) -> GeneKind {
        let mut code = self.code() + step % 5;
        if code > 5 {
            code -= 5;
        }
        Self::from_code(code).unwrap_or(self)
    }
}

/// One node of a gene expression tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneNode {
    pub kind: GeneKind,
    /// Sense read by every kind except Constant. Kept signed so corrupted
    /// values can be detected and clamped.
    pub sense_index: i32,
    pub c1: i64,
    pub c2: i64,
    /// Child whose value multiplies this node's (absent = 1.0)
    pub scale: Option<NodeIdx>,
    /// Child whose value is added to this node's (absent = 0.0)
    pub add: Option<NodeIdx>,
}

impl GeneNode {
    pub fn new(kind: GeneKind, sense_index: usize, c1: i64, c2: i64) -> Self {
        Self {
            kind,
            sense_index: sense_index as i32,
            c1,
            c2,
            scale: None,
            add: None,
        }
    }

    pub fn constant(value: i64) -> Self {
        Self::new(GeneKind::Constant, 0, value, 0)
    }

    /// Copy of this node's coefficients with no children
    pub fn detached(&self) -> Self {
        Self {
            scale: None,
            add: None,
            ..self.clone()
        }
    }

    /// Sense index clamped into range
    pub fn sense(&self) -> usize {
        if self.sense_index < 0 || self.sense_index as usize >= N_SENSES {
            tracing::warn!(
                sense_index = self.sense_index,
                "gene sense index out of range, clamping"
            );
        }
        self.sense_index.clamp(0, N_SENSES as i32 - 1) as usize
    }

    /// Value of this node alone, before its scale and add children apply
    pub fn raw_value(&self, senses: &SenseVector) -> Fixed {
        match self.kind {
            GeneKind::Constant => Fixed::from_raw(self.c1),
            GeneKind::Sense => senses.get(self.sense()).mul(Fixed::from_raw(self.c1)) + Fixed::from_raw(self.c2),
            GeneKind::Limit => limit_ramp(senses.get(self.sense()), self.c1, self.c2),
            GeneKind::Compare => {
                let other = senses.get(wrap_sense(self.c1));
                senses.get(self.sense()) - other + Fixed::from_raw(self.c2)
            }
            GeneKind::Match => {
                let other = senses.get(wrap_sense(self.c2));
                let distance = (senses.get(self.sense()) - other).mul(Fixed::from_raw(self.c1)).abs();
                (Fixed::ONE - distance).max(Fixed::ZERO)
            }
        }
    }
}

/// Map an arbitrary coefficient onto a sense index
fn wrap_sense(value: i64) -> usize {
    value.rem_euclid(N_SENSES as i64) as usize
}

/// Clamped linear ramp of `x` between breakpoints `l1` and `l2`
///
/// With `l1 <= l2` the ramp rises from 0.0 below `l1` to 1.0 above `l2`.
/// With `l1 > l2` it is inverted: 1.0 below `l2`, 0.0 above `l1`. Equal
/// breakpoints give 0.5 at the step.
pub fn limit_ramp(x: Fixed, l1: i64, l2: i64) -> Fixed {
    let x = x.raw() as i128;
    let (l1, l2) = (l1 as i128, l2 as i128);
    let scale = SCALE as i128;

    let value = if l1 <= l2 {
        if x < l1 {
            0
        } else if x > l2 {
            scale
        } else if l1 == l2 {
            scale / 2
        } else {
            (scale * (x - l1)) / (l2 - l1)
        }
    } else if x < l2 {
        scale
    } else if x > l1 {
        0
    } else {
        scale - (scale * (x - l2)) / (l1 - l2)
    };

    Fixed::from_raw(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn senses_with(pairs: &[(usize, i64)]) -> SenseVector {
        let mut s = SenseVector::zeroed();
        for &(i, v) in pairs {
            s.set(i, Fixed::from_raw(v));
        }
        s
    }

    #[test]
    fn test_constant_gene() {
        let g = GeneNode::constant(42);
        assert_eq!(g.raw_value(&SenseVector::zeroed()), Fixed::from_raw(42));
    }

    #[test]
    fn test_sense_gene_scales_and_offsets() {
        let g = GeneNode::new(GeneKind::Sense, 2, 512, 10);
        let s = senses_with(&[(2, 2048)]);
        // 2048 * 512 / 1024 + 10
        assert_eq!(g.raw_value(&s), Fixed::from_raw(1034));
    }

    #[test]
    fn test_limit_rising_ramp() {
        assert_eq!(limit_ramp(Fixed::from_raw(5), 10, 50), Fixed::ZERO);
        assert_eq!(limit_ramp(Fixed::from_raw(100), 10, 50), Fixed::ONE);
        assert_eq!(limit_ramp(Fixed::from_raw(30), 10, 50), Fixed::from_raw(512));
        assert_eq!(limit_ramp(Fixed::from_raw(10), 10, 10), Fixed::HALF);
    }

    #[test]
    fn test_limit_inverted_ramp() {
        assert_eq!(limit_ramp(Fixed::from_raw(5), 50, 10), Fixed::ONE);
        assert_eq!(limit_ramp(Fixed::from_raw(100), 50, 10), Fixed::ZERO);
        assert_eq!(limit_ramp(Fixed::from_raw(30), 50, 10), Fixed::from_raw(512));
    }

    #[test]
    fn test_compare_gene() {
        let g = GeneNode::new(GeneKind::Compare, 1, 3, 7);
        let s = senses_with(&[(1, 100), (3, 40)]);
        assert_eq!(g.raw_value(&s), Fixed::from_raw(67));

        // Negative coefficients still land on a valid sense
        let g = GeneNode::new(GeneKind::Compare, 1, -57, 0);
        assert_eq!(g.raw_value(&s), Fixed::from_raw(60));
    }

    #[test]
    fn test_match_gene_similarity() {
        let s = senses_with(&[(0, 1024), (1, 1024), (2, 3072)]);
        let identical = GeneNode::new(GeneKind::Match, 0, 1024, 1);
        assert_eq!(identical.raw_value(&s), Fixed::ONE);

        let distant = GeneNode::new(GeneKind::Match, 0, 1024, 2);
        assert_eq!(distant.raw_value(&s), Fixed::ZERO);

        let soft = GeneNode::new(GeneKind::Match, 0, 256, 2);
        // 1.0 - |1.0 - 3.0| * 0.25 = 0.5
        assert_eq!(soft.raw_value(&s), Fixed::HALF);
    }

    #[test]
    fn test_out_of_range_sense_is_clamped() {
        let s = senses_with(&[(0, 11), (N_SENSES - 1, 99)]);
        let mut g = GeneNode::new(GeneKind::Sense, 0, 1024, 0);
        g.sense_index = -4;
        assert_eq!(g.raw_value(&s), Fixed::from_raw(11));
        g.sense_index = 500;
        assert_eq!(g.raw_value(&s), Fixed::from_raw(99));
    }

    #[test]
    fn test_kind_cycle_always_changes() {
        for kind in GeneKind::ALL {
            for step in 1..=4 {
                assert_ne!(kind.cycled(step), kind);
            }
        }
        assert_eq!(GeneKind::Match.cycled(1), GeneKind::Constant);
    }
}

//! Combat resolution for a move into an occupied cell
//!
//! The defender's mass is scaled by the angle between the two facings. A
//! defender lined up with the attacker (relative facing 0) counts as meeting
//! it head-on and is strong; at relative facing 3 the strike counts as coming
//! from the rear and is nearly always fatal. Times-defended helps the
//! defender on the front angles, kills help the attacker on the rear ones.

use crate::core::fixed::Fixed;
use crate::core::rng::SimRng;

/// Defender mass after facing and experience adjustments, never negative
///
/// `relative_facing` is the defender's facing minus the attacker's, in
/// `-2..=3`.
pub fn effective_defender_mass(
    defender_mass: Fixed,
    relative_facing: i64,
    times_defended: u64,
    attacker_kills: u64,
) -> i64 {
    let mass = defender_mass.raw();
    let defended = times_defended as i64;
    let kills = attacker_kills as i64;

    let adjusted = match relative_facing {
        0 => mass.saturating_mul(defended / 2 + 1) / 128,
        1 | -1 => mass.saturating_mul(defended / 4 + 1) / 1024,
        2 | -2 => mass.saturating_mul(defended / 8 + 1) / 8192 - kills,
        _ => mass / 65536 - kills.saturating_mul(kills),
    };
    adjusted.max(0)
}

/// Stochastic trial: the attacker wins if a draw below
/// `effective + attacker_mass / 1024` reaches `effective`
///
/// A defender with no effective mass always loses.
pub fn attacker_wins(effective_defender: i64, attacker_mass: Fixed, rng: &mut SimRng) -> bool {
    let space = effective_defender.saturating_add(attacker_mass.raw().max(0) / 1024);
    rng.below(space) >= effective_defender
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_multipliers() {
        let m = Fixed::from_raw(1_048_576);
        assert_eq!(effective_defender_mass(m, 0, 0, 0), 8192);
        assert_eq!(effective_defender_mass(m, 1, 0, 0), 1024);
        assert_eq!(effective_defender_mass(m, -2, 0, 0), 128);
        assert_eq!(effective_defender_mass(m, 3, 0, 0), 16);
    }

    #[test]
    fn test_experience_adjustments() {
        let m = Fixed::from_raw(1_048_576);
        // Defender experience from the front
        assert_eq!(effective_defender_mass(m, 0, 4, 0), 8192 * 3);
        assert_eq!(effective_defender_mass(m, -1, 4, 0), 1024 * 2);
        // Attacker experience from the rear
        assert_eq!(effective_defender_mass(m, 2, 0, 5), 123);
        assert_eq!(effective_defender_mass(m, 3, 0, 3), 7);
        assert_eq!(effective_defender_mass(m, 3, 0, 100), 0);
    }

    #[test]
    fn test_zero_mass_defender_always_loses() {
        let mut rng = SimRng::new(1);
        for mass in [0, 1, 5000, 10_000_000] {
            assert!(attacker_wins(0, Fixed::from_raw(mass), &mut rng));
        }
    }

    #[test]
    fn test_massive_defender_usually_wins() {
        let mut rng = SimRng::new(2);
        let wins = (0..1000)
            .filter(|_| attacker_wins(1_000_000, Fixed::from_raw(102_400), &mut rng))
            .count();
        // Attacker share is 100 / 1_000_100
        assert!(wins < 5, "attacker won {} times", wins);
    }
}

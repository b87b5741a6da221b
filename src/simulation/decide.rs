//! Decision policy - arg-max over the expressed decision slots

use crate::core::constants::MATE_RESPONSE_SLOT;
use crate::core::fixed::Fixed;
use crate::core::types::{Action, SenseVector};
use crate::genetics::brain::Brain;

/// Starting bar every slot must beat
const DECISION_FLOOR: Fixed = Fixed::from_raw(-1_048_576);

/// Pick the action whose expressed slot evaluates highest
///
/// Slots are scanned in action order and the first maximum wins. If no slot
/// beats the floor the agent sleeps.
pub fn decide(brain: &Brain, senses: &SenseVector) -> Action {
    let mut best = DECISION_FLOOR;
    let mut choice = Action::Sleep;
    for (slot, action) in Action::CHOOSABLE.iter().enumerate() {
        let value = brain.evaluate_slot(slot, senses);
        if value > best {
            best = value;
            choice = *action;
        }
    }
    choice
}

/// Whether a prospective partner agrees to mate, judged on the suitor's senses
pub fn mate_consents(partner: &Brain, senses: &SenseVector) -> bool {
    debug_assert!(MATE_RESPONSE_SLOT >= Action::CHOOSABLE.len());
    partner.mate_response(senses).is_positive()
}

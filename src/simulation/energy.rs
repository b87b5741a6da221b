//! Energy accounting - every action is paid for in body mass
//!
//! Genes count as extra mass, growing with the cube of the gene count past a
//! knee, and bodies above the mass cap pay an obesity surcharge.

use crate::core::config::MetabolismConfig;
use crate::core::fixed::Fixed;
use crate::simulation::agent::Agent;

/// Debits below this many raw units are suspiciously cheap
const CHEAP_DEBIT: i64 = 100;

/// Mass an agent is charged as, genes included
pub fn effective_mass(mass: Fixed, genes: usize, m: &MetabolismConfig) -> i64 {
    let g = genes as i64;
    let knee2 = m.gene_knee.saturating_mul(m.gene_knee).max(1);
    let gene_mass = m.gene_cost.saturating_mul(g.saturating_mul(g).saturating_mul(g)) / knee2;
    mass.raw().saturating_abs().saturating_add(gene_mass)
}

/// Mass removed by an action of flat cost `cost`
pub fn metabolic_debit(cost: i64, mass: Fixed, genes: usize, m: &MetabolismConfig) -> Fixed {
    let effective = effective_mass(mass, genes, m);
    let mut cost = cost;
    if effective > m.mass_cap.raw() {
        let surcharge = (effective - m.mass_cap.raw()) / m.obesity_step.max(1);
        cost = cost.saturating_mul(1 + surcharge);
    }
    Fixed::from_raw(cost.saturating_mul(effective) / m.nominal_mass.max(1))
}

/// Charge an agent for an action; mass never drops below one raw unit
///
/// Returns the amount debited.
pub fn charge(agent: &mut Agent, cost: i64, m: &MetabolismConfig) -> Fixed {
    let debit = metabolic_debit(cost, agent.mass(), agent.brain.gene_count(), m);
    if debit.raw() < CHEAP_DEBIT {
        tracing::warn!(
            uid = %agent.uid,
            cost,
            mass = agent.mass().units(),
            genes = agent.brain.gene_count(),
            debit = debit.raw(),
            "action too cheap"
        );
    }

    let mut mass = agent.mass() - debit;
    if mass.raw() <= 0 {
        mass = Fixed::from_raw(1);
    }
    agent.set_mass(mass);
    debit
}

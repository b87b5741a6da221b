//! End-to-end turn scenarios
//!
//! These drive whole turns through the public API:
//! - A founder run is reproducible from its seed
//! - A refused courtship changes nothing but the suitor's failure count
//! - Starvation right after a Sleep feeds the cell with the full body mass
//! - A single-node chromosome cannot lose its root
//! - Thin parents never produce children
//! - A weightless defender always loses, and a beaten attacker feeds the
//!   defender's cell with its whole body
//! - A seeded founder run reproduces its recorded population history

use hexbugs::core::config::SimulationConfig;
use hexbugs::core::fixed::Fixed;
use hexbugs::core::rng::SimRng;
use hexbugs::core::types::{Action, AgentId};
use hexbugs::genetics::mutation::prune;
use hexbugs::genetics::starter::fixed_weight_brain;
use hexbugs::genetics::tree::ROOT;
use hexbugs::simulation::agent::Agent;
use hexbugs::simulation::energy::{charge, metabolic_debit};
use hexbugs::simulation::turn::{take_turn, DeathCause};
use hexbugs::simulation::{Simulation, SimulationState};
use hexbugs::world::hex::{Facing, HexPos};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SLEEP: [i64; 8] = [10, 0, 0, 0, 0, 0, 0, 0];
const MOVE: [i64; 8] = [0, 0, 0, 0, 10, 0, 0, 0];
const MATE: [i64; 8] = [0, 0, 0, 0, 0, 10, 0, 0];
const DIVIDE: [i64; 8] = [0, 0, 0, 0, 0, 0, 10, 0];

fn small_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.seed = seed;
    config.world.width = 40;
    config.world.height = 32;
    config
}

fn place(state: &mut SimulationState, weights: [i64; 8], pos: HexPos, facing: Facing, mass: i64) -> AgentId {
    let brain = fixed_weight_brain(weights);
    let mate = brain.duplicate();
    let agent = Agent::new(state.turn, pos, facing, Fixed::from_raw(mass), brain, mate);
    state.place_agent(agent).unwrap()
}

#[test]
fn test_founder_run_is_reproducible() {
    let run = |seed| {
        let mut sim = Simulation::fixed_schedule(small_config(seed)).unwrap();
        sim.run(150).unwrap();
        assert!(sim.state.is_consistent());
        let records: Vec<_> = sim
            .state
            .agents()
            .map(|(_, a)| (a.uid, a.pos(), a.mass(), a.brain.gene_count()))
            .collect();
        (sim.population(), sim.state.next_uid(), records)
    };

    assert_eq!(run(2024), run(2024));
}

/// What a founder run leaves behind, compared against a recorded copy
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
struct FounderRun {
    seed: u64,
    turns: u64,
    population: usize,
    uids_issued: u64,
    births: u64,
    deaths: u64,
    movement: u64,
    mate_successes: u64,
    mate_failures: u64,
    final_genes: u64,
    final_mass: i64,
    final_food: i64,
}

fn founder_run(seed: u64, turns: u64) -> FounderRun {
    let mut sim = Simulation::fixed_schedule(small_config(seed)).unwrap();
    let ran = sim.run(turns).unwrap();
    let history = &sim.state.history;
    let (births, deaths) = history.window_totals();
    let last = history.latest().cloned().unwrap_or_default();
    FounderRun {
        seed,
        turns: ran,
        population: sim.population(),
        uids_issued: sim.state.next_uid(),
        births,
        deaths,
        movement: history.iter().map(|t| t.movement).sum(),
        mate_successes: history.iter().map(|t| t.mate_successes).sum(),
        mate_failures: history.iter().map(|t| t.mate_failures).sum(),
        final_genes: last.total_genes,
        final_mass: last.total_mass.raw(),
        final_food: last.total_food.raw(),
    }
}

/// Recorded outcome of the seed-2024 founder run.
///
/// Written on the first run when absent, then pinned: later runs must match
/// it exactly. Set `HEXBUGS_BLESS=1` to record a deliberate change.
const FOUNDER_RUN_RECORD: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/founder_run.json");

#[test]
fn test_founder_run_matches_recorded_history() {
    let run = founder_run(2024, 150);
    assert_eq!(run.uids_issued, run.births + 1);
    assert_eq!(run.population as u64, 1 + run.births - run.deaths);

    let path = Path::new(FOUNDER_RUN_RECORD);
    let bless = std::env::var_os("HEXBUGS_BLESS").is_some();
    match std::fs::read_to_string(path) {
        Ok(json) if !bless => {
            let recorded: FounderRun = serde_json::from_str(&json).unwrap();
            assert_eq!(run, recorded, "founder run drifted from {}", path.display());
        }
        _ => {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, serde_json::to_string_pretty(&run).unwrap() + "\n").unwrap();
        }
    }
}

#[test]
fn test_founder_run_keeps_safety_on() {
    let mut sim = Simulation::fixed_schedule(small_config(9)).unwrap();
    sim.run(100).unwrap();
    assert!(sim.state.history.iter().all(|t| t.combat_deaths == 0 && t.collisions == 0));
}

#[test]
fn test_refused_mate_records_failure_only() {
    let mut state = SimulationState::new(small_config(1)).unwrap();
    let suitor = place(&mut state, MATE, HexPos::new(10, 10), Facing::E, 102_400 * 20);
    // Mate-response slot strongly negative: always refuses
    let refuser = place(&mut state, [10, 0, 0, 0, 0, 0, 0, -1000], HexPos::new(11, 10), Facing::W, 102_400 * 20);

    let suitor_mate = state.agent(suitor).unwrap().mate_brain.clone();
    let refuser_mate = state.agent(refuser).unwrap().mate_brain.clone();

    let outcome = take_turn(&mut state, suitor).unwrap();
    assert_eq!(outcome.action, Action::Mate);

    let s = state.agent(suitor).unwrap();
    assert_eq!(s.counters.mate_failures, 1);
    assert_eq!(s.counters.mate_successes + s.counters.mate_repeats, 0);
    assert_eq!(s.last_action(), Action::Mate);
    assert_eq!(s.mate_brain, suitor_mate);

    let r = state.agent(refuser).unwrap();
    assert_eq!(r.mate_brain, refuser_mate);
    assert_eq!(r.counters.mate_failures, 0);
    assert_eq!(r.last_action(), Action::Sleep);
}

#[test]
fn test_consenting_partner_swaps_mate_brains() {
    let mut state = SimulationState::new(small_config(1)).unwrap();
    let suitor = place(&mut state, MATE, HexPos::new(10, 10), Facing::E, 102_400 * 20);
    let mut willing = fixed_weight_brain([10, 0, 0, 0, 0, 0, 0, 1000]);
    willing.origin.uid = hexbugs::core::types::LineageId(77);
    let mate = willing.duplicate();
    let partner = state
        .place_agent(Agent::new(0, HexPos::new(11, 10), Facing::W, Fixed::from_raw(102_400 * 20), willing, mate))
        .unwrap();

    take_turn(&mut state, suitor).unwrap();
    let s = state.agent(suitor).unwrap();
    let p = state.agent(partner).unwrap();
    assert_eq!(s.mate_brain.uid().0, 77);
    assert_eq!(p.mate_brain.uid(), s.brain.uid());
    assert_eq!(s.counters.mate_successes, 1);
    assert_eq!(p.counters.mate_successes, 1);
    assert!(s.has_fresh_mate());
}

#[test]
fn test_starvation_after_sleep_feeds_cell() {
    let mut state = SimulationState::new(small_config(1)).unwrap();
    let floor = state.config.metabolism.starvation_floor.raw();
    let genes = fixed_weight_brain(SLEEP).gene_count();
    let cost = state.config.costs.sleep;

    // Starting mass that lands exactly one unit under the floor after sleeping
    let start = (floor..floor + 10_000)
        .find(|&m| m - metabolic_debit(cost, Fixed::from_raw(m), genes, &state.config.metabolism).raw() == floor - 1)
        .expect("some starting mass lands on floor - 1");

    let pos = HexPos::new(5, 5);
    let id = place(&mut state, SLEEP, pos, Facing::E, start);
    let food_before = state.world.food(pos);

    let outcome = take_turn(&mut state, id).unwrap();
    assert_eq!(outcome.action, Action::Sleep);
    assert_eq!(outcome.death, Some(DeathCause::Starvation));
    assert!(!state.population.contains(id));
    assert_eq!(state.current.starvations, 1);
    assert_eq!(state.world.food(pos), food_before + Fixed::from_raw(floor - 1));
    assert!(state.world.cell(pos).is_empty());
}

#[test]
fn test_sleeping_at_the_floor_survives() {
    let mut state = SimulationState::new(small_config(1)).unwrap();
    let floor = state.config.metabolism.starvation_floor.raw();
    let id = place(&mut state, SLEEP, HexPos::new(5, 5), Facing::E, floor * 2);
    let outcome = take_turn(&mut state, id).unwrap();
    assert_eq!(outcome.death, None);
    assert!(state.population.contains(id));
}

#[test]
fn test_single_node_root_survives_prune() {
    let mut brain = fixed_weight_brain(SLEEP);
    let genes = brain.gene_count();
    let shape = brain.slots[0].a.clone();

    let freed = prune(&mut brain.slots[0].a, ROOT, &mut SimRng::new(5)).unwrap();
    brain.recount();

    assert_eq!(freed, 0);
    assert_eq!(brain.gene_count(), genes);
    assert_eq!(brain.slots[0].a, shape);
}

#[test]
fn test_thin_parent_never_divides() {
    let config = small_config(1);
    let floor = config.metabolism.starvation_floor.raw();
    let overhead = config.costs.divide_overhead.raw();
    // Stock brains divide in three
    let threshold = 3 * (floor + overhead);

    for mass in [floor, threshold / 2, threshold - 3, threshold - 1] {
        let mut state = SimulationState::new(config.clone()).unwrap();
        let id = place(&mut state, DIVIDE, HexPos::new(20, 16), Facing::E, mass);
        let outcome = take_turn(&mut state, id).unwrap();
        assert_eq!(outcome.births, 0, "mass {} divided", mass);
        assert_eq!(state.current.births, 0);
        assert_eq!(outcome.death, Some(DeathCause::Starvation));
    }

    let mut state = SimulationState::new(config).unwrap();
    let id = place(&mut state, DIVIDE, HexPos::new(20, 16), Facing::E, threshold);
    assert_eq!(take_turn(&mut state, id).unwrap().births, 2);
}

#[test]
fn test_weightless_defender_always_loses() {
    for seed in 0..20 {
        let mut config = small_config(seed);
        config.safety = false;
        let mut state = SimulationState::new(config).unwrap();
        let attacker = place(&mut state, MOVE, HexPos::new(10, 10), Facing::E, 102_400 * 4);
        // Head-on, the most favourable angle for the defender
        let defender = place(&mut state, SLEEP, HexPos::new(11, 10), Facing::E, 0);

        let outcome = take_turn(&mut state, attacker).unwrap();
        assert_eq!(outcome.victim, Some(defender));
        assert_eq!(state.agent(attacker).unwrap().pos(), HexPos::new(11, 10));
        assert_eq!(state.current.collisions, 1);
        assert!(state.is_consistent());
    }
}

#[test]
fn test_heavy_head_on_defender_usually_holds() {
    let mut held = 0;
    for seed in 0..50 {
        let mut config = small_config(seed);
        config.safety = false;
        let mut state = SimulationState::new(config).unwrap();
        let home = HexPos::new(10, 10);
        let dest = HexPos::new(11, 10);
        let attacker = place(&mut state, MOVE, home, Facing::E, 102_400 * 2);
        let defender = place(&mut state, SLEEP, dest, Facing::E, 102_400 * 200);

        // The attacker's mass once the move has been paid for
        let mut charged = state.agent(attacker).unwrap().clone();
        charge(&mut charged, state.config.costs.movement, &state.config.metabolism);
        let food_home = state.world.food(home);
        let food_dest = state.world.food(dest);

        let outcome = take_turn(&mut state, attacker).unwrap();
        if outcome.death == Some(DeathCause::Combat) {
            held += 1;
            assert!(!state.population.contains(attacker));
            assert_eq!(state.world.food(dest), food_dest + charged.mass());
            assert_eq!(state.world.food(home), food_home);
            assert!(state.world.cell(home).is_empty());
            let d = state.agent(defender).unwrap();
            assert_eq!(d.last_action(), Action::Defend);
            assert_eq!(d.counters.times_defended, 1);
        }
    }
    assert!(held > 45, "defender held only {} times", held);
}

#[test]
fn test_sample_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/hexbugs.toml");
    let config = SimulationConfig::load(path).unwrap();
    assert_eq!(config, SimulationConfig::default());
}

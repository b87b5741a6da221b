//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here. Defaults reproduce the values the
//! evolutionary dynamics were tuned against. Masses and food are raw
//! fixed-point (1024 = one unit of mass); costs and rates are per-1024
//! multipliers unless stated otherwise.
//!
//! The engine re-reads this struct every turn. A [`Controller`] may change
//! fields between turns, so never cache a value across turns.
//!
//! [`Controller`]: crate::simulation::control::Controller

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{BugsError, Result};
use crate::core::fixed::Fixed;

/// Configuration for a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the single random stream
    pub seed: u64,
    pub world: WorldConfig,
    pub costs: ActionCosts,
    pub metabolism: MetabolismConfig,
    pub food: FoodConfig,
    pub division: DivisionPolicy,
    pub population: PopulationLimits,
    /// While set, moving into an occupied cell aborts instead of fighting
    pub safety: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 54321,
            world: WorldConfig::default(),
            costs: ActionCosts::default(),
            metabolism: MetabolismConfig::default(),
            food: FoodConfig::default(),
            division: DivisionPolicy::default(),
            population: PopulationLimits::default(),
            safety: true,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a TOML file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate().map_err(BugsError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.world.width < 4 || self.world.height < 4 {
            return Err(format!(
                "world must be at least 4x4, got {}x{}",
                self.world.width, self.world.height
            ));
        }

        // The offset-row hex layout only wraps cleanly on an even row count
        if self.world.height % 2 != 0 {
            return Err(format!("world height ({}) must be even", self.world.height));
        }

        if self.metabolism.starvation_floor.raw() <= 0 {
            return Err("starvation_floor must be positive".into());
        }

        if self.metabolism.nominal_mass <= 0 || self.metabolism.gene_knee <= 0 {
            return Err("nominal_mass and gene_knee must be positive".into());
        }

        if self.metabolism.obesity_step <= 0 {
            return Err("obesity_step must be positive".into());
        }

        if self.food.season_length == 0 {
            return Err("season_length must be non-zero".into());
        }

        if self.population.target > self.population.hard_limit {
            return Err(format!(
                "population target ({}) should be <= hard limit ({})",
                self.population.target, self.population.hard_limit
            ));
        }

        Ok(())
    }
}

/// World dimensions and initial food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    /// Food placed in every cell at the start of a run
    pub initial_food: Fixed,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 192,
            height: 160,
            initial_food: Fixed::from_raw(128_000),
        }
    }
}

/// Flat per-action costs, prorated by mass (see [`MetabolismConfig`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    pub sleep: i64,
    pub eat: i64,
    pub turn: i64,
    pub movement: i64,
    /// Extra charge for winning a fight, on top of the move
    pub fight: i64,
    /// Charged to the initiator of every mate attempt. Escalated over time
    /// by the adaptive schedule.
    pub mate: i64,
    /// Mass removed from every child's share at division
    pub divide_overhead: Fixed,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            sleep: 12,
            eat: 48,
            turn: 16,
            movement: 96,
            fight: 36,
            mate: 12,
            divide_overhead: Fixed::from_raw(25_600),
        }
    }
}

/// How costs turn into mass loss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetabolismConfig {
    /// Costs are quoted for an agent of this raw mass
    pub nominal_mass: i64,
    /// Raw mass charged per gene, cubic in gene count
    ///
    /// Effective extra mass is `gene_cost * genes^3 / gene_knee^2`, so beyond
    /// `gene_knee` genes the cost of carrying a genome climbs steeply.
    pub gene_cost: i64,
    pub gene_knee: i64,
    /// Maximum intake per Eat, per 1024 of body mass (205 = ~20%)
    pub eat_limit: i64,
    /// Below this mass an agent starves
    pub starvation_floor: Fixed,
    /// Above this effective mass every cost is taxed
    pub mass_cap: Fixed,
    /// Each `obesity_step` of mass over the cap adds another 1x to costs
    pub obesity_step: i64,
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        Self {
            nominal_mass: 1024,
            gene_cost: 128,
            gene_knee: 96,
            eat_limit: 205,
            starvation_floor: Fixed::from_raw(102_400),
            mass_cap: Fixed::from_raw(10_240_000),
            obesity_step: 102_400,
        }
    }
}

/// Food field tunables, read by the food-growth collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodConfig {
    /// Soft cap per cell; overage decays
    pub cap: Fixed,
    /// Peak per-turn growth multiplier, per 1024
    pub grow: i64,
    /// Share of a rich cell that leaks into a poor neighbour, per 1024
    pub spread: i64,
    /// Share of the overage above `cap` lost each turn, per 1024
    pub decay: i64,
    /// Amplitude of the latitude growth profile. Raised by the adaptive
    /// schedule once the population takes off.
    pub hump: f32,
    /// Turns for the growth band to sweep once across the world
    pub season_length: u64,
    /// Occupied cells grow food while `leak < 0`; otherwise they rot
    pub leak: i64,
    /// Rot multipliers by distance to the nearest agent, per 1024
    pub rot: [i64; 4],
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            cap: Fixed::from_raw(1_024_000),
            grow: 1044,
            spread: 10,
            decay: 115,
            hump: 1.4,
            season_length: 32_768,
            leak: -1,
            rot: [988, 973, 1012, 1023],
        }
    }
}

/// Gating rules applied when an agent chooses to divide
///
/// Each flag corresponds to one bit of the classic policy byte, see
/// [`DivisionPolicy::from_bits`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DivisionPolicy {
    /// Agents younger than `age_floor` cannot divide
    pub enforce_age_floor: bool,
    /// Underage attempt divides the parent's mass by its divide count
    pub age_split_penalty: bool,
    /// Underage attempt costs the division overhead
    pub age_overhead_penalty: bool,
    /// Agents that have not mated since their last division cannot divide
    pub enforce_mating: bool,
    /// Unmated attempt divides the parent's mass by its divide count
    pub mating_split_penalty: bool,
    /// Unmated attempt costs the division overhead
    pub mating_overhead_penalty: bool,
    /// After dividing, the agent must mate again before the next division
    pub reset_mate_after_division: bool,
    /// Minimum age in turns for division when the age floor is enforced
    pub age_floor: u64,
}

impl DivisionPolicy {
    const MATING: u8 = 0x01;
    const RESET_MATE: u8 = 0x02;
    const MATING_OVERHEAD: u8 = 0x04;
    const MATING_SPLIT: u8 = 0x08;
    const AGE: u8 = 0x10;
    const AGE_OVERHEAD: u8 = 0x20;
    const AGE_SPLIT: u8 = 0x40;

    /// Set the flags from a policy byte, keeping the age floor
    pub fn set_bits(&mut self, bits: u8) {
        self.enforce_mating = bits & Self::MATING != 0;
        self.reset_mate_after_division = bits & Self::RESET_MATE != 0;
        self.mating_overhead_penalty = bits & Self::MATING_OVERHEAD != 0;
        self.mating_split_penalty = bits & Self::MATING_SPLIT != 0;
        self.enforce_age_floor = bits & Self::AGE != 0;
        self.age_overhead_penalty = bits & Self::AGE_OVERHEAD != 0;
        self.age_split_penalty = bits & Self::AGE_SPLIT != 0;
    }

    pub fn from_bits(bits: u8) -> Self {
        let mut policy = Self::default();
        policy.set_bits(bits);
        policy
    }

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.enforce_mating {
            bits |= Self::MATING;
        }
        if self.reset_mate_after_division {
            bits |= Self::RESET_MATE;
        }
        if self.mating_overhead_penalty {
            bits |= Self::MATING_OVERHEAD;
        }
        if self.mating_split_penalty {
            bits |= Self::MATING_SPLIT;
        }
        if self.enforce_age_floor {
            bits |= Self::AGE;
        }
        if self.age_overhead_penalty {
            bits |= Self::AGE_OVERHEAD;
        }
        if self.age_split_penalty {
            bits |= Self::AGE_SPLIT;
        }
        bits
    }
}

/// Population regulation thresholds used by the adaptive schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationLimits {
    /// Age of division relaxes while the population is below this
    pub target: usize,
    /// Above this the age of division jumps to the age of the oldest agent
    pub hard_limit: usize,
}

impl Default for PopulationLimits {
    fn default() -> Self {
        Self {
            target: 5000,
            hard_limit: 24_000,
        }
    }
}

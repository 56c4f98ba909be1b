//! Engine configuration.
//!
//! A flat set of named thresholds for every gate in the objective engine.
//! The host loads it from whatever file format it uses (enable the `serde`
//! feature) and hands it to the engine; nothing in this workspace reads
//! files.  All durations are seconds, all health/resource floors are
//! percentages in `[0, 100]`.

use crate::{QbError, QbResult};

/// A closed `[min, max]` range of seconds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Distances (world units) at which a leader stops to let followers regroup.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FollowerDistance {
    /// Wait if *every* follower is further than this.
    pub nearest: f32,
    /// Wait if *any* follower is further than this.
    pub furthest: f32,
}

/// Cadence and ceilings for breaking off a quest to loot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootBreak {
    pub enabled: bool,
    /// Minimum seconds between loot scans while nothing has been found.
    pub min_time_between_looting_checks: f32,
    /// Minimum seconds between loot scans once loot was found.
    pub min_time_between_looting_events: f32,
    /// Pause applied whenever the loot gate fires.
    pub max_time_to_start_looting: f64,
    /// Ceiling on how long one loot search may run without finding anything.
    pub max_loot_scan_time: f64,
}

impl Default for LootBreak {
    fn default() -> Self {
        Self {
            enabled:                         true,
            min_time_between_looting_checks: 50.0,
            min_time_between_looting_events: 80.0,
            max_time_to_start_looting:       2.0,
            max_loot_scan_time:              4.0,
        }
    }
}

/// Displacement-based stuck detection thresholds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StuckDetection {
    /// Movement below this distance does not count as progress.
    pub distance: f32,
    /// Seconds without progress before the agent is declared stuck.
    pub time: f64,
}

impl Default for StuckDetection {
    fn default() -> Self {
        Self { distance: 2.0, time: 20.0 }
    }
}

/// Conditions an agent must satisfy to keep questing.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestingRequirements {
    /// Apply each quest's `[min_level, max_level]` gate.
    pub exclude_bots_by_level: bool,
    pub min_hydration: f32,
    pub min_energy: f32,
    pub min_health_head: f32,
    pub min_health_chest: f32,
    pub min_health_stomach: f32,
    /// Applied to each leg independently.
    pub min_health_legs: f32,
    pub max_overweight_percentage: f32,
    pub max_follower_distance: FollowerDistance,
    /// `max_time_on_quest` for quests built with
    /// `QuestSettings::from_requirements` (and the plain default).
    pub max_time_per_quest: f64,
    pub break_for_looting: LootBreak,
}

impl Default for QuestingRequirements {
    fn default() -> Self {
        Self {
            exclude_bots_by_level:     true,
            min_hydration:             20.0,
            min_energy:                20.0,
            min_health_head:           50.0,
            min_health_chest:          50.0,
            min_health_stomach:        50.0,
            min_health_legs:           50.0,
            max_overweight_percentage: 100.0,
            max_follower_distance:     FollowerDistance { nearest: 10.0, furthest: 20.0 },
            max_time_per_quest:        300.0,
            break_for_looting:         LootBreak::default(),
        }
    }
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Global cooldown between objective switches for one agent.
    pub min_time_between_switching_objectives: f64,
    /// Range the post-combat search threshold is drawn from.
    pub search_time_after_combat: MinMax,
    pub stuck_detection: StuckDetection,
    /// An agent within this distance of its step position has reached it.
    pub objective_reach_distance: f32,
    /// Pause applied while waiting for followers to regroup.
    pub follower_wait_secs: f64,
    pub requirements: QuestingRequirements,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_time_between_switching_objectives: 5.0,
            search_time_after_combat:              MinMax::new(20.0, 45.0),
            stuck_detection:                       StuckDetection::default(),
            objective_reach_distance:              2.0,
            follower_wait_secs:                    5.0,
            requirements:                          QuestingRequirements::default(),
        }
    }
}

impl EngineConfig {
    /// Reject configurations no gate can evaluate sensibly.
    pub fn validate(&self) -> QbResult<()> {
        let search = self.search_time_after_combat;
        if search.min < 0.0 || search.max < search.min {
            return Err(QbError::Config(format!(
                "search_time_after_combat must satisfy 0 <= min <= max (got {}..{})",
                search.min, search.max
            )));
        }
        if self.stuck_detection.distance < 0.0 || self.stuck_detection.time <= 0.0 {
            return Err(QbError::Config(
                "stuck_detection needs a non-negative distance and a positive time".into(),
            ));
        }
        if self.objective_reach_distance <= 0.0 {
            return Err(QbError::Config("objective_reach_distance must be positive".into()));
        }
        if self.min_time_between_switching_objectives < 0.0 || self.follower_wait_secs < 0.0 {
            return Err(QbError::Config("durations must be non-negative".into()));
        }

        let req = &self.requirements;
        let floors = [
            ("min_hydration", req.min_hydration),
            ("min_energy", req.min_energy),
            ("min_health_head", req.min_health_head),
            ("min_health_chest", req.min_health_chest),
            ("min_health_stomach", req.min_health_stomach),
            ("min_health_legs", req.min_health_legs),
        ];
        if let Some((name, value)) = floors.iter().find(|(_, v)| !(0.0..=100.0).contains(v)) {
            return Err(QbError::Config(format!("{name} must be a percentage (got {value})")));
        }
        let followers = req.max_follower_distance;
        if followers.nearest < 0.0 || followers.furthest < followers.nearest {
            return Err(QbError::Config(
                "max_follower_distance must satisfy 0 <= nearest <= furthest".into(),
            ));
        }
        if req.max_time_per_quest <= 0.0 {
            return Err(QbError::Config("max_time_per_quest must be positive".into()));
        }
        let loot = &req.break_for_looting;
        if loot.min_time_between_looting_checks < 0.0
            || loot.min_time_between_looting_events < 0.0
            || loot.max_time_to_start_looting < 0.0
            || loot.max_loot_scan_time < 0.0
        {
            return Err(QbError::Config("break_for_looting durations must be non-negative".into()));
        }
        Ok(())
    }
}

//! Quests: weighted containers of objectives with per-agent bookkeeping.
//!
//! # Concurrency
//!
//! All per-agent bookkeeping and the objective list live behind one
//! `RwLock` per quest.  Every mutating call (`start_quest_for_bot`,
//! `stop_quest_for_bot`, `blacklist_bot`, `complete_objective`, objective
//! add/remove) takes the write lock for its whole duration; queries take the
//! read lock and may run concurrently with each other.  A poisoned lock is
//! recovered rather than propagated — bookkeeping is always left consistent
//! by the short critical sections below.
//!
//! The "one active quest per agent" invariant is the caller's job (see
//! [`QuestRegistry::stop_all_for_bot`][crate::QuestRegistry::stop_all_for_bot]).

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use qb_core::{AgentId, ObjectiveId, QuestId, QuestingRequirements, SimRng, SimTime};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::{AgentProfile, Objective, QuestError, QuestResult};

/// Selection weights and gates for a quest.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuestSettings {
    pub min_level: u32,
    pub max_level: u32,
    /// Percent chance (0–100) the quest is accepted when offered.
    pub chance_for_selecting: f32,
    /// Lower values are offered first.
    pub priority: i32,
    /// The quest is unavailable once the simulation has run this long.
    pub max_raid_elapsed: f64,
    /// Agents engaged longer than this must pick another quest.
    pub max_time_on_quest: f64,
    pub is_repeatable: bool,
    /// Host-facing: whether agents may roam freely between this quest's
    /// objectives.  The engine and scheduler never read it.
    pub can_run_between_objectives: bool,
}

impl Default for QuestSettings {
    fn default() -> Self {
        Self {
            min_level:                  0,
            max_level:                  99,
            chance_for_selecting:       50.0,
            priority:                   99,
            max_raid_elapsed:           f64::MAX,
            max_time_on_quest:          QuestingRequirements::default().max_time_per_quest,
            is_repeatable:              false,
            can_run_between_objectives: true,
        }
    }
}

impl QuestSettings {
    /// Defaults with the time limit taken from the engine's questing
    /// requirements.
    pub fn from_requirements(requirements: &QuestingRequirements) -> Self {
        Self { max_time_on_quest: requirements.max_time_per_quest, ..Self::default() }
    }
}

#[derive(Default)]
struct QuestState {
    objectives: Vec<Arc<Objective>>,
    /// Agent → instant it first completed an objective here.
    active_bots: FxHashMap<AgentId, SimTime>,
    completed:   FxHashMap<AgentId, Vec<ObjectiveId>>,
    blacklist:   FxHashSet<AgentId>,
}

impl QuestState {
    fn valid_objectives(&self) -> impl Iterator<Item = &Arc<Objective>> {
        self.objectives.iter().filter(|o| o.first_step_position().is_some())
    }

    fn remaining_for(&self, agent: &AgentProfile) -> Vec<Arc<Objective>> {
        let done = self.completed.get(&agent.id);
        self.valid_objectives()
            .filter(|o| o.can_assign_bot(agent))
            .filter(|o| o.can_assign_more_bots())
            .filter(|o| done.is_none_or(|d| !d.contains(&o.id())))
            .cloned()
            .collect()
    }
}

/// A named, weighted collection of [`Objective`]s.
pub struct Quest {
    id:       QuestId,
    name:     String,
    settings: QuestSettings,
    state:    RwLock<QuestState>,
}

impl Quest {
    pub fn new(id: QuestId, name: impl Into<String>, settings: QuestSettings) -> Self {
        Self {
            id,
            name: name.into(),
            settings,
            state: RwLock::new(QuestState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, QuestState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, QuestState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Metadata ──────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> QuestId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &QuestSettings {
        &self.settings
    }

    pub fn priority(&self) -> i32 {
        self.settings.priority
    }

    pub fn chance_for_selecting(&self) -> f32 {
        self.settings.chance_for_selecting
    }

    // ── Objectives ────────────────────────────────────────────────────────

    pub fn add_objective(&self, objective: Objective) -> QuestResult<Arc<Objective>> {
        let mut state = self.write();
        if state.objectives.iter().any(|o| o.id() == objective.id()) {
            return Err(QuestError::DuplicateObjective {
                quest:     self.id,
                objective: objective.id(),
            });
        }
        let objective = Arc::new(objective);
        state.objectives.push(Arc::clone(&objective));
        Ok(objective)
    }

    /// Remove the objective with exactly this ID.  Returns `true` iff one was
    /// removed.  Agents already holding it keep their `Arc` until they let go.
    pub fn try_remove_objective(&self, id: ObjectiveId) -> bool {
        let mut state = self.write();
        let before = state.objectives.len();
        state.objectives.retain(|o| o.id() != id);
        state.objectives.len() < before
    }

    pub fn all_objectives(&self) -> Vec<Arc<Objective>> {
        self.read().objectives.clone()
    }

    pub fn number_of_objectives(&self) -> usize {
        self.read().objectives.len()
    }

    /// Objectives whose first step has a position.
    pub fn valid_objectives(&self) -> Vec<Arc<Objective>> {
        self.read().valid_objectives().cloned().collect()
    }

    pub fn number_of_valid_objectives(&self) -> usize {
        self.read().valid_objectives().count()
    }

    /// First objective matching `pred`, in insertion order.  More than one
    /// match is a data problem: it is logged and the first one wins.
    pub fn find_objective<F>(&self, pred: F) -> Option<Arc<Objective>>
    where
        F: Fn(&Objective) -> bool,
    {
        let state = self.read();
        let matches: Vec<&Arc<Objective>> = state.objectives.iter().filter(|o| pred(o)).collect();
        if matches.len() > 1 {
            let names: Vec<&str> = matches.iter().map(|o| o.name()).collect();
            warn!(
                quest = %self.name,
                objectives = ?names,
                "multiple objectives match; using the first one"
            );
        }
        matches.first().map(|o| Arc::clone(o))
    }

    pub fn objective_for_tag(&self, tag: &str) -> Option<Arc<Objective>> {
        self.find_objective(|o| o.tag() == Some(tag))
    }

    /// Drop every objective and forget the blacklist.
    pub fn clear(&self) {
        let mut state = self.write();
        state.blacklist.clear();
        state.objectives.clear();
    }

    // ── Per-agent bookkeeping ─────────────────────────────────────────────

    /// Record `now` as the agent's first engagement; no-op if already engaged.
    pub fn start_quest_for_bot(&self, agent: AgentId, now: SimTime) {
        self.write().active_bots.entry(agent).or_insert(now);
    }

    /// Forget the agent's engagement and completions.  The blacklist is
    /// untouched.
    pub fn stop_quest_for_bot(&self, agent: AgentId) {
        let mut state = self.write();
        state.active_bots.remove(&agent);
        state.completed.remove(&agent);
    }

    /// Permanently bar `agent` from this quest.
    pub fn blacklist_bot(&self, agent: AgentId) {
        let mut state = self.write();
        if state.blacklist.insert(agent) {
            debug!(quest = %self.name, %agent, "agent blacklisted");
        }
        state.active_bots.remove(&agent);
        state.completed.remove(&agent);
    }

    pub fn is_blacklisted(&self, agent: AgentId) -> bool {
        self.read().blacklist.contains(&agent)
    }

    pub fn complete_objective(&self, agent: AgentId, objective: ObjectiveId) {
        self.write().completed.entry(agent).or_default().push(objective);
    }

    pub fn has_bot_completed_any_objectives(&self, agent: AgentId) -> bool {
        self.read().completed.contains_key(&agent)
    }

    pub fn has_bot_completed(&self, agent: AgentId, objective: ObjectiveId) -> bool {
        self.read()
            .completed
            .get(&agent)
            .is_some_and(|d| d.contains(&objective))
    }

    /// Engaged agents in ascending ID order.
    pub fn active_bots(&self) -> Vec<AgentId> {
        let mut bots: Vec<AgentId> = self.read().active_bots.keys().copied().collect();
        bots.sort_unstable();
        bots
    }

    /// Seconds since the agent first engaged, if it has.
    pub fn time_on_quest(&self, agent: AgentId, now: SimTime) -> Option<f64> {
        self.read().active_bots.get(&agent).map(|&since| now.secs_since(since))
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Blacklist, level range (unless `exclude_by_level` is off) and the
    /// elapsed-simulation-time gate, all AND-ed.
    pub fn can_assign_bot(
        &self,
        agent: &AgentProfile,
        elapsed_raid_secs: f64,
        exclude_by_level: bool,
    ) -> bool {
        !self.is_blacklisted(agent.id)
            && (agent.level >= self.settings.min_level || !exclude_by_level)
            && (agent.level <= self.settings.max_level || !exclude_by_level)
            && elapsed_raid_secs < self.settings.max_raid_elapsed
    }

    /// Uniform pick among valid objectives with spare capacity.
    pub fn random_objective(&self, rng: &mut SimRng) -> Option<Arc<Objective>> {
        let state = self.read();
        let candidates: Vec<&Arc<Objective>> = state
            .valid_objectives()
            .filter(|o| o.can_assign_more_bots())
            .collect();
        rng.choose(&candidates).map(|o| Arc::clone(o))
    }

    /// Uniform pick among objectives this agent can still do here.
    ///
    /// Returns `None` when the agent has overstayed `max_time_on_quest`, even
    /// if objectives remain.
    pub fn random_new_objective(
        &self,
        agent: &AgentProfile,
        now: SimTime,
        rng: &mut SimRng,
    ) -> Option<Arc<Objective>> {
        let state = self.read();
        if let Some(&since) = state.active_bots.get(&agent.id) {
            let spent = now.secs_since(since);
            if spent > self.settings.max_time_on_quest {
                warn!(
                    agent = %agent.id,
                    quest = %self.name,
                    spent_secs = spent,
                    "agent has spent too long on quest and will choose another one"
                );
                return None;
            }
        }
        rng.choose(&state.remaining_for(agent)).cloned()
    }

    pub fn remaining_objective_count(&self, agent: &AgentProfile) -> usize {
        self.read().remaining_for(agent).len()
    }
}

impl fmt::Debug for Quest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Quest")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("objectives", &self.number_of_objectives())
            .finish()
    }
}

impl fmt::Display for Quest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

//! The shared quest pool and quest-level selection.

use std::collections::BTreeMap;
use std::sync::Arc;

use qb_core::{AgentId, QbError, QuestId, SimRng, SimTime};
use tracing::debug;

use crate::{AgentProfile, Objective, Quest, QuestError, QuestResult};

/// A quest together with the objective picked from it.
pub type Selection = (Arc<Quest>, Arc<Objective>);

/// Every quest available in the simulation, in registration order.
#[derive(Default)]
pub struct QuestRegistry {
    quests: Vec<Arc<Quest>>,
}

impl QuestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, quest: Quest) -> QuestResult<Arc<Quest>> {
        if self.quests.iter().any(|q| q.id() == quest.id()) {
            return Err(QuestError::DuplicateQuest(quest.id()));
        }
        let quest = Arc::new(quest);
        self.quests.push(Arc::clone(&quest));
        Ok(quest)
    }

    pub fn get(&self, id: QuestId) -> QuestResult<Arc<Quest>> {
        self.quests
            .iter()
            .find(|q| q.id() == id)
            .cloned()
            .ok_or(QuestError::Core(QbError::QuestNotFound(id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Quest>> {
        self.quests.iter()
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Remove `agent` from every quest's active set so a new quest can be
    /// started without breaking the one-active-quest invariant.
    pub fn stop_all_for_bot(&self, agent: AgentId) {
        for quest in &self.quests {
            quest.stop_quest_for_bot(agent);
        }
    }

    /// Pick a quest and one of its objectives for `agent`.
    ///
    /// Quests are offered in ascending priority; within one priority band the
    /// order is shuffled.  Each offered quest is accepted with probability
    /// `chance_for_selecting / 100`, provided the agent may take it and it
    /// still has a new objective for the agent.  If every roll fails, the
    /// first eligible quest in priority order is used so that available work
    /// never goes unassigned.
    pub fn select(
        &self,
        agent:             &AgentProfile,
        elapsed_raid_secs: f64,
        exclude_by_level:  bool,
        now:               SimTime,
        rng:               &mut SimRng,
    ) -> Option<Selection> {
        let mut bands: BTreeMap<i32, Vec<&Arc<Quest>>> = BTreeMap::new();
        for quest in &self.quests {
            if quest.can_assign_bot(agent, elapsed_raid_secs, exclude_by_level) {
                bands.entry(quest.priority()).or_default().push(quest);
            }
        }

        let mut fallback: Option<&Arc<Quest>> = None;
        for band in bands.values_mut() {
            rng.shuffle(band);
            for &quest in band.iter() {
                if quest.remaining_objective_count(agent) == 0 {
                    continue;
                }
                fallback.get_or_insert(quest);
                let chance = f64::from(quest.chance_for_selecting()) / 100.0;
                if !rng.gen_bool(chance) {
                    continue;
                }
                if let Some(objective) = quest.random_new_objective(agent, now, rng) {
                    debug!(agent = %agent.id, quest = %quest, objective = %objective, "quest selected");
                    return Some((Arc::clone(quest), objective));
                }
            }
        }

        let quest = fallback?;
        let objective = quest.random_new_objective(agent, now, rng)?;
        debug!(agent = %agent.id, quest = %quest, objective = %objective, "quest selected as fallback");
        Some((Arc::clone(quest), objective))
    }
}

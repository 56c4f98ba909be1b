//! Unit tests for qb-quest.

use std::sync::Arc;

use qb_core::{AgentId, ObjectiveId, Position, QuestId, QuestingRequirements, SimRng, SimTime};

use crate::{AgentProfile, Objective, Quest, QuestSettings, Step};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn profile(id: u32, level: u32) -> AgentProfile {
    AgentProfile::new(AgentId(id), level)
}

fn step_at(x: f32) -> Step {
    Step::new(Position::new(x, 0.0, 0.0))
}

fn objective(id: u32, steps: usize) -> Objective {
    let steps = (0..steps).map(|i| step_at(i as f32 * 10.0)).collect();
    Objective::new(ObjectiveId(id), format!("objective-{id}"), steps)
}

fn quest(id: u32) -> Quest {
    Quest::new(QuestId(id), format!("quest-{id}"), QuestSettings::default())
}

fn quest_with(id: u32, settings: QuestSettings) -> Arc<Quest> {
    Arc::new(Quest::new(QuestId(id), format!("quest-{id}"), settings))
}

// ── Objective ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod objective_tests {
    use super::*;

    #[test]
    fn next_step_walks_the_sequence() {
        let o = objective(1, 3);
        assert_eq!(o.next_step(None), Some(0));
        assert_eq!(o.next_step(Some(0)), Some(1));
        assert_eq!(o.next_step(Some(1)), Some(2));
        assert_eq!(o.next_step(Some(2)), None);
    }

    #[test]
    fn empty_objective_has_no_first_step() {
        let o = objective(1, 0);
        assert_eq!(o.next_step(None), None);
        assert!(o.first_step_position().is_none());
    }

    #[test]
    fn unresolved_first_step_is_invalid() {
        let o = Objective::new(ObjectiveId(1), "ghost", vec![Step::unresolved(), step_at(1.0)]);
        assert!(o.first_step_position().is_none());
    }

    #[test]
    fn step_number_is_one_based() {
        let o = objective(1, 2);
        assert_eq!(o.step_number(None), 0);
        assert_eq!(o.step_number(Some(0)), 1);
        assert_eq!(o.step_number(Some(1)), 2);
        assert_eq!(o.step_number(Some(9)), 0);
    }

    #[test]
    fn capacity_changes_by_one_unit() {
        let o = objective(1, 1).with_max_bots(2);
        assert!(o.can_assign_more_bots());
        assert!(o.try_assign_bot(AgentId(0)));
        assert!(o.can_assign_more_bots());
        assert!(o.try_assign_bot(AgentId(1)));
        assert!(!o.can_assign_more_bots());
        assert!(!o.try_assign_bot(AgentId(2)));
        assert!(o.try_assign_bot(AgentId(1)));
        assert_eq!(o.assigned_bot_count(), 2);
        assert!(o.unassign_bot(AgentId(0)));
        assert!(o.can_assign_more_bots());
        assert_eq!(o.assigned_bot_count(), 1);
    }

    #[test]
    fn rule_is_consulted() {
        let o = objective(1, 1).with_rule(|a| a.level >= 10);
        assert!(!o.can_assign_bot(&profile(0, 5)));
        assert!(o.can_assign_bot(&profile(0, 10)));
    }

    #[test]
    fn equality_is_by_id() {
        let a = objective(4, 1);
        let b = Objective::new(ObjectiveId(4), "other name", vec![]);
        assert_eq!(a, b);
        assert_ne!(a, objective(5, 1));
    }
}

// ── Quest ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod quest_tests {
    use super::*;

    #[test]
    fn level_gate_and_toggle() {
        let q = quest_with(1, QuestSettings { min_level: 10, max_level: 20, ..Default::default() });
        assert!(!q.can_assign_bot(&profile(0, 5), 0.0, true));
        assert!(q.can_assign_bot(&profile(0, 15), 0.0, true));
        assert!(!q.can_assign_bot(&profile(0, 25), 0.0, true));
        // Level gating disabled globally.
        assert!(q.can_assign_bot(&profile(0, 5), 0.0, false));
        assert!(q.can_assign_bot(&profile(0, 25), 0.0, false));
    }

    #[test]
    fn raid_time_gate() {
        let q = quest_with(1, QuestSettings { max_raid_elapsed: 600.0, ..Default::default() });
        assert!(q.can_assign_bot(&profile(0, 1), 599.0, true));
        assert!(!q.can_assign_bot(&profile(0, 1), 600.0, true));
    }

    #[test]
    fn blacklist_survives_stop_and_start() {
        let q = quest(1);
        let agent = profile(3, 1);
        q.blacklist_bot(agent.id);
        q.blacklist_bot(agent.id); // idempotent
        for i in 0..3 {
            q.start_quest_for_bot(agent.id, SimTime::from_secs(i));
            q.stop_quest_for_bot(agent.id);
            assert!(!q.can_assign_bot(&agent, 0.0, false));
        }
        assert!(q.is_blacklisted(agent.id));
    }

    #[test]
    fn blacklist_also_stops_the_quest() {
        let q = quest(1);
        q.start_quest_for_bot(AgentId(1), SimTime::ZERO);
        q.complete_objective(AgentId(1), ObjectiveId(9));
        q.blacklist_bot(AgentId(1));
        assert!(q.active_bots().is_empty());
        assert!(!q.has_bot_completed_any_objectives(AgentId(1)));
    }

    #[test]
    fn start_records_first_time_only() {
        let q = quest(1);
        q.start_quest_for_bot(AgentId(0), SimTime::from_secs(5));
        q.start_quest_for_bot(AgentId(0), SimTime::from_secs(50));
        assert_eq!(q.time_on_quest(AgentId(0), SimTime::from_secs(65)), Some(60.0));
    }

    #[test]
    fn stop_clears_engagement_but_not_blacklist_of_others() {
        let q = quest(1);
        q.blacklist_bot(AgentId(2));
        q.start_quest_for_bot(AgentId(1), SimTime::ZERO);
        q.complete_objective(AgentId(1), ObjectiveId(1));
        q.stop_quest_for_bot(AgentId(1));
        assert!(q.time_on_quest(AgentId(1), SimTime::ZERO).is_none());
        assert!(!q.has_bot_completed_any_objectives(AgentId(1)));
        assert!(q.is_blacklisted(AgentId(2)));
    }

    #[test]
    fn random_new_objective_skips_completed() {
        let q = quest(1);
        q.add_objective(objective(1, 1)).unwrap();
        q.add_objective(objective(2, 1)).unwrap();
        let agent = profile(0, 1);
        q.complete_objective(agent.id, ObjectiveId(1));

        let mut rng = SimRng::new(7);
        for _ in 0..20 {
            let picked = q.random_new_objective(&agent, SimTime::ZERO, &mut rng).unwrap();
            assert_eq!(picked.id(), ObjectiveId(2));
        }
        q.complete_objective(agent.id, ObjectiveId(2));
        assert!(q.random_new_objective(&agent, SimTime::ZERO, &mut rng).is_none());
        assert_eq!(q.remaining_objective_count(&agent), 0);
    }

    #[test]
    fn random_new_objective_filters_invalid_full_and_ruled_out() {
        let q = quest(1);
        q.add_objective(objective(1, 0)).unwrap(); // no first step
        let full = q.add_objective(objective(2, 1).with_max_bots(1)).unwrap();
        full.try_assign_bot(AgentId(99));
        q.add_objective(objective(3, 1).with_rule(|_| false)).unwrap();
        q.add_objective(objective(4, 1)).unwrap();

        let mut rng = SimRng::new(1);
        let picked = q.random_new_objective(&profile(0, 1), SimTime::ZERO, &mut rng).unwrap();
        assert_eq!(picked.id(), ObjectiveId(4));
    }

    #[test]
    fn time_limit_follows_requirements() {
        let requirements = QuestingRequirements { max_time_per_quest: 60.0, ..Default::default() };
        let q = quest_with(1, QuestSettings::from_requirements(&requirements));
        q.add_objective(objective(1, 1)).unwrap();
        q.add_objective(objective(2, 1)).unwrap();
        let agent = profile(0, 1);
        q.start_quest_for_bot(agent.id, SimTime::ZERO);

        let mut rng = SimRng::new(5);
        assert!(q.random_new_objective(&agent, SimTime::from_secs(60), &mut rng).is_some());
        assert!(q.random_new_objective(&agent, SimTime::from_secs(61), &mut rng).is_none());
    }

    #[test]
    fn default_time_limit_matches_default_requirements() {
        let settings = QuestSettings::default();
        assert_eq!(settings.max_time_on_quest, QuestingRequirements::default().max_time_per_quest);
        assert!(settings.can_run_between_objectives);
    }

    #[test]
    fn overstaying_agent_gets_nothing() {
        let q = quest_with(1, QuestSettings { max_time_on_quest: 60.0, ..Default::default() });
        q.add_objective(objective(1, 1)).unwrap();
        q.add_objective(objective(2, 1)).unwrap();
        let agent = profile(0, 1);
        q.start_quest_for_bot(agent.id, SimTime::ZERO);

        let mut rng = SimRng::new(3);
        assert!(q.random_new_objective(&agent, SimTime::from_secs(60), &mut rng).is_some());
        assert!(q.random_new_objective(&agent, SimTime::from_secs(61), &mut rng).is_none());
        // Other agents are unaffected.
        assert!(q.random_new_objective(&profile(1, 1), SimTime::from_secs(61), &mut rng).is_some());
    }

    #[test]
    fn random_objective_ignores_agent_bookkeeping() {
        let q = quest(1);
        assert!(q.random_objective(&mut SimRng::new(0)).is_none());
        let o = q.add_objective(objective(1, 1).with_max_bots(1)).unwrap();
        assert_eq!(q.random_objective(&mut SimRng::new(0)).map(|o| o.id()), Some(ObjectiveId(1)));
        o.try_assign_bot(AgentId(0));
        assert!(q.random_objective(&mut SimRng::new(0)).is_none());
    }

    #[test]
    fn duplicate_objective_rejected() {
        let q = quest(1);
        q.add_objective(objective(1, 1)).unwrap();
        assert!(q.add_objective(objective(1, 2)).is_err());
        assert_eq!(q.number_of_objectives(), 1);
    }

    #[test]
    fn remove_is_exact_match() {
        let q = quest(1);
        q.add_objective(objective(1, 1)).unwrap();
        q.add_objective(objective(2, 0)).unwrap();
        assert_eq!(q.number_of_valid_objectives(), 1);
        assert!(!q.try_remove_objective(ObjectiveId(3)));
        assert!(q.try_remove_objective(ObjectiveId(2)));
        assert_eq!(q.number_of_objectives(), 1);
        assert_eq!(q.all_objectives()[0].id(), ObjectiveId(1));
    }

    #[test]
    fn find_objective_returns_first_match() {
        let q = quest(1);
        q.add_objective(objective(1, 1).with_tag("zone-a")).unwrap();
        q.add_objective(objective(2, 1).with_tag("zone-b")).unwrap();
        q.add_objective(objective(3, 1).with_tag("zone-b")).unwrap();
        assert_eq!(q.objective_for_tag("zone-a").map(|o| o.id()), Some(ObjectiveId(1)));
        assert_eq!(q.objective_for_tag("zone-b").map(|o| o.id()), Some(ObjectiveId(2)));
        assert!(q.objective_for_tag("zone-c").is_none());
    }

    #[test]
    fn clear_drops_objectives_and_blacklist() {
        let q = quest(1);
        q.add_objective(objective(1, 1)).unwrap();
        q.blacklist_bot(AgentId(0));
        q.clear();
        assert_eq!(q.number_of_objectives(), 0);
        assert!(!q.is_blacklisted(AgentId(0)));
    }
}

// ── Assignment ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod assignment_tests {
    use super::*;
    use crate::{Assignment, AssignmentStatus};

    fn three_step_setup() -> (Arc<Quest>, Arc<Objective>) {
        let q = Arc::new(quest(1));
        let o = q.add_objective(objective(1, 3).with_max_bots(1)).unwrap();
        (q, o)
    }

    #[test]
    fn new_is_not_started() {
        let a = Assignment::new(AgentId(0));
        assert_eq!(a.status(), AssignmentStatus::NotStarted);
        assert!(a.start_time().is_none());
        assert!(a.end_time().is_none());
        assert!(a.quest().is_none());
    }

    #[test]
    fn empty_assignment_cannot_advance() {
        let mut a = Assignment::new(AgentId(0));
        assert!(!a.advance_step(SimTime::ZERO));
        assert_eq!(a.status(), AssignmentStatus::NotStarted);
    }

    #[test]
    fn construction_failure_stays_not_started() {
        let q = Arc::new(quest(1));
        let o = q.add_objective(objective(1, 0)).unwrap();
        let a = Assignment::for_objective(AgentId(0), q, Arc::clone(&o), SimTime::ZERO);
        assert_eq!(a.status(), AssignmentStatus::NotStarted);
        assert!(!a.is_started());
        assert_eq!(o.assigned_bot_count(), 0);
    }

    #[test]
    fn full_objective_refuses_second_assignment() {
        let (q, o) = three_step_setup();
        let (x, y) = (profile(0, 1), profile(1, 1));
        let mut rng = SimRng::new(0);
        // Both picks happen before either assignment claims the slot.
        let for_x = q.random_new_objective(&x, SimTime::ZERO, &mut rng).unwrap();
        let for_y = q.random_new_objective(&y, SimTime::ZERO, &mut rng).unwrap();

        let a = Assignment::for_objective(x.id, Arc::clone(&q), for_x, SimTime::ZERO);
        let b = Assignment::for_objective(y.id, Arc::clone(&q), for_y, SimTime::ZERO);
        assert!(a.is_started());
        assert!(!b.is_started());
        assert_eq!(b.status(), AssignmentStatus::NotStarted);
        assert!(b.start_time().is_none());
        assert_eq!(o.assigned_bot_count(), 1);
        assert!(o.is_assigned(x.id));
        assert!(!o.is_assigned(y.id));
    }

    #[test]
    fn concurrent_assignments_respect_cap() {
        let q = Arc::new(quest(1));
        let o = q.add_objective(objective(1, 1).with_max_bots(3)).unwrap();
        let started: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let (q, o) = (Arc::clone(&q), Arc::clone(&o));
                    s.spawn(move || {
                        let a = Assignment::for_objective(AgentId(i), q, o, SimTime::ZERO);
                        let started = a.is_started();
                        std::mem::forget(a);
                        started
                    })
                })
                .collect();
            handles.into_iter().map(|h| usize::from(h.join().unwrap())).sum()
        });
        assert_eq!(started, 3);
        assert_eq!(o.assigned_bot_count(), 3);
    }

    #[test]
    fn three_steps_then_exhausted() {
        let (q, o) = three_step_setup();
        let mut x = Assignment::for_objective(AgentId(0), Arc::clone(&q), Arc::clone(&o), SimTime::ZERO);
        assert_eq!(x.status(), AssignmentStatus::Pending);
        assert_eq!(x.step_index(), Some(0));

        // Agent Y is rejected while X holds the single slot.
        let y = profile(1, 1);
        assert!(o.can_assign_bot(&y));
        assert!(!o.can_assign_more_bots());
        assert!(q.random_new_objective(&y, SimTime::ZERO, &mut SimRng::new(0)).is_none());

        for expected in [1, 2] {
            x.begin();
            x.complete(SimTime::from_secs(expected));
            assert!(x.advance_step(SimTime::from_secs(expected)));
            assert_eq!(x.step_index(), Some(expected as usize));
        }

        x.begin();
        assert!(!x.advance_step(SimTime::from_secs(9)));
        assert_eq!(x.status(), AssignmentStatus::Active);

        x.complete(SimTime::from_secs(10));
        assert!(!x.advance_step(SimTime::from_secs(11)));
        assert_eq!(x.status(), AssignmentStatus::Completed);
        assert_eq!(x.step_index(), Some(2));
    }

    #[test]
    fn advance_refused_while_pending_or_active() {
        let (q, o) = three_step_setup();
        let mut a = Assignment::for_objective(AgentId(0), q, o, SimTime::ZERO);
        a.has_complete_path = false;
        assert!(!a.advance_step(SimTime::from_secs(1)));
        assert_eq!(a.status(), AssignmentStatus::Pending);
        assert_eq!(a.step_index(), Some(0));
        assert!(!a.has_complete_path);

        a.begin();
        assert!(!a.advance_step(SimTime::from_secs(2)));
        assert_eq!(a.status(), AssignmentStatus::Active);
        assert_eq!(a.step_index(), Some(0));
    }

    #[test]
    fn failed_cannot_advance() {
        let (q, o) = three_step_setup();
        let mut a = Assignment::for_objective(AgentId(0), q, o, SimTime::ZERO);
        a.fail(SimTime::from_secs(1));
        assert!(!a.advance_step(SimTime::from_secs(2)));
        assert_eq!(a.status(), AssignmentStatus::Failed);
    }

    #[test]
    fn start_time_written_once() {
        let (q, o) = three_step_setup();
        let mut a = Assignment::for_objective(AgentId(0), q, o, SimTime::from_secs(3));
        a.complete(SimTime::from_secs(4));
        assert!(a.advance_step(SimTime::from_secs(5)));
        a.complete(SimTime::from_secs(6));
        assert!(a.advance_step(SimTime::from_secs(7)));
        assert_eq!(a.start_time(), Some(SimTime::from_secs(3)));
        assert_eq!(a.elapsed_since_start(SimTime::from_secs(10)), Some(7.0));
    }

    #[test]
    fn end_time_first_write_wins() {
        let (q, o) = three_step_setup();
        let mut a = Assignment::for_objective(AgentId(0), q, o, SimTime::ZERO);
        a.complete(SimTime::from_secs(2));
        a.complete(SimTime::from_secs(3));
        a.fail(SimTime::from_secs(4));
        assert_eq!(a.status(), AssignmentStatus::Failed);
        assert_eq!(a.end_time(), Some(SimTime::from_secs(2)));
        assert_eq!(a.elapsed_since_end(SimTime::from_secs(5)), Some(3.0));
    }

    #[test]
    fn advance_clears_end_time_and_resets_path_flag() {
        let (q, o) = three_step_setup();
        let mut a = Assignment::for_objective(AgentId(0), q, o, SimTime::ZERO);
        a.has_complete_path = false;
        a.complete(SimTime::from_secs(1));
        assert!(a.advance_step(SimTime::from_secs(2)));
        assert!(a.end_time().is_none());
        assert!(a.has_complete_path);
        assert_eq!(a.status(), AssignmentStatus::Pending);
    }

    #[test]
    fn waited_long_enough_uses_step_wait() {
        let q = Arc::new(quest(1));
        let o = q
            .add_objective(Objective::new(ObjectiveId(1), "wait", vec![step_at(0.0).with_wait(5.0)]))
            .unwrap();
        let mut a = Assignment::for_objective(AgentId(0), q, o, SimTime::ZERO);
        assert!(!a.has_waited_long_enough_after_ending(SimTime::from_secs(100)));
        a.complete(SimTime::from_secs(10));
        assert!(!a.has_waited_long_enough_after_ending(SimTime::from_secs(14)));
        assert!(a.has_waited_long_enough_after_ending(SimTime::from_secs(15)));
    }

    #[test]
    fn archive_releases_slot_once() {
        let (q, o) = three_step_setup();
        let mut a = Assignment::for_objective(AgentId(0), q, Arc::clone(&o), SimTime::ZERO);
        assert_eq!(o.assigned_bot_count(), 1);
        a.archive();
        assert_eq!(a.status(), AssignmentStatus::Archived);
        assert_eq!(o.assigned_bot_count(), 0);
        drop(a);
        assert_eq!(o.assigned_bot_count(), 0);
    }

    #[test]
    fn drop_releases_slot() {
        let (q, o) = three_step_setup();
        {
            let _a = Assignment::for_objective(AgentId(0), q, Arc::clone(&o), SimTime::ZERO);
            assert!(o.is_assigned(AgentId(0)));
        }
        assert!(!o.is_assigned(AgentId(0)));
    }

    #[test]
    fn display_names_step_objective_and_quest() {
        let (q, o) = three_step_setup();
        let a = Assignment::for_objective(AgentId(0), q, o, SimTime::ZERO);
        assert_eq!(a.to_string(), "Step #1 for objective objective-1 in quest quest-1");
        assert_eq!(
            Assignment::new(AgentId(0)).to_string(),
            "Step #0 for objective ??? in quest ???"
        );
    }

    #[test]
    fn position_follows_current_step() {
        let (q, o) = three_step_setup();
        let mut a = Assignment::for_objective(AgentId(0), q, o, SimTime::ZERO);
        assert_eq!(a.position(), Some(Position::new(0.0, 0.0, 0.0)));
        a.complete(SimTime::ZERO);
        a.advance_step(SimTime::ZERO);
        assert_eq!(a.position(), Some(Position::new(10.0, 0.0, 0.0)));
    }
}

// ── QuestRegistry ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry_tests {
    use super::*;
    use crate::QuestRegistry;

    fn settings(priority: i32, chance: f32) -> QuestSettings {
        QuestSettings { priority, chance_for_selecting: chance, ..Default::default() }
    }

    #[test]
    fn duplicate_and_missing_ids() {
        let mut reg = QuestRegistry::new();
        reg.add(quest(1)).unwrap();
        assert!(reg.add(quest(1)).is_err());
        assert!(reg.get(QuestId(1)).is_ok());
        assert!(reg.get(QuestId(2)).is_err());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn lower_priority_value_wins_when_certain() {
        let mut reg = QuestRegistry::new();
        let late = reg.add(Quest::new(QuestId(1), "late", settings(10, 100.0))).unwrap();
        let early = reg.add(Quest::new(QuestId(2), "early", settings(1, 100.0))).unwrap();
        late.add_objective(objective(1, 1)).unwrap();
        early.add_objective(objective(2, 1)).unwrap();

        let mut rng = SimRng::new(11);
        for _ in 0..10 {
            let (q, o) = reg.select(&profile(0, 1), 0.0, true, SimTime::ZERO, &mut rng).unwrap();
            assert_eq!(q.id(), QuestId(2));
            assert_eq!(o.id(), ObjectiveId(2));
        }
    }

    #[test]
    fn zero_chance_falls_back_to_first_eligible() {
        let mut reg = QuestRegistry::new();
        let q = reg.add(Quest::new(QuestId(1), "never", settings(1, 0.0))).unwrap();
        q.add_objective(objective(1, 1)).unwrap();
        let picked = reg.select(&profile(0, 1), 0.0, true, SimTime::ZERO, &mut SimRng::new(0));
        assert_eq!(picked.map(|(q, _)| q.id()), Some(QuestId(1)));
    }

    #[test]
    fn ineligible_and_exhausted_quests_skipped() {
        let mut reg = QuestRegistry::new();
        let barred = reg.add(Quest::new(QuestId(1), "barred", settings(1, 100.0))).unwrap();
        barred.add_objective(objective(1, 1)).unwrap();
        barred.blacklist_bot(AgentId(0));
        reg.add(Quest::new(QuestId(2), "empty", settings(1, 100.0))).unwrap();
        let open = reg.add(Quest::new(QuestId(3), "open", settings(5, 100.0))).unwrap();
        open.add_objective(objective(3, 1)).unwrap();

        let picked = reg.select(&profile(0, 1), 0.0, true, SimTime::ZERO, &mut SimRng::new(0));
        assert_eq!(picked.map(|(q, _)| q.id()), Some(QuestId(3)));
    }

    #[test]
    fn nothing_available_is_none() {
        let reg = QuestRegistry::new();
        assert!(reg.select(&profile(0, 1), 0.0, true, SimTime::ZERO, &mut SimRng::new(0)).is_none());
    }

    #[test]
    fn stop_all_for_bot_clears_every_quest() {
        let mut reg = QuestRegistry::new();
        let a = reg.add(quest(1)).unwrap();
        let b = reg.add(quest(2)).unwrap();
        a.start_quest_for_bot(AgentId(0), SimTime::ZERO);
        b.start_quest_for_bot(AgentId(0), SimTime::ZERO);
        reg.stop_all_for_bot(AgentId(0));
        assert!(a.active_bots().is_empty());
        assert!(b.active_bots().is_empty());
    }
}

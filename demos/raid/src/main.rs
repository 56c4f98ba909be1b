//! Raid demo: six agents questing across a small map for four minutes.
//!
//! The world here is deliberately crude.  Agents walk in straight lines
//! toward their current step, get thirsty, and drink once the engine has
//! held them long enough.  A few scripted incidents exercise the gates:
//!
//! - agent 1 runs into a loot cache at 40 s;
//! - agent 2 spots an enemy at 30 s and searches for it afterwards;
//! - agent 3 is pinned in place and ends up stuck;
//! - agent 5 trails agent 4 as a follower and never quests itself.
//!
//! Run with `RUST_LOG=debug` to see every event the engine raises.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use anyhow::Result;
use qb_core::{
    AgentId, EngineConfig, ObjectiveId, Position, QuestId, QuestingRequirements, SimConfig, SimTime,
};
use qb_engine::{
    AgentBody, BodyPart, CombatMemory, Decision, EngineEvent, Layer, LayerRegistry, PathProvider,
    Ratio, SquadRegistry, ThreatMonitor,
};
use qb_quest::{AgentProfile, Assignment, Objective, Quest, QuestRegistry, QuestSettings, Step};
use qb_sim::{SimBuilder, SimObserver};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:          u64 = 7;
const TICK_MS:       u64 = 1_000;
const TOTAL_TICKS:   u64 = 240;
const AGENT_COUNT:   u32 = 6;
/// Walking speed in metres per second.
const WALK_SPEED:    f32 = 4.0;
/// Hydration lost per second, in percent.
const THIRST_RATE:   f32 = 0.4;
/// Agents drink once hydration drops below this.
const DRINK_BELOW:   f32 = 15.0;

const LOOTER:        AgentId = AgentId(1);
const FIGHTER:       AgentId = AgentId(2);
const PINNED:        AgentId = AgentId(3);
const LEADER:        AgentId = AgentId(4);
const FOLLOWER:      AgentId = AgentId(5);

const CACHE_FOUND_AT:  u64 = 40;
const CACHE_LOOTED_AT: u64 = 44;
const CACHE_EMPTY_AT:  u64 = 50;
const ENEMY_SEEN_AT:   u64 = 30;

// ── Raid world ────────────────────────────────────────────────────────────────

struct Body {
    position:  Position,
    hydration: f32,
    target:    Option<Position>,
}

struct RaidState {
    now:       SimTime,
    bodies:    Vec<Body>,
    followers: Vec<(AgentId, AgentId)>,
}

/// Every collaborator the engine needs, behind one lock.
///
/// The engine only reads during a tick; `advance` writes between ticks.
struct RaidWorld {
    state: RwLock<RaidState>,
}

impl RaidWorld {
    fn new(agents: u32) -> Self {
        let bodies = (0..agents)
            .map(|i| Body {
                position:  Position::new(i as f32 * 2.0, 0.0, 0.0),
                hydration: 100.0 - i as f32 * 12.0,
                target:    None,
            })
            .collect();
        Self {
            state: RwLock::new(RaidState { now: SimTime::ZERO, bodies, followers: vec![] }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RaidState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RaidState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn body<T>(&self, agent: AgentId, f: impl FnOnce(&Body) -> T) -> Option<T> {
        self.read().bodies.get(agent.index()).map(f)
    }

    fn now_secs(&self) -> u64 {
        self.read().now.as_secs_f64() as u64
    }

    /// Move the world on by `dt` seconds.  `moving` lists the agents the
    /// engine let through this tick, with the position they head for.
    fn advance(&self, now: SimTime, dt: f32, moving: &[(AgentId, Position)]) {
        let mut state = self.write();
        state.now = now;

        for &(agent, target) in moving {
            let Some(body) = state.bodies.get_mut(agent.index()) else { continue };
            body.target = Some(target);
            if agent != PINNED {
                body.position = step_toward(body.position, target, WALK_SPEED * dt);
            }
        }

        for body in &mut state.bodies {
            body.hydration -= THIRST_RATE * dt;
            if body.hydration < DRINK_BELOW {
                body.hydration = 100.0;
            }
        }

        // Followers keep a couple of metres behind their leader.
        let followers = state.followers.clone();
        for (leader, follower) in followers {
            let Some(anchor) = state.bodies.get(leader.index()).map(|b| b.position) else {
                continue;
            };
            if let Some(body) = state.bodies.get_mut(follower.index()) {
                body.position = Position::new(anchor.x - 2.0, anchor.y, anchor.z);
            }
        }
    }
}

fn step_toward(from: Position, to: Position, max: f32) -> Position {
    let dist = from.distance(to);
    if dist <= max {
        return to;
    }
    let k = max / dist;
    Position::new(
        from.x + (to.x - from.x) * k,
        from.y + (to.y - from.y) * k,
        from.z + (to.z - from.z) * k,
    )
}

impl AgentBody for RaidWorld {
    fn is_active(&self, agent: AgentId) -> bool {
        self.body(agent, |_| ()).is_some()
    }

    fn position(&self, agent: AgentId) -> Position {
        self.body(agent, |b| b.position).unwrap_or_default()
    }

    fn hydration(&self, agent: AgentId) -> Ratio {
        self.body(agent, |b| Ratio::new(b.hydration, 100.0)).unwrap_or_else(Ratio::full)
    }

    fn energy(&self, _agent: AgentId) -> Ratio {
        Ratio::full()
    }

    fn body_part_health(&self, _agent: AgentId, _part: BodyPart) -> Ratio {
        Ratio::full()
    }

    fn overweight(&self, _agent: AgentId) -> f32 {
        0.0
    }

    fn needs_first_aid(&self, _agent: AgentId) -> bool {
        false
    }

    fn needs_surgery(&self, _agent: AgentId) -> bool {
        false
    }
}

impl ThreatMonitor for RaidWorld {
    fn combat_memory(&self, agent: AgentId) -> CombatMemory {
        if agent == FIGHTER && self.now_secs() >= ENEMY_SEEN_AT {
            return CombatMemory {
                last_enemy_seen: Some(SimTime::from_secs(ENEMY_SEEN_AT)),
                ..CombatMemory::default()
            };
        }
        CombatMemory::default()
    }
}

impl LayerRegistry for RaidWorld {
    fn can_layer_be_used(&self, agent: AgentId, layer: Layer) -> bool {
        agent == LOOTER && layer == Layer::Looting
    }

    fn is_layer_requested(&self, _agent: AgentId, _layer: Layer) -> bool {
        false
    }

    fn is_layer_active(&self, agent: AgentId, layer: Layer) -> bool {
        let now = self.now_secs();
        agent == LOOTER && layer == Layer::Looting && (CACHE_FOUND_AT..CACHE_LOOTED_AT).contains(&now)
    }

    fn is_looting(&self, agent: AgentId) -> bool {
        let now = self.now_secs();
        agent == LOOTER && (CACHE_LOOTED_AT..CACHE_EMPTY_AT).contains(&now)
    }

    fn can_use_layer(&self, _agent: AgentId, _layer: Layer, _min_delay_secs: f32, _now: SimTime) -> bool {
        false
    }

    fn restart_can_use_timer(&self, _agent: AgentId, _layer: Layer, _now: SimTime) {}
}

impl SquadRegistry for RaidWorld {
    fn leader(&self, agent: AgentId) -> Option<AgentId> {
        (agent == FOLLOWER).then_some(LEADER)
    }

    fn alive_followers(&self, agent: AgentId) -> Vec<Position> {
        let state = self.read();
        state
            .followers
            .iter()
            .filter(|(leader, _)| *leader == agent)
            .filter_map(|(_, follower)| state.bodies.get(follower.index()))
            .map(|b| b.position)
            .collect()
    }

    fn register_follower(&self, leader: AgentId, follower: AgentId) {
        let mut state = self.write();
        if !state.followers.contains(&(leader, follower)) {
            state.followers.push((leader, follower));
        }
    }
}

impl PathProvider for RaidWorld {
    fn current_path(&self, agent: AgentId) -> Option<Vec<Position>> {
        self.body(agent, |b| b.target.map(|t| vec![b.position, t])).flatten()
    }
}

// ── Quests ────────────────────────────────────────────────────────────────────

fn at(x: f32, y: f32) -> Step {
    Step::new(Position::new(x, y, 0.0))
}

fn build_quests(requirements: &QuestingRequirements) -> Result<QuestRegistry> {
    let base = QuestSettings::from_requirements(requirements);
    let mut registry = QuestRegistry::new();

    let docks = Quest::new(
        QuestId(1),
        "Scout the docks",
        QuestSettings { priority: 10, chance_for_selecting: 100.0, ..base.clone() },
    );
    docks.add_objective(
        Objective::new(ObjectiveId(10), "Crane", vec![at(40.0, 10.0), at(55.0, 10.0).with_wait(3.0)])
            .with_min_time_at_objective(5.0),
    )?;
    docks.add_objective(
        Objective::new(ObjectiveId(11), "Pier", vec![at(60.0, -20.0)]).with_max_bots(2),
    )?;
    registry.add(docks)?;

    let towers = Quest::new(
        QuestId(2),
        "Check the towers",
        QuestSettings { priority: 20, chance_for_selecting: 80.0, ..base.clone() },
    );
    towers.add_objective(Objective::new(ObjectiveId(20), "North tower", vec![at(0.0, 120.0)]))?;
    towers.add_objective(Objective::new(
        ObjectiveId(21),
        "East tower",
        vec![at(120.0, 0.0), at(120.0, 30.0)],
    ))?;
    registry.add(towers)?;

    let patrol = Quest::new(
        QuestId(3),
        "Sweep the warehouses",
        QuestSettings { is_repeatable: true, ..base },
    );
    patrol.add_objective(
        Objective::new(ObjectiveId(30), "Warehouse row", vec![at(-30.0, 15.0), at(-45.0, 15.0)])
            .with_min_time_at_objective(8.0),
    )?;
    registry.add(patrol)?;

    Ok(registry)
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Logs what happens and remembers who may move after the current tick.
#[derive(Default)]
struct RaidObserver {
    moving:      Vec<AgentId>,
    assignments: usize,
    events:      usize,
    pauses:      usize,
    switches:    usize,
    stuck:       usize,
}

impl SimObserver for RaidObserver {
    fn on_assignment(&mut self, agent: AgentId, assignment: &Assignment) {
        self.assignments += 1;
        info!(%agent, %assignment, "assigned");
    }

    fn on_event(&mut self, _now: SimTime, _agent: AgentId, event: &EngineEvent) {
        self.events += 1;
        if matches!(event, EngineEvent::Stuck { .. }) {
            self.stuck += 1;
        }
    }

    fn on_decision(&mut self, _now: SimTime, agent: AgentId, decision: &Decision) {
        match decision {
            Decision::Continue => self.moving.push(agent),
            Decision::Pause { .. } => self.pauses += 1,
            Decision::SwitchRequested(_) => self.switches += 1,
            Decision::Inactive(_) => {}
        }
    }

    fn on_tick_end(&mut self, now: SimTime, questing: usize) {
        if now.as_secs_f64() as u64 % 30 == 0 {
            info!(t = now.as_secs_f64(), questing, "raid progress");
        }
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // 1. Logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 2. Agents.
    let profiles: Vec<AgentProfile> =
        (0..AGENT_COUNT).map(|i| AgentProfile::new(AgentId(i), 10 + i * 5)).collect();

    // 3. Config.
    let config = SimConfig { seed: SEED, tick_ms: TICK_MS, total_ticks: TOTAL_TICKS };
    let mut engine_config = EngineConfig::default();
    engine_config.stuck_detection.time = 15.0;
    engine_config.requirements.max_time_per_quest = 180.0;
    println!("Sim: {} ticks of {} ms, {} agents", TOTAL_TICKS, TICK_MS, AGENT_COUNT);

    // 4. Quests.
    let quests = build_quests(&engine_config.requirements)?;
    println!("Quests: {}", quests.len());
    for quest in quests.iter() {
        println!("  {:<24} {} objectives", quest.name(), quest.number_of_objectives());
    }
    println!();

    // 5. Build sim.
    let mut sim = SimBuilder::new(config, engine_config, RaidWorld::new(AGENT_COUNT))
        .agents(profiles)
        .quests(quests)
        .build()?;

    // 6. Run, moving the world between ticks.
    let dt = TICK_MS as f32 / 1_000.0;
    let mut obs = RaidObserver::default();
    let t0 = Instant::now();
    while sim.clock.now < sim.config.end_time() {
        sim.run_ticks(1, &mut obs)?;
        let moving: Vec<(AgentId, Position)> = obs
            .moving
            .drain(..)
            .filter_map(|agent| Some((agent, sim.assignment(agent)?.position()?)))
            .collect();
        sim.world.advance(sim.clock.now, dt, &moving);
    }
    obs.on_sim_end(sim.clock.now);
    let elapsed = t0.elapsed();

    // 7. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  assignments : {}", obs.assignments);
    println!("  events      : {}", obs.events);
    println!("  pauses      : {}", obs.pauses);
    println!("  switches    : {}", obs.switches);
    println!("  stuck       : {}", obs.stuck);
    println!();

    // 8. Final per-agent table.
    println!("{:<8} {:<10} {:<8} {}", "Agent", "Questing", "Done", "Assignment");
    println!("{}", "-".repeat(60));
    for profile in &sim.agents {
        let state = sim.engine.agent(profile.id)?;
        let assignment = state
            .tracker()
            .assignment()
            .map_or_else(|| "-".to_string(), |a| a.to_string());
        println!(
            "{:<8} {:<10} {:<8} {}",
            profile.id.to_string(),
            if state.tracker().is_active() { "yes" } else { "no" },
            state.tracker().history().count(),
            assignment,
        );
    }

    Ok(())
}

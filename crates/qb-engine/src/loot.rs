//! Gate 6: the loot-break sub-protocol.
//!
//! ```text
//!   idle ──can use layer──▶ searching ──loot picked up──▶ looting
//!     ▲                        │                             │
//!     └──── done looting ◀─────┴─────── neither / ceiling ◀──┘
//! ```
//!
//! While searching, the search stopwatch runs; while loot is being picked
//! up it is frozen, so "done looting" reports time actually spent searching.
//! Searching is abandoned once that time reaches `max_loot_scan_time`.

use qb_core::EngineConfig;

use crate::{AgentState, EngineEvent, Layer, TickContext};

impl AgentState {
    /// `true` if the agent should hold for the loot layer this tick.
    pub(crate) fn should_check_for_loot(
        &mut self,
        config: &EngineConfig,
        ctx:    &TickContext<'_>,
        events: &mut Vec<EngineEvent>,
    ) -> bool {
        let agent = self.agent;
        let now = ctx.now;
        let cfg = &config.requirements.break_for_looting;
        if !cfg.enabled || !ctx.layers.can_layer_be_used(agent, Layer::Looting) {
            return false;
        }

        let min_delay = self.loot.next_check_delay;
        self.loot.next_check_delay = cfg.min_time_between_looting_checks;

        let searching = ctx.layers.is_layer_active(agent, Layer::Looting);
        let looting = ctx.layers.is_looting(agent);
        let within_scan = self.loot.search_timer.elapsed_secs(now) < cfg.max_loot_scan_time;

        if (looting || within_scan)
            && (looting || searching || ctx.layers.can_use_layer(agent, Layer::Looting, min_delay, now))
        {
            if looting {
                if !self.loot.has_found_loot {
                    self.emit(events, EngineEvent::LootFound);
                }
                self.loot.has_found_loot = true;
                self.loot.next_check_delay = cfg.min_time_between_looting_events;
                self.loot.search_timer.stop(now);
            } else {
                if !self.loot.was_looting && !self.loot.search_timer.is_running() {
                    self.emit(events, EngineEvent::LootSearchStarted);
                }
                self.loot.search_timer.start(now);
            }
            if searching || looting {
                self.loot.was_looting = true;
            }
            ctx.layers.restart_can_use_timer(agent, Layer::Looting, now);
            return true;
        }

        if self.loot.was_looting || self.loot.has_found_loot {
            ctx.layers.restart_can_use_timer(agent, Layer::Looting, now);
            let search_secs = self.loot.search_timer.elapsed_secs(now);
            self.emit(events, EngineEvent::DoneLooting { search_secs });
        }
        self.loot.reset();
        false
    }
}

//! The `World` struct and its tick.

use dh_agent::{AgentRngs, AgentStore, EnemyStore};
use dh_behavior::{
    CatchContact, Creature, DuckFsm, DuckIntent, DuckTuning, EnemyFsm, EnemyIntent, FollowTarget,
};
use dh_chain::{ChainError, ChainResult, FollowerChain};
use dh_core::{AgentId, EnemyId, SimClock, SimConfig, Vec2};
use dh_cull::{CullKey, CullPass, CullTarget, VisibilityCuller};
use dh_spatial::ProximityIndex;
use rustc_hash::FxHashMap;

use crate::{DetachCause, ExitGate, SensorFrame, SimError, SimObserver, SimResult, TickReport};

// ── World ─────────────────────────────────────────────────────────────────────

/// Owns the chain, both creature populations, the culler, and the exit.
///
/// Each [`tick`](Self::tick) runs five phases:
///
/// 1. **Ingest**: copy reported positions into the stores.
/// 2. **Intent phase**: tick every enabled duck, then every enabled enemy, in
///    ascending id order.  No chain state changes here.
/// 3. **Apply phase**: apply chain intents (attach, leave, strip tail) in the
///    same order and forward the rest in the [`TickReport`].
/// 4. **Exit**: if the leader is at the exit, drain the chain and score.
/// 5. **Culling**: advance the culler's interval and switch agents on or off.
///
/// Create via [`WorldBuilder`][crate::WorldBuilder].
pub struct World {
    pub config:  SimConfig,
    pub clock:   SimClock,
    /// Leader and duck positions, spawn points, and activity flags.
    pub agents:  AgentStore,
    pub enemies: EnemyStore,
    pub rngs:    AgentRngs,
    pub exit:    ExitGate,

    pub(crate) chain:       FollowerChain,
    /// Indexed by `AgentId - 1`; the leader has no FSM.
    pub(crate) ducks:       Vec<DuckFsm>,
    pub(crate) enemy_fsms:  Vec<EnemyFsm>,
    pub(crate) culler:      VisibilityCuller,
    pub(crate) auto_cull:   bool,
    /// Catch geometry for derived contacts.
    pub(crate) catch_tuning: DuckTuning,
}

impl World {
    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn chain(&self) -> &FollowerChain {
        &self.chain
    }

    /// Direct chain access for callers that manage links themselves.
    ///
    /// Changing the chain here does not update duck FSMs; pair it with
    /// [`release_duck`](Self::release_duck) or keep the FSMs in step yourself.
    #[inline]
    pub fn chain_mut(&mut self) -> &mut FollowerChain {
        &mut self.chain
    }

    pub fn duck(&self, id: AgentId) -> Option<&DuckFsm> {
        id.index().checked_sub(1).and_then(|i| self.ducks.get(i))
    }

    fn duck_mut(&mut self, id: AgentId) -> Option<&mut DuckFsm> {
        id.index().checked_sub(1).and_then(|i| self.ducks.get_mut(i))
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&EnemyFsm> {
        self.enemy_fsms.get(id.index())
    }

    #[inline]
    pub fn culler(&self) -> &VisibilityCuller {
        &self.culler
    }

    #[inline]
    pub fn culler_mut(&mut self) -> &mut VisibilityCuller {
        &mut self.culler
    }

    /// Visibility as of the last culling pass.
    pub fn is_visible(&self, key: CullKey) -> Option<bool> {
        self.culler.is_visible(key)
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.exit.score()
    }

    #[inline]
    pub fn is_level_complete(&self) -> bool {
        self.exit.is_complete()
    }

    // ── Driving ───────────────────────────────────────────────────────────

    /// Advance the world by `dt` seconds.
    pub fn tick<O: SimObserver>(
        &mut self,
        dt:       f32,
        frame:    &SensorFrame,
        observer: &mut O,
    ) -> SimResult<TickReport> {
        if !(dt.is_finite() && dt >= 0.0) {
            return Err(SimError::Config(format!("tick dt must be finite and non-negative, got {dt}")));
        }
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        // ── Phase 1: ingest ───────────────────────────────────────────────
        self.ingest(frame);
        self.settle_unlinked(observer);

        // ── Phase 2: intent phase ─────────────────────────────────────────
        let catches = if frame.derive_catches {
            self.derive_catches(frame)?
        } else {
            FxHashMap::default()
        };
        let duck_intents = self.duck_intents(dt, frame, &catches);
        let enemy_intents = self.enemy_intents(dt, frame);

        // ── Phase 3: apply phase ──────────────────────────────────────────
        let mut report = TickReport::default();
        for (duck, intents) in duck_intents {
            self.apply_duck(duck, intents, &mut report, observer)?;
        }
        for (enemy, intents) in enemy_intents {
            self.apply_enemy(enemy, intents, &mut report, observer);
        }

        // ── Phase 4: exit ─────────────────────────────────────────────────
        if frame.at_exit {
            self.deliver_at_exit(&mut report, observer)?;
        }
        self.settle_unlinked(observer);

        // ── Phase 5: culling ──────────────────────────────────────────────
        if let Some(camera) = frame.camera {
            self.culler.set_camera(Some(camera));
            if self.auto_cull && !self.culler.is_running() {
                self.culler.start()?;
            }
        }
        report.cull = self.run_culler(dt);

        observer.on_tick_end(now, report.intent_count());
        self.clock.advance(dt);
        Ok(report)
    }

    /// Tick once per frame at `config.fixed_step_secs` until the frames run
    /// out or `config.total_ticks` is reached (when non-zero).
    pub fn run<O, I>(&mut self, frames: I, observer: &mut O) -> SimResult<Vec<TickReport>>
    where
        O: SimObserver,
        I: IntoIterator<Item = SensorFrame>,
    {
        let dt = self.config.fixed_step_secs;
        let mut reports = Vec::new();
        for frame in frames {
            if self.config.total_ticks > 0 && self.clock.current_tick >= self.config.end_tick() {
                break;
            }
            reports.push(self.tick(dt, &frame, observer)?);
        }
        Ok(reports)
    }

    // ── Out-of-band chain changes ─────────────────────────────────────────

    /// Splice `duck` out of the chain and set it wandering where it stands.
    ///
    /// Returns `false` if the duck was not in the chain.
    pub fn release_duck<O: SimObserver>(&mut self, duck: AgentId, observer: &mut O) -> SimResult<bool> {
        match self.chain.detach_agent(duck) {
            Ok(()) => {}
            Err(e) if e.is_benign() => {
                log::debug!("release of {duck} ignored: {e}");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }
        if let Some(position) = self.chain_position(duck) {
            if let Some(fsm) = self.duck_mut(duck) {
                fsm.on_detached(position);
            }
        }
        observer.on_duck_detached(duck, DetachCause::Released);
        Ok(true)
    }

    /// The duck's entity was destroyed: drop it from the chain and the
    /// culler and stop simulating it.
    pub fn remove_duck(&mut self, duck: AgentId) -> SimResult<()> {
        self.agents.check(duck)?;
        let Some(slot) = id_slot(duck) else {
            return Err(SimError::Config("the leader cannot be removed".into()));
        };
        self.chain.unregister(duck)?;
        self.culler.untrack(CullKey::Duck(duck));
        self.agents.active[duck.index()] = false;
        let position = self.agents.position[duck.index()];
        if let Some(fsm) = self.ducks.get_mut(slot) {
            fsm.set_enabled(false, position, self.rngs.duck_mut(duck));
        }
        log::debug!("{duck} removed from play");
        Ok(())
    }

    // ── Phases ────────────────────────────────────────────────────────────

    /// Copy reported positions into the stores.  Non-finite positions are
    /// dropped and the last good one is kept.
    fn ingest(&mut self, frame: &SensorFrame) {
        if frame.leader_position.is_finite() {
            if let Some(p) = self.agents.position.first_mut() {
                *p = frame.leader_position;
            }
        } else {
            log::trace!("leader position {} is not finite; kept the last one", frame.leader_position);
        }
        if let Some(f) = self.agents.facing.first_mut() {
            *f = frame.leader_facing;
        }
        for (&duck, s) in &frame.ducks {
            if !s.position.is_finite() {
                log::trace!("{duck} reported non-finite position {}", s.position);
                continue;
            }
            match id_slot(duck) {
                Some(_) if self.agents.contains(duck) => self.agents.position[duck.index()] = s.position,
                _ => log::trace!("sensor frame names unknown duck {duck}"),
            }
        }
        for (&enemy, s) in &frame.enemies {
            if !s.position.is_finite() {
                log::trace!("{enemy} reported non-finite position {}", s.position);
                continue;
            }
            if self.enemies.contains(enemy) {
                self.enemies.position[enemy.index()] = s.position;
            } else {
                log::trace!("sensor frame names unknown enemy {enemy}");
            }
        }
    }

    /// Any duck still following but no longer in the chain lands where it
    /// stands.
    fn settle_unlinked<O: SimObserver>(&mut self, observer: &mut O) {
        for slot in 0..self.ducks.len() {
            let duck = AgentId(slot as u32 + 1);
            if !self.ducks[slot].is_following() || self.chain.contains(duck) {
                continue;
            }
            let position = self.agents.position.get(duck.index()).copied().unwrap_or_default();
            self.ducks[slot].on_detached(position);
            log::debug!("{duck} was following outside the chain; set wandering");
            observer.on_duck_detached(duck, DetachCause::Unlinked);
        }
    }

    /// Stored position of a chain member, or `None` (logged) if the chain
    /// names an agent the store does not have.
    fn chain_position(&self, agent: AgentId) -> Option<Vec2> {
        let position = self.agents.position.get(agent.index()).copied();
        if position.is_none() {
            log::trace!("chain names {agent}, which has no agent slot");
        }
        position
    }

    /// Catch contacts from positions: any free duck whose catch point is
    /// within the catch radius of the leader or the current tail.
    fn derive_catches(&self, frame: &SensorFrame) -> SimResult<FxHashMap<AgentId, CatchContact>> {
        let offset = Vec2::new(0.0, self.catch_tuning.catch_offset_y);
        let free = frame.ducks.iter().filter_map(|(&id, s)| {
            let fsm = self.duck(id)?;
            if !s.position.is_finite() {
                log::trace!("{id} left out of catch detection: non-finite position");
                return None;
            }
            let catchable = fsm.is_enabled() && !fsm.is_following() && !fsm.is_delivered();
            catchable.then_some((id, s.position + offset))
        });
        let index = ProximityIndex::build(free)?;

        let leader = self.chain.leader();
        let tail = self
            .chain
            .tail_id()
            .and_then(|t| self.chain_position(t).map(|p| (t, p)));
        let hits = index.catch_hits((leader, frame.leader_position), tail, self.catch_tuning.catch_radius)?;

        Ok(hits
            .into_iter()
            .map(|h| {
                let contact = if h.target == leader {
                    CatchContact::Leader
                } else {
                    CatchContact::Tail(h.target)
                };
                (h.duck, contact)
            })
            .collect())
    }

    fn follow_target(&self, duck: AgentId, frame: &SensorFrame) -> Option<FollowTarget> {
        let parent = self.chain.parent_of(duck)?;
        Some(FollowTarget {
            parent_position: self.chain_position(parent)?,
            leader_position: frame.leader_position,
            leader_facing:   frame.leader_facing,
        })
    }

    fn duck_intents(
        &mut self,
        dt:      f32,
        frame:   &SensorFrame,
        catches: &FxHashMap<AgentId, CatchContact>,
    ) -> Vec<(AgentId, Vec<DuckIntent>)> {
        let mut out = Vec::new();
        for slot in 0..self.ducks.len() {
            let duck = AgentId(slot as u32 + 1);
            let fsm = &self.ducks[slot];
            if !fsm.is_enabled() || fsm.is_delivered() {
                continue;
            }
            let Some(reported) = frame.ducks.get(&duck) else {
                log::trace!("{duck} missing from sensor frame; skipped this tick");
                continue;
            };
            if !reported.position.is_finite() {
                log::trace!("{duck} has a non-finite position; skipped this tick");
                continue;
            }

            let mut sensors = reported.clone();
            if frame.derive_catches {
                sensors.catch = catches.get(&duck).copied();
            }
            if fsm.is_following() {
                sensors.follow = self.follow_target(duck, frame);
            }

            let intents = self.ducks[slot].tick(dt, &sensors, self.rngs.duck_mut(duck));
            if !intents.is_empty() {
                out.push((duck, intents));
            }
        }
        out
    }

    fn enemy_intents(&mut self, dt: f32, frame: &SensorFrame) -> Vec<(EnemyId, Vec<EnemyIntent>)> {
        let mut out = Vec::new();
        for slot in 0..self.enemy_fsms.len() {
            let enemy = EnemyId(slot as u32);
            if !self.enemy_fsms[slot].is_enabled() {
                continue;
            }
            let Some(sensors) = frame.enemies.get(&enemy) else {
                log::trace!("{enemy} missing from sensor frame; skipped this tick");
                continue;
            };
            if !sensors.position.is_finite() {
                log::trace!("{enemy} has a non-finite position; skipped this tick");
                continue;
            }
            let intents = self.enemy_fsms[slot].tick(dt, sensors, self.rngs.enemy_mut(enemy));
            if !intents.is_empty() {
                out.push((enemy, intents));
            }
        }
        out
    }

    fn apply_duck<O: SimObserver>(
        &mut self,
        duck:     AgentId,
        intents:  Vec<DuckIntent>,
        report:   &mut TickReport,
        observer: &mut O,
    ) -> SimResult<()> {
        for intent in intents {
            match intent {
                DuckIntent::AttachToLeader => {
                    let result = self.chain.attach_to_leader(duck);
                    self.settle_attach(duck, result, observer)?;
                }
                DuckIntent::AttachToTail { observed_tail } => {
                    let result = self.chain.attach_to_tail(duck, observed_tail);
                    self.settle_attach(duck, result, observer)?;
                }
                DuckIntent::LeaveChain => match self.chain.detach_agent(duck) {
                    Ok(()) => observer.on_duck_detached(duck, DetachCause::OutOfBounds),
                    Err(e) if e.is_benign() => log::debug!("{duck} leave ignored: {e}"),
                    Err(ChainError::MissingReference(id)) => {
                        log::trace!("leave skipped, {id} not registered");
                    }
                    Err(e) => return Err(e.into()),
                },
                other => report.duck_intents.push((duck, other)),
            }
        }
        Ok(())
    }

    /// Report a successful attach, or put the duck back the way it was.
    fn settle_attach<O: SimObserver>(
        &mut self,
        duck:     AgentId,
        result:   ChainResult<AgentId>,
        observer: &mut O,
    ) -> SimResult<()> {
        match result {
            Ok(parent) => {
                observer.on_duck_attached(duck, parent);
                Ok(())
            }
            Err(e) if e.is_benign() => {
                log::debug!("{duck} attach refused: {e}");
                if let Some(fsm) = self.duck_mut(duck) {
                    fsm.cancel_follow();
                }
                Ok(())
            }
            Err(ChainError::MissingReference(id)) => {
                log::trace!("attach skipped, {id} not registered");
                if let Some(fsm) = self.duck_mut(duck) {
                    fsm.cancel_follow();
                }
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn apply_enemy<O: SimObserver>(
        &mut self,
        enemy:    EnemyId,
        intents:  Vec<EnemyIntent>,
        report:   &mut TickReport,
        observer: &mut O,
    ) {
        for intent in intents {
            match intent {
                EnemyIntent::StripTail => self.strip_tail(enemy, observer),
                EnemyIntent::Alerted => {
                    observer.on_enemy_alerted(enemy);
                    report.enemy_intents.push((enemy, intent));
                }
                EnemyIntent::Jump { impulse } => {
                    observer.on_enemy_jump(enemy, impulse);
                    report.enemy_intents.push((enemy, intent));
                }
                other => report.enemy_intents.push((enemy, other)),
            }
        }
    }

    fn strip_tail<O: SimObserver>(&mut self, enemy: EnemyId, observer: &mut O) {
        let Some(duck) = self.chain.detach_tail() else {
            return;
        };
        if let Some(position) = self.chain_position(duck) {
            if let Some(fsm) = self.duck_mut(duck) {
                fsm.on_detached(position);
            }
        }
        log::debug!("{enemy} knocked {duck} off the chain");
        observer.on_duck_detached(duck, DetachCause::EnemyHit(enemy));
    }

    fn deliver_at_exit<O: SimObserver>(&mut self, report: &mut TickReport, observer: &mut O) -> SimResult<()> {
        if !self.chain.has_follower() {
            return Ok(());
        }
        let mut drained = self.chain.detach_all();
        drained.retain(|&duck| {
            let known = self.agents.contains(duck) && id_slot(duck).is_some();
            if !known {
                log::trace!("chain delivered {duck}, which has no agent slot; not scored");
            }
            known
        });
        for &duck in &drained {
            if let Some(fsm) = self.duck_mut(duck) {
                fsm.deliver();
            }
            self.agents.collect(duck)?;
            self.culler.untrack(CullKey::Duck(duck));
        }

        let completed = self.exit.deliver(drained.len());
        let (score, goal) = (self.exit.score(), self.exit.goal());
        log::info!("{} ducks delivered, score {score} of {goal}", drained.len());
        observer.on_ducks_delivered(&drained, score);
        if completed {
            log::info!("level complete with score {score}");
            observer.on_level_complete(score, goal);
        }
        report.delivered = drained;
        Ok(())
    }

    fn run_culler(&mut self, dt: f32) -> Option<CullPass> {
        let mut activity = Activity {
            agents:     &mut self.agents,
            enemies:    &mut self.enemies,
            ducks:      &mut self.ducks,
            enemy_fsms: &mut self.enemy_fsms,
            rngs:       &mut self.rngs,
        };
        self.culler.tick(dt, &mut activity)
    }
}

/// FSM slot for a duck id.  `None` for the leader.
#[inline]
fn id_slot(duck: AgentId) -> Option<usize> {
    duck.index().checked_sub(1)
}

// ── Activity ──────────────────────────────────────────────────────────────────

/// Split borrow of the world handed to the culler.
struct Activity<'a> {
    agents:     &'a mut AgentStore,
    enemies:    &'a mut EnemyStore,
    ducks:      &'a mut [DuckFsm],
    enemy_fsms: &'a mut [EnemyFsm],
    rngs:       &'a mut AgentRngs,
}

impl CullTarget for Activity<'_> {
    fn position(&self, key: CullKey) -> Option<Vec2> {
        match key {
            CullKey::Duck(a) => self.agents.position.get(a.index()).copied(),
            CullKey::Enemy(e) => self.enemies.position.get(e.index()).copied(),
        }
    }

    fn is_active(&self, key: CullKey) -> bool {
        match key {
            CullKey::Duck(a) => self.agents.active.get(a.index()).copied().unwrap_or(false),
            CullKey::Enemy(e) => self.enemies.active.get(e.index()).copied().unwrap_or(false),
        }
    }

    fn safe_to_deactivate(&self, key: CullKey) -> bool {
        match key {
            CullKey::Duck(a) => id_slot(a)
                .and_then(|i| self.ducks.get(i))
                .is_some_and(|d| d.safe_to_deactivate()),
            CullKey::Enemy(e) => self.enemy_fsms.get(e.index()).is_some_and(|f| f.safe_to_deactivate()),
        }
    }

    fn set_active(&mut self, key: CullKey, active: bool) {
        match key {
            CullKey::Duck(a) => {
                let i = a.index();
                if self.agents.collected.get(i).copied().unwrap_or(true) {
                    return;
                }
                let Some(slot) = id_slot(a) else { return };
                let Some(fsm) = self.ducks.get_mut(slot) else { return };
                self.agents.active[i] = active;
                fsm.set_enabled(active, self.agents.position[i], self.rngs.duck_mut(a));
            }
            CullKey::Enemy(e) => {
                let i = e.index();
                let Some(fsm) = self.enemy_fsms.get_mut(i) else {
                    return;
                };
                self.enemies.active[i] = active;
                fsm.set_enabled(active, self.enemies.position[i], self.rngs.enemy_mut(e));
            }
        }
    }
}

//! The fixed-interval visibility pass.

use dh_core::{AgentId, Countdown, EnemyId, Rect, Vec2};
use rustc_hash::FxHashMap;

use crate::{CameraView, CullError, CullResult};

// ── CullConfig ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CullConfig {
    /// Seconds between visibility passes.
    pub interval:         f32,
    /// Maximum camera distance; `<= 0` turns the distance check off.
    pub culling_distance: f32,
    /// Fraction the camera rectangle is grown by on each axis.
    pub viewport_offset:  f32,
    /// Slack added to `culling_distance`.
    pub distance_offset:  f32,
}

impl Default for CullConfig {
    fn default() -> Self {
        Self {
            interval:         0.2,
            culling_distance: 0.0,
            viewport_offset:  0.3,
            distance_offset:  20.0,
        }
    }
}

impl CullConfig {
    /// Checks everything except the interval, which [`VisibilityCuller::start`]
    /// enforces.
    pub fn validate(&self) -> CullResult<()> {
        if !self.interval.is_finite() {
            return Err(CullError::BadInterval(self.interval));
        }
        if !self.culling_distance.is_finite() || !self.distance_offset.is_finite() {
            return Err(CullError::Config("distances must be finite".into()));
        }
        if !(self.viewport_offset > -1.0) || !self.viewport_offset.is_finite() {
            return Err(CullError::Config(format!(
                "viewport_offset must be finite and above -1, got {}",
                self.viewport_offset
            )));
        }
        Ok(())
    }

    fn sees(&self, camera: &CameraView, rect: &Rect, p: Vec2) -> bool {
        if self.culling_distance > 0.0
            && camera.position.distance(p) > self.culling_distance + self.distance_offset
        {
            return false;
        }
        rect.contains(p)
    }
}

// ── CullKey / CullTarget ──────────────────────────────────────────────────────

/// A tracked agent.  Ducks sort before enemies, so a pass checks ducks first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CullKey {
    Duck(AgentId),
    Enemy(EnemyId),
}

/// The culler's only window onto the world.
///
/// Positions come in through here and activity changes go out through
/// [`set_active`](Self::set_active); the culler holds no agent state of its
/// own beyond the last visibility verdict.
pub trait CullTarget {
    /// Current position, or `None` if the agent no longer exists.
    fn position(&self, key: CullKey) -> Option<Vec2>;

    fn is_active(&self, key: CullKey) -> bool;

    /// `true` if the agent may be switched off right now.
    fn safe_to_deactivate(&self, key: CullKey) -> bool;

    fn set_active(&mut self, key: CullKey, active: bool);
}

/// What one visibility pass changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CullPass {
    pub checked:     usize,
    pub activated:   Vec<CullKey>,
    pub deactivated: Vec<CullKey>,
    /// Out of view but busy, so left running.
    pub held:        usize,
}

// ── VisibilityCuller ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct VisibilityCuller {
    config:   CullConfig,
    camera:   Option<CameraView>,
    /// Tracked keys in insertion order.
    order:    Vec<CullKey>,
    /// Last verdict per tracked key; `None` until the first pass sees it.
    verdicts: FxHashMap<CullKey, Option<bool>>,
    timer:    Countdown,
    running:  bool,
}

impl VisibilityCuller {
    pub fn new(config: CullConfig) -> CullResult<Self> {
        config.validate()?;
        let timer = Countdown::new(config.interval);
        Ok(Self {
            config,
            camera: None,
            order: Vec::new(),
            verdicts: FxHashMap::default(),
            timer,
            running: false,
        })
    }

    #[inline]
    pub fn config(&self) -> &CullConfig {
        &self.config
    }

    /// Replace the configuration.  A running culler restarts its interval.
    pub fn set_config(&mut self, config: CullConfig) -> CullResult<()> {
        config.validate()?;
        self.timer = Countdown::new(config.interval);
        self.config = config;
        Ok(())
    }

    #[inline]
    pub fn camera(&self) -> Option<&CameraView> {
        self.camera.as_ref()
    }

    pub fn set_camera(&mut self, camera: Option<CameraView>) {
        self.camera = camera;
    }

    // ── Monitoring ────────────────────────────────────────────────────────

    /// Begin periodic passes.  Restarts the interval if already running.
    pub fn start(&mut self) -> CullResult<()> {
        if self.camera.is_none() {
            return Err(CullError::NoCamera);
        }
        if !(self.config.interval > 0.0) {
            return Err(CullError::BadInterval(self.config.interval));
        }
        self.timer = Countdown::new(self.config.interval);
        self.running = true;
        log::debug!("visibility monitoring started, interval {}s", self.config.interval);
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.running {
            log::debug!("visibility monitoring stopped");
        }
        self.running = false;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ── Tracking ──────────────────────────────────────────────────────────

    /// Returns `false` if `key` was already tracked.
    pub fn track(&mut self, key: CullKey) -> bool {
        if self.verdicts.contains_key(&key) {
            return false;
        }
        self.verdicts.insert(key, None);
        self.order.push(key);
        true
    }

    /// Track every key from `keys`; returns how many were new.
    pub fn track_all(&mut self, keys: impl IntoIterator<Item = CullKey>) -> usize {
        keys.into_iter().filter(|&k| self.track(k)).count()
    }

    /// Returns `false` if `key` was not tracked.
    pub fn untrack(&mut self, key: CullKey) -> bool {
        if self.verdicts.remove(&key).is_none() {
            return false;
        }
        self.order.retain(|&k| k != key);
        true
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.verdicts.clear();
    }

    #[inline]
    pub fn is_tracked(&self, key: CullKey) -> bool {
        self.verdicts.contains_key(&key)
    }

    #[inline]
    pub fn tracked_len(&self) -> usize {
        self.order.len()
    }

    pub fn tracked(&self) -> impl Iterator<Item = CullKey> + '_ {
        self.order.iter().copied()
    }

    /// Visibility as of the last pass.  `None` if untracked or not yet seen.
    pub fn is_visible(&self, key: CullKey) -> Option<bool> {
        self.verdicts.get(&key).copied().flatten()
    }

    /// Switch a tracked agent on or off right now, bypassing the safety
    /// check.  Returns `false` for untracked keys.
    pub fn force_active<T: CullTarget + ?Sized>(&self, key: CullKey, active: bool, target: &mut T) -> bool {
        if !self.is_tracked(key) {
            return false;
        }
        target.set_active(key, active);
        true
    }

    // ── Passes ────────────────────────────────────────────────────────────

    /// Advance the interval by `dt` and run a pass when it expires.
    ///
    /// At most one pass runs per call, and the interval restarts from zero
    /// afterwards.  Returns `None` when no pass ran.
    pub fn tick<T: CullTarget + ?Sized>(&mut self, dt: f32, target: &mut T) -> Option<CullPass> {
        if !self.running || !self.timer.tick(dt) {
            return None;
        }
        self.timer.reset();
        let camera = self.camera?;
        Some(self.run_pass(&camera, target))
    }

    /// One visibility pass against `camera`, regardless of the interval.
    pub fn run_pass<T: CullTarget + ?Sized>(&mut self, camera: &CameraView, target: &mut T) -> CullPass {
        let rect = camera.padded_rect(self.config.viewport_offset);
        let mut pass = CullPass::default();

        for &key in &self.order {
            let Some(position) = target.position(key) else {
                log::trace!("culler skipped {key:?}: no position");
                continue;
            };
            pass.checked += 1;

            let visible = self.config.sees(camera, &rect, position);
            self.verdicts.insert(key, Some(visible));

            if target.is_active(key) == visible {
                continue;
            }
            if visible {
                target.set_active(key, true);
                pass.activated.push(key);
            } else if target.safe_to_deactivate(key) {
                target.set_active(key, false);
                pass.deactivated.push(key);
            } else {
                pass.held += 1;
            }
        }

        if !pass.activated.is_empty() || !pass.deactivated.is_empty() {
            log::debug!(
                "cull pass: {} checked, {} on, {} off, {} held",
                pass.checked,
                pass.activated.len(),
                pass.deactivated.len(),
                pass.held
            );
        }
        pass
    }
}

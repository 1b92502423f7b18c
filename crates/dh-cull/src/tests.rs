//! Unit tests for dh-cull.

#[cfg(test)]
mod helpers {
    use std::collections::BTreeMap;

    use dh_core::Vec2;

    use crate::{CullKey, CullTarget};

    #[derive(Default)]
    pub struct Fake {
        pub agents: BTreeMap<CullKey, (Vec2, bool, bool)>, // position, active, safe
        pub toggles: usize,
    }

    impl Fake {
        pub fn put(&mut self, key: CullKey, position: Vec2, active: bool, safe: bool) {
            self.agents.insert(key, (position, active, safe));
        }

        pub fn active(&self, key: CullKey) -> bool {
            self.agents[&key].1
        }
    }

    impl CullTarget for Fake {
        fn position(&self, key: CullKey) -> Option<Vec2> {
            self.agents.get(&key).map(|a| a.0)
        }

        fn is_active(&self, key: CullKey) -> bool {
            self.agents.get(&key).is_some_and(|a| a.1)
        }

        fn safe_to_deactivate(&self, key: CullKey) -> bool {
            self.agents.get(&key).is_some_and(|a| a.2)
        }

        fn set_active(&mut self, key: CullKey, active: bool) {
            if let Some(a) = self.agents.get_mut(&key) {
                a.1 = active;
                self.toggles += 1;
            }
        }
    }
}

#[cfg(test)]
mod viewport {
    use dh_core::Vec2;

    use crate::CameraView;

    #[test]
    fn rect_matches_ortho_size_and_aspect() {
        let cam = CameraView::new(Vec2::new(10.0, 0.0), 5.0, 2.0);
        let r = cam.view_rect();
        assert_eq!(r.size, Vec2::new(20.0, 10.0));
        assert_eq!(r.min, Vec2::new(0.0, -5.0));
    }

    #[test]
    fn padding_grows_both_axes_about_the_centre() {
        let cam = CameraView::new(Vec2::ZERO, 5.0, 2.0);
        let r = cam.padded_rect(0.3);
        assert!((r.size.x - 26.0).abs() < 1e-4);
        assert!((r.size.y - 13.0).abs() < 1e-4);
        assert!(r.center().length() < 1e-5);
    }
}

#[cfg(test)]
mod monitoring {
    use dh_core::Vec2;

    use crate::{CameraView, CullConfig, CullError, VisibilityCuller};

    #[test]
    fn start_needs_a_camera() {
        let mut culler = VisibilityCuller::new(CullConfig::default()).unwrap();
        assert_eq!(culler.start(), Err(CullError::NoCamera));
        assert!(!culler.is_running());
    }

    #[test]
    fn start_needs_a_positive_interval() {
        let cfg = CullConfig { interval: 0.0, ..CullConfig::default() };
        let mut culler = VisibilityCuller::new(cfg).unwrap();
        culler.set_camera(Some(CameraView::new(Vec2::ZERO, 5.0, 1.0)));
        assert_eq!(culler.start(), Err(CullError::BadInterval(0.0)));
    }

    #[test]
    fn bad_offsets_are_rejected() {
        let cfg = CullConfig { viewport_offset: -1.5, ..CullConfig::default() };
        assert!(matches!(VisibilityCuller::new(cfg), Err(CullError::Config(_))));
        let cfg = CullConfig { interval: f32::NAN, ..CullConfig::default() };
        assert!(VisibilityCuller::new(cfg).is_err());
    }

    #[test]
    fn stop_then_start_is_allowed() {
        let mut culler = VisibilityCuller::new(CullConfig::default()).unwrap();
        culler.set_camera(Some(CameraView::new(Vec2::ZERO, 5.0, 1.0)));
        culler.start().unwrap();
        culler.stop();
        assert!(!culler.is_running());
        culler.start().unwrap();
        assert!(culler.is_running());
    }
}

#[cfg(test)]
mod tracking {
    use dh_core::{AgentId, EnemyId};

    use crate::{CullConfig, CullKey, VisibilityCuller};

    #[test]
    fn track_is_idempotent_and_untrack_forgets() {
        let mut culler = VisibilityCuller::new(CullConfig::default()).unwrap();
        let duck = CullKey::Duck(AgentId(1));
        assert!(culler.track(duck));
        assert!(!culler.track(duck));
        assert_eq!(culler.track_all([duck, CullKey::Enemy(EnemyId(0))]), 1);
        assert_eq!(culler.tracked_len(), 2);

        assert!(culler.untrack(duck));
        assert!(!culler.untrack(duck));
        assert!(!culler.is_tracked(duck));
        assert_eq!(culler.is_visible(duck), None);
        assert_eq!(culler.tracked().collect::<Vec<_>>(), vec![CullKey::Enemy(EnemyId(0))]);
    }
}

#[cfg(test)]
mod passes {
    use dh_core::{AgentId, EnemyId, Vec2};

    use super::helpers::Fake;
    use crate::{CameraView, CullConfig, CullKey, VisibilityCuller};

    const DUCK: CullKey = CullKey::Duck(AgentId(1));
    const ENEMY: CullKey = CullKey::Enemy(EnemyId(0));

    fn running(cfg: CullConfig) -> VisibilityCuller {
        let mut culler = VisibilityCuller::new(cfg).unwrap();
        // Visible area 10 × 10, padded to 13 × 13.
        culler.set_camera(Some(CameraView::new(Vec2::ZERO, 5.0, 1.0)));
        culler.start().unwrap();
        culler
    }

    #[test]
    fn outside_and_safe_is_switched_off() {
        let mut culler = running(CullConfig::default());
        culler.track(DUCK);
        let mut world = Fake::default();
        world.put(DUCK, Vec2::new(50.0, 0.0), true, true);

        let pass = culler.tick(0.2, &mut world).unwrap();
        assert_eq!(pass.deactivated, vec![DUCK]);
        assert!(!world.active(DUCK));
        assert_eq!(culler.is_visible(DUCK), Some(false));
    }

    #[test]
    fn outside_but_busy_stays_on() {
        let mut culler = running(CullConfig::default());
        culler.track(ENEMY);
        let mut world = Fake::default();
        world.put(ENEMY, Vec2::new(50.0, 0.0), true, false);

        let pass = culler.tick(0.2, &mut world).unwrap();
        assert!(pass.deactivated.is_empty());
        assert_eq!(pass.held, 1);
        assert!(world.active(ENEMY));
        assert_eq!(culler.is_visible(ENEMY), Some(false));
    }

    #[test]
    fn coming_back_into_view_reactivates_without_asking() {
        let mut culler = running(CullConfig::default());
        culler.track(DUCK);
        let mut world = Fake::default();
        world.put(DUCK, Vec2::new(1.0, 1.0), false, false);

        let pass = culler.tick(0.2, &mut world).unwrap();
        assert_eq!(pass.activated, vec![DUCK]);
        assert!(world.active(DUCK));
    }

    #[test]
    fn padding_keeps_edge_agents_alive() {
        let mut culler = running(CullConfig::default());
        culler.track(DUCK);
        let mut world = Fake::default();
        // Outside the 10 × 10 view, inside the padded 13 × 13.
        world.put(DUCK, Vec2::new(6.0, 0.0), true, true);

        culler.tick(0.2, &mut world).unwrap();
        assert!(world.active(DUCK));
        assert_eq!(culler.is_visible(DUCK), Some(true));
    }

    #[test]
    fn distance_limit_applies_only_when_positive() {
        let cfg = CullConfig {
            culling_distance: 1.0,
            distance_offset:  2.0,
            viewport_offset:  10.0,
            ..CullConfig::default()
        };
        let mut culler = running(cfg);
        culler.track(DUCK);
        let mut world = Fake::default();
        world.put(DUCK, Vec2::new(4.0, 0.0), true, true);

        culler.tick(0.2, &mut world).unwrap();
        assert!(!world.active(DUCK), "4 > 1 + 2 culls even inside the rect");

        world.put(DUCK, Vec2::new(2.5, 0.0), false, true);
        culler.tick(0.2, &mut world).unwrap();
        assert!(world.active(DUCK));
    }

    #[test]
    fn passes_wait_for_the_interval() {
        let mut culler = running(CullConfig::default());
        culler.track(DUCK);
        let mut world = Fake::default();
        world.put(DUCK, Vec2::new(50.0, 0.0), true, true);

        assert!(culler.tick(0.1, &mut world).is_none());
        assert!(world.active(DUCK));
        assert!(culler.tick(0.1, &mut world).is_some());
        assert!(!world.active(DUCK));
        // Interval restarts after the pass.
        assert!(culler.tick(0.1, &mut world).is_none());
    }

    #[test]
    fn a_long_frame_runs_one_pass() {
        let mut culler = running(CullConfig::default());
        let mut world = Fake::default();
        assert!(culler.tick(1.0, &mut world).is_some());
        assert!(culler.tick(0.1, &mut world).is_none());
    }

    #[test]
    fn stopped_culler_does_nothing() {
        let mut culler = running(CullConfig::default());
        culler.track(DUCK);
        culler.stop();
        let mut world = Fake::default();
        world.put(DUCK, Vec2::new(50.0, 0.0), true, true);
        assert!(culler.tick(1.0, &mut world).is_none());
        assert_eq!(world.toggles, 0);
    }

    #[test]
    fn missing_agents_are_skipped() {
        let mut culler = running(CullConfig::default());
        culler.track(DUCK);
        culler.track(ENEMY);
        let mut world = Fake::default();
        world.put(ENEMY, Vec2::ZERO, true, true);

        let pass = culler.tick(0.2, &mut world).unwrap();
        assert_eq!(pass.checked, 1);
        assert_eq!(culler.is_visible(DUCK), None);
        assert_eq!(culler.is_visible(ENEMY), Some(true));
    }

    #[test]
    fn force_active_bypasses_safety_for_tracked_keys() {
        let mut culler = running(CullConfig::default());
        culler.track(DUCK);
        let mut world = Fake::default();
        world.put(DUCK, Vec2::ZERO, true, false);
        world.put(ENEMY, Vec2::ZERO, true, false);

        assert!(culler.force_active(DUCK, false, &mut world));
        assert!(!world.active(DUCK));
        assert!(!culler.force_active(ENEMY, false, &mut world));
        assert!(world.active(ENEMY));
    }
}

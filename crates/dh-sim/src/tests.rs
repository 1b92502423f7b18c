//! World-level scenario tests for dh-sim.

#[cfg(test)]
mod helpers {
    use dh_agent::AgentStoreBuilder;
    use dh_behavior::{CatchContact, DuckSensors, EnemySensors};
    use dh_core::{Facing, SimConfig, Vec2};

    use crate::{SensorFrame, World, WorldBuilder};

    pub const DT: f32 = 0.02;

    pub fn world(ducks: &[Vec2], enemies: &[Vec2]) -> World {
        let (agents, enemy_store, rngs) = AgentStoreBuilder::new(7)
            .leader(Vec2::ZERO)
            .ducks(ducks.iter().copied())
            .enemies(enemies.iter().copied())
            .build()
            .unwrap();
        WorldBuilder::new(SimConfig::default(), agents, enemy_store, rngs)
            .build()
            .unwrap()
    }

    pub fn frame() -> SensorFrame {
        SensorFrame::new(Vec2::ZERO, Facing::Right)
    }

    pub fn at(position: Vec2) -> DuckSensors {
        DuckSensors { position, ..DuckSensors::default() }
    }

    pub fn catching(position: Vec2, contact: CatchContact) -> DuckSensors {
        DuckSensors { position, catch: Some(contact), ..DuckSensors::default() }
    }

    pub fn enemy_at(position: Vec2) -> EnemySensors {
        EnemySensors { position, ..EnemySensors::default() }
    }

    pub fn spots(n: usize) -> Vec<Vec2> {
        (1..=n).map(|i| Vec2::new(i as f32 * 3.0, 1.0)).collect()
    }
}

#[cfg(test)]
mod builder {
    use dh_agent::AgentStoreBuilder;
    use dh_behavior::DuckTuning;
    use dh_core::{AgentId, SimConfig, Vec2};
    use dh_cull::{CullConfig, CullKey};

    use super::helpers::{spots, world};
    use crate::{SimError, WorldBuilder};

    fn stores(ducks: usize) -> (dh_agent::AgentStore, dh_agent::EnemyStore, dh_agent::AgentRngs) {
        AgentStoreBuilder::new(1)
            .leader(Vec2::ZERO)
            .ducks(spots(ducks))
            .enemy(Vec2::new(20.0, 0.0))
            .build()
            .unwrap()
    }

    #[test]
    fn registers_every_duck_and_tracks_everyone() {
        let w = world(&spots(3), &[Vec2::new(20.0, 0.0)]);
        assert!(w.chain().is_empty());
        assert_eq!(w.chain().registered_count(), 4, "leader plus three ducks");
        assert!(w.culler().is_tracked(CullKey::Duck(AgentId(3))));
        assert!(!w.culler().is_tracked(CullKey::Duck(AgentId(0))));
        assert_eq!(w.culler().tracked_len(), 4);
        assert_eq!(w.exit.goal(), 2);
    }

    #[test]
    fn per_duck_tunings_must_match_duck_count() {
        let (a, e, r) = stores(2);
        let err = WorldBuilder::new(SimConfig::default(), a, e, r)
            .duck_tunings(vec![DuckTuning::default()])
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::AgentCountMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        let (a, e, r) = stores(1);
        let tuning = DuckTuning { catch_radius: -1.0, ..DuckTuning::default() };
        let result = WorldBuilder::new(SimConfig::default(), a, e, r).duck_tuning(tuning).build();
        assert!(matches!(result, Err(SimError::Behavior(_))));
    }

    #[test]
    fn culling_with_zero_interval_is_rejected() {
        let (a, e, r) = stores(1);
        let cfg = CullConfig { interval: 0.0, ..CullConfig::default() };
        let result = WorldBuilder::new(SimConfig::default(), a, e, r).culling(cfg).build();
        assert!(matches!(result, Err(SimError::Cull(_))));
    }

    #[test]
    fn goal_override_is_capped_by_duck_count() {
        let (a, e, r) = stores(3);
        let w = WorldBuilder::new(SimConfig::default(), a, e, r).goal(9).build().unwrap();
        assert_eq!(w.exit.goal(), 2);

        let (a, e, r) = stores(3);
        let w = WorldBuilder::new(SimConfig::default(), a, e, r).goal(3).build().unwrap();
        assert_eq!(w.exit.goal(), 3);
    }
}

#[cfg(test)]
mod chain_flow {
    use dh_behavior::{CatchContact, DuckIntent, DuckSensors, DuckState};
    use dh_core::{AgentId, EnemyId, Vec2};

    use super::helpers::{at, catching, enemy_at, frame, spots, world, DT};
    use crate::{DetachCause, EventLog, NoopObserver, SimError, SimEvent};

    #[test]
    fn wandering_duck_touching_the_leader_starts_following() {
        let mut w = world(&spots(1), &[]);
        let duck = AgentId(1);
        let p = Vec2::new(3.0, 1.0);
        let grounded = DuckSensors { position: p, grounded: true, ..DuckSensors::default() };

        // Land, hop, land again.
        let report = w.tick(DT, &frame().duck(duck, grounded.clone()), &mut NoopObserver).unwrap();
        assert!(report.intents_for(duck).any(|i| matches!(i, DuckIntent::Jump { .. })));
        w.tick(DT, &frame().duck(duck, at(p)), &mut NoopObserver).unwrap();
        w.tick(DT, &frame().duck(duck, grounded), &mut NoopObserver).unwrap();
        assert!(matches!(w.duck(duck).unwrap().state(), DuckState::Wandering { .. }));

        let mut log = EventLog::new();
        w.tick(DT, &frame().duck(duck, catching(p, CatchContact::Leader)), &mut log).unwrap();

        assert!(w.duck(duck).unwrap().is_following());
        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![duck]);
        assert_eq!(w.chain().parent_of(duck), Some(AgentId(0)));
        assert_eq!(
            log.kinds().cloned().collect::<Vec<_>>(),
            vec![SimEvent::Attached { duck, parent: AgentId(0) }]
        );
    }

    #[test]
    fn same_tick_catches_queue_up_in_id_order() {
        let mut w = world(&spots(3), &[]);
        let mut f = frame();
        for (i, p) in spots(3).into_iter().enumerate() {
            f = f.duck(AgentId(i as u32 + 1), catching(p, CatchContact::Leader));
        }
        let mut log = EventLog::new();
        w.tick(DT, &f, &mut log).unwrap();

        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![AgentId(1), AgentId(2), AgentId(3)]);
        assert_eq!(w.chain().tail_id(), Some(AgentId(3)));
        assert_eq!(
            log.kinds().cloned().collect::<Vec<_>>(),
            vec![
                SimEvent::Attached { duck: AgentId(1), parent: AgentId(0) },
                SimEvent::Attached { duck: AgentId(2), parent: AgentId(1) },
                SimEvent::Attached { duck: AgentId(3), parent: AgentId(2) },
            ]
        );
    }

    #[test]
    fn enemy_hits_strip_the_chain_tail_first() {
        let mut w = world(&spots(3), &[Vec2::new(-5.0, 0.0)]);
        let mut f = frame();
        for (i, p) in spots(3).into_iter().enumerate() {
            f = f.duck(AgentId(i as u32 + 1), catching(p, CatchContact::Leader));
        }
        w.tick(DT, &f, &mut NoopObserver).unwrap();

        let mut hit = enemy_at(Vec2::new(-5.0, 0.0));
        hit.follower_contact = true;
        let mut log = EventLog::new();
        for expected in [3, 2, 1] {
            w.tick(DT, &frame().enemy(EnemyId(0), hit.clone()), &mut log).unwrap();
            let duck = AgentId(expected);
            assert!(!w.chain().contains(duck));
            assert!(matches!(w.duck(duck).unwrap().state(), DuckState::Wandering { .. }));
        }
        assert!(w.chain().is_empty());
        assert!(!w.chain().has_follower());

        let detached: Vec<_> = log
            .kinds()
            .filter_map(|e| match e {
                SimEvent::Detached { duck, cause } => Some((duck.0, *cause)),
                _ => None,
            })
            .collect();
        let hit_by = DetachCause::EnemyHit(EnemyId(0));
        assert_eq!(detached, vec![(3, hit_by), (2, hit_by), (1, hit_by)]);

        // Nothing left to strip.
        w.tick(DT, &frame().enemy(EnemyId(0), hit), &mut log).unwrap();
        assert!(w.chain().is_empty());
    }

    #[test]
    fn stale_tail_catch_is_refused_and_retried_next_tick() {
        let mut w = world(&spots(3), &[]);
        let s = spots(3);
        w.tick(DT, &frame().duck(AgentId(1), catching(s[0], CatchContact::Leader)), &mut NoopObserver)
            .unwrap();

        // Both saw duck 1 as the tail; only the first in id order gets it.
        let f = frame()
            .duck(AgentId(2), catching(s[1], CatchContact::Tail(AgentId(1))))
            .duck(AgentId(3), catching(s[2], CatchContact::Tail(AgentId(1))));
        w.tick(DT, &f, &mut NoopObserver).unwrap();
        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![AgentId(1), AgentId(2)]);
        let loser = w.duck(AgentId(3)).unwrap();
        assert!(!loser.is_following());
        assert!(matches!(loser.state(), DuckState::Floating { .. }));

        w.tick(DT, &frame().duck(AgentId(3), catching(s[2], CatchContact::Tail(AgentId(2)))), &mut NoopObserver)
            .unwrap();
        assert_eq!(w.chain().tail_id(), Some(AgentId(3)));
        assert!(w.chain().verify().is_ok());
    }

    #[test]
    fn derived_catches_use_leader_then_tail() {
        let mut w = world(&spots(2), &[]);
        // Catch point sits 0.15 below the duck.
        let f = frame()
            .duck(AgentId(1), at(Vec2::new(0.3, 0.15)))
            .duck(AgentId(2), at(Vec2::new(5.0, 0.15)))
            .derive_catches();
        w.tick(DT, &f, &mut NoopObserver).unwrap();
        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![AgentId(1)]);

        let f = frame()
            .duck(AgentId(1), at(Vec2::new(-1.0, 0.0)))
            .duck(AgentId(2), at(Vec2::new(-1.2, 0.15)))
            .derive_catches();
        w.tick(DT, &f, &mut NoopObserver).unwrap();
        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![AgentId(1), AgentId(2)]);
    }

    #[test]
    fn following_ducks_trail_their_parent() {
        let mut w = world(&spots(1), &[]);
        let duck = AgentId(1);
        w.tick(DT, &frame().duck(duck, catching(Vec2::new(1.0, 0.0), CatchContact::Leader)), &mut NoopObserver)
            .unwrap();

        let report = w.tick(DT, &frame().duck(duck, at(Vec2::new(1.0, 0.0))), &mut NoopObserver).unwrap();
        let step = report
            .intents_for(duck)
            .find_map(|i| match i {
                DuckIntent::MoveTo(p) => Some(*p),
                _ => None,
            })
            .unwrap();
        // Leader faces right, so the slot is one unit to its left.
        assert!(step.x < 1.0, "moving toward x = -1, got {step}");
    }

    #[test]
    fn out_of_bounds_duck_is_spliced_and_walks_home() {
        let mut w = world(&spots(3), &[]);
        let s = spots(3);
        let mut f = frame();
        for (i, p) in s.iter().enumerate() {
            f = f.duck(AgentId(i as u32 + 1), catching(*p, CatchContact::Leader));
        }
        w.tick(DT, &f, &mut NoopObserver).unwrap();

        let lost = DuckSensors { position: Vec2::new(0.0, -50.0), out_of_bounds: true, ..DuckSensors::default() };
        let mut log = EventLog::new();
        let report = w.tick(DT, &frame().duck(AgentId(2), lost), &mut log).unwrap();

        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![AgentId(1), AgentId(3)]);
        assert_eq!(w.chain().parent_of(AgentId(3)), Some(AgentId(1)));
        assert!(report.intents_for(AgentId(2)).any(|i| *i == DuckIntent::ReturnTo(s[1])));
        assert!(log.kinds().any(|e| *e == SimEvent::Detached { duck: AgentId(2), cause: DetachCause::OutOfBounds }));
        assert_eq!(*w.duck(AgentId(2)).unwrap().state(), DuckState::Locked);

        let home = DuckSensors { position: s[1], return_complete: true, ..DuckSensors::default() };
        w.tick(DT, &frame().duck(AgentId(2), home), &mut NoopObserver).unwrap();
        assert_eq!(w.duck(AgentId(2)).unwrap().anchor(), Some(s[1]));
    }

    #[test]
    fn release_duck_splices_from_the_middle() {
        let mut w = world(&spots(3), &[]);
        let mut f = frame();
        for (i, p) in spots(3).into_iter().enumerate() {
            f = f.duck(AgentId(i as u32 + 1), catching(p, CatchContact::Leader));
        }
        w.tick(DT, &f, &mut NoopObserver).unwrap();

        let mut log = EventLog::new();
        assert!(w.release_duck(AgentId(2), &mut log).unwrap());
        assert!(!w.release_duck(AgentId(2), &mut log).unwrap());
        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![AgentId(1), AgentId(3)]);
        assert!(matches!(w.duck(AgentId(2)).unwrap().state(), DuckState::Wandering { .. }));
        assert_eq!(log.events.len(), 1);
    }

    #[test]
    fn removed_duck_leaves_chain_and_culler() {
        let mut w = world(&spots(2), &[]);
        let mut f = frame();
        for (i, p) in spots(2).into_iter().enumerate() {
            f = f.duck(AgentId(i as u32 + 1), catching(p, CatchContact::Leader));
        }
        w.tick(DT, &f, &mut NoopObserver).unwrap();

        w.remove_duck(AgentId(1)).unwrap();
        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![AgentId(2)]);
        assert!(!w.chain().is_registered(AgentId(1)));
        assert!(!w.culler().is_tracked(dh_cull::CullKey::Duck(AgentId(1))));
        assert!(!w.agents.active[1]);
        assert!(w.remove_duck(AgentId(0)).is_err());
    }

    #[test]
    fn missing_sensors_skip_the_duck() {
        let mut w = world(&spots(2), &[]);
        let report = w.tick(DT, &frame().duck(AgentId(2), at(spots(2)[1])), &mut NoopObserver).unwrap();
        assert_eq!(report.intents_for(AgentId(1)).count(), 0);
        assert!(report.intents_for(AgentId(2)).count() > 0);
    }

    #[test]
    fn bad_dt_is_an_error() {
        let mut w = world(&spots(1), &[]);
        assert!(matches!(w.tick(-1.0, &frame(), &mut NoopObserver), Err(SimError::Config(_))));
        assert!(w.tick(f32::NAN, &frame(), &mut NoopObserver).is_err());
        assert_eq!(w.clock.current_tick.0, 0);
    }

    #[test]
    fn non_finite_duck_is_skipped_while_its_neighbour_ticks() {
        let s = spots(2);
        let mut w = world(&s, &[]);
        let f = frame()
            .duck(AgentId(1), at(Vec2::new(f32::NAN, 1.0)))
            .duck(AgentId(2), at(s[1]))
            .derive_catches();

        for _ in 0..2 {
            let report = w.tick(DT, &f, &mut NoopObserver).unwrap();
            assert_eq!(report.intents_for(AgentId(1)).count(), 0);
            assert!(report.intents_for(AgentId(2)).count() > 0);
        }
        assert_eq!(w.clock.current_tick.0, 2);
        assert_eq!(w.agents.position[1], s[0], "last good position kept");
    }

    #[test]
    fn chain_ids_without_agents_are_skipped() {
        let s = spots(1);
        let mut w = world(&s, &[]);
        let stray = AgentId(50);
        w.chain_mut().register(stray);
        w.chain_mut().attach_to_leader(stray).unwrap();

        // Tail lookup for catches and the follow target both meet the stray.
        w.tick(DT, &frame().duck(AgentId(1), at(s[0])).derive_catches(), &mut NoopObserver).unwrap();
        w.tick(DT, &frame().duck(AgentId(1), catching(s[0], CatchContact::Tail(stray))), &mut NoopObserver)
            .unwrap();
        assert_eq!(w.chain().parent_of(AgentId(1)), Some(stray));
        w.tick(DT, &frame().duck(AgentId(1), at(s[0])), &mut NoopObserver).unwrap();

        let mut log = EventLog::new();
        let report = w.tick(DT, &frame().at_exit(true), &mut log).unwrap();
        assert_eq!(report.delivered, vec![AgentId(1)]);
        assert_eq!(w.score(), 1);
        assert!(w.chain().is_empty());
    }

    #[test]
    fn follower_unlinked_outside_the_world_lands_next_tick() {
        let s = spots(2);
        let mut w = world(&s, &[]);
        let mut f = frame();
        for (i, &p) in s.iter().enumerate() {
            f = f.duck(AgentId(i as u32 + 1), catching(p, CatchContact::Leader));
        }
        w.tick(DT, &f, &mut NoopObserver).unwrap();
        w.chain_mut().detach_agent(AgentId(1)).unwrap();

        let mut log = EventLog::new();
        let f = frame().duck(AgentId(1), at(s[0])).duck(AgentId(2), at(s[1]));
        w.tick(DT, &f, &mut log).unwrap();

        assert!(matches!(w.duck(AgentId(1)).unwrap().state(), DuckState::Wandering { .. }));
        assert!(w.duck(AgentId(2)).unwrap().is_following());
        assert_eq!(w.chain().iter().collect::<Vec<_>>(), vec![AgentId(2)]);
        assert!(log.kinds().any(|e| *e == SimEvent::Detached { duck: AgentId(1), cause: DetachCause::Unlinked }));
    }
}

#[cfg(test)]
mod enemies {
    use dh_behavior::EnemyIntent;
    use dh_core::{EnemyId, Vec2};

    use super::helpers::{enemy_at, frame, world};
    use crate::{EventLog, NoopObserver, SimEvent};

    const ENEMY: EnemyId = EnemyId(0);

    #[test]
    fn sight_alerts_and_the_alert_wears_off() {
        let mut w = world(&[], &[Vec2::new(5.0, 0.0)]);
        let mut seen = enemy_at(Vec2::new(5.0, 0.0));
        seen.leader_in_sight = true;
        let unseen = enemy_at(Vec2::new(5.0, 0.0));

        let mut log = EventLog::new();
        w.tick(1.0, &frame().enemy(ENEMY, seen), &mut log).unwrap();
        assert!(w.enemy(ENEMY).unwrap().state().is_chase());
        assert_eq!(log.kinds().cloned().collect::<Vec<_>>(), vec![SimEvent::Alerted { enemy: ENEMY }]);

        // Default alert window is 10 s.
        for _ in 0..9 {
            w.tick(1.0, &frame().enemy(ENEMY, unseen.clone()), &mut log).unwrap();
            assert!(w.enemy(ENEMY).unwrap().state().is_chase());
        }
        w.tick(1.0, &frame().enemy(ENEMY, unseen), &mut log).unwrap();
        assert!(w.enemy(ENEMY).unwrap().state().is_patrol());
    }

    #[test]
    fn leader_contact_knocks_back_and_strips() {
        let mut w = world(&[Vec2::new(1.0, 0.0)], &[Vec2::new(2.0, 0.0)]);
        let duck = dh_core::AgentId(1);
        w.tick(
            0.02,
            &frame().duck(duck, super::helpers::catching(Vec2::new(1.0, 0.0), dh_behavior::CatchContact::Leader)),
            &mut NoopObserver,
        )
        .unwrap();
        assert_eq!(w.chain().len(), 1);

        let mut hit = enemy_at(Vec2::new(2.0, 0.0));
        hit.leader_contact = true;
        let mut log = EventLog::new();
        let report = w.tick(0.02, &frame().enemy(ENEMY, hit), &mut log).unwrap();

        assert!(w.chain().is_empty());
        let knock = report
            .enemy_intents_for(ENEMY)
            .find_map(|i| match i {
                EnemyIntent::Knockback { impulse } => Some(*impulse),
                _ => None,
            })
            .unwrap();
        assert!(knock.x < 0.0 && knock.y > 0.0, "pushed away from the enemy and up");
        assert!(report.enemy_intents_for(ENEMY).all(|i| *i != EnemyIntent::StripTail));
        assert!(log.kinds().any(|e| matches!(e, SimEvent::Alerted { .. })));
        assert!(log.kinds().any(|e| matches!(e, SimEvent::Detached { .. })));
    }
}

#[cfg(test)]
mod exit {
    use dh_behavior::CatchContact;
    use dh_core::AgentId;
    use dh_cull::CullKey;

    use super::helpers::{at, catching, frame, spots, world, DT};
    use crate::{EventLog, ExitGate, NoopObserver, SimEvent, World};

    fn attach(w: &mut World, ids: &[u32]) {
        let s = spots(w.agents.duck_count());
        let mut f = frame();
        for &i in ids {
            f = f.duck(AgentId(i), catching(s[i as usize - 1], CatchContact::Leader));
        }
        w.tick(DT, &f, &mut NoopObserver).unwrap();
    }

    #[test]
    fn exit_drains_the_chain_and_completes_the_level() {
        let mut w = world(&spots(3), &[]);
        attach(&mut w, &[1, 2, 3]);

        let mut log = EventLog::new();
        let report = w.tick(DT, &frame().at_exit(true), &mut log).unwrap();

        assert_eq!(report.delivered, vec![AgentId(3), AgentId(2), AgentId(1)]);
        assert!(w.chain().is_empty());
        assert_eq!(w.score(), 3);
        assert!(w.is_level_complete());
        assert_eq!(w.agents.collected_count(), 3);
        assert!(w.duck(AgentId(2)).unwrap().is_delivered());
        assert!(!w.culler().is_tracked(CullKey::Duck(AgentId(2))));
        assert_eq!(
            log.kinds().cloned().collect::<Vec<_>>(),
            vec![
                SimEvent::Delivered { ducks: vec![AgentId(3), AgentId(2), AgentId(1)], score: 3 },
                SimEvent::LevelComplete { score: 3, goal: 2 },
            ]
        );
    }

    #[test]
    fn level_completes_once_at_the_goal() {
        let mut w = world(&spots(3), &[]);
        let mut log = EventLog::new();

        attach(&mut w, &[1]);
        w.tick(DT, &frame().at_exit(true), &mut log).unwrap();
        assert_eq!(w.score(), 1);
        assert!(!w.is_level_complete());
        assert_eq!(w.exit.remaining(), 1);

        attach(&mut w, &[2]);
        w.tick(DT, &frame().at_exit(true), &mut log).unwrap();
        assert!(w.is_level_complete());

        attach(&mut w, &[3]);
        w.tick(DT, &frame().at_exit(true), &mut log).unwrap();
        assert_eq!(w.score(), 3);
        let completions = log.kinds().filter(|e| matches!(e, SimEvent::LevelComplete { .. })).count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn empty_chain_at_exit_does_nothing() {
        let mut w = world(&spots(2), &[]);
        let mut log = EventLog::new();
        let report = w.tick(DT, &frame().at_exit(true), &mut log).unwrap();
        assert!(report.delivered.is_empty());
        assert_eq!(w.score(), 0);
        assert!(log.events.is_empty());
    }

    #[test]
    fn delivered_ducks_stay_out_of_play() {
        let mut w = world(&spots(1), &[]);
        attach(&mut w, &[1]);
        w.tick(DT, &frame().at_exit(true), &mut NoopObserver).unwrap();

        let s = spots(1);
        let report = w
            .tick(DT, &frame().duck(AgentId(1), catching(s[0], CatchContact::Leader)), &mut NoopObserver)
            .unwrap();
        assert_eq!(report.intents_for(AgentId(1)).count(), 0);
        assert!(w.chain().is_empty());

        let report = w.tick(DT, &frame().duck(AgentId(1), at(s[0])), &mut NoopObserver).unwrap();
        assert_eq!(report.intent_count(), 0);
    }

    #[test]
    fn gate_goal_is_one_short_of_the_duck_count() {
        let mut gate = ExitGate::new(5);
        assert_eq!(gate.goal(), 4);
        assert!(!gate.deliver(0));
        assert!(!gate.deliver(3));
        assert!(gate.deliver(1));
        assert!(!gate.deliver(1));
        assert_eq!(gate.score(), 5);
        assert_eq!(ExitGate::new(0).goal(), 0);
    }
}

#[cfg(test)]
mod culling {
    use dh_behavior::{CatchContact, DuckState, EnemySensors};
    use dh_core::{AgentId, EnemyId, Vec2};
    use dh_cull::{CameraView, CullKey};

    use super::helpers::{at, catching, frame, world};
    use crate::NoopObserver;

    const FAR: Vec2 = Vec2::new(100.0, 0.0);

    fn camera_at(x: f32) -> CameraView {
        CameraView::new(Vec2::new(x, 0.0), 5.0, 1.0)
    }

    #[test]
    fn idle_agents_out_of_view_are_switched_off() {
        let mut w = world(&[FAR], &[FAR]);
        let report = w.tick(0.2, &frame().camera(camera_at(0.0)), &mut NoopObserver).unwrap();

        let pass = report.cull.unwrap();
        assert_eq!(pass.deactivated, vec![CullKey::Duck(AgentId(1)), CullKey::Enemy(EnemyId(0))]);
        assert!(!w.agents.active[1]);
        assert!(!w.enemies.active[0]);
        assert!(!dh_behavior::Creature::is_enabled(w.duck(AgentId(1)).unwrap()));
        assert_eq!(w.is_visible(CullKey::Duck(AgentId(1))), Some(false));
    }

    #[test]
    fn busy_agents_out_of_view_keep_running() {
        let mut w = world(&[Vec2::new(0.5, 0.0)], &[FAR]);
        let chasing = EnemySensors { position: FAR, leader_in_sight: true, ..EnemySensors::default() };
        let f = frame()
            .duck(AgentId(1), catching(Vec2::new(0.5, 0.0), CatchContact::Leader))
            .enemy(EnemyId(0), chasing);
        w.tick(0.02, &f, &mut NoopObserver).unwrap();
        assert!(w.duck(AgentId(1)).unwrap().is_following());

        let report = w.tick(0.2, &frame().camera(camera_at(200.0)), &mut NoopObserver).unwrap();
        let pass = report.cull.unwrap();
        assert!(pass.deactivated.is_empty());
        assert_eq!(pass.held, 2);
        assert!(w.agents.active[1]);
        assert!(w.enemies.active[0]);
    }

    #[test]
    fn back_in_view_reactivates_as_floating_where_it_is() {
        let mut w = world(&[FAR], &[]);
        w.tick(0.2, &frame().camera(camera_at(0.0)), &mut NoopObserver).unwrap();
        assert!(!w.agents.active[1]);

        let here = Vec2::new(1.0, 0.0);
        let report = w.tick(0.2, &frame().duck(AgentId(1), at(here)), &mut NoopObserver).unwrap();
        assert_eq!(report.cull.unwrap().activated, vec![CullKey::Duck(AgentId(1))]);
        assert!(w.agents.active[1]);
        match w.duck(AgentId(1)).unwrap().state() {
            DuckState::Floating { home, .. } => assert_eq!(*home, here),
            other => panic!("expected Floating, got {other:?}"),
        }
    }

    #[test]
    fn no_camera_no_culling() {
        let mut w = world(&[FAR], &[]);
        let report = w.tick(1.0, &frame(), &mut NoopObserver).unwrap();
        assert!(report.cull.is_none());
        assert!(w.agents.active[1]);
        assert_eq!(w.is_visible(CullKey::Duck(AgentId(1))), None);
    }
}

#[cfg(test)]
mod level {
    use dh_core::Vec2;

    use crate::{load_level_reader, SimError};

    #[test]
    fn parses_a_layout() {
        let csv = "kind,x,y\n# start\nleader,0,1\nduck, 4, 1.5\nduck,9,1.5\nenemy,14,1\nexit,30,1\n";
        let level = load_level_reader(csv.as_bytes()).unwrap();
        assert_eq!(level.leader, Vec2::new(0.0, 1.0));
        assert_eq!(level.ducks, vec![Vec2::new(4.0, 1.5), Vec2::new(9.0, 1.5)]);
        assert_eq!(level.enemies, vec![Vec2::new(14.0, 1.0)]);
        assert_eq!(level.exit, Some(Vec2::new(30.0, 1.0)));

        let (agents, enemies, _) = level.store_builder(3).build().unwrap();
        assert_eq!(agents.duck_count(), 2);
        assert_eq!(enemies.count, 1);
    }

    #[test]
    fn needs_exactly_one_leader() {
        let none = "kind,x,y\nduck,1,1\n";
        assert!(matches!(load_level_reader(none.as_bytes()), Err(SimError::Level(_))));
        let two = "kind,x,y\nleader,0,0\nleader,1,0\n";
        assert!(matches!(load_level_reader(two.as_bytes()), Err(SimError::Level(_))));
    }

    #[test]
    fn unknown_kinds_and_bad_numbers_fail() {
        let kind = "kind,x,y\nleader,0,0\ngoose,1,1\n";
        assert!(matches!(load_level_reader(kind.as_bytes()), Err(SimError::Csv(_))));
        let num = "kind,x,y\nleader,zero,0\n";
        assert!(matches!(load_level_reader(num.as_bytes()), Err(SimError::Csv(_))));
        let inf = "kind,x,y\nleader,inf,0\n";
        assert!(matches!(load_level_reader(inf.as_bytes()), Err(SimError::Level(_))));
    }
}

#[cfg(test)]
mod observer {
    use dh_behavior::CatchContact;
    use dh_core::{AgentId, Tick, Vec2};

    use super::helpers::{catching, frame, world, DT};
    use crate::{EventLog, SimEvent};

    #[test]
    fn events_carry_their_tick_and_dump_to_csv() {
        let mut w = world(&[Vec2::new(1.0, 0.0)], &[]);
        let mut log = EventLog::new();
        w.tick(DT, &frame(), &mut log).unwrap();
        w.tick(DT, &frame().duck(AgentId(1), catching(Vec2::new(1.0, 0.0), CatchContact::Leader)), &mut log)
            .unwrap();

        assert_eq!(log.events, vec![(Tick(1), SimEvent::Attached { duck: AgentId(1), parent: AgentId(0) })]);

        let mut out = Vec::new();
        log.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "tick,event,detail\n1,attached,AgentId(1) behind AgentId(0)\n");
    }
}

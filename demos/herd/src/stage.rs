//! A toy stand-in for the game's physics layer.
//!
//! Moves the leader right at a constant speed, applies movement intents
//! verbatim, and turns distances into the contact and sight facts the world
//! expects.  Nothing here collides or falls.

use dh_behavior::{DuckIntent, DuckSensors, EnemyIntent, EnemySensors};
use dh_core::{AgentId, EnemyId, Facing, Vec2};
use dh_cull::CameraView;
use dh_sim::{Level, SensorFrame, TickReport, World};

const LEADER_SPEED:    f32 = 4.0;
const SIGHT_RANGE:     f32 = 8.0;
const CONTACT_RANGE:   f32 = 0.8;
const EXIT_RANGE:      f32 = 1.0;
/// Fraction of an enemy kick that reaches the leader's position.
const KNOCKBACK_SCALE: f32 = 0.02;

const CAMERA_ORTHO:  f32 = 5.0;
const CAMERA_ASPECT: f32 = 16.0 / 9.0;

pub struct Stage {
    pub leader: Vec2,
    pub exit:   Vec2,
    /// Indexed by `AgentId`; slot 0 mirrors the leader and is unused.
    ducks:      Vec<Vec2>,
    returning:  Vec<bool>,
    enemies:    Vec<Vec2>,
    /// Contact state last tick, so contacts are reported once per touch.
    touching:   Vec<bool>,
    brushing:   Vec<bool>,
}

impl Stage {
    pub fn new(level: &Level, exit: Vec2) -> Self {
        let mut ducks = Vec::with_capacity(level.ducks.len() + 1);
        ducks.push(level.leader);
        ducks.extend_from_slice(&level.ducks);
        let enemy_count = level.enemies.len();
        Self {
            leader: level.leader,
            exit,
            returning: vec![false; ducks.len()],
            ducks,
            enemies: level.enemies.clone(),
            touching: vec![false; enemy_count],
            brushing: vec![false; enemy_count],
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.leader.x += LEADER_SPEED * dt;
    }

    pub fn sense(&mut self, world: &World) -> SensorFrame {
        let mut frame = SensorFrame::new(self.leader, Facing::Right)
            .camera(CameraView::new(self.leader, CAMERA_ORTHO, CAMERA_ASPECT))
            .at_exit(self.leader.distance(self.exit) < EXIT_RANGE)
            .derive_catches();

        for (i, &position) in self.ducks.iter().enumerate().skip(1) {
            if world.agents.collected[i] {
                continue;
            }
            let sensors = DuckSensors {
                position,
                return_complete: std::mem::take(&mut self.returning[i]),
                ..DuckSensors::default()
            };
            frame = frame.duck(AgentId(i as u32), sensors);
        }

        for (i, &position) in self.enemies.iter().enumerate() {
            let to_leader = self.leader.distance(position);
            let touching = to_leader < CONTACT_RANGE;
            let brushing = world
                .chain()
                .iter()
                .any(|d| self.ducks[d.index()].distance(position) < CONTACT_RANGE);

            let sensors = EnemySensors {
                position,
                grounded:         true,
                leader_position:  self.leader,
                leader_in_sight:  to_leader < SIGHT_RANGE,
                obstacle:         None,
                back_clear:       true,
                leader_contact:   touching && !self.touching[i],
                follower_contact: brushing && !self.brushing[i],
            };
            self.touching[i] = touching;
            self.brushing[i] = brushing;
            frame = frame.enemy(EnemyId(i as u32), sensors);
        }
        frame
    }

    pub fn apply(&mut self, report: &TickReport) {
        for (duck, intent) in &report.duck_intents {
            let i = duck.index();
            match intent {
                DuckIntent::HoldAt(p) | DuckIntent::MoveTo(p) => self.ducks[i] = *p,
                DuckIntent::ReturnTo(p) => {
                    self.ducks[i] = *p;
                    self.returning[i] = true;
                }
                _ => {}
            }
        }
        for (enemy, intent) in &report.enemy_intents {
            match intent {
                EnemyIntent::MoveTo(p) => self.enemies[enemy.index()] = *p,
                EnemyIntent::Knockback { impulse } => self.leader.x += impulse.x * KNOCKBACK_SCALE,
                _ => {}
            }
        }
    }
}

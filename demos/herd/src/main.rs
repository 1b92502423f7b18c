//! herd — scripted run of the duck_herd gameplay core.
//!
//! The leader walks right through a short level, picks up the ducks it
//! passes, takes a hit from the enemy guarding the path, and hands the rest
//! in at the exit.  A toy stage stands in for the game's physics.
//!
//! Usage: `herd [settings.json]`.  The settings file holds `sim`, `duck`,
//! `enemy` and `cull` sections; any section left out keeps its default.

mod stage;

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use dh_behavior::{DuckTuning, EnemyTuning};
use dh_core::{AgentId, SimConfig};
use dh_cull::CullConfig;
use dh_sim::{load_level_reader, EventLog, SimEvent, WorldBuilder};

use stage::Stage;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:      u64 = 42;
const MAX_TICKS: u64 = 3_000; // 60 s at 50 Hz

const LEVEL_CSV: &str = "\
kind,x,y\n\
leader,0,1\n\
duck,4,1.15\n\
duck,8,1.15\n\
duck,12,1.15\n\
duck,16,1.15\n\
enemy,22,1\n\
exit,30,1\n\
";

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    sim:   SimConfig,
    duck:  DuckTuning,
    enemy: EnemyTuning,
    cull:  CullConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sim:   SimConfig { seed: SEED, total_ticks: MAX_TICKS, ..SimConfig::default() },
            duck:  DuckTuning::default(),
            enemy: EnemyTuning::default(),
            cull:  CullConfig::default(),
        }
    }
}

fn load_settings() -> Result<Settings> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(Settings::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {path}"))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = load_settings()?;
    let dt = settings.sim.fixed_step_secs;
    let tick_cap = if settings.sim.total_ticks > 0 { settings.sim.total_ticks } else { MAX_TICKS };

    // 1. Level and stores.
    let level = load_level_reader(Cursor::new(LEVEL_CSV))?;
    let exit = level.exit.context("level has no exit")?;
    let (agents, enemies, rngs) = level.store_builder(settings.sim.seed).build()?;
    println!("=== herd — duck_herd gameplay core ===");
    println!(
        "Ducks: {}  |  Enemies: {}  |  Goal: {}  |  Seed: {}",
        agents.duck_count(),
        enemies.count,
        agents.duck_count().saturating_sub(1),
        settings.sim.seed
    );
    println!();

    // 2. World.
    let mut world = WorldBuilder::new(settings.sim.clone(), agents, enemies, rngs)
        .duck_tuning(settings.duck.clone())
        .enemy_tuning(settings.enemy.clone())
        .culling(settings.cull.clone())
        .build()?;
    let mut stage = Stage::new(&level, exit);
    let mut events = EventLog::new();

    // 3. Run until the level is won or time runs out.
    let (mut switched_off, mut switched_on) = (0usize, 0usize);
    while world.clock.current_tick.0 < tick_cap && !world.is_level_complete() {
        stage.advance(dt);
        let frame = stage.sense(&world);
        let report = world.tick(dt, &frame, &mut events)?;
        stage.apply(&report);

        if let Some(pass) = &report.cull {
            switched_off += pass.deactivated.len();
            switched_on += pass.activated.len();
        }
    }
    log::info!("stopped at {}", world.clock);

    // 4. Event trail.
    for (tick, event) in &events.events {
        match event {
            SimEvent::Attached { duck, parent } => println!("{tick:>6}  {duck} joined behind {parent}"),
            SimEvent::Detached { duck, cause } => println!("{tick:>6}  {duck} lost ({cause:?})"),
            SimEvent::Alerted { enemy } => println!("{tick:>6}  {enemy} spotted the leader"),
            SimEvent::EnemyJump { enemy, .. } => println!("{tick:>6}  {enemy} jumped"),
            SimEvent::Delivered { ducks, score } => {
                println!("{tick:>6}  {} ducks delivered, score {score}", ducks.len())
            }
            SimEvent::LevelComplete { score, goal } => println!("{tick:>6}  level complete ({score}/{goal})"),
        }
    }
    println!();

    std::fs::create_dir_all("output/herd")?;
    events.write_csv(File::create(Path::new("output/herd/events.csv"))?)?;

    // 5. Final duck table.
    println!("{:<12} {:<10} {:<8} {:<9}", "Duck", "State", "Active", "Collected");
    println!("{}", "-".repeat(42));
    for duck in world.agents.duck_ids() {
        let state = world.duck(duck).map_or("-", |d| d.state().name());
        println!(
            "{:<12} {:<10} {:<8} {:<9}",
            duck.to_string(),
            state,
            world.agents.active[duck.index()],
            world.agents.collected[duck.index()],
        );
    }
    println!();

    let summary = serde_json::json!({
        "ticks":          world.clock.current_tick.0,
        "elapsed_secs":   world.clock.elapsed_secs,
        "score":          world.score(),
        "goal":           world.exit.goal(),
        "complete":       world.is_level_complete(),
        "chain":          world.chain().iter().map(|a: AgentId| a.0).collect::<Vec<_>>(),
        "culled":         switched_off,
        "restored":       switched_on,
        "events":         events.events.len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

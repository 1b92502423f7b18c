//! Level layout loading.
//!
//! A layout is a CSV file with a `kind,x,y` header and one row per spawn:
//!
//! ```text
//! kind,x,y
//! leader,0,1
//! duck,4,1.5
//! duck,9,1.5
//! enemy,14,1
//! exit,30,1
//! ```
//!
//! Lines starting with `#` are ignored.  Exactly one `leader` row is
//! required; `exit` is optional and may appear at most once.

use std::io::Read;
use std::path::Path;

use dh_agent::AgentStoreBuilder;
use dh_core::Vec2;
use serde::Deserialize;

use crate::{SimError, SimResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnKind {
    Leader,
    Duck,
    Enemy,
    Exit,
}

#[derive(Debug, Deserialize)]
struct SpawnRow {
    kind: SpawnKind,
    x:    f32,
    y:    f32,
}

/// Spawn points read from a layout file, ducks and enemies in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub leader:  Vec2,
    pub ducks:   Vec<Vec2>,
    pub enemies: Vec<Vec2>,
    pub exit:    Option<Vec2>,
}

impl Level {
    /// An [`AgentStoreBuilder`] preloaded with this level's spawn points.
    pub fn store_builder(&self, seed: u64) -> AgentStoreBuilder {
        AgentStoreBuilder::new(seed)
            .leader(self.leader)
            .ducks(self.ducks.iter().copied())
            .enemies(self.enemies.iter().copied())
    }
}

pub fn load_level(path: &Path) -> SimResult<Level> {
    let file = std::fs::File::open(path)?;
    load_level_reader(file)
}

pub fn load_level_reader<R: Read>(reader: R) -> SimResult<Level> {
    let mut rdr = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut leader = None;
    let mut exit = None;
    let mut ducks = Vec::new();
    let mut enemies = Vec::new();

    for (i, row) in rdr.deserialize::<SpawnRow>().enumerate() {
        let row = row?;
        let at = Vec2::new(row.x, row.y);
        if !at.is_finite() {
            return Err(SimError::Level(format!("row {}: non-finite position", i + 1)));
        }
        match row.kind {
            SpawnKind::Leader => {
                if leader.replace(at).is_some() {
                    return Err(SimError::Level(format!("row {}: second leader", i + 1)));
                }
            }
            SpawnKind::Exit => {
                if exit.replace(at).is_some() {
                    return Err(SimError::Level(format!("row {}: second exit", i + 1)));
                }
            }
            SpawnKind::Duck => ducks.push(at),
            SpawnKind::Enemy => enemies.push(at),
        }
    }

    let leader = leader.ok_or_else(|| SimError::Level("no leader row".into()))?;
    log::debug!("level loaded: {} ducks, {} enemies", ducks.len(), enemies.len());
    Ok(Level { leader, ducks, enemies, exit })
}

//! R-tree over duck catch points.
//!
//! Rebuilt each tick from the positions the physics layer reported.  Bulk
//! loading a few dozen points is cheaper than keeping a dynamic tree in sync
//! with every move.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use dh_core::{AgentId, Vec2};

use crate::{SpatialError, SpatialResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct PointEntry {
    point: [f32; 2],
    id:    AgentId,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PointEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── CatchHit ──────────────────────────────────────────────────────────────────

/// A duck whose catch point is within range of a chain member.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatchHit {
    pub duck:   AgentId,
    /// The leader or the tail the duck reached.
    pub target: AgentId,
}

// ── ProximityIndex ────────────────────────────────────────────────────────────

pub struct ProximityIndex {
    tree: RTree<PointEntry>,
}

impl ProximityIndex {
    /// Bulk-load `(id, point)` pairs.  Fails on the first non-finite point.
    pub fn build(points: impl IntoIterator<Item = (AgentId, Vec2)>) -> SpatialResult<Self> {
        let entries = points
            .into_iter()
            .map(|(id, p)| {
                if p.is_finite() {
                    Ok(PointEntry { point: p.to_array(), id })
                } else {
                    Err(SpatialError::NonFinite(id))
                }
            })
            .collect::<SpatialResult<Vec<_>>>()?;
        Ok(Self { tree: RTree::bulk_load(entries) })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Ids within `radius` of `center` (inclusive), ascending.
    pub fn within(&self, center: Vec2, radius: f32) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self
            .tree
            .locate_within_distance(center.to_array(), radius * radius)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Closest id to `center`, or `None` if the index is empty.
    pub fn nearest(&self, center: Vec2) -> Option<AgentId> {
        self.tree.nearest_neighbor(&center.to_array()).map(|e| e.id)
    }

    /// Which indexed ducks reached the leader or the tail.
    ///
    /// A duck in range of both is reported against the leader.  Entries whose
    /// id equals `leader.0` or the tail's id are skipped, so callers may index
    /// every duck without filtering first.
    pub fn catch_hits(
        &self,
        leader: (AgentId, Vec2),
        tail:   Option<(AgentId, Vec2)>,
        radius: f32,
    ) -> SpatialResult<Vec<CatchHit>> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SpatialError::BadRadius(radius));
        }
        let (leader_id, leader_pos) = leader;
        let tail_id = tail.map(|(id, _)| id);
        let skip = |id: AgentId| id == leader_id || Some(id) == tail_id;

        let mut hits: Vec<CatchHit> = self
            .within(leader_pos, radius)
            .into_iter()
            .filter(|&id| !skip(id))
            .map(|duck| CatchHit { duck, target: leader_id })
            .collect();

        if let Some((tail_id, tail_pos)) = tail {
            for duck in self.within(tail_pos, radius) {
                if !skip(duck) && !hits.iter().any(|h| h.duck == duck) {
                    hits.push(CatchHit { duck, target: tail_id });
                }
            }
        }
        hits.sort_unstable_by_key(|h| h.duck);
        Ok(hits)
    }
}

//! Invariant checking and repair.
//!
//! The walk always starts at the leader and follows `child` links; that side
//! of the adjacency is treated as authoritative when the two disagree.

use dh_core::AgentId;

use crate::{ChainError, ChainResult, FollowerChain, Role};

/// What [`FollowerChain::heal`] changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HealReport {
    pub repairs: usize,
    /// Followers that were cut loose, ascending.  They are ownerless now
    /// and whoever drives their behavior should treat them as detached.
    pub cut:     Vec<AgentId>,
}

impl HealReport {
    /// `true` if the chain was already healthy.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.repairs == 0
    }
}

impl FollowerChain {
    /// Check every chain invariant.
    ///
    /// - the leader slot exists, has role `Leader` and no parent;
    /// - walking `child` from the leader reaches only registered followers,
    ///   never revisits a node, and each node's `parent` is its predecessor;
    /// - the node the walk ends on is the cached tail (or the leader when
    ///   the tail is `None`), and the walk length equals the cached `len`;
    /// - every follower not on the walk is ownerless.
    pub fn verify(&self) -> ChainResult<()> {
        let leader = self.leader();
        let Some(root) = self.slot(leader) else {
            return Err(ChainError::BrokenInvariant(format!("leader {leader} has no slot")));
        };
        if root.role != Role::Leader || root.parent.is_some() {
            return Err(ChainError::BrokenInvariant(format!(
                "leader {leader} has role {:?} and parent {:?}",
                root.role, root.parent
            )));
        }

        let mut seen = vec![false; self.links().len()];
        seen[leader.index()] = true;

        let mut prev = leader;
        let mut count = 0usize;
        while let Some(next) = self.child_of(prev) {
            let Some(link) = self.slot(next) else {
                return Err(ChainError::BrokenInvariant(format!(
                    "{prev} points at unregistered child {next}"
                )));
            };
            if seen[next.index()] {
                return Err(ChainError::BrokenInvariant(format!("cycle through {next}")));
            }
            if link.role != Role::Follower {
                return Err(ChainError::BrokenInvariant(format!("{next} is not a follower")));
            }
            if link.parent != Some(prev) {
                return Err(ChainError::BrokenInvariant(format!(
                    "{prev}.child = {next} but {next}.parent = {:?}",
                    link.parent
                )));
            }
            seen[next.index()] = true;
            count += 1;
            prev = next;
        }

        let expected_tail = if prev == leader { None } else { Some(prev) };
        if self.tail_id() != expected_tail {
            return Err(ChainError::BrokenInvariant(format!(
                "cached tail {:?} but chain ends at {prev}",
                self.tail_id()
            )));
        }
        if self.len() != count {
            return Err(ChainError::BrokenInvariant(format!(
                "cached length {} but walked {count}",
                self.len()
            )));
        }

        for (idx, slot) in self.links().iter().enumerate() {
            if let Some(link) = slot {
                if !seen[idx] && (link.parent.is_some() || link.child.is_some()) {
                    return Err(ChainError::BrokenInvariant(format!(
                        "{} is outside the chain but still linked",
                        AgentId(idx as u32)
                    )));
                }
            }
        }
        Ok(())
    }

    /// Re-sync the chain from the leader side.  A healthy chain comes back
    /// with a clean report.
    pub fn heal(&mut self) -> HealReport {
        let leader = self.leader();
        let mut repairs = 0usize;
        let mut cut = Vec::new();
        let mut seen = vec![false; self.links().len()];

        match self.slot_mut(leader) {
            Some(root) => {
                if root.role != Role::Leader || root.parent.is_some() {
                    root.role = Role::Leader;
                    root.parent = None;
                    repairs += 1;
                }
            }
            None => {
                // Leader slot lost; nothing hangs off it any more.
                let idx = leader.index();
                if idx >= self.links().len() {
                    return HealReport { repairs, cut };
                }
                self.links_mut()[idx] = Some(crate::Link::leader());
                repairs += 1;
            }
        }
        seen[leader.index()] = true;

        let mut prev = leader;
        let mut count = 0usize;
        while let Some(next) = self.child_of(prev) {
            let usable = self
                .slot(next)
                .is_some_and(|l| l.role == Role::Follower && !seen[next.index()]);
            if !usable {
                if let Some(link) = self.slot_mut(prev) {
                    link.child = None;
                }
                repairs += 1;
                break;
            }
            if let Some(link) = self.slot_mut(next) {
                if link.parent != Some(prev) {
                    link.parent = Some(prev);
                    repairs += 1;
                }
            }
            seen[next.index()] = true;
            count += 1;
            prev = next;
        }

        for (idx, slot) in self.links_mut().iter_mut().enumerate() {
            if let Some(link) = slot {
                if !seen[idx] && (link.parent.is_some() || link.child.is_some()) {
                    link.clear();
                    repairs += 1;
                    if link.role == Role::Follower {
                        cut.push(AgentId(idx as u32));
                    }
                }
            }
        }

        let tail = if prev == leader { None } else { Some(prev) };
        if self.tail_id() != tail || self.len() != count {
            repairs += 1;
        }
        self.set_cached(tail, count);

        if repairs > 0 {
            log::warn!(
                "healed follower chain: {repairs} repairs, {} cut loose, length now {count}",
                cut.len()
            );
        }
        HealReport { repairs, cut }
    }
}

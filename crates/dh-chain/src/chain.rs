//! The `FollowerChain` and its attach / detach protocol.

use dh_core::AgentId;

use crate::{ChainError, ChainResult, Link, TransitionFault};

/// Upper bound on `detach_all` iterations.
///
/// A well-formed chain drains in exactly `len()` steps; the cap only matters
/// if the links were corrupted into a loop that `heal` has not yet cut.
pub const DRAIN_ITERATION_CAP: usize = 100;

// ── FollowerChain ─────────────────────────────────────────────────────────────

/// Arena of chain links rooted at a single leader.
///
/// Slots are indexed by `AgentId`; unregistered ids have an empty slot.  The
/// leader occupies its own slot and is always present.
///
/// `tail` is cached for O(1) append.  `None` means the leader is its own tail
/// (the chain is empty).
pub struct FollowerChain {
    leader: AgentId,
    links:  Vec<Option<Link>>,
    tail:   Option<AgentId>,
    len:    usize,
}

impl FollowerChain {
    /// Create an empty chain rooted at `leader`.
    pub fn new(leader: AgentId) -> Self {
        let mut links = vec![None; leader.index() + 1];
        links[leader.index()] = Some(Link::leader());
        Self { leader, links, tail: None, len: 0 }
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register a freshly spawned agent as ownerless.
    ///
    /// Returns `false` if `agent` was already registered (its links are left
    /// untouched) or is the leader.
    pub fn register(&mut self, agent: AgentId) -> bool {
        if agent == self.leader || agent == AgentId::INVALID {
            return false;
        }
        let idx = agent.index();
        if idx >= self.links.len() {
            self.links.resize(idx + 1, None);
        }
        if self.links[idx].is_some() {
            return false;
        }
        self.links[idx] = Some(Link::ownerless());
        true
    }

    /// Forget `agent`, splicing it out of the chain first if it is attached.
    pub fn unregister(&mut self, agent: AgentId) -> ChainResult<()> {
        if agent == self.leader {
            return Err(ChainError::InvalidTransition {
                agent,
                fault: TransitionFault::LeaderCannotFollow,
            });
        }
        let link = self.link(agent)?;
        if link.is_attached() {
            self.detach_agent(agent)?;
        }
        self.links[agent.index()] = None;
        Ok(())
    }

    #[inline]
    pub fn is_registered(&self, agent: AgentId) -> bool {
        self.slot(agent).is_some()
    }

    // ── Attach ────────────────────────────────────────────────────────────

    /// Append `agent` behind the current tail (or the leader if empty).
    ///
    /// Returns the id the agent now follows.  An agent that already has a
    /// parent is rejected with [`ChainError::InvalidTransition`] and the
    /// chain is left as it was; overlapping catch triggers in the same tick
    /// hit this path.
    pub fn attach_to_leader(&mut self, agent: AgentId) -> ChainResult<AgentId> {
        if agent == self.leader {
            return Err(ChainError::InvalidTransition {
                agent,
                fault: TransitionFault::LeaderCannotFollow,
            });
        }
        let link = self.link(agent)?;
        if link.parent.is_some() || self.tail == Some(agent) {
            return Err(ChainError::InvalidTransition {
                agent,
                fault: TransitionFault::AlreadyAttached,
            });
        }

        let parent = self.tail_or_leader();
        self.set_child(parent, Some(agent));
        self.set_parent(agent, Some(parent));
        self.tail = Some(agent);
        self.len += 1;

        log::debug!("{agent} attached behind {parent} (chain length {})", self.len);
        self.after_mutation();
        Ok(parent)
    }

    /// Append `agent` behind `observed_tail`, the tail the caller saw when it
    /// detected the catch.
    ///
    /// If the tail has moved since (another duck was appended or detached
    /// earlier in the same tick) the request is rejected as stale instead of
    /// silently attaching somewhere the caller did not expect.  Naming the
    /// leader while the chain is empty is the same as
    /// [`attach_to_leader`](Self::attach_to_leader).
    pub fn attach_to_tail(&mut self, agent: AgentId, observed_tail: AgentId) -> ChainResult<AgentId> {
        let actual = self.tail_or_leader();
        if observed_tail != actual {
            // Report a double attach ahead of a stale tail; it's the more
            // useful diagnosis when both apply.
            if self.link(agent)?.parent.is_some() {
                return Err(ChainError::InvalidTransition {
                    agent,
                    fault: TransitionFault::AlreadyAttached,
                });
            }
            return Err(ChainError::InvalidTransition {
                agent,
                fault: TransitionFault::StaleTail { observed: observed_tail, actual },
            });
        }
        self.attach_to_leader(agent)
    }

    // ── Detach ────────────────────────────────────────────────────────────

    /// Remove the last agent in line and return its id.
    ///
    /// Returns `None` when the chain is already empty.  The detached agent
    /// is left ownerless; its new behavior state is the caller's business.
    pub fn detach_tail(&mut self) -> Option<AgentId> {
        let tail = self.tail?;
        let parent = self.slot(tail).and_then(|l| l.parent);

        match parent {
            // Tail without a parent: the cached tail is lying.
            None => {
                log::warn!("tail {tail} has no parent; clearing tail and repairing chain");
                self.tail = None;
                self.heal();
                return None;
            }
            // Parent is another duck: it becomes the new tail.
            Some(p) if p != self.leader => {
                self.set_child(p, None);
                self.tail = Some(p);
            }
            // Parent is the leader: the chain is now empty.
            Some(_) => {
                self.set_child(self.leader, None);
                self.tail = None;
            }
        }

        if let Some(link) = self.slot_mut(tail) {
            link.clear();
        }
        self.len = self.len.saturating_sub(1);

        log::debug!("{tail} detached from tail (chain length {})", self.len);
        self.after_mutation();
        Some(tail)
    }

    /// Drain the chain tail-first, returning ids in detach order.
    ///
    /// Stops after [`DRAIN_ITERATION_CAP`] iterations even if agents remain.
    pub fn detach_all(&mut self) -> Vec<AgentId> {
        let mut drained = Vec::with_capacity(self.len);
        for _ in 0..DRAIN_ITERATION_CAP {
            match self.detach_tail() {
                Some(agent) => drained.push(agent),
                None => break,
            }
        }
        if !self.is_empty() {
            log::warn!(
                "detach_all hit the {DRAIN_ITERATION_CAP}-iteration cap with {} agents left",
                self.len
            );
        }
        drained
    }

    /// Splice `agent` out from anywhere in the chain.
    ///
    /// Its child (if any) is re-parented to its parent, so the chain stays
    /// continuous.  Removing the tail is the same as [`detach_tail`](Self::detach_tail).
    pub fn detach_agent(&mut self, agent: AgentId) -> ChainResult<()> {
        if agent == self.leader {
            return Err(ChainError::InvalidTransition {
                agent,
                fault: TransitionFault::LeaderCannotFollow,
            });
        }
        let link = self.link(agent)?;
        let Some(parent) = link.parent else {
            return Err(ChainError::InvalidTransition {
                agent,
                fault: TransitionFault::NotAttached,
            });
        };

        if self.tail == Some(agent) {
            self.detach_tail();
            return Ok(());
        }

        let child = link.child;
        self.set_child(parent, child);
        if let Some(c) = child {
            self.set_parent(c, Some(parent));
        }
        if let Some(link) = self.slot_mut(agent) {
            link.clear();
        }
        self.len = self.len.saturating_sub(1);

        log::debug!("{agent} spliced out between {parent} and {child:?}");
        self.after_mutation();
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn leader(&self) -> AgentId {
        self.leader
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tail.is_none()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// The last follower in line, or `None` if the chain is empty.
    #[inline]
    pub fn tail_id(&self) -> Option<AgentId> {
        self.tail
    }

    /// The current tail, or the leader when the chain is empty.  This is the
    /// id a newly caught duck will follow.
    #[inline]
    pub fn tail_or_leader(&self) -> AgentId {
        self.tail.unwrap_or(self.leader)
    }

    /// `true` if the leader has at least one follower.
    #[inline]
    pub fn has_follower(&self) -> bool {
        self.slot(self.leader).and_then(|l| l.child).is_some()
    }

    /// The follower directly behind the leader.
    #[inline]
    pub fn first_follower(&self) -> Option<AgentId> {
        self.slot(self.leader).and_then(|l| l.child)
    }

    /// `true` if `agent` is a follower currently in the chain.
    #[inline]
    pub fn contains(&self, agent: AgentId) -> bool {
        self.slot(agent).is_some_and(|l| l.is_attached())
    }

    pub fn parent_of(&self, agent: AgentId) -> Option<AgentId> {
        self.slot(agent).and_then(|l| l.parent)
    }

    pub fn child_of(&self, agent: AgentId) -> Option<AgentId> {
        self.slot(agent).and_then(|l| l.child)
    }

    /// Read-only view of one agent's adjacency.
    pub fn get(&self, agent: AgentId) -> Option<&Link> {
        self.slot(agent)
    }

    /// Followers in leader-to-tail order.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter {
            chain:     self,
            next:      self.first_follower(),
            remaining: self.len,
        }
    }

    /// Number of registered agents, leader included.
    pub fn registered_count(&self) -> usize {
        self.links.iter().filter(|l| l.is_some()).count()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn slot(&self, agent: AgentId) -> Option<&Link> {
        self.links.get(agent.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, agent: AgentId) -> Option<&mut Link> {
        self.links.get_mut(agent.index()).and_then(Option::as_mut)
    }

    fn link(&self, agent: AgentId) -> ChainResult<Link> {
        self.slot(agent).copied().ok_or(ChainError::MissingReference(agent))
    }

    fn set_child(&mut self, agent: AgentId, child: Option<AgentId>) {
        if let Some(link) = self.slot_mut(agent) {
            link.child = child;
        }
    }

    fn set_parent(&mut self, agent: AgentId, parent: Option<AgentId>) {
        if let Some(link) = self.slot_mut(agent) {
            link.parent = parent;
        }
    }

    pub(crate) fn links(&self) -> &[Option<Link>] {
        &self.links
    }

    pub(crate) fn links_mut(&mut self) -> &mut [Option<Link>] {
        &mut self.links
    }

    pub(crate) fn set_cached(&mut self, tail: Option<AgentId>, len: usize) {
        self.tail = tail;
        self.len = len;
    }

    /// Debug builds panic on a broken invariant; release builds repair it.
    fn after_mutation(&mut self) {
        if let Err(e) = self.verify() {
            if cfg!(debug_assertions) {
                panic!("follower chain corrupted: {e}");
            }
            let report = self.heal();
            log::warn!(
                "follower chain corrupted ({e}); {} links repaired, {:?} cut loose",
                report.repairs, report.cut
            );
        }
    }
}

// ── ChainIter ─────────────────────────────────────────────────────────────────

/// Iterator over followers from the leader's child to the tail.
///
/// Bounded by the cached length so a corrupted loop can't spin forever.
pub struct ChainIter<'a> {
    chain:     &'a FollowerChain,
    next:      Option<AgentId>,
    remaining: usize,
}

impl Iterator for ChainIter<'_> {
    type Item = AgentId;

    fn next(&mut self) -> Option<AgentId> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = self.chain.child_of(current);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

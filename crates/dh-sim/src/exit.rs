//! Exit scoring and the level goal.

/// Tallies delivered ducks and decides when the level is won.
///
/// The goal is one fewer than the number of ducks placed, so a single lost
/// duck does not fail the level.  The level is complete when every duck is
/// in or the goal is met.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExitGate {
    score:    u32,
    amount:   u32,
    goal:     u32,
    complete: bool,
}

impl ExitGate {
    pub fn new(duck_count: usize) -> Self {
        let amount = u32::try_from(duck_count).unwrap_or(u32::MAX);
        Self {
            score: 0,
            amount,
            goal: amount.saturating_sub(1),
            complete: false,
        }
    }

    /// Override the goal.  Ignored if it exceeds the number of ducks.
    pub fn set_goal(&mut self, goal: u32) {
        if goal <= self.amount {
            self.goal = goal;
        }
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn goal(&self) -> u32 {
        self.goal
    }

    #[inline]
    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Ducks still needed to reach the goal.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.score)
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Add `delivered` to the score.  Returns `true` exactly once: on the
    /// delivery that completes the level.
    pub fn deliver(&mut self, delivered: usize) -> bool {
        if delivered == 0 {
            return false;
        }
        let delivered = u32::try_from(delivered).unwrap_or(u32::MAX);
        self.score = self.score.saturating_add(delivered);
        if self.complete {
            return false;
        }
        self.complete = self.score == self.amount || self.score >= self.goal;
        self.complete
    }
}

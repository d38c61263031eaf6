use crate::{HarvestLimits, Post, SeenLedger, StopReason};

/// Mutable state of one harvest run.
///
/// Created fresh per run and consumed on termination. Posts accumulate in
/// discovery order and are never removed; the ledger never resets.
#[derive(Debug, Default)]
pub struct HarvestState {
    ledger: SeenLedger,
    posts: Vec<Post>,
    stagnant_cycles: u32,
    cycles_attempted: u32,
}

impl HarvestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one extracted post. Returns true when the post was novel and
    /// appended; a previously seen id leaves the state untouched.
    pub fn admit(&mut self, post: Post) -> bool {
        if !self.ledger.is_novel(&post.id) {
            return false;
        }
        self.posts.push(post);
        true
    }

    /// Close out one snapshot pass. A pass with zero novel posts counts
    /// toward stagnation; any progress resets the streak.
    pub fn finish_cycle(&mut self, novel_in_cycle: usize) {
        if novel_in_cycle == 0 {
            self.stagnant_cycles += 1;
        } else {
            self.stagnant_cycles = 0;
        }
    }

    /// Note that a load-more trigger was issued.
    pub fn record_scroll(&mut self) {
        self.cycles_attempted += 1;
    }

    /// Evaluate the termination policy against the current counters.
    pub fn stop_reason(&self, limits: &HarvestLimits) -> Option<StopReason> {
        if self.posts.len() >= limits.target_posts {
            Some(StopReason::TargetReached)
        } else if self.cycles_attempted >= limits.max_cycles {
            Some(StopReason::CycleLimit)
        } else if self.stagnant_cycles >= limits.max_stagnant_cycles {
            Some(StopReason::Stagnation)
        } else {
            None
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn stagnant_cycles(&self) -> u32 {
        self.stagnant_cycles
    }

    pub fn cycles_attempted(&self) -> u32 {
        self.cycles_attempted
    }

    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }
}

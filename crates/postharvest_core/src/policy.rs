/// Termination limits for one harvest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestLimits {
    /// Stop once this many unique posts have been accumulated.
    pub target_posts: usize,
    /// Hard ceiling on load-more (scroll) triggers.
    pub max_cycles: u32,
    /// Stop after this many consecutive cycles with zero novel posts.
    pub max_stagnant_cycles: u32,
}

impl HarvestLimits {
    pub fn for_target(target_posts: usize) -> Self {
        Self {
            target_posts,
            ..Self::default()
        }
    }
}

impl Default for HarvestLimits {
    fn default() -> Self {
        Self {
            target_posts: 5,
            max_cycles: 40,
            max_stagnant_cycles: 3,
        }
    }
}

/// Why a harvest run stopped. All three conditions are simple disjuncts;
/// when several hold at once the first in this order is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    CycleLimit,
    Stagnation,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TargetReached => write!(f, "target post count reached"),
            StopReason::CycleLimit => write!(f, "scroll cycle limit reached"),
            StopReason::Stagnation => write!(f, "feed stopped yielding new posts"),
        }
    }
}

/// Run state definitions for the pagination driver
///
/// A run moves forward only: each page is fetched once, then either written
/// or recorded as failed, and the run advances, finishes or aborts.
use std::fmt;

/// Represents where the pagination driver currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    // ===== Start =====
    /// Nothing has been requested yet
    Idle,

    // ===== Per-page States =====
    /// The page with this index is being fetched
    Fetching(u32),

    /// Records of this page are being written to the sink
    Writing(u32),

    /// This page did not yield a record list
    Failed(u32),

    // ===== Terminal States =====
    /// Every planned page was visited (or the first page failed)
    Done,

    /// An unexpected error stopped the loop early
    Aborted,
}

impl RunState {
    /// Returns true if the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// The page index this state refers to, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Fetching(page) | Self::Writing(page) | Self::Failed(page) => Some(*page),
            Self::Idle | Self::Done | Self::Aborted => None,
        }
    }

    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// Page indices only grow, so a page is never fetched twice.
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        match (self, next) {
            (Self::Idle, Self::Fetching(_)) => true,
            (Self::Fetching(a), Self::Writing(b)) | (Self::Fetching(a), Self::Failed(b)) => a == b,
            (Self::Fetching(_), Self::Aborted) => true,
            (Self::Writing(a), Self::Fetching(b)) | (Self::Failed(a), Self::Fetching(b)) => b > a,
            (Self::Writing(_), Self::Done | Self::Aborted) => true,
            (Self::Failed(_), Self::Done | Self::Aborted) => true,
            _ => false,
        }
    }

    /// Short lowercase label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching(_) => "fetching",
            Self::Writing(_) => "writing",
            Self::Failed(_) => "failed",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page() {
            Some(page) => write!(f, "{}({})", self.label(), page),
            None => write!(f, "{}", self.label()),
        }
    }
}

//! Task state definitions for tracking crawl progress
//!
//! Every crawl task walks the same short state machine:
//!
//! ```text
//! Spawned -> DepthCheck -> { DepthExhausted | ClaimAttempt }
//! ClaimAttempt -> { AlreadyClaimed | Fetching }
//! Fetching -> { Failed | Fetched }
//! ```

use std::fmt;

/// Represents the current state of one crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task has been counted as outstanding and handed to the runtime
    Spawned,

    /// Task is checking its remaining depth
    DepthCheck,

    /// Task is trying to claim its address in the visited set
    ClaimAttempt,

    /// Task owns its address and is waiting on the fetcher
    Fetching,

    // ===== Terminal Drop States =====
    /// Remaining depth was zero; the visited set was never consulted
    DepthExhausted,

    /// Another task claimed the address first
    AlreadyClaimed,

    // ===== Terminal Result States =====
    /// Fetch failed; one error result was emitted
    Failed,

    /// Fetch succeeded; one result was emitted and children were spawned
    Fetched,
}

impl TaskState {
    /// Returns true if the task has reached the end of its state machine
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if the task may still do work
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Spawned | Self::DepthCheck | Self::ClaimAttempt | Self::Fetching
        )
    }

    /// Returns true if reaching this state emitted a result
    pub fn emits_result(&self) -> bool {
        matches!(self, Self::Failed | Self::Fetched)
    }

    /// Returns true if the task stopped without doing any fetch
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::DepthExhausted | Self::AlreadyClaimed)
    }

    /// Checks whether moving from `self` to `next` follows the state machine
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Spawned, Self::DepthCheck)
                | (Self::DepthCheck, Self::DepthExhausted)
                | (Self::DepthCheck, Self::ClaimAttempt)
                | (Self::ClaimAttempt, Self::AlreadyClaimed)
                | (Self::ClaimAttempt, Self::Fetching)
                | (Self::Fetching, Self::Failed)
                | (Self::Fetching, Self::Fetched)
        )
    }

    /// Stable lowercase name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spawned => "spawned",
            Self::DepthCheck => "depth_check",
            Self::ClaimAttempt => "claim_attempt",
            Self::Fetching => "fetching",
            Self::DepthExhausted => "depth_exhausted",
            Self::AlreadyClaimed => "already_claimed",
            Self::Failed => "failed",
            Self::Fetched => "fetched",
        }
    }

    /// Returns all terminal states
    pub fn terminal_states() -> [Self; 4] {
        [
            Self::DepthExhausted,
            Self::AlreadyClaimed,
            Self::Failed,
            Self::Fetched,
        ]
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        for state in TaskState::terminal_states() {
            assert!(state.is_terminal(), "{} should be terminal", state);
            assert!(!state.is_active());
        }

        assert!(TaskState::Spawned.is_active());
        assert!(TaskState::Fetching.is_active());
    }

    #[test]
    fn test_only_fetch_outcomes_emit_results() {
        assert!(TaskState::Failed.emits_result());
        assert!(TaskState::Fetched.emits_result());
        assert!(!TaskState::DepthExhausted.emits_result());
        assert!(!TaskState::AlreadyClaimed.emits_result());

        assert!(TaskState::DepthExhausted.is_dropped());
        assert!(TaskState::AlreadyClaimed.is_dropped());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(TaskState::Spawned.can_transition_to(TaskState::DepthCheck));
        assert!(TaskState::DepthCheck.can_transition_to(TaskState::DepthExhausted));
        assert!(TaskState::ClaimAttempt.can_transition_to(TaskState::Fetching));
        assert!(TaskState::Fetching.can_transition_to(TaskState::Fetched));
    }

    #[test]
    fn test_invalid_transitions() {
        // Depth is always checked before claiming
        assert!(!TaskState::Spawned.can_transition_to(TaskState::ClaimAttempt));
        // Losing the claim never leads to a fetch
        assert!(!TaskState::AlreadyClaimed.can_transition_to(TaskState::Fetching));
        // Terminal states are final
        assert!(!TaskState::Fetched.can_transition_to(TaskState::Fetching));
        assert!(!TaskState::Failed.can_transition_to(TaskState::Fetched));
    }

    #[test]
    fn test_display() {
        assert_eq!(TaskState::AlreadyClaimed.to_string(), "already_claimed");
    }
}

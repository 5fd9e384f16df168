//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitedSet`: The set of claimed addresses, with an atomic `claim`
//! - `TaskState`: The state machine each crawl task walks through

mod task_state;
mod visited;

// Re-export main types
pub use task_state::TaskState;
pub use visited::VisitedSet;

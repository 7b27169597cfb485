//! Agent-to-agent (A2A) task protocol: payload types and the HTTP client
//! used to hand a single task to one remote agent.

pub mod client;
pub mod types;

pub use client::{HttpTaskClient, TaskDispatch};
pub use types::{Task, TaskError, TaskOutcome, TaskPriority, TaskStatus};

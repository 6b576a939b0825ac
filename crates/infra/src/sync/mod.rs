//! Background synchronization agent

mod agent;
pub mod errors;

pub use agent::{AgentStatus, StartOutcome, SyncAgent, SyncAgentConfig};
pub use errors::{AgentError, AgentResult};

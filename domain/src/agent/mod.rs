//! Agent domain module
//!
//! Agents, their roles, capability inference and sub-agent specifications.

pub mod capabilities;
pub mod entities;
pub mod sub_agent;

pub use capabilities::infer_capabilities;
pub use entities::{Agent, AgentId, AgentType, Complexity};
pub use sub_agent::{SubAgentSpec, default_sub_agent_specs, parse_sub_agent_specs};

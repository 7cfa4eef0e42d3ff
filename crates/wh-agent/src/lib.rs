//! `wh-agent`: per-vehicle state machine and move negotiation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`state`]     | `AgentState`: closed lifecycle enumeration                   |
//! | [`agent`]     | `Agent<Z>`, `AgentParams`: assignment, loading, replanning   |
//! | [`world`]     | `WorldView`, `AgentSnapshot`: prior-tick snapshot + index    |
//! | [`negotiate`] | `Agent::negotiate`, `Decision`: the one-step move decision   |
//!
//! # Design notes
//!
//! Negotiation reads only the [`WorldView`] frozen at the end of the previous
//! tick and writes only the negotiating agent.  No agent observes another
//! agent's in-progress decision, so the negotiation pass can run in any
//! order (or in parallel) and the orchestrator arbitrates the resulting
//! proposals afterwards.

pub mod agent;
pub mod negotiate;
pub mod state;
pub mod world;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentParams};
pub use negotiate::Decision;
pub use state::AgentState;
pub use world::{AgentSnapshot, WorldView};

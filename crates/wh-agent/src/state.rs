//! Agent lifecycle states.

use std::fmt;

/// Where an agent is in its work cycle.
///
/// ```text
///            assign ok                 blocked
///   IDLE ───────────────▶ MOVE ◀──────────────▶ WAIT
///    ▲                     │ arrived (path empty)
///    │ countdown done      ▼
///    └──────────────── LOADING
///
///   IDLE at shed + empty queue ─▶ TERMINATED ─▶ IDLE (queue refilled)
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    /// No route in hand: waiting for a dispatch or a path.
    #[default]
    Idle,
    /// Following a path; proposed a move (or is about to).
    Move,
    /// Holding position this tick because the next cell is contested.
    Wait,
    /// Dwelling at a pallet or shed; carries the only countdown.
    Loading,
    /// Retired for lack of work; revived when the queue refills.
    Terminated,
}

impl AgentState {
    /// `true` for states that take part in per-tick negotiation.
    #[inline]
    pub fn negotiates(self) -> bool {
        !matches!(self, AgentState::Loading | AgentState::Terminated)
    }

    #[inline]
    pub fn is_terminated(self) -> bool {
        matches!(self, AgentState::Terminated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::Idle       => "IDLE",
            AgentState::Move       => "MOVE",
            AgentState::Wait       => "WAIT",
            AgentState::Loading    => "LOADING",
            AgentState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

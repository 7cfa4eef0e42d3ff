//! Read-only snapshot of the fleet at the end of the previous tick.

use rustc_hash::FxHashMap;

use wh_core::{AgentId, Position};

use crate::AgentState;

/// The parts of an agent other agents may observe.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id:     AgentId,
    pub pos:    Position,
    pub state:  AgentState,
    pub target: Option<Position>,
}

/// Frozen view of every agent's committed position, state, and target,
/// plus a position → agent index rebuilt once per tick.
///
/// The index turns blocker detection into one hash lookup instead of an
/// O(N) scan per agent.  Shed cells may hold several agents; the index keeps
/// the lowest id there, which is enough because sheds are exempt from
/// blocking.
pub struct WorldView<'a> {
    agents:    Vec<AgentSnapshot>,
    occupancy: FxHashMap<Position, AgentId>,
    sheds:     &'a [Position],
}

impl<'a> WorldView<'a> {
    /// Build from snapshots in ascending `AgentId` order.
    pub fn new(agents: Vec<AgentSnapshot>, sheds: &'a [Position]) -> Self {
        let mut occupancy =
            FxHashMap::with_capacity_and_hasher(agents.len(), Default::default());
        for a in &agents {
            occupancy.entry(a.pos).or_insert(a.id);
        }
        Self { agents, occupancy, sheds }
    }

    #[inline]
    pub fn get(&self, agent: AgentId) -> Option<&AgentSnapshot> {
        self.agents.get(agent.index())
    }

    #[inline]
    pub fn is_shed(&self, pos: Position) -> bool {
        self.sheds.contains(&pos)
    }

    /// Some agent standing on `pos`.
    #[inline]
    pub fn occupant(&self, pos: Position) -> Option<AgentId> {
        self.occupancy.get(&pos).copied()
    }

    /// `true` if an agent other than `me` stands on `pos`.
    pub fn is_occupied_by_other(&self, pos: Position, me: AgentId) -> bool {
        match self.occupancy.get(&pos) {
            None => false,
            Some(&id) if id != me => true,
            // `me` is indexed here; on a shed someone else may share the cell.
            Some(_) => self.agents.iter().any(|a| a.pos == pos && a.id != me),
        }
    }

    /// The agent that blocks `me` from entering `pos`, if any.  Shed cells
    /// never block.
    pub fn blocker_at(&self, pos: Position, me: AgentId) -> Option<&AgentSnapshot> {
        if self.is_shed(pos) {
            return None;
        }
        self.occupant(pos)
            .filter(|&id| id != me)
            .and_then(|id| self.get(id))
    }
}

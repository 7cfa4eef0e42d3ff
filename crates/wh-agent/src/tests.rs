//! Unit tests for wh-agent.

use std::collections::VecDeque;

use wh_core::{AgentId, Move, MoveSet, Position, Randomness};
use wh_grid::{GridGraph, GridGraphBuilder};

use crate::{Agent, AgentParams, AgentSnapshot, AgentState, Decision, WorldView};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Deterministic stand-in for the seeded RNG: a fixed patience budget and a
/// script of yield picks.
struct Scripted {
    patience: u32,
    picks:    VecDeque<usize>,
}

impl Scripted {
    fn patience(p: u32) -> Self {
        Self { patience: p, picks: VecDeque::new() }
    }
}

impl Randomness for Scripted {
    fn patience(&mut self, _min: u32, _max: u32) -> u32 {
        self.patience
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }
}

fn params() -> AgentParams {
    AgentParams { patience_min: 5, patience_max: 20, loading_ticks: 20 }
}

fn agent(id: u32, pos: (i32, i32), patience: u32) -> Agent<Scripted> {
    Agent::new(AgentId(id), pos.into(), params(), Scripted::patience(patience))
}

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

fn open_grid(w: i32, h: i32) -> GridGraph {
    let mut b = GridGraphBuilder::new();
    for y in 0..h {
        for x in 0..w {
            b.add_cell(p(x, y), MoveSet::ALL);
        }
    }
    b.build()
}

/// Horizontal two-way corridor `(0,0)..(len-1,0)` with no side cells.
fn corridor(len: i32) -> GridGraph {
    GridGraph::from_moves((0..len).map(|x| (p(x, 0), MoveSet::of(&[Move::Left, Move::Right]))))
}

fn snap(id: u32, pos: Position, state: AgentState, target: Option<Position>) -> AgentSnapshot {
    AgentSnapshot { id: AgentId(id), pos, state, target }
}

/// World with the negotiating agent at index 0 followed by `others`.
fn world_with<'a>(me: &Agent<Scripted>, others: &[AgentSnapshot], sheds: &'a [Position]) -> WorldView<'a> {
    let mut all = vec![me.snapshot()];
    all.extend_from_slice(others);
    WorldView::new(all, sheds)
}

// ── AgentState ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod state {
    use super::*;

    #[test]
    fn negotiating_states() {
        assert!(AgentState::Idle.negotiates());
        assert!(AgentState::Move.negotiates());
        assert!(AgentState::Wait.negotiates());
        assert!(!AgentState::Loading.negotiates());
        assert!(!AgentState::Terminated.negotiates());
    }

    #[test]
    fn display() {
        assert_eq!(AgentState::Loading.to_string(), "LOADING");
        assert_eq!(AgentState::default(), AgentState::Idle);
    }
}

// ── WorldView ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod world {
    use super::*;

    #[test]
    fn blocker_lookup_skips_self_and_sheds() {
        let sheds = [p(5, 5)];
        let world = WorldView::new(
            vec![
                snap(0, p(0, 0), AgentState::Move, None),
                snap(1, p(1, 0), AgentState::Idle, None),
                snap(2, p(5, 5), AgentState::Idle, None),
            ],
            &sheds,
        );
        assert_eq!(world.blocker_at(p(1, 0), AgentId(0)).map(|b| b.id), Some(AgentId(1)));
        assert!(world.blocker_at(p(0, 0), AgentId(0)).is_none());
        assert!(world.blocker_at(p(5, 5), AgentId(0)).is_none());
        assert!(world.blocker_at(p(2, 0), AgentId(0)).is_none());
    }

    #[test]
    fn shared_shed_occupancy() {
        let sheds = [p(5, 5)];
        let world = WorldView::new(
            vec![
                snap(0, p(5, 5), AgentState::Idle, None),
                snap(1, p(5, 5), AgentState::Idle, None),
            ],
            &sheds,
        );
        assert_eq!(world.occupant(p(5, 5)), Some(AgentId(0)));
        assert!(world.is_occupied_by_other(p(5, 5), AgentId(0)));
        assert!(world.is_occupied_by_other(p(5, 5), AgentId(1)));
        assert!(!world.is_occupied_by_other(p(4, 5), AgentId(1)));
    }
}

// ── Assignment and lifecycle ──────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn new_agent_is_idle_and_untargeted() {
        let a = agent(0, (1, 1), 7);
        assert_eq!(a.state, AgentState::Idle);
        assert!(a.is_unemployed());
        assert_eq!(a.max_patience, 7);
        assert_eq!(a.patience, 7);
    }

    #[test]
    fn assign_success() {
        let g = open_grid(4, 4);
        let mut a = agent(0, (0, 0), 9);
        a.task_complete = true;
        assert!(a.assign(p(3, 0), &g));
        assert_eq!(a.state, AgentState::Move);
        assert_eq!(a.target, Some(p(3, 0)));
        assert_eq!(a.path.len(), 4);
        assert!(!a.task_complete);
        assert_eq!(a.patience, 9);
    }

    #[test]
    fn assign_failure_keeps_target_but_no_path() {
        let g = corridor(3);
        let mut a = agent(0, (0, 0), 5);
        assert!(!a.assign(p(9, 9), &g));
        assert_eq!(a.state, AgentState::Idle);
        assert!(a.path.is_empty());
        assert_eq!(a.target, Some(p(9, 9)));
    }

    #[test]
    fn arrival_starts_loading_and_dwell_completes() {
        let g = corridor(3);
        let mut a = agent(0, (0, 0), 5);
        a.assign(p(1, 0), &g);
        let world = WorldView::new(vec![a.snapshot()], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Propose(p(1, 0)));
        assert!(!a.is_at_target());
        a.commit_move(p(1, 0));
        assert!(a.is_at_target());

        let world = WorldView::new(vec![a.snapshot()], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        assert_eq!(a.state, AgentState::Loading);
        assert_eq!(a.loading_timer, 20);

        for _ in 0..19 {
            assert!(!a.tick_loading());
            assert_eq!(a.state, AgentState::Loading);
        }
        assert!(a.tick_loading());
        assert_eq!(a.state, AgentState::Idle);
        assert!(a.task_complete);
        assert_eq!(a.loading_timer, 0);
    }

    #[test]
    fn completed_task_does_not_reload() {
        let g = corridor(3);
        let mut a = agent(0, (1, 0), 5);
        a.target = Some(p(1, 0));
        a.task_complete = true;
        let world = WorldView::new(vec![a.snapshot()], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        assert_eq!(a.state, AgentState::Idle);
    }

    #[test]
    fn loading_agent_does_not_negotiate() {
        let g = corridor(3);
        let mut a = agent(0, (1, 0), 5);
        a.state = AgentState::Loading;
        a.loading_timer = 4;
        let world = WorldView::new(vec![a.snapshot()], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        assert_eq!(a.loading_timer, 4);
    }

    #[test]
    fn untargeted_agent_stays_idle() {
        let g = corridor(3);
        let mut a = agent(0, (0, 0), 5);
        let world = WorldView::new(vec![a.snapshot()], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        assert_eq!(a.state, AgentState::Idle);
    }

    #[test]
    fn lost_path_replans_without_moving() {
        let g = corridor(5);
        let mut a = agent(0, (0, 0), 5);
        a.target = Some(p(4, 0));
        a.state = AgentState::Wait;
        let world = WorldView::new(vec![a.snapshot()], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        assert_eq!(a.state, AgentState::Move);
        assert_eq!(a.path.goal(), Some(p(4, 0)));
    }

    #[test]
    fn terminate_and_revive() {
        let mut a = agent(0, (0, 0), 5);
        assert!(!a.revive());
        a.path = vec![p(0, 0), p(1, 0)].into();
        a.terminate();
        assert_eq!(a.state, AgentState::Terminated);
        assert!(a.path.is_empty());
        assert!(a.revive());
        assert_eq!(a.state, AgentState::Idle);
        assert!(a.task_complete);
    }

    #[test]
    fn reset_restores_spawn() {
        let g = corridor(4);
        let mut a = agent(0, (0, 0), 5);
        a.assign(p(3, 0), &g);
        a.commit_move(p(1, 0));
        a.task_complete = true;
        a.reset();
        assert_eq!(a.pos, p(0, 0));
        assert!(a.is_unemployed());
        assert!(a.path.is_empty());
        assert!(!a.task_complete);
    }
}

// ── Negotiation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod negotiation {
    use super::*;

    #[test]
    fn free_cell_is_proposed_and_current_cell_dropped() {
        let g = open_grid(3, 1);
        let mut a = agent(0, (0, 0), 5);
        a.assign(p(2, 0), &g);
        assert_eq!(a.path.front(), Some(p(0, 0)));
        let world = world_with(&a, &[], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Propose(p(1, 0)));
        assert_eq!(a.path.front(), Some(p(1, 0)));
        assert_eq!(a.state, AgentState::Move);
    }

    #[test]
    fn patience_five_escalates_on_sixth_contested_tick() {
        // 3×3 open floor: the blocker sits in the middle of the row, so a
        // detour around it exists.
        let g = open_grid(3, 3);
        let mut a = agent(0, (0, 1), 5);
        a.assign(p(2, 1), &g);
        let blocker = snap(1, p(1, 1), AgentState::Idle, Some(p(0, 0)));

        for tick in 1..=5 {
            let world = world_with(&a, &[blocker], &[]);
            assert_eq!(a.negotiate(&world, &g), Decision::Stay);
            assert_eq!(a.state, AgentState::Wait, "tick {tick}");
            assert_eq!(a.patience, 5 - tick);
            assert_eq!(a.path.front(), Some(p(1, 1)), "still planning through the blocker");
        }

        let world = world_with(&a, &[blocker], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        assert_eq!(a.state, AgentState::Move);
        assert!(!a.path.contains(p(1, 1)));
        assert_eq!(a.path.goal(), Some(p(2, 1)));
        assert_eq!(a.patience, 5);
    }

    #[test]
    fn loading_blocker_triggers_immediate_replan() {
        let g = open_grid(3, 3);
        let mut a = agent(0, (0, 1), 20);
        a.assign(p(2, 1), &g);
        let blocker = snap(1, p(1, 1), AgentState::Loading, Some(p(1, 1)));
        let world = world_with(&a, &[blocker], &[]);

        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        assert_eq!(a.state, AgentState::Move);
        assert!(!a.path.contains(p(1, 1)));
        assert_eq!(a.patience, 20, "no patience spent");
    }

    #[test]
    fn loading_blocker_on_target_leaves_agent_waiting() {
        // The bay itself is occupied: no route avoids it, so the agent waits
        // next to it without spending patience.
        let g = corridor(3);
        let mut a = agent(0, (0, 0), 5);
        a.assign(p(1, 0), &g);
        let occupant = snap(1, p(1, 0), AgentState::Loading, Some(p(1, 0)));
        for _ in 0..10 {
            let world = world_with(&a, &[occupant], &[]);
            assert_eq!(a.negotiate(&world, &g), Decision::Stay);
            assert_eq!(a.state, AgentState::Wait);
            assert_eq!(a.pos, p(0, 0));
            assert_eq!(a.patience, 5);
        }
    }

    #[test]
    fn same_target_queues_without_replanning() {
        let g = open_grid(3, 3);
        let mut a = agent(0, (0, 1), 1);
        a.assign(p(2, 1), &g);
        let path_before = a.path.clone();
        let ahead = snap(1, p(1, 1), AgentState::Wait, Some(p(2, 1)));

        for _ in 0..25 {
            let world = world_with(&a, &[ahead], &[]);
            assert_eq!(a.negotiate(&world, &g), Decision::Stay);
            assert_eq!(a.state, AgentState::Wait);
            assert_eq!(a.patience, 1);
        }
        // Only the leading current-cell waypoint was consumed.
        assert_eq!(a.path.len(), path_before.len() - 1);
        assert!(a.path.contains(p(1, 1)));
    }

    #[test]
    fn shed_destination_never_blocks() {
        let g = corridor(3);
        let sheds = [p(1, 0)];
        let mut a = agent(0, (0, 0), 5);
        a.assign(p(1, 0), &g);
        let parked = snap(1, p(1, 0), AgentState::Idle, None);
        let world = world_with(&a, &[parked], &sheds);
        assert_eq!(a.negotiate(&world, &g), Decision::Propose(p(1, 0)));
    }

    /// Corridor `(0,0)..(4,0)` with a side pocket `(1,1)` below `(1,0)`.
    fn corridor_with_pocket() -> GridGraph {
        let mut b = GridGraphBuilder::new();
        for x in 0..5 {
            b.add_cell(p(x, 0), MoveSet::of(&[Move::Left, Move::Right]));
        }
        b.add_cell(p(1, 0), MoveSet::of(&[Move::Left, Move::Right, Move::Down]));
        b.add_cell(p(1, 1), MoveSet::of(&[Move::Up]));
        b.build()
    }

    #[test]
    fn exhausted_patience_without_detour_yields_to_side_cell() {
        let g = corridor_with_pocket();
        let mut a = agent(0, (1, 0), 0);
        a.assign(p(4, 0), &g);
        let blocker = snap(1, p(2, 0), AgentState::Idle, Some(p(0, 0)));
        let world = world_with(&a, &[blocker], &[]);

        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        // Candidates in Move::ALL order: Down (1,1), Left (0,0).  Pick 0.
        assert_eq!(a.state, AgentState::Move);
        assert_eq!(a.path.front(), Some(p(1, 1)));
        assert_eq!(a.path.len(), 1);
    }

    #[test]
    fn yield_pick_is_driven_by_randomness() {
        let g = corridor_with_pocket();
        let mut a = Agent::new(
            AgentId(0),
            p(1, 0),
            params(),
            Scripted { patience: 0, picks: VecDeque::from([1]) },
        );
        a.assign(p(4, 0), &g);
        let blocker = snap(1, p(2, 0), AgentState::Idle, None);
        let world = world_with(&a, &[blocker], &[]);
        a.negotiate(&world, &g);
        assert_eq!(a.path.front(), Some(p(0, 0)));
    }

    #[test]
    fn occupied_side_cell_is_not_a_yield_candidate() {
        let g = corridor_with_pocket();
        let mut a = agent(0, (1, 0), 0);
        a.assign(p(4, 0), &g);
        let ahead = snap(1, p(2, 0), AgentState::Idle, None);
        let in_pocket = snap(2, p(1, 1), AgentState::Idle, None);
        let world = world_with(&a, &[ahead, in_pocket], &[]);
        a.negotiate(&world, &g);
        assert_eq!(a.path.front(), Some(p(0, 0)));
    }

    #[test]
    fn occupied_shed_is_still_a_yield_candidate() {
        let g = corridor_with_pocket();
        let sheds = [p(1, 1)];
        let mut a = agent(0, (1, 0), 0);
        a.assign(p(4, 0), &g);
        let ahead = snap(1, p(2, 0), AgentState::Idle, None);
        let behind = snap(2, p(0, 0), AgentState::Idle, None);
        let on_shed = snap(3, p(1, 1), AgentState::Idle, None);
        let world = world_with(&a, &[ahead, behind, on_shed], &sheds);
        a.negotiate(&world, &g);
        assert_eq!(a.state, AgentState::Move);
        assert_eq!(a.path.front(), Some(p(1, 1)));
    }

    #[test]
    fn wedged_agent_waits_indefinitely() {
        // One-way corridor: nothing behind, nothing beside.
        let g = GridGraph::from_moves((0..4).map(|x| (p(x, 0), MoveSet::of(&[Move::Right]))));
        let mut a = agent(0, (1, 0), 0);
        a.assign(p(3, 0), &g);
        let blocker = snap(1, p(2, 0), AgentState::Idle, Some(p(0, 0)));

        for _ in 0..100 {
            let world = world_with(&a, &[blocker], &[]);
            assert_eq!(a.negotiate(&world, &g), Decision::Stay);
            assert_eq!(a.state, AgentState::Wait);
            assert_eq!(a.pos, p(1, 0));
            assert_eq!(a.path.front(), Some(p(2, 0)));
            assert_eq!(a.path.goal(), Some(p(3, 0)));
        }
    }

    #[test]
    fn blocker_leaving_releases_waiter() {
        let g = corridor(4);
        let mut a = agent(0, (0, 0), 5);
        a.assign(p(3, 0), &g);
        let blocker = snap(1, p(1, 0), AgentState::Idle, None);
        let world = world_with(&a, &[blocker], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Stay);
        assert_eq!(a.state, AgentState::Wait);

        let gone = snap(1, p(9, 9), AgentState::Idle, None);
        let world = world_with(&a, &[gone], &[]);
        assert_eq!(a.negotiate(&world, &g), Decision::Propose(p(1, 0)));
        assert_eq!(a.state, AgentState::Move);
    }
}

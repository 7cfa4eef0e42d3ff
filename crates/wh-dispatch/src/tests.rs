//! Unit tests for wh-dispatch.

use std::io::Cursor;

use wh_agent::{Agent, AgentParams, AgentState};
use wh_core::{AgentId, AgentRng, MoveSet, Position, SectorId, SimRng};
use wh_grid::{GridGraph, GridGraphBuilder, SectorLockManager, SectorPartition};

use crate::{
    load_tasks_csv, load_tasks_reader, DispatchError, DispatchSummary, Dispatcher, SelectionPolicy, TaskQueue,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

const SHED: Position = Position { x: 0, y: 3 };
const TASK_A: Position = Position { x: 4, y: 0 };
const TASK_B: Position = Position { x: 4, y: 2 };

/// Open 6×4 floor.  Sector 1 is the top-right pair of cells, sector 2 the
/// pair two rows below; the shed sits bottom-left outside both.
fn floor() -> (GridGraph, SectorPartition) {
    let mut b = GridGraphBuilder::new();
    for y in 0..4 {
        for x in 0..6 {
            b.add_cell(p(x, y), MoveSet::ALL);
        }
    }
    let g = b.build();
    let sectors = SectorPartition::new(
        &g,
        [
            (p(4, 0), SectorId(1)),
            (p(5, 0), SectorId(1)),
            (p(4, 2), SectorId(2)),
            (p(5, 2), SectorId(2)),
        ],
    )
    .unwrap();
    (g, sectors)
}

fn agent(id: u32, pos: Position) -> Agent {
    Agent::new(AgentId(id), pos, AgentParams::default(), AgentRng::new(7, AgentId(id)))
}

fn dispatcher(tasks: &[Position]) -> Dispatcher {
    Dispatcher::new(vec![SHED], tasks.iter().copied().collect())
}

// ── TaskQueue ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod task_queue {
    use super::*;

    #[test]
    fn priority_insert_goes_first() {
        let mut q: TaskQueue = vec![p(1, 1), p(2, 2)].into();
        q.push_front(p(9, 9));
        assert_eq!(q.get(0), Some(p(9, 9)));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn remove_shifts_later_tasks() {
        let mut q: TaskQueue = vec![p(1, 1), p(2, 2), p(3, 3)].into();
        assert_eq!(q.remove(1), Some(p(2, 2)));
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![p(1, 1), p(3, 3)]);
        assert_eq!(q.remove(5), None);
    }

    #[test]
    fn lookahead_is_bounded_by_length() {
        let q: TaskQueue = vec![p(1, 1), p(2, 2)].into();
        assert_eq!(q.lookahead(3).count(), 2);
        assert_eq!(q.lookahead(1).collect::<Vec<_>>(), vec![p(1, 1)]);
    }

    #[test]
    fn random_draws_only_from_pallets() {
        let pallets = [p(4, 2), p(5, 2), p(4, 3)];
        let q = TaskQueue::random(&pallets, 100, &mut SimRng::new(3));
        assert_eq!(q.len(), 100);
        assert!(q.iter().all(|t| pallets.contains(&t)));
    }

    #[test]
    fn random_is_reproducible() {
        let pallets = [p(4, 2), p(5, 2), p(4, 3), p(5, 3)];
        let a = TaskQueue::random(&pallets, 20, &mut SimRng::new(11));
        let b = TaskQueue::random(&pallets, 20, &mut SimRng::new(11));
        assert_eq!(a, b);
    }

    #[test]
    fn random_without_pallets_is_empty() {
        assert!(TaskQueue::random(&[], 10, &mut SimRng::new(0)).is_empty());
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod selection {
    use super::*;

    #[test]
    fn skips_task_in_locked_sector() {
        let (g, sectors) = floor();
        let mut locks = SectorLockManager::new();
        assert!(locks.acquire(AgentId(1), Some(SectorId(1))));

        let mut d = dispatcher(&[TASK_A, TASK_B]);
        let mut agents = vec![agent(0, SHED)];
        let summary = d.dispatch(&mut agents, &g, &sectors, &locks, None);

        assert_eq!(summary.assigned, 1);
        assert_eq!(agents[0].target, Some(TASK_B));
        assert_eq!(agents[0].state, AgentState::Move);
        assert_eq!(d.queue().iter().collect::<Vec<_>>(), vec![TASK_A]);
    }

    #[test]
    fn skips_task_targeted_by_another_agent() {
        let (g, sectors) = floor();
        let locks = SectorLockManager::new();
        let mut d = dispatcher(&[TASK_A, TASK_B]);

        let mut busy_one = agent(1, p(2, 0));
        busy_one.assign(p(5, 0), &g);
        let mut agents = vec![agent(0, SHED), busy_one];
        d.dispatch(&mut agents, &g, &sectors, &locks, None);

        assert_eq!(agents[0].target, Some(TASK_B));
        assert_eq!(agents[1].target, Some(p(5, 0)));
    }

    #[test]
    fn own_target_does_not_count_as_busy() {
        let (_, sectors) = floor();
        let mut me = agent(0, SHED);
        me.target = Some(p(5, 0));
        let busy = Dispatcher::busy_sectors(AgentId(0), &[me], &sectors, &SectorLockManager::new());
        assert!(busy.is_empty());
    }

    #[test]
    fn all_contested_falls_back_to_front() {
        let (g, sectors) = floor();
        let mut locks = SectorLockManager::new();
        locks.acquire(AgentId(1), Some(SectorId(1)));
        locks.acquire(AgentId(2), Some(SectorId(2)));

        let mut d = dispatcher(&[TASK_A, TASK_B]);
        let mut agents = vec![agent(0, SHED)];
        d.dispatch(&mut agents, &g, &sectors, &locks, None);
        assert_eq!(agents[0].target, Some(TASK_A));
    }

    #[test]
    fn unsectored_task_is_never_busy() {
        let (_, sectors) = floor();
        let mut locks = SectorLockManager::new();
        locks.acquire(AgentId(1), Some(SectorId(1)));
        let d = dispatcher(&[TASK_A, p(2, 1)]);
        let busy = Dispatcher::busy_sectors::<AgentRng>(AgentId(0), &[], &sectors, &locks);
        assert_eq!(d.select(&busy, &sectors, None), Some(1));
    }

    #[test]
    fn fifo_ignores_contention() {
        let (g, sectors) = floor();
        let mut locks = SectorLockManager::new();
        locks.acquire(AgentId(1), Some(SectorId(1)));

        let mut d = dispatcher(&[TASK_A, TASK_B]).with_policy(SelectionPolicy::Fifo);
        let mut agents = vec![agent(0, SHED)];
        d.dispatch(&mut agents, &g, &sectors, &locks, None);
        assert_eq!(agents[0].target, Some(TASK_A));
    }

    #[test]
    fn override_index_wins() {
        let (_, sectors) = floor();
        let busy = Default::default();
        let d = dispatcher(&[TASK_A, TASK_B, p(1, 1)]);
        assert_eq!(d.select(&busy, &sectors, Some(2)), Some(2));
        assert_eq!(d.select(&busy, &sectors, Some(3)), Some(0));
        assert_eq!(d.select(&busy, &sectors, Some(usize::MAX)), Some(0));
    }

    #[test]
    fn empty_queue_selects_nothing() {
        let (_, sectors) = floor();
        let d = dispatcher(&[]);
        assert_eq!(d.select(&Default::default(), &sectors, Some(0)), None);
    }
}

// ── Dispatch pass ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatch {
    use super::*;

    #[test]
    fn finished_agent_returns_to_nearest_shed() {
        let (g, sectors) = floor();
        let mut d = Dispatcher::new(vec![p(0, 3), p(5, 3)], vec![TASK_A].into());
        let mut a = agent(0, p(4, 2));
        a.target = Some(p(4, 2));
        a.task_complete = true;
        let mut agents = vec![a];

        let summary = d.dispatch(&mut agents, &g, &sectors, &SectorLockManager::new(), None);
        assert_eq!(summary, DispatchSummary { to_shed: 1, assigned: 0, terminated: 0 });
        assert_eq!(agents[0].target, Some(p(5, 3)));
        assert!(!agents[0].task_complete);
        assert_eq!(d.queue().len(), 1);
    }

    #[test]
    fn nearest_shed_tie_goes_to_first_listed() {
        let d = Dispatcher::new(vec![p(0, 0), p(4, 0)], TaskQueue::new());
        assert_eq!(d.nearest_shed(p(2, 0)), Some(p(0, 0)));
        assert_eq!(d.nearest_shed(p(3, 0)), Some(p(4, 0)));
    }

    #[test]
    fn unemployed_agent_away_from_shed_heads_home() {
        let (g, sectors) = floor();
        let mut d = dispatcher(&[TASK_A]);
        let mut agents = vec![agent(0, p(3, 1))];
        d.dispatch(&mut agents, &g, &sectors, &SectorLockManager::new(), None);
        assert_eq!(agents[0].target, Some(SHED));
        assert_eq!(agents[0].state, AgentState::Move);
    }

    #[test]
    fn empty_queue_at_shed_terminates() {
        let (g, sectors) = floor();
        let mut d = dispatcher(&[]);
        let mut a = agent(0, SHED);
        a.target = Some(SHED);
        a.task_complete = true;
        let mut agents = vec![a];

        let summary = d.dispatch(&mut agents, &g, &sectors, &SectorLockManager::new(), None);
        assert_eq!(summary.terminated, 1);
        assert_eq!(agents[0].state, AgentState::Terminated);
        assert_eq!(agents[0].target, None);
        assert!(agents[0].path.is_empty());
        assert!(!agents[0].task_complete);
    }

    #[test]
    fn busy_agents_are_left_alone() {
        let (g, sectors) = floor();
        let mut d = dispatcher(&[TASK_A]);

        let mut loading = agent(0, SHED);
        loading.state = AgentState::Loading;
        loading.loading_timer = 3;
        let mut moving = agent(1, p(2, 2));
        moving.assign(TASK_B, &g);
        let mut agents = vec![loading, moving];

        let summary = d.dispatch(&mut agents, &g, &sectors, &SectorLockManager::new(), None);
        assert_eq!(summary, DispatchSummary::default());
        assert_eq!(agents[0].state, AgentState::Loading);
        assert_eq!(agents[1].target, Some(TASK_B));
        assert_eq!(d.queue().len(), 1);
    }

    #[test]
    fn terminated_agent_revives_when_work_arrives() {
        let (g, sectors) = floor();
        let locks = SectorLockManager::new();
        let mut d = dispatcher(&[]);
        let mut agents = vec![agent(0, SHED)];
        d.dispatch(&mut agents, &g, &sectors, &locks, None);
        assert_eq!(agents[0].state, AgentState::Terminated);

        assert_eq!(d.revive_all(&mut agents), 0);
        d.insert_priority(TASK_B);
        assert_eq!(d.revive_all(&mut agents), 1);
        assert_eq!(agents[0].state, AgentState::Idle);
        assert!(agents[0].task_complete);

        d.dispatch(&mut agents, &g, &sectors, &locks, None);
        assert_eq!(agents[0].target, Some(TASK_B));
        assert!(d.queue().is_empty());
    }

    #[test]
    fn initial_dispatch_hands_out_front_tasks_in_id_order() {
        let (g, _) = floor();
        let mut d = dispatcher(&[TASK_A, TASK_B]);
        let mut agents = vec![agent(0, p(0, 0)), agent(1, p(1, 0)), agent(2, p(2, 0))];
        assert_eq!(d.initial_dispatch(&mut agents, &g), 2);
        assert_eq!(agents[0].target, Some(TASK_A));
        assert_eq!(agents[1].target, Some(TASK_B));
        assert!(agents[2].is_unemployed());
    }

    #[test]
    fn override_applies_to_every_assignment_in_the_pass() {
        let (g, sectors) = floor();
        let mut d = dispatcher(&[p(1, 0), p(2, 0), p(3, 0)]);
        let mut agents = vec![agent(0, SHED), agent(1, SHED)];
        d.dispatch(&mut agents, &g, &sectors, &SectorLockManager::new(), Some(1));
        assert_eq!(agents[0].target, Some(p(2, 0)));
        assert_eq!(agents[1].target, Some(p(3, 0)));
        assert_eq!(d.queue().iter().collect::<Vec<_>>(), vec![p(1, 0)]);
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use super::*;

    #[test]
    fn reads_rows_in_order() {
        let csv = "x,y\n4,2\n 17, 7\n4,2\n";
        let q = load_tasks_reader(Cursor::new(csv)).unwrap();
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![p(4, 2), p(17, 7), p(4, 2)]);
    }

    #[test]
    fn header_only_is_empty() {
        let q = load_tasks_reader(Cursor::new("x,y\n")).unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn bad_row_is_a_parse_error() {
        let err = load_tasks_reader(Cursor::new("x,y\n1,2\nthree,4\n")).unwrap_err();
        match err {
            DispatchError::Parse(msg) => assert!(msg.contains("row 2"), "{msg}"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("tasks.csv");
        std::fs::write(&path, "x,y\n3,1\n5,6\n").unwrap();
        let q = load_tasks_csv(&path).unwrap();
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![p(3, 1), p(5, 6)]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = load_tasks_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DispatchError::Io(_)), "{err:?}");
    }
}

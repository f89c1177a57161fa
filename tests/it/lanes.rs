//! Foreground state driving the background loader.

use std::sync::Arc;
use std::time::{Duration, Instant};

use csv_chart::data::loader::JobState;
use csv_chart::{Axis, ChartConfig, ChartEvent, ChartState};

use crate::helpers::CsvBuilder;

/// Poll until the current job reaches a terminal state.
fn poll_until_done(state: &mut ChartState, timeout: Duration) -> Vec<ChartEvent> {
    let start = Instant::now();
    let mut events = Vec::new();
    while start.elapsed() < timeout {
        events.extend(state.poll());
        if state.job().state.is_terminal() {
            break;
        }
        std::thread::yield_now();
    }
    events.extend(state.poll());
    events
}

fn terminal_count(events: &[ChartEvent]) -> usize {
    events
        .iter()
        .filter(|e| {
            matches!(
                e,
                ChartEvent::LoadCompleted(_) | ChartEvent::LoadCancelled | ChartEvent::LoadFailed(_)
            )
        })
        .count()
}

#[test]
fn polled_load_reports_progress_then_one_completion() {
    let file = CsvBuilder::numeric(4, 20_000).write();
    let mut state = ChartState::new(ChartConfig {
        max_points: 500,
        ..ChartConfig::default()
    });
    state.open(file.path()).unwrap();
    let catalog = state.columns.clone();
    state.selection.select_all(&catalog);
    state.start_load().unwrap();
    assert_eq!(state.job().state, JobState::Running);

    let events = poll_until_done(&mut state, Duration::from_secs(30));

    assert_eq!(terminal_count(&events), 1);
    assert!(matches!(events.last(), Some(ChartEvent::LoadCompleted(_))));
    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            ChartEvent::LoadProgress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last(), Some(&100));

    let store = state.store().unwrap();
    assert_eq!(store.stride(), 40);
    assert_eq!(store.len(), 4);
}

#[test]
fn selection_edits_do_not_reach_running_job() {
    let file = CsvBuilder::numeric(3, 5_000).write();
    let mut state = ChartState::default();
    state.open(file.path()).unwrap();
    state.selection.set(0, true);
    state.start_load().unwrap();

    // Edit the selection while the job may still be running.
    state.selection.set(1, true);
    state.selection.set(2, true);
    state.wait();

    let store = state.store().unwrap();
    assert_eq!(store.names(), vec!["c0"]);
}

#[test]
fn failed_or_cancelled_load_keeps_published_store() {
    let file = CsvBuilder::numeric(2, 1_000).write();
    let mut state = ChartState::default();
    state.open(file.path()).unwrap();
    state.selection.set(0, true);
    state.start_load().unwrap();
    state.wait();
    let before = state.store().unwrap();

    // The source disappears before the next load.
    let path = file.path().to_path_buf();
    drop(file);
    state.start_load().unwrap();
    let events = state.wait();

    assert!(matches!(events.last(), Some(ChartEvent::LoadFailed(_))));
    assert_eq!(state.job().state, JobState::Failed);
    assert!(state.job().error_message.is_some());
    assert!(Arc::ptr_eq(&before, &state.store().unwrap()));
    assert!(!path.exists());
}

#[test]
fn immediate_cancel_leaves_store_as_before() {
    let big = CsvBuilder::numeric(2, 300_000).write();
    let mut state = ChartState::default();
    state.open(big.path()).unwrap();
    state.selection.set(1, true);
    state.start_load().unwrap();
    state.cancel_load();
    let events = state.wait();

    assert_eq!(terminal_count(&events), 1);
    match events.last() {
        Some(ChartEvent::LoadCancelled) => {
            assert_eq!(state.job().state, JobState::Cancelled);
            assert!(state.store().is_none());
        }
        // The loader can win the race on a fast machine; then the store must
        // be the complete new snapshot.
        Some(ChartEvent::LoadCompleted(store)) => {
            assert!(Arc::ptr_eq(store, &state.store().unwrap()));
            assert_eq!(store.total_rows(), 300_000);
        }
        other => panic!("unexpected terminal event {other:?}"),
    }
}

#[test]
fn restarting_delivers_both_terminal_events() {
    let file = CsvBuilder::numeric(2, 100_000).write();
    let mut state = ChartState::default();
    state.open(file.path()).unwrap();
    state.selection.set(0, true);

    let first = state.start_load().unwrap();
    let second = state.start_load().unwrap();
    assert_ne!(first, second);
    assert_eq!(state.job().id, second);

    let events = state.wait();
    assert_eq!(terminal_count(&events), 2);
    assert_eq!(state.job().state, JobState::Completed);
    assert_eq!(state.store().unwrap().total_rows(), 100_000);
}

#[test]
fn axis_assignment_survives_reload() {
    let file = CsvBuilder::numeric(2, 100).write();
    let mut state = ChartState::default();
    state.open(file.path()).unwrap();
    state.selection.set(0, true);
    state.selection.set(1, true);
    state.assign_axis(1, Axis::Secondary);

    state.start_load().unwrap();
    state.wait();

    let store = state.store().unwrap();
    assert_eq!(store.get("c1").unwrap().axis, Axis::Secondary);
    assert!(state.axes().secondary_in_use());
    assert!(state.scales().secondary.is_some());
}

#[test]
fn axis_change_during_load_reaches_new_snapshot() {
    let file = CsvBuilder::numeric(2, 100_000).write();
    let mut state = ChartState::default();
    state.open(file.path()).unwrap();
    state.selection.set(0, true);
    state.selection.set(1, true);
    state.start_load().unwrap();

    // The running job was started with everything on the primary axis.
    state.assign_axis(1, Axis::Secondary);
    let events = state.wait();

    let Some(ChartEvent::LoadCompleted(completed)) = events.last() else {
        panic!("expected completion, got {events:?}");
    };
    let store = state.store().unwrap();
    assert!(Arc::ptr_eq(completed, &store));
    assert_eq!(store.get("c1").unwrap().axis, Axis::Secondary);
    assert_eq!(store.get("c0").unwrap().axis, Axis::Primary);
}

#[test]
fn pointer_query_uses_config_divisor() {
    let file = CsvBuilder::numeric(1, 300).write();
    let mut state = ChartState::new(ChartConfig {
        nearest_point_threshold_divisor: 299.0,
        debounce_interval_ms: 0,
        ..ChartConfig::default()
    });
    state.open(file.path()).unwrap();
    state.selection.set(0, true);
    state.start_load().unwrap();
    state.wait();

    // Visible x is 1..=300, so the radius is exactly 1.
    let now = Instant::now();
    let Some(ChartEvent::NearestPointResult(hits)) = state.pointer_moved(10.5, now) else {
        panic!("expected a result");
    };
    assert_eq!(hits[0].1.map(|p| p.x), Some(10.0));
    let Some(ChartEvent::NearestPointResult(hits)) = state.pointer_moved(301.0, now) else {
        panic!("expected a result");
    };
    assert_eq!(hits[0].1, None);
}

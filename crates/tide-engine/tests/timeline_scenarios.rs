//! End-to-end timeline scenarios against the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use pretty_assertions::assert_eq;
use tide_core::calendar::WeekStart;
use tide_core::clock::FixedClock;
use tide_core::entities::Task;
use tide_core::enums::TaskStatus;
use tide_core::patch::NewTask;
use tide_engine::memory::MemoryStore;
use tide_engine::window::TimelineWindow;
use tide_engine::TimelineEngine;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn stored_task(id: &str, status: TaskStatus, due: Option<&str>) -> Task {
    Task {
        id: id.into(),
        title: format!("task {id}"),
        description: None,
        group_id: None,
        created_by: None,
        status,
        due_date: due.map(date),
        due_time: None,
        original_due_date: due.map(date),
        completed_at: None,
        created_at: ts("2023-12-01T00:00:00Z"),
        updated_at: ts("2023-12-01T00:00:00Z"),
        deleted_at: None,
        assignees: Vec::new(),
    }
}

fn engine_on(today: &str, tasks: Vec<Task>) -> TimelineEngine<MemoryStore> {
    let clock = Arc::new(FixedClock::at_noon(date(today)));
    let store = MemoryStore::new(clock.clone());
    for task in tasks {
        store.insert(task);
    }
    TimelineEngine::new(Arc::new(store), clock)
}

#[tokio::test]
async fn old_overdue_task_surfaces_only_today() {
    let engine = engine_on(
        "2024-01-10",
        vec![stored_task("tsk-old", TaskStatus::Todo, Some("2024-01-01"))],
    );
    engine
        .refresh(TimelineWindow::new(date("2024-01-01"), date("2024-01-10")))
        .await;

    let range = engine.range(TimelineWindow::new(date("2024-01-01"), date("2024-01-10")));
    for (day, entries) in &range {
        if *day == date("2024-01-10") {
            assert_eq!(entries.len(), 1);
            assert!(entries[0].rollover.is_overdue);
            assert_eq!(entries[0].rollover.days_overdue, 9);
        } else {
            assert!(entries.is_empty(), "task leaked into {day}");
        }
    }
}

#[tokio::test]
async fn overdue_task_outside_the_window_is_still_loaded() {
    let engine = engine_on(
        "2024-01-10",
        vec![stored_task("tsk-ancient", TaskStatus::Todo, Some("2023-03-15"))],
    );
    engine
        .refresh(TimelineWindow::around(date("2024-01-10"), 7))
        .await;

    let today = engine.day(date("2024-01-10"));
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].task.id, "tsk-ancient");
}

#[tokio::test]
async fn unchecking_a_backlog_completion_schedules_it_today() {
    let mut done = stored_task("tsk-b", TaskStatus::Done, None);
    done.completed_at = Some(ts("2024-01-05T10:00:00Z"));
    let engine = engine_on("2024-01-06", vec![done]);
    engine
        .refresh(TimelineWindow::around(date("2024-01-06"), 7))
        .await;

    assert_eq!(engine.day(date("2024-01-05")).len(), 1);

    let reopened = engine.toggle_done("tsk-b").await.unwrap();
    assert_eq!(reopened.status, TaskStatus::Todo);
    assert_eq!(reopened.due_date, Some(date("2024-01-06")));
    assert_eq!(reopened.original_due_date, Some(date("2024-01-06")));
    assert_eq!(reopened.completed_at, None);

    assert!(engine.day(date("2024-01-05")).is_empty());
    assert_eq!(engine.day(date("2024-01-06")).len(), 1);
}

#[tokio::test]
async fn failed_write_leaves_collection_byte_for_byte_unchanged() {
    let engine = engine_on(
        "2024-01-10",
        vec![
            stored_task("tsk-1", TaskStatus::Todo, Some("2024-01-09")),
            stored_task("tsk-2", TaskStatus::Cancel, Some("2024-01-10")),
        ],
    );
    engine
        .refresh(TimelineWindow::around(date("2024-01-10"), 7))
        .await;
    let before = serde_json::to_string(&engine.tasks()).unwrap();

    engine.store().fail_writes(3);
    assert!(engine.toggle_done("tsk-1").await.is_err());
    assert!(engine.set_status("tsk-2", TaskStatus::Todo).await.is_err());
    assert!(engine.delete_task("tsk-1").await.is_err());

    let after = serde_json::to_string(&engine.tasks()).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn refreshing_twice_changes_nothing() {
    let engine = engine_on(
        "2024-01-10",
        vec![
            stored_task("tsk-1", TaskStatus::Todo, Some("2024-01-02")),
            stored_task("tsk-2", TaskStatus::Todo, Some("2024-01-12")),
        ],
    );
    let window = TimelineWindow::around(date("2024-01-10"), 7);
    engine.refresh(window).await;
    let once = engine.tasks();
    engine.refresh(window).await;
    assert_eq!(engine.tasks(), once);
}

#[tokio::test]
async fn week_view_has_seven_days_and_collapses_overdue() {
    let mut done = stored_task("tsk-done", TaskStatus::Done, Some("2024-01-02"));
    done.completed_at = Some(ts("2024-01-09T15:00:00Z"));
    let engine = engine_on(
        "2024-01-10",
        vec![
            stored_task("tsk-late", TaskStatus::Todo, Some("2024-01-08")),
            stored_task("tsk-fri", TaskStatus::Todo, Some("2024-01-12")),
            done,
        ],
    );
    engine
        .refresh(TimelineWindow::week_of(date("2024-01-10"), WeekStart::Monday))
        .await;

    let week = engine.week(date("2024-01-10"), WeekStart::Monday);
    assert_eq!(week.len(), 7);
    let ids = |d: &str| -> Vec<String> {
        week[&date(d)].iter().map(|e| e.task.id.clone()).collect()
    };
    assert_eq!(ids("2024-01-08"), Vec::<String>::new());
    assert_eq!(ids("2024-01-09"), vec!["tsk-done".to_string()]);
    assert_eq!(ids("2024-01-10"), vec!["tsk-late".to_string()]);
    assert_eq!(ids("2024-01-12"), vec!["tsk-fri".to_string()]);
}

#[tokio::test]
async fn completion_date_follows_local_offset() {
    let mut done = stored_task("tsk-late-night", TaskStatus::Done, None);
    done.completed_at = Some(ts("2024-01-05T23:30:00Z"));
    let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
    let clock = Arc::new(FixedClock::new(ts("2024-01-06T03:00:00Z"), seoul));
    let store = MemoryStore::new(clock.clone());
    store.insert(done);
    let engine = TimelineEngine::new(Arc::new(store), clock);

    engine
        .refresh(TimelineWindow::around(date("2024-01-06"), 1))
        .await;
    assert!(engine.day(date("2024-01-05")).is_empty());
    assert_eq!(engine.day(date("2024-01-06")).len(), 1);
}

#[tokio::test]
async fn created_task_lands_in_its_bucket() {
    let engine = engine_on("2024-01-10", Vec::new());
    let created = engine
        .create_task(NewTask::new("Pay rent").due(date("2024-01-11")))
        .await
        .unwrap();

    let tomorrow = engine.day(date("2024-01-11"));
    assert_eq!(tomorrow.len(), 1);
    assert_eq!(tomorrow[0].task.id, created.id);
    assert!(engine.backlog().is_empty());
}

//! Serde roundtrip and JsonSchema validation tests for entity types.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use schemars::schema_for;
use tide_core::entities::{Assignee, Task};
use tide_core::enums::TaskStatus;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

roundtrip_and_validate!(
    backlog_task_roundtrip,
    Task,
    Task {
        id: "tsk-a3f8b2c1".into(),
        title: "Sort receipts".into(),
        description: None,
        group_id: None,
        created_by: Some("usr-1".into()),
        status: TaskStatus::Todo,
        due_date: None,
        due_time: None,
        original_due_date: None,
        completed_at: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        deleted_at: None,
        assignees: Vec::new(),
    }
);

roundtrip_and_validate!(
    group_task_roundtrip,
    Task,
    Task {
        id: "tsk-0badf00d".into(),
        title: "Clean the kitchen".into(),
        description: Some("Before the guests arrive".into()),
        group_id: Some("grp-1".into()),
        created_by: Some("usr-1".into()),
        status: TaskStatus::Done,
        due_date: NaiveDate::from_ymd_opt(2024, 1, 4),
        due_time: NaiveTime::from_hms_opt(18, 30, 0),
        original_due_date: NaiveDate::from_ymd_opt(2024, 1, 2),
        completed_at: Some(Utc.with_ymd_and_hms(2024, 1, 4, 19, 0, 0).unwrap()),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 4, 19, 0, 0).unwrap(),
        deleted_at: None,
        assignees: vec![
            Assignee {
                user_id: "usr-1".into(),
                is_completed: true,
                completed_at: Some(Utc.with_ymd_and_hms(2024, 1, 4, 19, 0, 0).unwrap()),
            },
            Assignee::pending("usr-2"),
        ],
    }
);

roundtrip_and_validate!(assignee_roundtrip, Assignee, Assignee::pending("usr-9"));

#[test]
fn dates_serialize_as_plain_calendar_strings() {
    let task = Task {
        id: "tsk-1".into(),
        title: "t".into(),
        description: None,
        group_id: None,
        created_by: None,
        status: TaskStatus::Todo,
        due_date: NaiveDate::from_ymd_opt(2024, 1, 6),
        due_time: NaiveTime::from_hms_opt(7, 5, 0),
        original_due_date: NaiveDate::from_ymd_opt(2024, 1, 6),
        completed_at: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        deleted_at: None,
        assignees: Vec::new(),
    };
    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["due_date"], "2024-01-06");
    assert_eq!(json["due_time"], "07:05:00");
    assert_eq!(json["status"], "TODO");
}

#[test]
fn missing_assignees_default_to_empty() {
    let json = serde_json::json!({
        "id": "tsk-1",
        "title": "t",
        "description": null,
        "group_id": null,
        "created_by": null,
        "status": "CANCEL",
        "due_date": "2024-01-06",
        "due_time": null,
        "original_due_date": "2024-01-06",
        "completed_at": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "deleted_at": null
    });
    let task: Task = serde_json::from_value(json).unwrap();
    assert!(task.assignees.is_empty());
    assert_eq!(task.status, TaskStatus::Cancel);
}

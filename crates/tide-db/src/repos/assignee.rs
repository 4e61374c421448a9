//! Assignee rows. Order is stored in `position` and always read back in it.

use std::collections::HashMap;

use tide_core::entities::{Assignee, Task};

use crate::TaskDb;
use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, opt_value, parse_optional_datetime};

/// Replace the assignee rows of `task_id` with `assignees`, in order.
pub(crate) async fn write_assignees(
    conn: &libsql::Connection,
    task_id: &str,
    assignees: &[Assignee],
) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM task_assignees WHERE task_id = ?1", [task_id])
        .await?;
    for (position, assignee) in assignees.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| DatabaseError::InvalidState("too many assignees".into()))?;
        conn.execute(
            "INSERT INTO task_assignees (task_id, user_id, position, is_completed, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                task_id,
                assignee.user_id.as_str(),
                position,
                i64::from(assignee.is_completed),
                opt_value(assignee.completed_at.map(format_datetime))
            ],
        )
        .await?;
    }
    Ok(())
}

impl TaskDb {
    /// Fill `assignees` on every task in `tasks` with one query.
    pub(crate) async fn attach_assignees(&self, tasks: &mut [Task]) -> Result<(), DatabaseError> {
        if tasks.is_empty() {
            return Ok(());
        }
        let placeholders = (1..=tasks.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let params: Vec<libsql::Value> = tasks.iter().map(|t| t.id.clone().into()).collect();
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT task_id, user_id, is_completed, completed_at
                     FROM task_assignees
                     WHERE task_id IN ({placeholders})
                     ORDER BY task_id, position"
                ),
                libsql::params_from_iter(params),
            )
            .await?;

        let mut by_task: HashMap<String, Vec<Assignee>> = HashMap::new();
        while let Some(row) = rows.next().await? {
            let task_id: String = row.get(0)?;
            by_task.entry(task_id).or_default().push(Assignee {
                user_id: row.get(1)?,
                is_completed: row.get::<i64>(2)? != 0,
                completed_at: parse_optional_datetime(get_opt_string(&row, 3)?.as_deref())?,
            });
        }
        for task in tasks {
            if let Some(assignees) = by_task.remove(&task.id) {
                task.assignees = assignees;
            }
        }
        Ok(())
    }
}

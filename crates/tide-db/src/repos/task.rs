//! Task repository: range queries, create, patch, soft and hard delete.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};

use tide_core::entities::Task;
use tide_core::ids::PREFIX_TASK;
use tide_core::mutation::{apply_patch, build_task};
use tide_core::patch::{NewTask, TaskPatch};
use tide_core::transition;

use crate::TaskDb;
use crate::error::DatabaseError;
use crate::helpers::{
    format_date, format_datetime, format_time, get_opt_string, opt_value, parse_datetime,
    parse_enum, parse_optional_date, parse_optional_datetime, parse_optional_time,
};
use crate::repos::assignee::write_assignees;

const SELECT_COLS: &str = "id, title, description, group_id, created_by, status, due_date, \
     due_time, original_due_date, completed_at, created_at, updated_at, deleted_at";

const ORDER: &str = "ORDER BY due_date, due_time, created_at";

fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        group_id: get_opt_string(row, 3)?,
        created_by: get_opt_string(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        due_date: parse_optional_date(get_opt_string(row, 6)?.as_deref())?,
        due_time: parse_optional_time(get_opt_string(row, 7)?.as_deref())?,
        original_due_date: parse_optional_date(get_opt_string(row, 8)?.as_deref())?,
        completed_at: parse_optional_datetime(get_opt_string(row, 9)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
        deleted_at: parse_optional_datetime(get_opt_string(row, 12)?.as_deref())?,
        assignees: Vec::new(),
    })
}

/// Every column after `id`, in `SELECT_COLS` order, as stored text.
fn column_values(task: &Task) -> [(&'static str, Option<String>); 12] {
    [
        ("title", Some(task.title.clone())),
        ("description", task.description.clone()),
        ("group_id", task.group_id.clone()),
        ("created_by", task.created_by.clone()),
        ("status", Some(task.status.as_str().to_string())),
        ("due_date", task.due_date.map(format_date)),
        ("due_time", task.due_time.map(format_time)),
        ("original_due_date", task.original_due_date.map(format_date)),
        ("completed_at", task.completed_at.map(format_datetime)),
        ("created_at", Some(format_datetime(task.created_at))),
        ("updated_at", Some(format_datetime(task.updated_at))),
        ("deleted_at", task.deleted_at.map(format_datetime)),
    ]
}

fn invalid(error: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::InvalidState(error.to_string())
}

impl TaskDb {
    /// Stored timestamps have millisecond precision; so does everything
    /// this handle hands back.
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(3)
    }

    async fn query_tasks(
        &self,
        predicate: &str,
        params: Vec<libsql::Value>,
    ) -> Result<Vec<Task>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM tasks WHERE deleted_at IS NULL AND ({predicate}) {ORDER}"
        );
        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().await? {
            tasks.push(row_to_task(&row)?);
        }
        self.attach_assignees(&mut tasks).await?;
        Ok(tasks)
    }

    /// TODO tasks due on or before `as_of`.
    pub async fn list_active(&self, as_of: NaiveDate) -> Result<Vec<Task>, DatabaseError> {
        self.retrying(|| {
            self.query_tasks(
                "status = 'TODO' AND due_date IS NOT NULL AND due_date <= ?1",
                vec![format_date(as_of).into()],
            )
        })
        .await
    }

    /// Tasks of any status due within `[start, end]`.
    pub async fn list_due_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Task>, DatabaseError> {
        self.retrying(|| {
            self.query_tasks(
                "due_date >= ?1 AND due_date <= ?2",
                vec![format_date(start).into(), format_date(end).into()],
            )
        })
        .await
    }

    /// DONE tasks completed within `[start, end]`, dated or not.
    pub async fn list_completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, DatabaseError> {
        self.retrying(|| {
            self.query_tasks(
                "status = 'DONE' AND completed_at >= ?1 AND completed_at <= ?2",
                vec![format_datetime(start).into(), format_datetime(end).into()],
            )
        })
        .await
    }

    pub async fn list_backlog(&self) -> Result<Vec<Task>, DatabaseError> {
        self.retrying(|| self.query_tasks("due_date IS NULL", Vec::new()))
            .await
    }

    /// A live (not soft-deleted) task by id.
    ///
    /// # Errors
    ///
    /// `DatabaseError::NoResult` if the task does not exist or is deleted.
    pub async fn get_task(&self, id: &str) -> Result<Task, DatabaseError> {
        let mut tasks = self
            .retrying(|| self.query_tasks("id = ?1", vec![id.into()]))
            .await?;
        tasks.pop().ok_or(DatabaseError::NoResult)
    }

    /// Insert a new task with a fresh `tsk-` id.
    ///
    /// # Errors
    ///
    /// `DatabaseError::InvalidState` for invalid input.
    pub async fn insert_task(&self, input: &NewTask) -> Result<Task, DatabaseError> {
        input.validate().map_err(invalid)?;
        let id = self.generate_id(PREFIX_TASK).await?;
        let task = build_task(id, input, self.now());

        let mut params: Vec<libsql::Value> = vec![task.id.clone().into()];
        params.extend(column_values(&task).into_iter().map(|(_, v)| opt_value(v)));

        let tx = self.conn().transaction().await?;
        tx.execute(
            &format!(
                "INSERT INTO tasks ({SELECT_COLS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
            ),
            libsql::params_from_iter(params),
        )
        .await?;
        write_assignees(&tx, &task.id, &task.assignees).await?;
        tx.commit().await?;

        tracing::debug!(task_id = %task.id, "task inserted");
        Ok(task)
    }

    /// Apply `patch` with the shared mutation rules, writing only the
    /// columns that changed.
    ///
    /// # Errors
    ///
    /// `NoResult` if the task is missing; `InvalidState` for an invalid
    /// patch or an illegal status transition.
    pub async fn apply_update(&self, id: &str, patch: &TaskPatch) -> Result<Task, DatabaseError> {
        patch.validate().map_err(invalid)?;
        let current = self.get_task(id).await?;
        if let Some(target) = patch.status {
            if target != current.status {
                transition::validate(current.status, target).map_err(invalid)?;
            }
        }
        let next = apply_patch(&current, patch, self.now());

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut idx = 1usize;
        for ((column, before), (_, after)) in column_values(&current)
            .into_iter()
            .zip(column_values(&next))
        {
            if before != after {
                sets.push(format!("{column} = ?{idx}"));
                params.push(opt_value(after));
                idx += 1;
            }
        }
        params.push(id.into());
        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ?{idx} AND deleted_at IS NULL",
            sets.join(", ")
        );

        let tx = self.conn().transaction().await?;
        if !sets.is_empty() {
            tx.execute(&sql, libsql::params_from_iter(params)).await?;
        }
        if let Some(assignees) = &patch.assignees {
            write_assignees(&tx, id, assignees).await?;
        }
        tx.commit().await?;

        tracing::debug!(task_id = id, columns = sets.len(), "task updated");
        self.get_task(id).await
    }

    /// Mark a task deleted. It disappears from every read.
    ///
    /// # Errors
    ///
    /// `NoResult` if the task is missing or already deleted.
    pub async fn soft_delete(&self, id: &str) -> Result<(), DatabaseError> {
        let now = format_datetime(self.now());
        let changed = self
            .conn()
            .execute(
                "UPDATE tasks SET deleted_at = ?1, updated_at = ?1
                 WHERE id = ?2 AND deleted_at IS NULL",
                libsql::params![now.as_str(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        tracing::debug!(task_id = id, "task soft-deleted");
        Ok(())
    }

    /// Remove a task and its assignees permanently, deleted or not.
    ///
    /// # Errors
    ///
    /// `NoResult` if no such row exists.
    pub async fn purge_task(&self, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        tracing::debug!(task_id = id, "task purged");
        Ok(())
    }

    /// Number of stored rows, soft-deleted ones included.
    pub async fn count_rows(&self) -> Result<u64, DatabaseError> {
        let mut rows = self.conn().query("SELECT COUNT(*) FROM tasks", ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count).map_err(|e| DatabaseError::Query(e.to_string()))
    }
}

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create a task.
    Add(AddArgs),
    /// Mark a task done, or one assignee's share of it with --user.
    Done(TaskRef),
    /// Reopen a done task, or one assignee's share of it with --user.
    Undo(TaskRef),
    /// Cancel a task.
    Cancel { id: String },
    /// Bring a cancelled task back to TODO.
    Restore { id: String },
    /// Reschedule a task to another day.
    Move(MoveArgs),
    /// Move a task to the backlog (no due date).
    BacklogMove { id: String },
    /// Delete a task.
    Delete { id: String },
    /// Today's tasks, including everything overdue.
    Today,
    /// Tasks shown under one day.
    Day {
        /// `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday`, or `+N`/`-N` days.
        date: String,
    },
    /// The seven days of a week.
    Week {
        /// Any day of the week to show (same forms as `day`). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
    /// Tasks without a due date.
    Backlog,
    /// Print the effective configuration.
    Config,
}

#[derive(Clone, Debug, Args)]
pub struct AddArgs {
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Due day (same forms as `day`). Omit for the backlog.
    #[arg(long)]
    pub due: Option<String>,
    /// Due time, `HH:MM`.
    #[arg(long, requires = "due")]
    pub at: Option<String>,
    #[arg(long)]
    pub group: Option<String>,
    /// Assign to these users, in order.
    #[arg(long = "assign", value_delimiter = ',')]
    pub assignees: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct TaskRef {
    pub id: String,
    /// Toggle this assignee's completion instead of the task status.
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct MoveArgs {
    pub id: String,
    /// Target day (same forms as `day`).
    pub date: String,
    /// New due time, `HH:MM`.
    #[arg(long)]
    pub at: Option<String>,
}

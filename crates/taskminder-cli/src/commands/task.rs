//! Task management commands for CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;

use taskminder_core::task::due_date;
use taskminder_core::{
    DueFilter, NaivePolicy, NewTask, ScheduledSet, SchedulingOutcome, TaskEdit, TaskFilter,
    TaskListView, TaskRecord, TaskRow, TaskStatus, WriteBackReport,
};

use crate::app;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task and schedule its reminders
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: String,
        /// Due date (RFC 3339, or YYYY-MM-DDTHH:MM)
        #[arg(long)]
        due: String,
    },
    /// List tasks after reconciling their status
    List {
        /// Case-insensitive title search
        #[arg(long)]
        search: Option<String>,
        /// Filter by status (pending, done, failed)
        #[arg(long)]
        status: Option<String>,
        /// Filter by due date (overdue, upcoming)
        #[arg(long)]
        due: Option<String>,
        /// Number of pages to show
        #[arg(long, default_value = "1")]
        pages: usize,
    },
    /// Edit a task; resets it to pending and replaces its reminders
    Update {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New due date
        #[arg(long)]
        due: Option<String>,
    },
    /// Toggle a task between pending and done
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a task and cancel its reminders
    Delete {
        /// Task ID
        id: String,
    },
    /// Reconcile stored status with due dates
    Reconcile,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RowOutput {
    #[serde(flatten)]
    record: TaskRecord,
    checked: bool,
    locked: bool,
}

impl From<TaskRow> for RowOutput {
    fn from(row: TaskRow) -> Self {
        Self {
            record: TaskRecord::from(&row.task),
            checked: row.checked,
            locked: row.locked,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput {
    tasks: Vec<RowOutput>,
    total: usize,
    has_more: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReminderOutput {
    label: String,
    fire_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReminderFailureOutput {
    label: String,
    error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeOutput {
    task: TaskRecord,
    reminder_outcome: SchedulingOutcome,
    reminders: Vec<ReminderOutput>,
    reminder_failures: Vec<ReminderFailureOutput>,
}

impl ChangeOutput {
    fn new(task: TaskRecord, set: ScheduledSet) -> Self {
        Self {
            task,
            reminder_outcome: set.outcome,
            reminders: set
                .entries
                .into_iter()
                .map(|e| ReminderOutput {
                    label: e.label,
                    fire_at: e.fire_at,
                })
                .collect(),
            reminder_failures: set
                .failures
                .into_iter()
                .map(|f| ReminderFailureOutput {
                    label: f.label,
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

fn parse_due(input: &str, policy: NaivePolicy) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    Ok(due_date::parse(input, policy)?)
}

fn report_write_failures(report: &WriteBackReport) {
    for failure in &report.failures {
        eprintln!(
            "warning: could not save status {} for '{}': {}",
            failure.status, failure.id, failure.error
        );
    }
}

pub async fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let app = app::open().await?;
    let svc = &app.service;
    let policy = app.config.dates.naive_policy();
    let now = Utc::now();

    match action {
        TaskAction::Add {
            title,
            description,
            due,
        } => {
            let draft = NewTask::new(title, description, parse_due(&due, policy)?);
            let change = svc.add_task(draft, now).await?;
            let output = ChangeOutput::new(TaskRecord::from(&change.task), change.reminders);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        TaskAction::List {
            search,
            status,
            due,
            pages,
        } => {
            let filter = TaskFilter {
                search,
                status: status.as_deref().map(str::parse::<TaskStatus>).transpose()?,
                due: due.as_deref().map(str::parse::<DueFilter>).transpose()?,
            };

            let loaded = svc.load(now).await?;
            report_write_failures(&loaded.report);

            let mut view = TaskListView::new(loaded.reconciliation.resolved, app.config.list.page_size)
                .with_filter(filter);
            view.show_pages(pages);

            let output = ListOutput {
                total: view.total_matching(now),
                has_more: view.has_more(now),
                tasks: view.visible(now).into_iter().map(RowOutput::from).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        TaskAction::Update {
            id,
            title,
            description,
            due,
        } => {
            let edit = TaskEdit {
                title,
                description,
                due_date: due.as_deref().map(|d| parse_due(d, policy)).transpose()?,
            };
            let change = svc.update_task(&id, edit, now).await?;
            let output = ChangeOutput::new(TaskRecord::from(&change.task), change.reminders);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        TaskAction::Toggle { id } => {
            let loaded = svc.load(now).await?;
            report_write_failures(&loaded.report);

            let task = svc.toggle_complete(&id, loaded.tasks()).await?;
            println!("{}", serde_json::to_string_pretty(&TaskRecord::from(&task))?);
        }
        TaskAction::Delete { id } => {
            svc.delete_task(&id).await?;
            println!("Task deleted: {id}");
        }
        TaskAction::Reconcile => {
            let loaded = svc.load(now).await?;
            report_write_failures(&loaded.report);
            println!("{}", loaded.reconciliation.summary().message());
        }
    }
    Ok(())
}

use chrono::Utc;
use clap::Subcommand;

use taskminder_core::ValidationError;

use crate::app;

#[derive(Subcommand)]
pub enum RemindAction {
    /// List reminders waiting in the outbox
    List {
        /// Only reminders for this task
        #[arg(long)]
        task: Option<String>,
    },
    /// Show which reminders a task would get if scheduled now
    Plan {
        /// Task ID
        id: String,
    },
    /// Cancel every pending reminder for a task
    Cancel {
        /// Task ID
        id: String,
    },
}

pub async fn run(action: RemindAction) -> Result<(), Box<dyn std::error::Error>> {
    let app = app::open().await?;
    let reminders = app.service.reminders();

    match action {
        RemindAction::List { task } => {
            let entries: Vec<_> = reminders
                .port()
                .entries()
                .await?
                .into_iter()
                .filter(|e| task.as_deref().map_or(true, |id| e.payload.task_id == id))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        RemindAction::Plan { id } => {
            let now = Utc::now();
            let loaded = app.service.load(now).await?;
            let task = loaded
                .tasks()
                .iter()
                .find(|t| t.id == id)
                .ok_or(ValidationError::UnknownTask { id })?;
            println!("{}", serde_json::to_string_pretty(&reminders.plan(task, now))?);
        }
        RemindAction::Cancel { id } => {
            let removed = reminders.cancel(&id).await?;
            println!("Cancelled {removed} reminder(s) for {id}");
        }
    }
    Ok(())
}

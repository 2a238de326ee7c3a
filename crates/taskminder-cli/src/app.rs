//! Wires the configured adapters into a [`TaskService`].

use taskminder_core::{
    data_dir, Config, ReconciliationEngine, ReminderScheduler, TaskService,
};

use crate::file_store::JsonFileTaskStore;
use crate::outbox::FileOutbox;

pub type Service = TaskService<JsonFileTaskStore, FileOutbox>;

pub struct App {
    pub config: Config,
    pub service: Service,
}

/// Load the config and open the task file and reminder outbox in the data directory.
pub async fn open() -> Result<App, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let dir = data_dir()?;

    let store = JsonFileTaskStore::new(dir.join("tasks.json"), config.dates.naive_policy());
    let outbox = FileOutbox::new(dir.join("reminders.json"));
    let reminders = if config.reminders.enabled {
        ReminderScheduler::register(outbox).await
    } else {
        ReminderScheduler::disabled(outbox)
    };
    let engine = ReconciliationEngine::with_config(config.reconciliation.clone());

    tracing::debug!(data_dir = %dir.display(), "opened task store");
    Ok(App {
        service: TaskService::new(store, reminders).with_engine(engine),
        config,
    })
}

//! Task list view-model.
//!
//! A derived projection over the reconciled task set: search, status and
//! due-date filters plus "show more" pagination. Nothing here is persisted;
//! rebuild it whenever the task set is reloaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::task::{Task, TaskStatus};

/// Due-date filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DueFilter {
    /// Due at or before now
    Overdue,
    /// Due after now
    Upcoming,
}

impl FromStr for DueFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overdue" => Ok(DueFilter::Overdue),
            "upcoming" => Ok(DueFilter::Upcoming),
            other => Err(format!("unknown due filter '{other}': expected overdue or upcoming")),
        }
    }
}

/// Filters applied to the task list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub due: Option<DueFilter>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        if let Some(query) = self.search.as_deref() {
            if !task.title.to_lowercase().contains(&query.to_lowercase()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        match self.due {
            Some(DueFilter::Overdue) => task.is_overdue(now),
            Some(DueFilter::Upcoming) => !task.is_overdue(now),
            None => true,
        }
    }
}

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub task: Task,
    /// Completion checkbox ticked
    pub checked: bool,
    /// Completion toggle disabled (task failed)
    pub locked: bool,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            task: task.clone(),
            checked: task.status == TaskStatus::Done,
            locked: task.status == TaskStatus::Failed,
        }
    }
}

/// Filtered, paginated view over a task set.
#[derive(Debug, Clone)]
pub struct TaskListView {
    tasks: Vec<Task>,
    filter: TaskFilter,
    page_size: usize,
    visible_count: usize,
}

impl TaskListView {
    pub fn new(tasks: Vec<Task>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            tasks,
            filter: TaskFilter::default(),
            page_size,
            visible_count: page_size,
        }
    }

    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    /// Swap in a freshly reconciled task set, keeping filter and page.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// All tasks matching the filter, in task order.
    pub fn filtered(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| self.filter.matches(t, now))
            .collect()
    }

    pub fn total_matching(&self, now: DateTime<Utc>) -> usize {
        self.filtered(now).len()
    }

    /// The current page of rows.
    pub fn visible(&self, now: DateTime<Utc>) -> Vec<TaskRow> {
        self.filtered(now)
            .into_iter()
            .take(self.visible_count)
            .map(TaskRow::from)
            .collect()
    }

    pub fn has_more(&self, now: DateTime<Utc>) -> bool {
        self.visible_count < self.total_matching(now)
    }

    /// Reveal one more page.
    pub fn show_more(&mut self) {
        self.visible_count = self.visible_count.saturating_add(self.page_size);
    }

    /// Show the first `pages` pages at once. At least one page is always shown.
    pub fn show_pages(&mut self, pages: usize) {
        self.visible_count = self.page_size.saturating_mul(pages.max(1));
    }
}

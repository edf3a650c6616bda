//! TaskRegistry: concurrent task status lookup via DashMap.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::task::{Task, TaskRecord, TaskStatus};

/// Thread-safe record of every submitted task and where it stands.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: DashMap<String, TaskRecord>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` as queued and return its new id.
    pub fn register(&self, task: &Task) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.tasks.insert(
            id.clone(),
            TaskRecord {
                id: id.clone(),
                kind: task.kind().to_string(),
                campaign_id: task.campaign_id().map(str::to_string),
                status: TaskStatus::Queued,
                submitted_at: Utc::now(),
                finished_at: None,
            },
        );
        id
    }

    /// Snapshot of one task.
    pub fn get(&self, id: &str) -> Option<TaskRecord> {
        self.tasks.get(id).map(|r| r.clone())
    }

    pub fn status(&self, id: &str) -> Option<TaskStatus> {
        self.tasks.get(id).map(|r| r.status.clone())
    }

    pub fn mark_running(&self, id: &str, attempt: u32) {
        self.set(id, TaskStatus::Running { attempt });
    }

    pub fn mark_succeeded(&self, id: &str, summary: serde_json::Value) {
        self.set(id, TaskStatus::Succeeded { summary });
    }

    pub fn mark_failed(&self, id: &str, error: impl Into<String>, attempts: u32) {
        self.set(
            id,
            TaskStatus::Failed {
                error: error.into(),
                attempts,
            },
        );
    }

    /// Tasks for one campaign, oldest first.
    pub fn for_campaign(&self, campaign_id: &str) -> Vec<TaskRecord> {
        let mut records: Vec<TaskRecord> = self
            .tasks
            .iter()
            .filter(|r| r.campaign_id.as_deref() == Some(campaign_id))
            .map(|r| r.clone())
            .collect();
        records.sort_by_key(|r| r.submitted_at);
        records
    }

    /// Drop finished tasks that ended before `cutoff`. Returns the number removed.
    pub fn prune_finished(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.tasks.len();
        self.tasks
            .retain(|_, r| !matches!(r.finished_at, Some(at) if at < cutoff));
        before - self.tasks.len()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn set(&self, id: &str, status: TaskStatus) {
        if let Some(mut entry) = self.tasks.get_mut(id) {
            if status.is_terminal() {
                entry.finished_at = Some(Utc::now());
            }
            entry.status = status;
        }
    }
}

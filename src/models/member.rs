//! Family member record and request payloads.

use serde::{Deserialize, Serialize};

/// Points and completed tasks tracked for one family member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub name: String,
    pub points: i64,
    pub completed_tasks: Vec<String>,
    /// RFC 3339 timestamp of the last mutation; `None` for a record that was never stored.
    pub last_updated: Option<String>,
}

impl MemberRecord {
    /// A zero-value record: no points, no tasks, never stored.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            points: 0,
            completed_tasks: Vec::new(),
            last_updated: None,
        }
    }

    /// Append `task` unless the list already contains it.
    ///
    /// Returns `true` when the task was added.
    pub fn append_task_deduped(&mut self, task: &str) -> bool {
        if self.completed_tasks.iter().any(|t| t == task) {
            return false;
        }
        self.completed_tasks.push(task.to_string());
        true
    }

    /// Replace the whole task list. No deduplication, no merge with the previous list.
    pub fn replace_task_list(&mut self, tasks: Vec<String>) {
        self.completed_tasks = tasks;
    }
}

/// Request body for POST: add `points` and append one task.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncrementRequest {
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub task: Option<String>,
}

/// Request body for PUT: set `points` and replace the task list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub task: Option<TaskList>,
}

/// The `task` field of a PUT body: a single task name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TaskList {
    One(String),
    Many(Vec<String>),
}

impl TaskList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            TaskList::One(task) => vec![task],
            TaskList::Many(tasks) => tasks,
        }
    }
}

/// Response body for GET /leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<MemberRecord>,
}

/// Plain `{message}` response.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

//! Member service: create, read, increment, overwrite and delete member records.
//!
//! Every mutation loads the record, applies the change in memory and writes it
//! back inside one transaction.

use std::sync::Arc;

use chrono::Utc;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{IncrementRequest, MemberRecord, SetRequest};

/// Member operations over an injected repository handle.
#[derive(Clone)]
pub struct MemberService {
    repo: Arc<Repository>,
    persist_on_fetch: bool,
}

impl MemberService {
    pub fn new(repo: Arc<Repository>, persist_on_fetch: bool) -> Self {
        Self {
            repo,
            persist_on_fetch,
        }
    }

    /// Current state of a member.
    ///
    /// An unknown name yields a zero record. It is only stored when the service
    /// was built with `persist_on_fetch`.
    pub async fn fetch(&self, name: &str) -> Result<MemberRecord, AppError> {
        if !self.persist_on_fetch {
            return Ok(self
                .repo
                .get_member(name)
                .await?
                .unwrap_or_else(|| MemberRecord::empty(name)));
        }

        let mut tx = self.repo.begin().await?;
        if let Some(existing) = Repository::get_member_in(&mut tx, name).await? {
            return Ok(existing);
        }

        let mut record = MemberRecord::empty(name);
        record.last_updated = Some(now());
        Repository::upsert_member_in(&mut tx, &record).await?;
        tx.commit().await?;

        tracing::info!(member = %name, "Created member on first fetch");
        Ok(record)
    }

    /// Add points and append a task unless already completed.
    pub async fn increment(
        &self,
        name: &str,
        request: IncrementRequest,
    ) -> Result<MemberRecord, AppError> {
        let mut tx = self.repo.begin().await?;
        let existing = Repository::get_member_in(&mut tx, name).await?;
        let created = existing.is_none();

        let record = apply_increment(existing, name, &request, now())?;
        Repository::upsert_member_in(&mut tx, &record).await?;
        tx.commit().await?;

        tracing::info!(
            member = %name,
            delta = request.points,
            points = record.points,
            created,
            "Points added"
        );
        Ok(record)
    }

    /// Overwrite points and the whole task list.
    pub async fn set(&self, name: &str, request: SetRequest) -> Result<MemberRecord, AppError> {
        let mut tx = self.repo.begin().await?;
        let existing = Repository::get_member_in(&mut tx, name).await?;
        let created = existing.is_none();

        let record = apply_set(existing, name, request, now())?;
        Repository::upsert_member_in(&mut tx, &record).await?;
        tx.commit().await?;

        tracing::info!(
            member = %name,
            points = record.points,
            tasks = record.completed_tasks.len(),
            created,
            "Points set"
        );
        Ok(record)
    }

    /// Remove a member. Fails with `NotFound` if there is nothing to remove.
    pub async fn delete(&self, name: &str) -> Result<(), AppError> {
        if !self.repo.delete_member(name).await? {
            return Err(AppError::NotFound(format!("{} not found", name)));
        }
        tracing::info!(member = %name, "Member deleted");
        Ok(())
    }

    /// All members, highest points first.
    pub async fn leaderboard(&self) -> Result<Vec<MemberRecord>, AppError> {
        self.repo.leaderboard().await
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Apply a POST to the stored record, or to a fresh zero record if there is none.
pub fn apply_increment(
    existing: Option<MemberRecord>,
    name: &str,
    request: &IncrementRequest,
    timestamp: String,
) -> Result<MemberRecord, AppError> {
    if let Some(task) = &request.task {
        validate_task(task)?;
    }

    let mut record = existing.unwrap_or_else(|| MemberRecord::empty(name));
    record.points = record.points.checked_add(request.points).ok_or_else(|| {
        AppError::Validation(format!(
            "Adding {} points to {} would overflow",
            request.points, name
        ))
    })?;

    if let Some(task) = &request.task {
        if !record.append_task_deduped(task) {
            tracing::debug!(member = %name, task = %task, "Task already completed");
        }
    }

    record.last_updated = Some(timestamp);
    Ok(record)
}

/// Apply a PUT: points and task list are replaced, nothing is merged.
pub fn apply_set(
    existing: Option<MemberRecord>,
    name: &str,
    request: SetRequest,
    timestamp: String,
) -> Result<MemberRecord, AppError> {
    let tasks = request.task.map(|t| t.into_vec()).unwrap_or_default();
    for task in &tasks {
        validate_task(task)?;
    }

    let mut record = existing.unwrap_or_else(|| MemberRecord::empty(name));
    record.points = request.points;
    record.replace_task_list(tasks);
    record.last_updated = Some(timestamp);
    Ok(record)
}

fn validate_task(task: &str) -> Result<(), AppError> {
    if task.trim().is_empty() {
        return Err(AppError::Validation(
            "Task name must not be empty".to_string(),
        ));
    }
    Ok(())
}

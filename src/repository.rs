//! Async domain API over the storage engine. The repository is the only
//! component that speaks both domain objects and storage rows, and the only
//! one allowed to chain two row operations into one logical unit (the
//! skill-plus-progress create and delete). No caching: every read re-queries
//! the store.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task;
use tracing::{debug, warn};

use crate::db::{self, Store, StoreError};
use crate::models::{today_stamp, Progress, ProgressDraft, Skill, SkillDraft};

/// Repository bound to one store handle, injected at construction.
pub struct SkillRepository {
    store: Arc<Store>,
}

impl SkillRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Every skill currently in storage, in storage order.
    pub async fn list_skills(&self) -> Result<Vec<Skill>> {
        let store = Arc::clone(&self.store);
        let skills = task::spawn_blocking(move || store.with_conn(|conn| db::fetch_skills(conn)))
            .await
            .context("storage worker terminated")??;
        debug!(count = skills.len(), "listed skills");
        Ok(skills)
    }

    /// One skill by id; `None` when no row has it.
    pub async fn get_skill(&self, id: i64) -> Result<Option<Skill>> {
        let store = Arc::clone(&self.store);
        let skill =
            task::spawn_blocking(move || store.with_conn(|conn| db::get_skill_by_id(conn, id)))
                .await
                .context("storage worker terminated")??;
        Ok(skill)
    }

    /// The progress record belonging to a skill; `None` when the skill has
    /// none.
    pub async fn get_progress_for_skill(&self, skill_id: i64) -> Result<Option<Progress>> {
        let store = Arc::clone(&self.store);
        let progress = task::spawn_blocking(move || {
            store.with_conn(|conn| db::get_progress_by_skill_id(conn, skill_id))
        })
        .await
        .context("storage worker terminated")??;
        Ok(progress)
    }

    /// Create a skill together with its progress record and return the new
    /// skill id. The repository stamps `last_edit_date` with today and links
    /// the progress row to the freshly assigned id; both rows land in one
    /// transaction, so a failed skill insert leaves no progress behind.
    pub async fn create_skill(&self, skill: SkillDraft, progress: ProgressDraft) -> Result<i64> {
        let store = Arc::clone(&self.store);
        let date = today_stamp();
        let (skill_id, progress_id) = task::spawn_blocking(move || {
            store.with_conn(|conn| db::insert_skill_with_progress(conn, &skill, &progress, &date))
        })
        .await
        .context("storage worker terminated")?
        .context("failed to create skill with progress")?;
        debug!(skill_id, progress_id, "created skill with progress");
        Ok(skill_id)
    }

    /// Update a skill by id. Returns rows affected; 0 when the id is unknown
    /// or the write was rejected row-level.
    pub async fn update_skill(&self, skill: Skill) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let result =
            task::spawn_blocking(move || store.with_conn(|conn| db::update_skill(conn, &skill)))
                .await
                .context("storage worker terminated")?;
        rows_or_zero(result, "update skill")
    }

    /// Update a progress record by id. Same rows-affected contract as
    /// [`update_skill`](Self::update_skill).
    pub async fn update_progress(&self, progress: Progress) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let result = task::spawn_blocking(move || {
            store.with_conn(|conn| db::update_progress(conn, &progress))
        })
        .await
        .context("storage worker terminated")?;
        rows_or_zero(result, "update progress")
    }

    /// Delete a skill and the progress record that references it. Returns
    /// skill rows affected; deleting an unknown id affects 0 rows and is not
    /// an error.
    pub async fn delete_skill(&self, id: i64) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let result =
            task::spawn_blocking(move || store.with_conn(|conn| db::delete_skill_cascade(conn, id)))
                .await
                .context("storage worker terminated")?;
        rows_or_zero(result, "delete skill")
    }
}

/// Row-level rejections surface as zero rows affected; only engine-level
/// failures stay errors.
fn rows_or_zero(result: Result<usize, StoreError>, operation: &str) -> Result<usize> {
    match result {
        Ok(rows) => Ok(rows),
        Err(StoreError::Constraint(message)) => {
            warn!(operation, %message, "write rejected, reporting zero rows affected");
            Ok(0)
        }
        Err(err) => Err(err.into()),
    }
}

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::{ProgressDraft, Skill, SkillDraft};
use crate::repository::SkillRepository;

/// Observable state for the list screen: the full skill collection plus the
/// outcome flags of the last insert and delete. Every piece of state lives in
/// its own watch channel, so new subscribers replay the latest value and
/// "read current state" always sees the last completed write.
pub struct ListController {
    repository: Arc<SkillRepository>,
    skills: watch::Sender<Vec<Skill>>,
    last_insert: watch::Sender<Option<bool>>,
    last_delete: watch::Sender<Option<bool>>,
}

impl ListController {
    pub fn new(repository: Arc<SkillRepository>) -> Self {
        Self {
            repository,
            skills: watch::Sender::new(Vec::new()),
            last_insert: watch::Sender::new(None),
            last_delete: watch::Sender::new(None),
        }
    }

    /// Re-fetch the whole collection and replace the observed list wholesale.
    /// The list is never patched in place; what observers see is always the
    /// storage engine's last response.
    pub async fn refresh(&self) -> Result<()> {
        let skills = self.repository.list_skills().await?;
        debug!(count = skills.len(), "list refreshed");
        self.skills.send_replace(skills);
        Ok(())
    }

    /// Create a skill with its progress. The insert flag records whether a
    /// new id was produced; the list is refreshed afterward regardless of the
    /// outcome so it reflects truth even on failure.
    pub async fn create(&self, skill: SkillDraft, progress: ProgressDraft) {
        let inserted = match self.repository.create_skill(skill, progress).await {
            Ok(id) => {
                debug!(id, "skill created");
                true
            }
            Err(err) => {
                warn!(error = %err, "skill create failed");
                false
            }
        };
        self.last_insert.send_replace(Some(inserted));
        self.refresh_after_mutation().await;
    }

    /// Delete a skill by id. The delete flag records whether a row was
    /// actually removed; the list is refreshed afterward regardless.
    pub async fn delete(&self, id: i64) {
        let deleted = match self.repository.delete_skill(id).await {
            Ok(rows) => rows > 0,
            Err(err) => {
                warn!(id, error = %err, "skill delete failed");
                false
            }
        };
        self.last_delete.send_replace(Some(deleted));
        self.refresh_after_mutation().await;
    }

    /// Latest-value subscription to the skill collection.
    pub fn skills(&self) -> watch::Receiver<Vec<Skill>> {
        self.skills.subscribe()
    }

    /// Outcome of the most recent create; `None` until one has run.
    pub fn last_insert(&self) -> watch::Receiver<Option<bool>> {
        self.last_insert.subscribe()
    }

    /// Outcome of the most recent delete; `None` until one has run.
    pub fn last_delete(&self) -> watch::Receiver<Option<bool>> {
        self.last_delete.subscribe()
    }

    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "refresh after mutation failed");
        }
    }
}

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::models::{Progress, Skill};
use crate::repository::SkillRepository;

/// Observable state for the detail and editor screens: the current skill, its
/// progress record, and the outcome flag of the last update.
pub struct DetailController {
    repository: Arc<SkillRepository>,
    skill: watch::Sender<Option<Skill>>,
    progress: watch::Sender<Option<Progress>>,
    last_update: watch::Sender<Option<bool>>,
}

impl DetailController {
    pub fn new(repository: Arc<SkillRepository>) -> Self {
        Self {
            repository,
            skill: watch::Sender::new(None),
            progress: watch::Sender::new(None),
            last_update: watch::Sender::new(None),
        }
    }

    /// Fetch the skill by id, then its progress. A missing skill leaves the
    /// progress state untouched; the dependent fetch is skipped entirely.
    pub async fn load(&self, id: i64) {
        let skill = match self.repository.get_skill(id).await {
            Ok(skill) => skill,
            Err(err) => {
                warn!(id, error = %err, "skill load failed");
                return;
            }
        };
        let found = skill.is_some();
        self.skill.send_replace(skill);
        if found {
            self.reload_progress(id).await;
        }
    }

    /// Update the skill; the flag records whether a row was touched, and the
    /// skill (with its progress) is reloaded afterward regardless of outcome.
    pub async fn save_skill(&self, skill: Skill) {
        let id = skill.id;
        let updated = match self.repository.update_skill(skill).await {
            Ok(rows) => rows > 0,
            Err(err) => {
                warn!(id, error = %err, "skill update failed");
                false
            }
        };
        self.last_update.send_replace(Some(updated));
        self.load(id).await;
    }

    /// Update the progress record; the flag records whether a row was
    /// touched, and the progress is re-fetched by its skill id afterward.
    pub async fn save_progress(&self, progress: Progress) {
        let skill_id = progress.skill_id;
        let updated = match self.repository.update_progress(progress).await {
            Ok(rows) => rows > 0,
            Err(err) => {
                warn!(skill_id, error = %err, "progress update failed");
                false
            }
        };
        self.last_update.send_replace(Some(updated));
        self.reload_progress(skill_id).await;
    }

    /// Latest-value subscription to the loaded skill.
    pub fn skill(&self) -> watch::Receiver<Option<Skill>> {
        self.skill.subscribe()
    }

    /// Latest-value subscription to the loaded progress.
    pub fn progress(&self) -> watch::Receiver<Option<Progress>> {
        self.progress.subscribe()
    }

    /// Outcome of the most recent save; `None` until one has run.
    pub fn last_update(&self) -> watch::Receiver<Option<bool>> {
        self.last_update.subscribe()
    }

    async fn reload_progress(&self, skill_id: i64) {
        match self.repository.get_progress_for_skill(skill_id).await {
            Ok(progress) => {
                self.progress.send_replace(progress);
            }
            Err(err) => warn!(skill_id, error = %err, "progress load failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use crate::models::{ProgressDraft, SkillDraft, Status};

    async fn controller_with_skill() -> (DetailController, i64) {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let repository = Arc::new(SkillRepository::new(store));
        let id = repository
            .create_skill(
                SkillDraft {
                    name: "Rust".to_string(),
                    description: Some("Systems language".to_string()),
                },
                ProgressDraft::from_tracker(75, Some("notes".to_string())),
            )
            .await
            .unwrap();
        (DetailController::new(repository), id)
    }

    #[tokio::test]
    async fn load_populates_skill_and_progress() {
        let (controller, id) = controller_with_skill().await;
        controller.load(id).await;

        let skill = controller.skill().borrow().clone().unwrap();
        assert_eq!(skill.name, "Rust");
        let progress = controller.progress().borrow().clone().unwrap();
        assert_eq!(progress.skill_id, id);
        assert_eq!(progress.status, Status::Advanced);
    }

    #[tokio::test]
    async fn missing_skill_skips_the_progress_fetch() {
        let (controller, _) = controller_with_skill().await;
        controller.load(404).await;

        assert!(controller.skill().borrow().is_none());
        // progress state was never set, not cleared
        assert!(controller.progress().borrow().is_none());
    }

    #[tokio::test]
    async fn save_skill_flags_success_and_reloads() {
        let (controller, id) = controller_with_skill().await;
        controller.load(id).await;

        let mut skill = controller.skill().borrow().clone().unwrap();
        skill.name = "Rust 2024".to_string();
        controller.save_skill(skill).await;

        assert_eq!(*controller.last_update().borrow(), Some(true));
        assert_eq!(
            controller.skill().borrow().clone().unwrap().name,
            "Rust 2024"
        );
    }

    #[tokio::test]
    async fn save_against_missing_row_flags_failure() {
        let (controller, _) = controller_with_skill().await;
        controller
            .save_skill(Skill {
                id: 404,
                name: "Ghost".to_string(),
                description: None,
                last_edit_date: "2024-01-01".to_string(),
            })
            .await;
        assert_eq!(*controller.last_update().borrow(), Some(false));
    }

    #[tokio::test]
    async fn save_progress_reloads_the_stored_record() {
        let (controller, id) = controller_with_skill().await;
        controller.load(id).await;

        let mut progress = controller.progress().borrow().clone().unwrap();
        progress.tracker = 95;
        progress.status = Status::from_tracker(95);
        controller.save_progress(progress).await;

        assert_eq!(*controller.last_update().borrow(), Some(true));
        let reloaded = controller.progress().borrow().clone().unwrap();
        assert_eq!(reloaded.tracker, 95);
        assert_eq!(reloaded.status, Status::Expert);
    }
}

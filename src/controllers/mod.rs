//! Controllers translating user commands into repository calls and holding
//! the observable state the screens render from. State is replaced wholesale
//! after every mutation, never patched in place.

mod detail;
mod list;

pub use detail::DetailController;
pub use list::ListController;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::Store;
    use crate::models::{ProgressDraft, SkillDraft, Status};
    use crate::repository::SkillRepository;

    /// The full lifecycle a user walks through: create, inspect, delete,
    /// delete again.
    #[tokio::test]
    async fn create_inspect_delete_scenario() {
        let store = Arc::new(Store::open_in_memory().unwrap());
        let repository = Arc::new(SkillRepository::new(store));
        let list = ListController::new(Arc::clone(&repository));
        let detail = DetailController::new(Arc::clone(&repository));

        list.create(
            SkillDraft {
                name: "Rust".to_string(),
                description: Some("Systems language".to_string()),
            },
            ProgressDraft::from_tracker(75, None),
        )
        .await;
        assert_eq!(*list.last_insert().borrow(), Some(true));

        let skills = list.skills().borrow().clone();
        assert_eq!(skills.len(), 1);
        let id = skills[0].id;

        detail.load(id).await;
        let progress = detail.progress().borrow().clone().unwrap();
        assert_eq!(progress.status, Status::Advanced);

        list.delete(id).await;
        assert_eq!(*list.last_delete().borrow(), Some(true));
        assert!(list.skills().borrow().is_empty());

        list.delete(id).await;
        assert_eq!(*list.last_delete().borrow(), Some(false));
        assert!(list.skills().borrow().is_empty());
    }
}

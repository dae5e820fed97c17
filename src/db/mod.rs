//! Persistence module split across logical submodules: the connection/schema
//! handle plus one row-operation file per table.

mod connection;
mod progress;
mod skills;

pub use connection::{data_dir, default_db_path, ensure_schema, Store, StoreError};
pub use progress::{
    delete_progress_by_id, delete_progress_by_skill_id, fetch_progress_for_skill,
    get_progress_by_id, get_progress_by_skill_id, insert_progress, update_progress,
};
pub use skills::{
    delete_skill_by_id, delete_skill_cascade, fetch_skills, get_skill_by_id, insert_skill,
    insert_skill_with_progress, update_skill,
};

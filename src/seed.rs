//! Demo data for trying the application out on an empty database. Each entry
//! becomes one skill/progress pair linked through the composite insert.

use tracing::info;

use crate::db::{insert_skill_with_progress, Store, StoreError};
use crate::models::{ProgressDraft, SkillDraft};

/// Edit date stamped on every seeded row.
const SEED_DATE: &str = "2024-12-24";

/// (name, description, tracker, personal notes)
const SEED_ROWS: &[(&str, &str, i64, &str)] = &[
    (
        "Kotlin",
        "Modern programming language",
        20,
        "Still learning the basics",
    ),
    (
        "Java",
        "Popular object-oriented programming language",
        50,
        "Understand most concepts",
    ),
    (
        "Python",
        "Versatile programming language",
        80,
        "Able to create complex projects",
    ),
    (
        "C++",
        "High-performance programming language",
        100,
        "Master of the language",
    ),
    (
        "JavaScript",
        "Language for web development",
        30,
        "Working on simple programs",
    ),
    (
        "SQL",
        "Language for managing databases",
        60,
        "Learning frameworks and tools",
    ),
    (
        "Android Development",
        "Creating mobile apps for Android",
        90,
        "Building large-scale projects",
    ),
    (
        "iOS Development",
        "Creating mobile apps for iOS",
        100,
        "Fluent in multiple libraries and tools",
    ),
    (
        "Machine Learning",
        "Field of artificial intelligence",
        25,
        "Exploring algorithms and structures",
    ),
    (
        "Web Development",
        "Creating websites and web applications",
        50,
        "Focused on specific libraries",
    ),
];

/// Fill the skill and progress tables with the demo data set.
pub fn populate_database(store: &Store) -> Result<(), StoreError> {
    store.with_conn(|conn| {
        for (name, description, tracker, notes) in SEED_ROWS {
            let skill = SkillDraft {
                name: (*name).to_string(),
                description: Some((*description).to_string()),
            };
            let progress = ProgressDraft::from_tracker(*tracker, Some((*notes).to_string()));
            insert_skill_with_progress(conn, &skill, &progress, SEED_DATE)?;
        }
        Ok(())
    })?;
    info!(rows = SEED_ROWS.len(), "seeded demo data");
    Ok(())
}

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::models::{ProgressDraft, Skill, SkillDraft};

use super::connection::StoreError;
use super::progress;

fn skill_from_row(row: &Row<'_>) -> rusqlite::Result<Skill> {
    Ok(Skill {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        last_edit_date: row.get(3)?,
    })
}

/// Insert a skill row and return the engine-assigned id. Passing an explicit
/// id overwrites any row already holding it (REPLACE semantics, used by the
/// seed path); `None` lets SQLite pick the next unused value.
pub fn insert_skill(
    conn: &Connection,
    id: Option<i64>,
    draft: &SkillDraft,
    last_edit_date: &str,
) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO skill (id, name, description, lastEditDate)
         VALUES (?1, ?2, ?3, ?4)",
        params![id, draft.name, draft.description, last_edit_date],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, name = %draft.name, "inserted skill");
    Ok(id)
}

/// Update every editable field of a skill, matched by id. Returns the number
/// of rows touched: 0 when no row has that id, 1 otherwise.
pub fn update_skill(conn: &Connection, skill: &Skill) -> Result<usize, StoreError> {
    let updated = conn.execute(
        "UPDATE skill SET name = ?1, description = ?2, lastEditDate = ?3 WHERE id = ?4",
        params![skill.name, skill.description, skill.last_edit_date, skill.id],
    )?;
    debug!(id = skill.id, updated, "updated skill");
    Ok(updated)
}

/// Remove a skill row by id. Unknown ids affect zero rows and are not an
/// error.
pub fn delete_skill_by_id(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let deleted = conn.execute("DELETE FROM skill WHERE id = ?1", params![id])?;
    debug!(id, deleted, "deleted skill");
    Ok(deleted)
}

/// Retrieve every skill in storage order. Ordering for display is the sort
/// policy's job, not the query's.
pub fn fetch_skills(conn: &Connection) -> Result<Vec<Skill>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, name, description, lastEditDate FROM skill")?;
    let skills = stmt
        .query_map([], skill_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(skills)
}

/// Look up one skill by id; absent rows are `None`, never an error.
pub fn get_skill_by_id(conn: &Connection, id: i64) -> Result<Option<Skill>, StoreError> {
    let skill = conn
        .query_row(
            "SELECT id, name, description, lastEditDate FROM skill WHERE id = ?1",
            params![id],
            skill_from_row,
        )
        .optional()?;
    Ok(skill)
}

/// Insert a skill together with its progress row in one transaction. The
/// progress row is linked to the freshly assigned skill id, so no reader ever
/// observes a skill without progress.
pub fn insert_skill_with_progress(
    conn: &mut Connection,
    skill: &SkillDraft,
    progress_draft: &ProgressDraft,
    last_edit_date: &str,
) -> Result<(i64, i64), StoreError> {
    let tx = conn.transaction()?;
    let skill_id = insert_skill(&tx, None, skill, last_edit_date)?;
    let progress_id = progress::insert_progress(&tx, None, skill_id, progress_draft)?;
    tx.commit()?;
    Ok((skill_id, progress_id))
}

/// Delete a skill and the progress rows that reference it, in one
/// transaction. Returns the number of skill rows removed; unknown ids affect
/// zero rows without error.
pub fn delete_skill_cascade(conn: &mut Connection, id: i64) -> Result<usize, StoreError> {
    let tx = conn.transaction()?;
    let deleted = delete_skill_by_id(&tx, id)?;
    progress::delete_progress_by_skill_id(&tx, id)?;
    tx.commit()?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::super::connection::ensure_schema;
    use super::*;
    use crate::models::Status;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    fn draft(name: &str) -> SkillDraft {
        SkillDraft {
            name: name.to_string(),
            description: Some(format!("{name} description")),
        }
    }

    #[test]
    fn insert_and_fetch_round_trip() {
        let conn = test_conn();
        let id = insert_skill(&conn, None, &draft("Rust"), "2024-06-15").unwrap();
        let skill = get_skill_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(skill.name, "Rust");
        assert_eq!(skill.description.as_deref(), Some("Rust description"));
        assert_eq!(skill.last_edit_date, "2024-06-15");
    }

    #[test]
    fn explicit_id_replaces_existing_row() {
        let conn = test_conn();
        insert_skill(&conn, Some(7), &draft("Rust"), "2024-01-01").unwrap();
        insert_skill(&conn, Some(7), &draft("Zig"), "2024-02-02").unwrap();
        let skills = fetch_skills(&conn).unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].name, "Zig");
    }

    #[test]
    fn ids_are_unique_across_inserts() {
        let conn = test_conn();
        let first = insert_skill(&conn, None, &draft("Rust"), "2024-01-01").unwrap();
        let second = insert_skill(&conn, None, &draft("Go"), "2024-01-02").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn update_missing_row_affects_nothing() {
        let conn = test_conn();
        let rows = update_skill(
            &conn,
            &Skill {
                id: 99,
                name: "Ghost".to_string(),
                description: None,
                last_edit_date: "2024-01-01".to_string(),
            },
        )
        .unwrap();
        assert_eq!(rows, 0);
    }

    #[test]
    fn delete_missing_row_affects_nothing() {
        let conn = test_conn();
        assert_eq!(delete_skill_by_id(&conn, 99).unwrap(), 0);
    }

    #[test]
    fn absent_lookup_is_none() {
        let conn = test_conn();
        assert!(get_skill_by_id(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn composite_insert_links_progress_to_new_skill() {
        let mut conn = test_conn();
        let (skill_id, progress_id) = insert_skill_with_progress(
            &mut conn,
            &draft("Rust"),
            &ProgressDraft::from_tracker(75, Some("notes".to_string())),
            "2024-06-15",
        )
        .unwrap();
        let progress = progress::get_progress_by_id(&conn, progress_id)
            .unwrap()
            .unwrap();
        assert_eq!(progress.skill_id, skill_id);
        assert_eq!(progress.status, Status::Advanced);
        assert_eq!(progress.tracker, 75);
    }

    #[test]
    fn cascade_delete_removes_only_the_matching_progress() {
        let mut conn = test_conn();
        let (first_id, _) = insert_skill_with_progress(
            &mut conn,
            &draft("Rust"),
            &ProgressDraft::from_tracker(20, None),
            "2024-01-01",
        )
        .unwrap();
        let (second_id, _) = insert_skill_with_progress(
            &mut conn,
            &draft("Go"),
            &ProgressDraft::from_tracker(50, None),
            "2024-01-02",
        )
        .unwrap();

        assert_eq!(delete_skill_cascade(&mut conn, first_id).unwrap(), 1);
        assert!(get_progress_lookup(&conn, first_id).is_none());
        assert!(get_progress_lookup(&conn, second_id).is_some());
        // repeated delete of the same id is a no-op
        assert_eq!(delete_skill_cascade(&mut conn, first_id).unwrap(), 0);
    }

    fn get_progress_lookup(conn: &Connection, skill_id: i64) -> Option<crate::models::Progress> {
        progress::get_progress_by_skill_id(conn, skill_id).unwrap()
    }
}

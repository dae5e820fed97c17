use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::models::{Progress, ProgressDraft, Status};

use super::connection::StoreError;

fn progress_from_row(row: &Row<'_>) -> rusqlite::Result<Progress> {
    let label: String = row.get(2)?;
    Ok(Progress {
        id: row.get(0)?,
        skill_id: row.get(1)?,
        status: Status::from_label(&label),
        tracker: row.get(3)?,
        personal_notes: row.get(4)?,
    })
}

/// Insert a progress row linked to `skill_id` and return the engine-assigned
/// id. An explicit id overwrites any row already holding it (REPLACE
/// semantics, used by the seed path).
pub fn insert_progress(
    conn: &Connection,
    id: Option<i64>,
    skill_id: i64,
    draft: &ProgressDraft,
) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO progress (id, skillId, status, tracker, personalNotes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id,
            skill_id,
            draft.status.as_str(),
            draft.tracker,
            draft.personal_notes
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(id, skill_id, "inserted progress");
    Ok(id)
}

/// Update every editable field of a progress row, matched by id. Returns the
/// number of rows touched: 0 when no row has that id, 1 otherwise.
pub fn update_progress(conn: &Connection, progress: &Progress) -> Result<usize, StoreError> {
    let updated = conn.execute(
        "UPDATE progress SET skillId = ?1, status = ?2, tracker = ?3, personalNotes = ?4
         WHERE id = ?5",
        params![
            progress.skill_id,
            progress.status.as_str(),
            progress.tracker,
            progress.personal_notes,
            progress.id
        ],
    )?;
    debug!(id = progress.id, updated, "updated progress");
    Ok(updated)
}

/// Remove a progress row by id. Unknown ids affect zero rows and are not an
/// error.
pub fn delete_progress_by_id(conn: &Connection, id: i64) -> Result<usize, StoreError> {
    let deleted = conn.execute("DELETE FROM progress WHERE id = ?1", params![id])?;
    debug!(id, deleted, "deleted progress");
    Ok(deleted)
}

/// Remove the progress rows referencing a skill id. Invoked by the cascade
/// delete so a skill never leaves its progress orphaned behind.
pub fn delete_progress_by_skill_id(conn: &Connection, skill_id: i64) -> Result<usize, StoreError> {
    let deleted = conn.execute(
        "DELETE FROM progress WHERE skillId = ?1",
        params![skill_id],
    )?;
    debug!(skill_id, deleted, "deleted progress for skill");
    Ok(deleted)
}

/// First progress row referencing the given skill id; absent rows are `None`,
/// never an error. Each skill is meant to own exactly one row, but the query
/// tolerates duplicates by taking the first.
pub fn get_progress_by_skill_id(
    conn: &Connection,
    skill_id: i64,
) -> Result<Option<Progress>, StoreError> {
    let progress = conn
        .query_row(
            "SELECT id, skillId, status, tracker, personalNotes FROM progress
             WHERE skillId = ?1",
            params![skill_id],
            progress_from_row,
        )
        .optional()?;
    Ok(progress)
}

/// Every progress row referencing the given skill id, in storage order. The
/// provider's collection queries go through this; the single-row variant above
/// serves the repository.
pub fn fetch_progress_for_skill(
    conn: &Connection,
    skill_id: i64,
) -> Result<Vec<Progress>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, skillId, status, tracker, personalNotes FROM progress WHERE skillId = ?1",
    )?;
    let rows = stmt
        .query_map(params![skill_id], progress_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Look up one progress row by its own id.
pub fn get_progress_by_id(conn: &Connection, id: i64) -> Result<Option<Progress>, StoreError> {
    let progress = conn
        .query_row(
            "SELECT id, skillId, status, tracker, personalNotes FROM progress WHERE id = ?1",
            params![id],
            progress_from_row,
        )
        .optional()?;
    Ok(progress)
}

#[cfg(test)]
mod tests {
    use super::super::connection::ensure_schema;
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_and_lookup_by_skill_id() {
        let conn = test_conn();
        let id = insert_progress(
            &conn,
            None,
            3,
            &ProgressDraft::from_tracker(50, Some("halfway there".to_string())),
        )
        .unwrap();
        let progress = get_progress_by_skill_id(&conn, 3).unwrap().unwrap();
        assert_eq!(progress.id, id);
        assert_eq!(progress.skill_id, 3);
        assert_eq!(progress.status, Status::Intermediate);
        assert_eq!(progress.personal_notes.as_deref(), Some("halfway there"));
    }

    #[test]
    fn absent_lookups_are_none() {
        let conn = test_conn();
        assert!(get_progress_by_skill_id(&conn, 9).unwrap().is_none());
        assert!(get_progress_by_id(&conn, 9).unwrap().is_none());
    }

    #[test]
    fn unknown_stored_label_reads_as_unknown() {
        let conn = test_conn();
        conn.execute(
            "INSERT INTO progress (skillId, status, tracker, personalNotes)
             VALUES (1, 'Wizard', 55, NULL)",
            [],
        )
        .unwrap();
        let progress = get_progress_by_skill_id(&conn, 1).unwrap().unwrap();
        assert_eq!(progress.status, Status::Unknown);
    }

    #[test]
    fn update_is_idempotent() {
        let conn = test_conn();
        let id = insert_progress(&conn, None, 1, &ProgressDraft::from_tracker(20, None)).unwrap();
        let updated = Progress {
            id,
            skill_id: 1,
            status: Status::from_tracker(95),
            tracker: 95,
            personal_notes: Some("almost done".to_string()),
        };
        assert_eq!(update_progress(&conn, &updated).unwrap(), 1);
        assert_eq!(update_progress(&conn, &updated).unwrap(), 1);
        let stored = get_progress_by_id(&conn, id).unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn delete_by_skill_id_leaves_other_skills_alone() {
        let conn = test_conn();
        insert_progress(&conn, None, 1, &ProgressDraft::from_tracker(10, None)).unwrap();
        insert_progress(&conn, None, 2, &ProgressDraft::from_tracker(80, None)).unwrap();
        assert_eq!(delete_progress_by_skill_id(&conn, 1).unwrap(), 1);
        assert!(get_progress_by_skill_id(&conn, 1).unwrap().is_none());
        assert!(get_progress_by_skill_id(&conn, 2).unwrap().is_some());
    }
}

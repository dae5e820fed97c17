//! Domain models that mirror the SQLite schema and get passed throughout the
//! application. These types stay light-weight data holders so other layers can
//! focus on presentation and persistence logic.

use std::fmt;

use chrono::NaiveDate;

/// Fixed storage format for `last_edit_date` values. Every parse and format in
/// the crate goes through this one pattern so dates stay locale-free and
/// lexicographically stable.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A named item of knowledge or ability being tracked.
pub struct Skill {
    /// Primary key from the database. Edit/delete flows bubble the id back to
    /// the persistence layer.
    pub id: i64,
    /// User-facing display name. The editor rejects empty names before they
    /// reach storage; the storage engine itself does not enforce this.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Calendar date of the last create or edit, stored as `YYYY-MM-DD` text.
    pub last_edit_date: String,
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The single record describing completion percentage, qualitative status, and
/// notes for one [`Skill`].
pub struct Progress {
    /// Primary key from the SQLite store.
    pub id: i64,
    /// Soft reference to the owning skill's id. There is no database
    /// constraint behind it; the repository keeps the link consistent.
    pub skill_id: i64,
    /// Qualitative band derived from `tracker`, stored redundantly as text.
    pub status: Status,
    /// Progress percentage in `[0, 100]`.
    pub tracker: i64,
    /// Optional free-text notes.
    pub personal_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Editor output for a skill that does not have an engine-assigned id yet.
pub struct SkillDraft {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Editor output for a progress record headed into the create path. The owning
/// skill id is absent on purpose: the repository assigns it from the freshly
/// inserted skill row.
pub struct ProgressDraft {
    pub status: Status,
    pub tracker: i64,
    pub personal_notes: Option<String>,
}

impl ProgressDraft {
    /// Build a draft whose status band matches the tracker value. Both editor
    /// modes construct their progress through this so the stored label never
    /// drifts from the percentage.
    pub fn from_tracker(tracker: i64, personal_notes: Option<String>) -> Self {
        Self {
            status: Status::from_tracker(tracker),
            tracker,
            personal_notes,
        }
    }
}

/// Qualitative proficiency bands. `Unknown` doubles as the defensive bucket
/// for out-of-range trackers and unrecognized stored labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Unknown,
}

impl Status {
    /// Map a 0–100 tracker value into its band. Bands are inclusive on both
    /// ends and contiguous; anything outside `[0, 100]` is `Unknown`.
    pub fn from_tracker(tracker: i64) -> Self {
        match tracker {
            0..=30 => Status::Beginner,
            31..=60 => Status::Intermediate,
            61..=90 => Status::Advanced,
            91..=100 => Status::Expert,
            _ => Status::Unknown,
        }
    }

    /// The denormalized label written to the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Beginner => "Beginner",
            Status::Intermediate => "Intermediate",
            Status::Advanced => "Advanced",
            Status::Expert => "Expert",
            Status::Unknown => "Unknown",
        }
    }

    /// Parse a stored label back into a band. Labels the current code never
    /// wrote (hand-edited databases, older versions) fold into `Unknown`
    /// instead of failing the row read.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Beginner" => Status::Beginner,
            "Intermediate" => Status::Intermediate,
            "Advanced" => Status::Advanced,
            "Expert" => Status::Expert,
            _ => Status::Unknown,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Today's date in the fixed storage format, taken from the local clock.
pub fn today_stamp() -> String {
    chrono::Local::now()
        .date_naive()
        .format(DATE_FORMAT)
        .to_string()
}

/// Parse a stored date for ordering purposes. Malformed text maps to the
/// minimum representable date so sorting stays total and never panics.
pub fn parse_stored_date(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bands_cover_boundaries() {
        assert_eq!(Status::from_tracker(0), Status::Beginner);
        assert_eq!(Status::from_tracker(30), Status::Beginner);
        assert_eq!(Status::from_tracker(31), Status::Intermediate);
        assert_eq!(Status::from_tracker(60), Status::Intermediate);
        assert_eq!(Status::from_tracker(61), Status::Advanced);
        assert_eq!(Status::from_tracker(90), Status::Advanced);
        assert_eq!(Status::from_tracker(91), Status::Expert);
        assert_eq!(Status::from_tracker(100), Status::Expert);
    }

    #[test]
    fn status_bands_are_total_over_valid_range() {
        for tracker in 0..=100 {
            assert_ne!(Status::from_tracker(tracker), Status::Unknown);
        }
    }

    #[test]
    fn out_of_range_trackers_are_unknown() {
        assert_eq!(Status::from_tracker(-1), Status::Unknown);
        assert_eq!(Status::from_tracker(101), Status::Unknown);
    }

    #[test]
    fn labels_round_trip() {
        for status in [
            Status::Beginner,
            Status::Intermediate,
            Status::Advanced,
            Status::Expert,
            Status::Unknown,
        ] {
            assert_eq!(Status::from_label(status.as_str()), status);
        }
        assert_eq!(Status::from_label("Grandmaster"), Status::Unknown);
    }

    #[test]
    fn draft_derives_status_from_tracker() {
        let draft = ProgressDraft::from_tracker(75, None);
        assert_eq!(draft.status, Status::Advanced);
        assert_eq!(draft.tracker, 75);
    }

    #[test]
    fn malformed_dates_parse_to_sentinel() {
        assert_eq!(parse_stored_date("not a date"), NaiveDate::MIN);
        assert_eq!(
            parse_stored_date("2024-06-15"),
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
    }

    #[test]
    fn today_stamp_uses_fixed_format() {
        let stamp = today_stamp();
        assert!(NaiveDate::parse_from_str(&stamp, DATE_FORMAT).is_ok());
    }
}

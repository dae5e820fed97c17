//! Ordering policy for the list screen. Storage hands rows back in whatever
//! order it likes; this is the only ordering contract callers may rely on.

use std::cmp::Reverse;

use crate::models::{parse_stored_date, Skill};

/// Sort skills by their last-edit date according to the persisted preference.
/// The sort is stable, so equal dates keep their original relative order, and
/// malformed dates order as the minimum sentinel instead of panicking.
pub fn sort_skills(skills: &mut [Skill], newest_first: bool) {
    if newest_first {
        skills.sort_by_key(|skill| Reverse(parse_stored_date(&skill.last_edit_date)));
    } else {
        skills.sort_by_key(|skill| parse_stored_date(&skill.last_edit_date));
    }
}

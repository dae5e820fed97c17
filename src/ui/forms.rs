use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Progress, Skill};

/// Smallest and largest tracker values the slider can take.
const TRACKER_MIN: i64 = 0;
const TRACKER_MAX: i64 = 100;

/// Internal representation of the skill editor fields. The same form backs
/// create and edit mode; only the submit path differs.
#[derive(Clone)]
pub(crate) struct SkillForm {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) tracker: i64,
    pub(crate) notes: String,
    pub(crate) active: SkillField,
    pub(crate) error: Option<String>,
}

impl Default for SkillForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            tracker: TRACKER_MIN,
            notes: String::new(),
            active: SkillField::Name,
            error: None,
        }
    }
}

/// Fields available within the editor, in focus order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum SkillField {
    Name,
    Description,
    Tracker,
    Notes,
}

impl SkillForm {
    /// Populate the form from an existing skill/progress pair when entering
    /// edit mode. A missing progress record leaves the slider at zero.
    pub(crate) fn from_skill(skill: &Skill, progress: Option<&Progress>) -> Self {
        Self {
            name: skill.name.clone(),
            description: skill.description.clone().unwrap_or_default(),
            tracker: progress.map(|p| p.tracker).unwrap_or(TRACKER_MIN),
            notes: progress
                .and_then(|p| p.personal_notes.clone())
                .unwrap_or_default(),
            active: SkillField::Name,
            error: None,
        }
    }

    /// Cycle focus forward across the four fields.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            SkillField::Name => SkillField::Description,
            SkillField::Description => SkillField::Tracker,
            SkillField::Tracker => SkillField::Notes,
            SkillField::Notes => SkillField::Name,
        };
    }

    /// Cycle focus backward.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            SkillField::Name => SkillField::Notes,
            SkillField::Description => SkillField::Name,
            SkillField::Tracker => SkillField::Description,
            SkillField::Notes => SkillField::Tracker,
        };
    }

    /// Append a character to the active text field. The tracker is adjusted
    /// with arrow keys instead; typing into it is ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SkillField::Name => self.name.push(ch),
            SkillField::Description => self.description.push(ch),
            SkillField::Notes => self.notes.push(ch),
            SkillField::Tracker => return false,
        }
        true
    }

    /// Remove the last character from the active text field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            SkillField::Name => {
                self.name.pop();
            }
            SkillField::Description => {
                self.description.pop();
            }
            SkillField::Notes => {
                self.notes.pop();
            }
            SkillField::Tracker => {}
        }
    }

    /// Move the tracker slider, clamped to its valid range. Returns whether
    /// the value changed.
    pub(crate) fn adjust_tracker(&mut self, delta: i64) -> bool {
        let adjusted = (self.tracker + delta).clamp(TRACKER_MIN, TRACKER_MAX);
        if adjusted == self.tracker {
            false
        } else {
            self.tracker = adjusted;
            true
        }
    }

    /// Validate the inputs and return values ready for persistence: trimmed
    /// name, trimmed description, and notes (empty notes become `None`). Name
    /// and description must be filled; the tracker needs no check because the
    /// slider cannot leave its range.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, Option<String>)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Skill name is required."));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(anyhow!("Skill description is required."));
        }
        let notes = self.notes.trim();
        let notes = if notes.is_empty() {
            None
        } else {
            Some(notes.to_string())
        };
        Ok((name.to_string(), description.to_string(), notes))
    }

    /// Render a styled line for one text field of the modal form.
    pub(crate) fn build_line(&self, field_name: &str, field: SkillField) -> Line<'static> {
        let (value, placeholder) = match field {
            SkillField::Name => (self.name.clone(), "<required>"),
            SkillField::Description => (self.description.clone(), "<required>"),
            SkillField::Notes => (self.notes.clone(), "<optional>"),
            SkillField::Tracker => (self.tracker.to_string(), ""),
        };
        let is_active = self.active == field;

        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Character count of the requested text field, for cursor placement.
    pub(crate) fn value_len(&self, field: SkillField) -> usize {
        match field {
            SkillField::Name => self.name.chars().count(),
            SkillField::Description => self.description.chars().count(),
            SkillField::Notes => self.notes.chars().count(),
            SkillField::Tracker => 0,
        }
    }
}

/// State for the delete confirmation dialog on the list screen.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl ConfirmDelete {
    pub(crate) fn from(skill: &Skill) -> Self {
        Self {
            id: skill.id,
            name: skill.name.clone(),
        }
    }
}

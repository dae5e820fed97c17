use crate::models::{Progress, Skill};

/// Backing state for the list screen: the sorted skill collection plus the
/// current selection.
pub(crate) struct ListScreen {
    pub(crate) skills: Vec<Skill>,
    pub(crate) selected: usize,
}

impl ListScreen {
    pub(crate) fn new(skills: Vec<Skill>) -> Self {
        Self {
            skills,
            selected: 0,
        }
    }

    /// Replace the collection wholesale, keeping the selection in bounds.
    pub(crate) fn set_skills(&mut self, skills: Vec<Skill>) {
        self.skills = skills;
        self.ensure_in_bounds();
    }

    pub(crate) fn current_skill(&self) -> Option<&Skill> {
        self.skills.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.skills.is_empty() {
            return;
        }
        let len = self.skills.len() as isize;
        let mut new = self.selected as isize + offset;
        if new < 0 {
            new = 0;
        }
        if new >= len {
            new = len - 1;
        }
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        if !self.skills.is_empty() {
            self.selected = 0;
        }
    }

    pub(crate) fn select_last(&mut self) {
        if !self.skills.is_empty() {
            self.selected = self.skills.len() - 1;
        }
    }

    fn ensure_in_bounds(&mut self) {
        if self.skills.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.skills.len() {
            self.selected = self.skills.len() - 1;
        }
    }
}

/// Backing state for the read-only detail screen. The progress record may be
/// absent when the underlying data predates the composite create.
pub(crate) struct DetailScreen {
    pub(crate) skill: Skill,
    pub(crate) progress: Option<Progress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(count: i64) -> Vec<Skill> {
        (0..count)
            .map(|id| Skill {
                id,
                name: format!("skill-{id}"),
                description: None,
                last_edit_date: "2024-01-01".to_string(),
            })
            .collect()
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut screen = ListScreen::new(skills(3));
        screen.move_selection(-2);
        assert_eq!(screen.selected, 0);
        screen.move_selection(10);
        assert_eq!(screen.selected, 2);
        screen.select_first();
        assert_eq!(screen.selected, 0);
        screen.select_last();
        assert_eq!(screen.selected, 2);
    }

    #[test]
    fn replacing_the_collection_clamps_the_selection() {
        let mut screen = ListScreen::new(skills(5));
        screen.select_last();
        screen.set_skills(skills(2));
        assert_eq!(screen.selected, 1);
        screen.set_skills(Vec::new());
        assert_eq!(screen.selected, 0);
        assert!(screen.current_skill().is_none());
    }
}

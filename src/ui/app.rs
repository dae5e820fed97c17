use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tokio::runtime::Handle;

use crate::controllers::{DetailController, ListController};
use crate::models::{today_stamp, Progress, ProgressDraft, Skill, SkillDraft, Status};
use crate::prefs::Preferences;
use crate::sort::sort_skills;

use super::forms::{ConfirmDelete, SkillField, SkillForm};
use super::helpers::{centered_rect, surface_error, tracker_bar};
use super::screens::{DetailScreen, ListScreen};

/// Footer space reserved for status messages and key hints.
const FOOTER_HEIGHT: u16 = 3;
/// Character width of the tracker bar on the detail screen and in the editor.
const TRACKER_BAR_WIDTH: usize = 20;

/// High-level navigation states. The list collection itself lives on the App
/// because every screen returns to it.
enum Screen {
    List,
    Detail(DetailScreen),
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    Editing { target: EditorTarget, form: SkillForm },
    ConfirmDelete(ConfirmDelete),
}

/// Whether the editor creates a fresh skill or rewrites an existing pair.
enum EditorTarget {
    Create,
    Edit {
        skill: Skill,
        progress: Option<Progress>,
    },
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Commands block on the
/// controllers through the runtime handle; drawing reads the state snapshots
/// the controllers last published.
pub struct App {
    runtime: Handle,
    list_controller: ListController,
    detail_controller: DetailController,
    prefs: Preferences,
    data_dir: PathBuf,
    list: ListScreen,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    /// Build the app from already-constructed controllers. The list controller
    /// is expected to have run its initial refresh; the constructor pulls and
    /// sorts whatever it currently holds.
    pub fn new(
        runtime: Handle,
        list_controller: ListController,
        detail_controller: DetailController,
        prefs: Preferences,
        data_dir: PathBuf,
    ) -> Self {
        let mut skills = list_controller.skills().borrow().clone();
        sort_skills(&mut skills, prefs.newest_first);
        Self {
            runtime,
            list_controller,
            detail_controller,
            prefs,
            data_dir,
            list: ListScreen::new(skills),
            screen: Screen::List,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Editing { target, form } => self.handle_editor(code, target, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::List => self.handle_list_key(code, exit),
            Screen::Detail(_) => self.handle_detail_key(code),
        }
    }

    fn handle_list_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Up => self.list.move_selection(-1),
            KeyCode::Down => self.list.move_selection(1),
            KeyCode::PageUp => self.list.move_selection(-5),
            KeyCode::PageDown => self.list.move_selection(5),
            KeyCode::Home => self.list.select_first(),
            KeyCode::End => self.list.select_last(),
            KeyCode::Enter => {
                if let Some(id) = self.list.current_skill().map(|skill| skill.id) {
                    self.open_detail(id);
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Ok(Mode::Editing {
                    target: EditorTarget::Create,
                    form: SkillForm::default(),
                });
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(id) = self.list.current_skill().map(|skill| skill.id) {
                    return self.open_editor_for(id);
                }
                self.set_status("No skill selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if let Some(skill) = self.list.current_skill() {
                    return Ok(Mode::ConfirmDelete(ConfirmDelete::from(skill)));
                }
                self.set_status("No skill selected to delete.", StatusKind::Error);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.toggle_sort_mode()?,
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_detail_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.clear_status();
                self.screen = Screen::List;
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Screen::Detail(detail) = &self.screen {
                    let id = detail.skill.id;
                    return self.open_editor_for(id);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_editor(
        &mut self,
        code: KeyCode,
        target: EditorTarget,
        mut form: SkillForm,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Left => {
                if form.active == SkillField::Tracker {
                    form.adjust_tracker(-1);
                }
            }
            KeyCode::Right => {
                if form.active == SkillField::Tracker {
                    form.adjust_tracker(1);
                }
            }
            KeyCode::PageDown => {
                if form.active == SkillField::Tracker {
                    form.adjust_tracker(-10);
                }
            }
            KeyCode::PageUp => {
                if form.active == SkillField::Tracker {
                    form.adjust_tracker(10);
                }
            }
            KeyCode::Enter => return self.submit_editor(target, form),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::Editing { target, form })
    }

    fn submit_editor(&mut self, target: EditorTarget, mut form: SkillForm) -> Result<Mode> {
        let (name, description, notes) = match form.parse_inputs() {
            Ok(values) => values,
            Err(err) => {
                form.error = Some(surface_error(&err));
                return Ok(Mode::Editing { target, form });
            }
        };

        match target {
            EditorTarget::Create => {
                let draft = SkillDraft {
                    name: name.clone(),
                    description: Some(description),
                };
                let progress = ProgressDraft::from_tracker(form.tracker, notes);
                self.runtime
                    .block_on(self.list_controller.create(draft, progress));
                let inserted = *self.list_controller.last_insert().borrow();
                self.refresh_list_state();
                if inserted == Some(true) {
                    self.set_status(format!("Added {name}."), StatusKind::Info);
                    Ok(Mode::Normal)
                } else {
                    form.error = Some("Could not add the skill.".to_string());
                    Ok(Mode::Editing {
                        target: EditorTarget::Create,
                        form,
                    })
                }
            }
            EditorTarget::Edit { skill, progress } => {
                let updated_skill = Skill {
                    id: skill.id,
                    name: name.clone(),
                    description: Some(description),
                    last_edit_date: today_stamp(),
                };
                self.runtime
                    .block_on(self.detail_controller.save_skill(updated_skill));
                let mut saved = *self.detail_controller.last_update().borrow() == Some(true);

                if let Some(existing) = &progress {
                    let updated_progress = Progress {
                        id: existing.id,
                        skill_id: skill.id,
                        status: Status::from_tracker(form.tracker),
                        tracker: form.tracker,
                        personal_notes: notes,
                    };
                    self.runtime
                        .block_on(self.detail_controller.save_progress(updated_progress));
                    saved = saved && *self.detail_controller.last_update().borrow() == Some(true);
                }

                self.reload_list()?;
                if saved {
                    self.sync_detail_screen();
                    self.set_status(format!("Updated {name}."), StatusKind::Info);
                    Ok(Mode::Normal)
                } else {
                    form.error = Some("Could not update the skill.".to_string());
                    Ok(Mode::Editing {
                        target: EditorTarget::Edit { skill, progress },
                        form,
                    })
                }
            }
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.runtime.block_on(self.list_controller.delete(confirm.id));
                let deleted = *self.list_controller.last_delete().borrow() == Some(true);
                self.refresh_list_state();
                if deleted {
                    self.set_status(format!("Deleted {}.", confirm.name), StatusKind::Info);
                } else {
                    self.set_status("Could not delete the skill.", StatusKind::Error);
                }
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Delete cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Load a skill into the detail controller and switch to the detail
    /// screen. A vanished skill surfaces as a footer error instead.
    fn open_detail(&mut self, id: i64) {
        self.runtime.block_on(self.detail_controller.load(id));
        let skill = self.detail_controller.skill().borrow().clone();
        match skill {
            Some(skill) => {
                let progress = self.detail_controller.progress().borrow().clone();
                self.clear_status();
                self.screen = Screen::Detail(DetailScreen { skill, progress });
            }
            None => self.set_status("Skill no longer exists.", StatusKind::Error),
        }
    }

    /// Load the freshest skill/progress pair and open the editor over it.
    fn open_editor_for(&mut self, id: i64) -> Result<Mode> {
        self.runtime.block_on(self.detail_controller.load(id));
        let skill = self.detail_controller.skill().borrow().clone();
        match skill {
            Some(skill) => {
                let progress = self.detail_controller.progress().borrow().clone();
                self.clear_status();
                let form = SkillForm::from_skill(&skill, progress.as_ref());
                Ok(Mode::Editing {
                    target: EditorTarget::Edit { skill, progress },
                    form,
                })
            }
            None => {
                self.set_status("Skill no longer exists.", StatusKind::Error);
                self.reload_list()?;
                Ok(Mode::Normal)
            }
        }
    }

    /// Flip the persisted sort preference and re-order the visible list.
    fn toggle_sort_mode(&mut self) -> Result<()> {
        let newest_first = self.prefs.toggle_newest_first(&self.data_dir)?;
        sort_skills(&mut self.list.skills, newest_first);
        let message = if newest_first {
            "Sorting newest first."
        } else {
            "Sorting oldest first."
        };
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    /// Re-query storage through the list controller, then pull the result.
    fn reload_list(&mut self) -> Result<()> {
        self.runtime.block_on(self.list_controller.refresh())?;
        self.refresh_list_state();
        Ok(())
    }

    /// Pull the list controller's latest collection and sort it for display.
    fn refresh_list_state(&mut self) {
        let mut skills = self.list_controller.skills().borrow().clone();
        sort_skills(&mut skills, self.prefs.newest_first);
        self.list.set_skills(skills);
    }

    /// Refresh an open detail screen from the detail controller's state.
    fn sync_detail_screen(&mut self) {
        let skill = self.detail_controller.skill().borrow().clone();
        let progress = self.detail_controller.progress().borrow().clone();
        if let Screen::Detail(detail) = &mut self.screen {
            if let Some(skill) = skill {
                detail.skill = skill;
            }
            detail.progress = progress;
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
            .split(frame.area());

        match &self.screen {
            Screen::List => self.draw_list(frame, chunks[0]),
            Screen::Detail(detail) => self.draw_detail(frame, chunks[0], detail),
        }
        self.draw_footer(frame, chunks[1]);

        match &self.mode {
            Mode::Normal => {}
            Mode::Editing { target, form } => self.draw_editor(frame, target, form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, confirm),
        }
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let title = if self.prefs.newest_first {
            " Skills (newest first) "
        } else {
            " Skills (oldest first) "
        };
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.list.skills.is_empty() {
            let empty = Paragraph::new("No skills yet. Press 'a' to add one.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .list
            .skills
            .iter()
            .map(|skill| {
                let description = skill.description.clone().unwrap_or_default();
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            skill.name.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw("  "),
                        Span::styled(
                            skill.last_edit_date.clone(),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]),
                    Line::from(Span::styled(description, Style::default().fg(Color::Gray))),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.list.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, detail: &DetailScreen) {
        let mut lines = vec![
            Line::from(vec![
                Span::raw("Name: "),
                Span::styled(
                    detail.skill.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!(
                "Description: {}",
                detail.skill.description.clone().unwrap_or_default()
            )),
            Line::from(format!("Last edited: {}", detail.skill.last_edit_date)),
            Line::default(),
        ];

        match &detail.progress {
            Some(progress) => {
                lines.push(Line::from(format!("Status: {}", progress.status)));
                lines.push(Line::from(format!(
                    "Level:  {}",
                    tracker_bar(progress.tracker, TRACKER_BAR_WIDTH)
                )));
                if let Some(notes) = &progress.personal_notes {
                    lines.push(Line::default());
                    lines.push(Line::from(format!("Notes: {notes}")));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "No progress recorded.",
                Style::default().fg(Color::DarkGray),
            ))),
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Skill details "));
        frame.render_widget(paragraph, area);
    }

    fn draw_editor(&self, frame: &mut Frame, target: &EditorTarget, form: &SkillForm) {
        let title = match target {
            EditorTarget::Create => " Add skill ",
            EditorTarget::Edit { .. } => " Edit skill ",
        };
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);

        let tracker_style = if form.active == SkillField::Tracker {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let mut lines = vec![
            form.build_line("Name", SkillField::Name),
            form.build_line("Description", SkillField::Description),
            Line::from(vec![
                Span::raw("Level: "),
                Span::styled(tracker_bar(form.tracker, TRACKER_BAR_WIDTH), tracker_style),
            ]),
            form.build_line("Notes", SkillField::Notes),
            Line::default(),
            Line::from(Span::styled(
                "Tab fields · ←/→ level · Enter save · Esc cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);

        if form.active != SkillField::Tracker {
            let (row, label) = match form.active {
                SkillField::Name => (0u16, "Name"),
                SkillField::Description => (1, "Description"),
                SkillField::Notes => (3, "Notes"),
                SkillField::Tracker => unreachable!(),
            };
            let x = area.x + 1 + label.len() as u16 + 2 + form.value_len(form.active) as u16;
            let y = area.y + 1 + row;
            frame.set_cursor_position((x, y));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, confirm: &ConfirmDelete) {
        let area = centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, area);

        let lines = vec![
            Line::from(format!("Delete {}?", confirm.name)),
            Line::from(Span::styled(
                "This removes the skill and its progress.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::default(),
            Line::from("[y] delete    [n] cancel"),
        ];
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Confirm delete "));
        frame.render_widget(paragraph, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let line = if let Some(status) = &self.status {
            Line::from(Span::styled(status.text.clone(), status.kind.style()))
        } else {
            let hints = match (&self.mode, &self.screen) {
                (Mode::Editing { .. }, _) => "Tab/Shift-Tab fields · ←/→ level · Enter save · Esc cancel",
                (Mode::ConfirmDelete(_), _) => "y confirm · n cancel",
                (Mode::Normal, Screen::List) => {
                    "↑/↓ select · Enter details · a add · e edit · d delete · s sort · q quit"
                }
                (Mode::Normal, Screen::Detail(_)) => "e edit · Esc back",
            };
            Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
        };
        let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }
}

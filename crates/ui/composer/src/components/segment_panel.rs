//! The "Saving Segment" slide-over: name input, selected schemas, chooser and
//! the save/cancel buttons.

use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use segment::SchemaField;
use tui_input::{backend::crossterm::EventHandler, Input, InputRequest};

use super::{
    popup::{draw_popup_frame, right_panel_rect},
    popups::FieldChooser,
    Component,
};
use crate::{
    action::{Action, Notice, PopupResult},
    state::{InputMode, State},
    theme,
    tui::{Event, EventResponse, Frame},
};

const PANEL_WIDTH: u16 = 58;
const PLACEHOLDER: &str = "e.g. last_10_days_blog_visits";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Row(usize),
    AddSchema,
    Save,
    Cancel,
}

/// Which slot a chosen field goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChooserTarget {
    Add,
    Row(usize),
}

pub struct SegmentPanel {
    name: Input,
    focus: Focus,
    chooser: Option<(ChooserTarget, FieldChooser)>,
}

impl Default for SegmentPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentPanel {
    pub fn new() -> Self {
        Self {
            name: Input::default(),
            focus: Focus::Name,
            chooser: None,
        }
    }

    fn reset(&mut self) {
        self.name.reset();
        self.focus = Focus::Name;
        self.chooser = None;
    }

    fn focus_order(rows: usize) -> Vec<Focus> {
        let mut order = Vec::with_capacity(rows + 4);
        order.push(Focus::Name);
        order.extend((0..rows).map(Focus::Row));
        order.extend([Focus::AddSchema, Focus::Save, Focus::Cancel]);
        order
    }

    fn set_focus(&mut self, focus: Focus, state: &mut State) {
        self.focus = focus;
        state.input_mode = if focus == Focus::Name {
            InputMode::Insert
        } else {
            InputMode::Normal
        };
    }

    fn step_focus(&mut self, forward: bool, state: &mut State) {
        let order = Self::focus_order(state.session.selection().len());
        let pos = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (pos + 1) % order.len()
        } else {
            pos.checked_sub(1).unwrap_or(order.len() - 1)
        };
        self.set_focus(order[next], state);
    }

    /// Rows can disappear underneath the focus (reset after a save).
    fn clamp_focus(&mut self, state: &mut State) {
        let len = state.session.selection().len();
        if let Focus::Row(i) = self.focus {
            if i >= len {
                let focus = if len == 0 {
                    Focus::AddSchema
                } else {
                    Focus::Row(len - 1)
                };
                self.set_focus(focus, state);
            }
        }
    }

    /// Open the chooser for `target`, or return a notice when nothing is left to pick.
    fn open_chooser(&mut self, target: ChooserTarget, state: &State) -> Result<Option<Action>> {
        let selection = state.session.selection();
        let chooser = match target {
            ChooserTarget::Add => {
                let options = selection.available_choices();
                if options.is_empty() {
                    return Ok(Some(Action::Notify(Notice::info(
                        "All schemas are already added",
                    ))));
                }
                FieldChooser::new("Add schema", options)
            }
            ChooserTarget::Row(i) => {
                let options = selection.available_choices_excluding_own_slot(i)?;
                let chooser = FieldChooser::new("Change schema", options);
                match selection.get(i) {
                    Some(current) => chooser.preselect(current),
                    None => chooser,
                }
            }
        };
        self.chooser = Some((target, chooser));
        Ok(None)
    }

    fn apply_choice(&mut self, field: SchemaField, state: &mut State) -> Option<Action> {
        let (target, _) = self.chooser.take()?;
        let selection = state.session.selection_mut();
        let result = match target {
            ChooserTarget::Add => selection.add(field),
            ChooserTarget::Row(i) => selection.replace_at(i, field),
        };
        match result {
            Ok(()) => {
                tracing::debug!(field = %field, ?target, "schema chosen");
                None
            }
            Err(e) => Some(Action::Notify(Notice::error(e.notice()))),
        }
    }

    fn remove_row(&mut self, index: usize, state: &mut State) -> Option<Action> {
        match state.session.selection_mut().remove_at(index) {
            Ok(field) => {
                tracing::debug!(field = %field, index, "schema removed");
                self.clamp_focus(state);
                None
            }
            Err(e) => Some(Action::Notify(Notice::error(e.notice()))),
        }
    }

    fn edit_name(&mut self, key: KeyEvent, state: &mut State) -> Action {
        if self
            .name
            .handle_event(&CrosstermEvent::Key(key))
            .is_some_and(|change| change.value)
        {
            state.session.set_name(self.name.value());
        }
        Action::Update
    }

    fn draw_name(&self, f: &mut Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Name;
        let border = if focused { theme::ACCENT } else { theme::MUTED };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        let width = inner.width.max(1) as usize;
        let scroll = self.name.visual_scroll(width);

        let text = if self.name.value().is_empty() {
            Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(theme::MUTED)))
        } else {
            Paragraph::new(self.name.value()).scroll((0, scroll as u16))
        };
        f.render_widget(text.block(block), area);

        if focused && self.chooser.is_none() {
            let x = self.name.visual_cursor().saturating_sub(scroll) as u16;
            f.set_cursor_position((inner.x + x.min(inner.width.saturating_sub(1)), inner.y));
        }
    }

    fn draw_rows(&self, f: &mut Frame<'_>, area: Rect, state: &State) {
        let selection = state.session.selection();
        if selection.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled(
                    "-- No schemas added yet --",
                    Style::default().fg(theme::MUTED),
                )),
                area,
            );
            return;
        }

        let visible = area.height.max(1) as usize;
        let start = match self.focus {
            Focus::Row(i) if i >= visible => i + 1 - visible,
            _ => 0,
        };
        let lines: Vec<Line> = selection
            .iter()
            .enumerate()
            .skip(start)
            .take(visible)
            .map(|(i, field)| {
                let focused = self.focus == Focus::Row(i);
                Line::from(vec![
                    Span::raw(if focused { "> " } else { "  " }),
                    theme::trait_dot(field.trait_type()),
                    Span::raw(" "),
                    Span::styled(
                        format!("{} {}", field.glyph(), field.label()),
                        theme::focused(Style::default(), focused),
                    ),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines), area);
    }

    fn draw_buttons(&self, f: &mut Frame<'_>, area: Rect, state: &State) {
        let session = &state.session;
        let save_label = if session.is_submitting() {
            " Saving... "
        } else {
            " Save the Segment "
        };
        let save_style = if session.can_submit() || session.is_submitting() {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme::MUTED)
        };
        let cancel_style = Style::default().fg(Color::White);

        let line = Line::from(vec![
            Span::styled(
                format!("[{save_label}]"),
                theme::focused(save_style, self.focus == Focus::Save),
            ),
            Span::raw("  "),
            Span::styled(
                "[ Cancel ]",
                theme::focused(cancel_style, self.focus == Focus::Cancel),
            ),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }
}

impl Component for SegmentPanel {
    fn handle_events(
        &mut self,
        event: Event,
        state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        if !state.panel_open {
            return Ok(None);
        }
        match event {
            Event::Key(key) => self.handle_key_events(key, state),
            Event::Paste(text) if self.focus == Focus::Name && self.chooser.is_none() => {
                for c in text.chars().filter(|c| !c.is_control()) {
                    self.name.handle(InputRequest::InsertChar(c));
                }
                state.session.set_name(self.name.value());
                Ok(Some(EventResponse::Stop(Action::Update)))
            }
            _ => Ok(None),
        }
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        if !state.panel_open {
            return Ok(None);
        }
        if let Some((_, chooser)) = self.chooser.as_mut() {
            return chooser.handle_key_events(key, state);
        }
        self.clamp_focus(state);

        let action = match (key.code, self.focus) {
            (KeyCode::Esc, _) => Action::ClosePanel,
            (KeyCode::Char('s'), _) if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Action::Submit
            }
            (KeyCode::Tab, _) => {
                self.step_focus(true, state);
                Action::Update
            }
            (KeyCode::BackTab, _) => {
                self.step_focus(false, state);
                Action::Update
            }
            (KeyCode::Enter | KeyCode::Down, Focus::Name) => {
                self.step_focus(true, state);
                Action::Update
            }
            (KeyCode::Up, Focus::Name) => Action::Update,
            (_, Focus::Name) => self.edit_name(key, state),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.step_focus(false, state);
                Action::Update
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                self.step_focus(true, state);
                Action::Update
            }
            (KeyCode::Left, Focus::Cancel) => {
                self.set_focus(Focus::Save, state);
                Action::Update
            }
            (KeyCode::Right, Focus::Save) => {
                self.set_focus(Focus::Cancel, state);
                Action::Update
            }
            (KeyCode::Enter, Focus::Row(i)) => self
                .open_chooser(ChooserTarget::Row(i), state)?
                .unwrap_or(Action::Update),
            (KeyCode::Delete | KeyCode::Char('d'), Focus::Row(i)) => {
                self.remove_row(i, state).unwrap_or(Action::Update)
            }
            (KeyCode::Enter, Focus::AddSchema) => self
                .open_chooser(ChooserTarget::Add, state)?
                .unwrap_or(Action::Update),
            (KeyCode::Enter, Focus::Save) => Action::Submit,
            (KeyCode::Enter, Focus::Cancel) => Action::ClosePanel,
            _ => return Ok(None),
        };
        Ok(Some(EventResponse::Stop(action)))
    }

    fn update(&mut self, action: Action, state: &mut State) -> Result<Option<Action>> {
        match action {
            Action::OpenPanel | Action::ClosePanel => {
                self.reset();
                state.input_mode = if state.panel_open {
                    InputMode::Insert
                } else {
                    InputMode::Normal
                };
                Ok(None)
            }
            Action::PopupResult(PopupResult::FieldChosen(field)) => {
                Ok(self.apply_choice(field, state))
            }
            Action::PopupResult(PopupResult::Cancelled) => {
                self.chooser = None;
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, state: &State) -> Result<()> {
        if !state.panel_open {
            return Ok(());
        }
        let panel = right_panel_rect(area, PANEL_WIDTH);
        let inner = draw_popup_frame(f, panel, "Saving Segment");

        let [label, name, help, legend, _, header, rows, add, _, buttons] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner.inner(ratatui::layout::Margin::new(1, 0)));

        f.render_widget(
            Paragraph::new("Enter the Name of the Segment")
                .style(Style::default().add_modifier(Modifier::BOLD)),
            label,
        );
        self.draw_name(f, name);
        f.render_widget(
            Paragraph::new("To save your segment, you need to add the schemas to build the query")
                .style(Style::default().fg(theme::MUTED))
                .wrap(Wrap { trim: true }),
            help,
        );
        f.render_widget(
            Paragraph::new(Line::from(vec![
                theme::trait_dot(segment::TraitType::User),
                Span::raw(format!(" - {}   ", segment::TraitType::User.label())),
                theme::trait_dot(segment::TraitType::Group),
                Span::raw(format!(" - {}", segment::TraitType::Group.label())),
            ])),
            legend,
        );
        f.render_widget(
            Paragraph::new("Selected Schemas")
                .style(Style::default().add_modifier(Modifier::UNDERLINED)),
            header,
        );
        self.draw_rows(f, rows, state);
        f.render_widget(
            Paragraph::new(Span::styled(
                "+ Add new schema",
                theme::focused(Style::default().fg(Color::Green), self.focus == Focus::AddSchema),
            )),
            add,
        );
        self.draw_buttons(f, buttons, state);

        if let Some((_, chooser)) = self.chooser.as_mut() {
            chooser.draw(f, area, state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use SchemaField::{Age, City, FirstName, Gender, LastName};

    fn open() -> (SegmentPanel, State) {
        let mut state = State::new();
        state.open_panel();
        let mut panel = SegmentPanel::new();
        panel.update(Action::OpenPanel, &mut state).unwrap();
        (panel, state)
    }

    fn press(panel: &mut SegmentPanel, state: &mut State, code: KeyCode) -> Option<Action> {
        match panel
            .handle_key_events(KeyEvent::new(code, KeyModifiers::NONE), state)
            .unwrap()
        {
            Some(EventResponse::Stop(a)) | Some(EventResponse::Continue(a)) => Some(a),
            None => None,
        }
    }

    /// Feed an action back the way the app loop does.
    fn dispatch(panel: &mut SegmentPanel, state: &mut State, action: Action) -> Option<Action> {
        panel.update(action, state).unwrap()
    }

    #[test]
    fn typing_updates_the_draft_name() {
        let (mut panel, mut state) = open();
        for c in "blog".chars() {
            press(&mut panel, &mut state, KeyCode::Char(c));
        }
        press(&mut panel, &mut state, KeyCode::Backspace);
        assert_eq!(state.session.name(), "blo");
        assert_eq!(state.input_mode, InputMode::Insert);
    }

    #[test]
    fn add_schema_through_chooser() {
        let (mut panel, mut state) = open();
        // Name -> AddSchema (no rows yet)
        press(&mut panel, &mut state, KeyCode::Tab);
        assert_eq!(panel.focus, Focus::AddSchema);
        assert_eq!(state.input_mode, InputMode::Normal);

        press(&mut panel, &mut state, KeyCode::Enter);
        assert!(panel.chooser.is_some());
        press(&mut panel, &mut state, KeyCode::Down);
        let chosen = press(&mut panel, &mut state, KeyCode::Enter).unwrap();
        assert_eq!(chosen, Action::PopupResult(PopupResult::FieldChosen(LastName)));

        assert_eq!(dispatch(&mut panel, &mut state, chosen), None);
        assert!(!panel.chooser.is_some());
        assert_eq!(state.session.selection().as_slice(), &[LastName]);
    }

    #[test]
    fn chooser_for_add_hides_taken_fields() {
        let (mut panel, mut state) = open();
        state.session.selection_mut().add(FirstName).unwrap();
        panel.set_focus(Focus::AddSchema, &mut state);
        press(&mut panel, &mut state, KeyCode::Enter);

        let (_, chooser) = panel.chooser.as_ref().unwrap();
        assert_eq!(chooser.options().len(), 6);
        assert!(chooser.options().iter().all(|d| d.id != FirstName));
    }

    #[test]
    fn duplicate_choice_raises_notice() {
        let (mut panel, mut state) = open();
        panel.set_focus(Focus::AddSchema, &mut state);
        press(&mut panel, &mut state, KeyCode::Enter);
        // another path added the field while the chooser was open
        state.session.selection_mut().add(FirstName).unwrap();

        let follow_up = dispatch(
            &mut panel,
            &mut state,
            Action::PopupResult(PopupResult::FieldChosen(FirstName)),
        );
        assert_eq!(
            follow_up,
            Some(Action::Notify(Notice::error("Schema already added")))
        );
        assert_eq!(state.session.selection().len(), 1);
    }

    #[test]
    fn row_chooser_replaces_in_place() {
        let (mut panel, mut state) = open();
        state.session.selection_mut().add(Age).unwrap();
        state.session.selection_mut().add(City).unwrap();
        panel.set_focus(Focus::Row(1), &mut state);

        press(&mut panel, &mut state, KeyCode::Enter);
        {
            let (_, chooser) = panel.chooser.as_ref().unwrap();
            assert_eq!(chooser.selected().map(|d| d.id), Some(City));
            assert!(chooser.options().iter().all(|d| d.id != Age));
        }
        dispatch(
            &mut panel,
            &mut state,
            Action::PopupResult(PopupResult::FieldChosen(SchemaField::State)),
        );
        assert_eq!(
            state.session.selection().as_slice(),
            &[Age, SchemaField::State]
        );
    }

    #[test]
    fn cancelled_chooser_changes_nothing() {
        let (mut panel, mut state) = open();
        panel.set_focus(Focus::AddSchema, &mut state);
        press(&mut panel, &mut state, KeyCode::Enter);
        let cancelled = press(&mut panel, &mut state, KeyCode::Esc).unwrap();
        dispatch(&mut panel, &mut state, cancelled);
        assert!(!panel.chooser.is_some());
        assert!(state.session.selection().is_empty());
    }

    #[test]
    fn delete_removes_row_and_moves_focus() {
        let (mut panel, mut state) = open();
        state.session.selection_mut().add(Gender).unwrap();
        state.session.selection_mut().add(City).unwrap();
        panel.set_focus(Focus::Row(1), &mut state);

        press(&mut panel, &mut state, KeyCode::Char('d'));
        assert_eq!(state.session.selection().as_slice(), &[Gender]);
        assert_eq!(panel.focus, Focus::Row(0));

        press(&mut panel, &mut state, KeyCode::Delete);
        assert!(state.session.selection().is_empty());
        assert_eq!(panel.focus, Focus::AddSchema);
    }

    #[test]
    fn tab_cycles_through_every_control() {
        let (mut panel, mut state) = open();
        state.session.selection_mut().add(Age).unwrap();
        let mut seen = vec![panel.focus];
        for _ in 0..4 {
            press(&mut panel, &mut state, KeyCode::Tab);
            seen.push(panel.focus);
        }
        assert_eq!(
            seen,
            vec![
                Focus::Name,
                Focus::Row(0),
                Focus::AddSchema,
                Focus::Save,
                Focus::Cancel
            ]
        );
        press(&mut panel, &mut state, KeyCode::Tab);
        assert_eq!(panel.focus, Focus::Name);
        press(&mut panel, &mut state, KeyCode::BackTab);
        assert_eq!(panel.focus, Focus::Cancel);
    }

    #[test]
    fn buttons_emit_submit_and_close() {
        let (mut panel, mut state) = open();
        panel.set_focus(Focus::Save, &mut state);
        assert_eq!(press(&mut panel, &mut state, KeyCode::Enter), Some(Action::Submit));
        press(&mut panel, &mut state, KeyCode::Right);
        assert_eq!(
            press(&mut panel, &mut state, KeyCode::Enter),
            Some(Action::ClosePanel)
        );
        assert_eq!(press(&mut panel, &mut state, KeyCode::Esc), Some(Action::ClosePanel));
    }

    #[test]
    fn full_selection_has_nothing_to_add() {
        let (mut panel, mut state) = open();
        for d in segment::all_fields() {
            state.session.selection_mut().add(d.id).unwrap();
        }
        panel.set_focus(Focus::AddSchema, &mut state);
        assert_eq!(
            press(&mut panel, &mut state, KeyCode::Enter),
            Some(Action::Notify(Notice::info("All schemas are already added")))
        );
        assert!(panel.chooser.is_none());
    }

    #[test]
    fn closed_panel_ignores_keys() {
        let mut state = State::new();
        let mut panel = SegmentPanel::new();
        assert_eq!(press(&mut panel, &mut state, KeyCode::Enter), None);
    }
}

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Clear, Paragraph},
};
use segment::FieldDescriptor;

use crate::{
    action::{Action, PopupResult},
    components::{
        popup::{centered_rect_fixed, draw_popup_frame},
        Component, PopupComponent,
    },
    state::State,
    theme,
    tui::{EventResponse, Frame},
};

/// Pick exactly one schema field out of a precomputed list of choices.
///
/// Emits `PopupResult::FieldChosen` on Enter and `PopupResult::Cancelled` on
/// Esc. Up/Down (and k/j) move the selection, wrapping at both ends.
pub struct FieldChooser {
    title: String,
    options: Vec<&'static FieldDescriptor>,
    selected: usize,
    scroll: usize,
    min_width: u16,
    min_height: u16,
}

impl FieldChooser {
    pub fn new(title: impl Into<String>, options: Vec<&'static FieldDescriptor>) -> Self {
        Self {
            title: title.into(),
            options,
            selected: 0,
            scroll: 0,
            min_width: 40,
            min_height: 13,
        }
    }

    /// Preselect the entry for `field` if it is among the options.
    pub fn preselect(mut self, field: segment::SchemaField) -> Self {
        if let Some(pos) = self.options.iter().position(|d| d.id == field) {
            self.selected = pos;
        }
        self
    }

    #[cfg(test)]
    pub fn options(&self) -> &[&'static FieldDescriptor] {
        &self.options
    }

    pub fn selected(&self) -> Option<&'static FieldDescriptor> {
        self.options.get(self.selected).copied()
    }

    fn max_visible(inner: Rect) -> usize {
        // two rows are kept for the key hints
        inner.height.saturating_sub(2).max(1) as usize
    }

    fn ensure_visible(&mut self, inner: Rect) {
        if self.options.is_empty() {
            self.scroll = 0;
            self.selected = 0;
            return;
        }
        let max_visible = Self::max_visible(inner);
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + max_visible {
            self.scroll = self.selected + 1 - max_visible;
        }
    }
}

impl Component for FieldChooser {
    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        let action = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.options.is_empty() {
                    self.selected = self
                        .selected
                        .checked_sub(1)
                        .unwrap_or(self.options.len() - 1);
                }
                Action::Update
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.options.is_empty() {
                    self.selected = (self.selected + 1) % self.options.len();
                }
                Action::Update
            }
            KeyCode::Enter => self.submit_action().unwrap_or(Action::Update),
            KeyCode::Esc => self.cancel_action().unwrap_or(Action::Update),
            // the chooser is modal, swallow everything else
            _ => Action::Update,
        };
        Ok(Some(EventResponse::Stop(action)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, _state: &State) -> Result<()> {
        if area.width < 5 || area.height < 5 {
            return Ok(());
        }

        let dialog = centered_rect_fixed(area, self.min_width, self.min_height);
        let inner = draw_popup_frame(f, dialog, &self.title);
        self.ensure_visible(inner);

        let mut lines: Vec<Line> = Vec::new();
        if self.options.is_empty() {
            lines.push(Line::from(Span::styled(
                "All schemas are already added",
                Style::default().fg(theme::MUTED),
            )));
        } else {
            let end = (self.scroll + Self::max_visible(inner)).min(self.options.len());
            for (idx, d) in self.options[self.scroll..end].iter().enumerate() {
                let is_selected = self.scroll + idx == self.selected;
                let label = format!("{} {}", d.glyph, d.label);
                let label = if is_selected {
                    Span::styled(label, Style::default().fg(Color::Black).bg(Color::White).bold())
                } else {
                    Span::styled(label, Style::default().fg(Color::White))
                };
                lines.push(Line::from(vec![
                    Span::raw(if is_selected { "> " } else { "  " }),
                    theme::trait_dot(d.trait_type),
                    Span::raw(" "),
                    label,
                ]));
            }
        }

        if inner.height >= 3 {
            lines.push(Line::raw(""));
            lines.push(
                Line::from(vec![
                    Span::styled("Up/Down", Style::default().fg(Color::White)),
                    Span::raw(": Select  "),
                    Span::styled("Enter", Style::default().fg(Color::White)),
                    Span::raw(": Choose  "),
                    Span::styled("Esc", Style::default().fg(Color::White)),
                    Span::raw(": Cancel"),
                ])
                .fg(theme::MUTED),
            );
        }

        f.render_widget(Clear, inner);
        f.render_widget(Paragraph::new(Text::from(lines)), inner);
        Ok(())
    }
}

impl PopupComponent for FieldChooser {
    fn submit_action(&mut self) -> Option<Action> {
        match self.selected() {
            Some(d) => Some(Action::PopupResult(PopupResult::FieldChosen(d.id))),
            None => self.cancel_action(),
        }
    }
}

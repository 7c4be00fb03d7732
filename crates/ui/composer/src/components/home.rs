use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::Component;
use crate::{
    action::Action,
    state::State,
    theme,
    tui::{EventResponse, Frame},
};

/// Landing page with the "Save Segment" trigger.
#[derive(Default)]
pub struct Home {
    endpoint: String,
}

impl Home {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Component for Home {
    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        state: &mut State,
    ) -> Result<Option<EventResponse<Action>>> {
        if state.panel_open {
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Enter | KeyCode::Char('s') => Action::OpenPanel,
            KeyCode::Char('q') => Action::Quit,
            _ => return Ok(None),
        };
        Ok(Some(EventResponse::Stop(action)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, _state: &State) -> Result<()> {
        let block = Block::default()
            .title(" Segments ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::MUTED));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let [_, button, _, hint, endpoint] = Layout::vertical([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let [button] = Layout::horizontal([Constraint::Length(20)])
            .flex(ratatui::layout::Flex::Center)
            .areas(button);
        f.render_widget(
            Paragraph::new("Save Segment")
                .alignment(Alignment::Center)
                .style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(theme::ACCENT)),
                ),
            button,
        );

        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Enter", Style::default().fg(Color::White)),
                Span::raw(": Save Segment  "),
                Span::styled("q", Style::default().fg(Color::White)),
                Span::raw(": Quit"),
            ]))
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme::MUTED)),
            hint,
        );
        f.render_widget(
            Paragraph::new(format!("endpoint: {}", self.endpoint))
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme::MUTED)),
            endpoint,
        );
        Ok(())
    }
}

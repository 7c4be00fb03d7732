use std::time::{Duration, Instant};

use color_eyre::Result;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use slotmap::{new_key_type, SlotMap};

use super::Component;
use crate::{
    action::{Action, Notice, NoticeKind},
    state::State,
    tui::Frame,
};

new_key_type! { pub struct NotificationKey; }

const DEFAULT_TTL: Duration = Duration::from_secs(4);
const TOAST_WIDTH: u16 = 36;
const MAX_VISIBLE: usize = 4;

pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) >= self.ttl
    }
}

/// Stack of short-lived toasts in the top-right corner.
#[derive(Default)]
pub struct Notifications {
    items: SlotMap<NotificationKey, Notification>,
    ttl: Option<Duration>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            items: SlotMap::with_key(),
            ttl: Some(ttl),
        }
    }

    pub fn push(&mut self, notice: Notice) {
        let ttl = self.ttl.unwrap_or(DEFAULT_TTL);
        self.items.insert(Notification {
            kind: notice.kind,
            message: notice.message,
            created_at: Instant::now(),
            ttl,
        });
    }

    /// Drop every toast whose ttl has elapsed at `now`.
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|_, n| !n.expired(now));
    }

    /// Messages, oldest first.
    #[cfg(test)]
    pub fn messages(&self) -> Vec<&str> {
        let mut items: Vec<&Notification> = self.items.values().collect();
        items.sort_by_key(|n| n.created_at);
        items.into_iter().map(|n| n.message.as_str()).collect()
    }
}

fn kind_color(kind: NoticeKind) -> Color {
    match kind {
        NoticeKind::Info => Color::Cyan,
        NoticeKind::Success => Color::Green,
        NoticeKind::Error => Color::LightRed,
    }
}

impl Component for Notifications {
    fn update(&mut self, action: Action, _state: &mut State) -> Result<Option<Action>> {
        match action {
            Action::Notify(notice) => {
                tracing::info!(kind = ?notice.kind, message = %notice.message, "notification");
                self.push(notice);
            }
            Action::Tick => self.prune(Instant::now()),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect, _state: &State) -> Result<()> {
        let mut items: Vec<&Notification> = self.items.values().collect();
        items.sort_by_key(|n| std::cmp::Reverse(n.created_at));

        let width = TOAST_WIDTH.min(area.width);
        let mut y = area.y.saturating_add(1);
        for n in items.into_iter().take(MAX_VISIBLE) {
            if y.saturating_add(3) > area.bottom() {
                break;
            }
            let rect = Rect {
                x: area.right().saturating_sub(width + 1),
                y,
                width,
                height: 3,
            };
            let color = kind_color(n.kind);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color));
            let body = Paragraph::new(Line::from(Span::styled(
                n.message.as_str(),
                Style::default().fg(color),
            )))
            .block(block);
            f.render_widget(Clear, rect);
            f.render_widget(body, rect);
            y += 3;
        }
        Ok(())
    }
}

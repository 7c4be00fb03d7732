use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Block, Borders, Clear},
};

use crate::{action::Action, action::PopupResult, components::Component, tui::Frame};

/// Popup components and layout helpers.
///
/// Overlays are drawn after the page underneath: compute the rect with
/// `centered_rect_fixed` (dialogs) or `right_panel_rect` (slide-overs), then
/// draw the content into the rect returned by `draw_popup_frame`.
pub trait PopupComponent: Component {
    /// Action emitted when the popup is confirmed (Enter).
    fn submit_action(&mut self) -> Option<Action>;

    /// Action emitted when the popup is dismissed (Esc).
    fn cancel_action(&mut self) -> Option<Action> {
        Some(Action::PopupResult(PopupResult::Cancelled))
    }
}

/// Centered rectangle with a fixed size, clamped to `area`.
pub fn centered_rect_fixed(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);

    let x = area.x.saturating_add((area.width.saturating_sub(w)) / 2);
    let y = area.y.saturating_add((area.height.saturating_sub(h)) / 2);

    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

/// Full-height slide-over anchored to the right edge of `area`.
pub fn right_panel_rect(area: Rect, width: u16) -> Rect {
    let w = width.min(area.width);
    Rect {
        x: area.x.saturating_add(area.width - w),
        y: area.y,
        width: w,
        height: area.height,
    }
}

/// Draw a rounded, bordered shell with a title at `area` and return the
/// inner rect. The area is cleared first so the page does not bleed through.
pub fn draw_popup_frame(frame: &mut Frame<'_>, area: Rect, title: impl Into<String>) -> Rect {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title.into()))
        .borders(Borders::ALL)
        .border_set(symbols::border::ROUNDED)
        .style(Style::default().fg(Color::White).bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

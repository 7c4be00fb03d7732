use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};
use segment::TraitType;

pub const ACCENT: Color = Color::Cyan;
pub const MUTED: Color = Color::DarkGray;

pub fn trait_color(trait_type: TraitType) -> Color {
    match trait_type {
        TraitType::User => Color::Green,
        TraitType::Group => Color::LightRed,
    }
}

/// Colored dot marking the trait type of a field.
pub fn trait_dot(trait_type: TraitType) -> Span<'static> {
    Span::styled("●", Style::default().fg(trait_color(trait_type)))
}

pub fn focused(style: Style, is_focused: bool) -> Style {
    if is_focused {
        style.fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        style
    }
}

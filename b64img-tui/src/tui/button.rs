use ratatui::{
    buffer::Buffer,
    crossterm::event::{MouseButton, MouseEvent, MouseEventKind},
    layout::{Alignment, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::tui::Theme;

pub trait CallOnce {
    fn call_once(self);
}

impl<F: FnOnce()> CallOnce for F {
    fn call_once(self) {
        self();
    }
}

pub struct DoNothing;

impl CallOnce for DoNothing {
    fn call_once(self) {}
}

/// Clickable button. Reacts to the mouse event it is given while rendering:
/// left-down shows it pressed, left-up inside the area fires `on_click`.
pub struct Button<'a, F = DoNothing> {
    label: &'a str,
    key: Option<&'a str>,
    theme: &'a Theme,
    state: State,
    enabled: bool,
    variant: ButtonVariant,
    mouse_event: Option<MouseEvent>,

    on_click: Option<F>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum State {
    #[default]
    Normal,
    Pressed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
}

impl<'a> Button<'a> {
    pub fn new(label: &'a str, theme: &'a Theme) -> Button<'a> {
        Button {
            label,
            key: None,
            theme,
            state: State::default(),
            enabled: true,
            variant: ButtonVariant::default(),
            mouse_event: None,
            on_click: None,
        }
    }
}

impl<'a, F> Button<'a, F>
where
    F: CallOnce,
{
    pub fn on_click<F2>(self, on_click: F2) -> Button<'a, F2>
    where
        F2: FnOnce(),
    {
        Button {
            label: self.label,
            key: self.key,
            theme: self.theme,
            state: self.state,
            enabled: self.enabled,
            variant: self.variant,
            mouse_event: self.mouse_event,
            on_click: Some(on_click),
        }
    }

    /// Keyboard shortcut shown next to the label
    pub fn key(mut self, key: &'a str) -> Self {
        self.key = Some(key);
        self
    }

    pub fn mouse_event(mut self, mouse_event: Option<MouseEvent>) -> Self {
        self.mouse_event = mouse_event;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self
    }

    fn handle_mouse(&mut self, area: Rect) {
        let Some(mouse) = self.mouse_event else {
            return;
        };
        if !self.enabled || !area.contains(Position::new(mouse.column, mouse.row)) {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.state = State::Pressed;
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(on_click) = self.on_click.take() {
                    on_click.call_once();
                }
                self.state = State::Normal;
            }
            _ => {}
        }
    }

    // fg, bg, top, bottom
    fn colors(&self) -> (Color, Color, Color, Color) {
        let t = self.theme;
        if !self.enabled {
            return (t.content, t.muted, t.border, t.border);
        }
        match (self.state, self.variant) {
            (State::Normal, ButtonVariant::Primary) => {
                (t.primary, t.primary_bg, t.primary, t.primary)
            }
            (State::Pressed, ButtonVariant::Primary) => {
                (t.primary, t.primary_pressed, t.primary, t.border)
            }
            (State::Normal, ButtonVariant::Secondary) => {
                (t.secondary, t.secondary_bg, t.secondary, t.secondary)
            }
            (State::Pressed, ButtonVariant::Secondary) => {
                (t.secondary, t.secondary_pressed, t.secondary, t.border)
            }
        }
    }
}

impl<'a, F: CallOnce + 'a> Widget for Button<'a, F> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        self.handle_mouse(area);

        let (fg, bg, top, bottom) = self.colors();

        buf.set_style(area, Style::default().fg(fg).bg(bg));

        let rows = area.rows().collect::<Vec<_>>();
        let last_index = rows.len().saturating_sub(1);
        let (first, middle, last) = match rows.len() {
            0 | 1 => (None, &rows[..], None),
            2 => (None, &rows[..last_index], Some(rows[last_index])),
            _ => (Some(rows[0]), &rows[1..last_index], Some(rows[last_index])),
        };

        if let Some(first) = first {
            "▔".repeat(area.width as usize)
                .fg(top)
                .bg(bg)
                .render(first, buf);
        }

        if let Some(last) = last {
            "▁".repeat(area.width as usize)
                .fg(bottom)
                .bg(bg)
                .render(last, buf);
        }

        let Some(&row) = middle.first() else {
            return;
        };

        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(if self.enabled {
                top
            } else {
                self.theme.border
            }));

        let inner = block.inner(row);
        block.render(row, buf);

        let style = if self.enabled {
            Style::default().fg(fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(fg).add_modifier(Modifier::DIM)
        };

        let mut spans = vec![Span::styled(self.label, style)];
        if let Some(key) = self.key {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("[{key}]"),
                Style::default().fg(self.theme.key_hint),
            ));
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn click_inside_fires_once() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        let mut clicks = 0;

        Button::new("ok", &theme)
            .mouse_event(Some(mouse(MouseEventKind::Up(MouseButton::Left), 2, 1)))
            .on_click(|| clicks += 1)
            .render(area, &mut buf);

        assert_eq!(clicks, 1);
    }

    #[test]
    fn click_outside_or_disabled_is_ignored() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 5));
        let mut clicks = 0;

        Button::new("ok", &theme)
            .mouse_event(Some(mouse(MouseEventKind::Up(MouseButton::Left), 15, 4)))
            .on_click(|| clicks += 1)
            .render(area, &mut buf);

        Button::new("ok", &theme)
            .enabled(false)
            .mouse_event(Some(mouse(MouseEventKind::Up(MouseButton::Left), 2, 1)))
            .on_click(|| clicks += 1)
            .render(area, &mut buf);

        assert_eq!(clicks, 0);
    }
}

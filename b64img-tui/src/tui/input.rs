use b64img::CodecError;
use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent},
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Paragraph, Widget},
};

use crate::tui::{
    button::{Button, ButtonVariant},
    render_title,
    text_input::{TextArea, TextInput},
    utils::{self, themed_block},
    Action, Theme,
};

/// Text entry screen: the Base64 field, convert/clear, and the last error
#[derive(Debug, Default)]
pub struct InputState {
    pub text: TextInput,
    pub error: Option<String>,
    action: Option<Action>,
}

impl InputState {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            text: initial.map(TextInput::new).unwrap_or_default(),
            ..Default::default()
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => Some(Action::Convert),
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('l') if ctrl => Some(Action::Clear),
            _ => {
                self.text.handle_key(key);
                None
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.text.insert_str(text);
    }

    /// Empty the field and the error line
    pub fn clear(&mut self) {
        self.text.clear();
        self.error = None;
    }

    pub fn show_error(&mut self, error: &CodecError) {
        self.error = Some(error.to_string());
    }

    pub fn take_action(&mut self) -> Option<Action> {
        self.action.take()
    }
}

pub struct InputScreen<'a> {
    state: &'a mut InputState,
    theme: &'a Theme,
    mouse_event: Option<MouseEvent>,
}

impl<'a> InputScreen<'a> {
    pub fn new(state: &'a mut InputState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            mouse_event: None,
        }
    }

    pub fn mouse_event(mut self, mouse_event: Option<MouseEvent>) -> Self {
        self.mouse_event = mouse_event;
        self
    }
}

impl Widget for InputScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        buf.set_style(area, Style::default().bg(theme.background));

        let [header_area, main_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        render_title(theme).render(header_area, buf);

        let main_area = utils::center(
            main_area,
            Constraint::Max(100),
            Constraint::Percentage(100),
        );

        let [label_area, text_area, buttons_area, error_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .spacing(1)
        .margin(1)
        .areas(main_area);

        Paragraph::new("  Enter Base64 string here...")
            .style(Style::default().fg(theme.content))
            .render(label_area, buf);

        let title = format!("{} chars", self.state.text.len());
        let block = themed_block(Some(&title), theme).border_style(theme.focused);
        let inner = block.inner(text_area);
        block.render(text_area, buf);
        TextArea::new(&self.state.text)
            .style(Style::default().fg(theme.content))
            .placeholder(
                "paste or type base64 text",
                Style::default()
                    .fg(theme.border)
                    .add_modifier(Modifier::ITALIC),
            )
            .render(inner, buf);

        let [convert_area, _, clear_area] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(buttons_area);

        let state = &mut *self.state;
        Button::new("convert", theme)
            .key("enter")
            .mouse_event(self.mouse_event)
            .on_click(|| state.action = Some(Action::Convert))
            .render(convert_area, buf);

        Button::new("clear", theme)
            .key("ctrl+l")
            .variant(ButtonVariant::Secondary)
            .mouse_event(self.mouse_event)
            .on_click(|| state.action = Some(Action::Clear))
            .render(clear_area, buf);

        if let Some(error) = &state.error {
            Paragraph::new(Line::from(error.as_str()).centered())
                .style(
                    Style::default()
                        .fg(theme.error_fg)
                        .add_modifier(Modifier::BOLD),
                )
                .render(error_area, buf);
        }

        utils::key_hints(
            &[("enter", "convert"), ("ctrl+l", "clear"), ("ctrl+t", "theme"), ("esc", "quit")],
            theme,
        )
        .render(footer_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn typing_edits_text_and_enter_converts() {
        let mut state = InputState::new(None);
        assert_eq!(state.handle_key(press(KeyCode::Char('q'), KeyModifiers::NONE)), None);
        assert_eq!(state.text.value(), "q");
        assert_eq!(
            state.handle_key(press(KeyCode::Enter, KeyModifiers::NONE)),
            Some(Action::Convert)
        );
        assert_eq!(
            state.handle_key(press(KeyCode::Char('l'), KeyModifiers::CONTROL)),
            Some(Action::Clear)
        );
    }

    #[test]
    fn clear_resets_text_and_error() {
        let mut state = InputState::new(Some("abc".into()));
        state.show_error(&CodecError::EmptyInput);
        assert_eq!(state.error.as_deref(), Some("Please enter a Base64 string."));

        state.clear();
        assert!(state.text.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn renders_error_line() {
        let mut state = InputState::new(None);
        state.show_error(&CodecError::EmptyInput);
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);

        InputScreen::new(&mut state, &theme).render(area, &mut buf);

        let screen: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(screen.contains("Please enter a Base64 string."));
        assert!(screen.contains("Enter Base64 string here..."));
    }
}

use std::{borrow::Cow, path::Path};

use b64img::CodecError;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::{utils, Theme};

#[derive(Debug, Clone)]
pub struct ErrorInfo {
    pub title: Cow<'static, str>,
    pub message: Vec<Cow<'static, str>>,
    pub hint: Option<Cow<'static, str>>,
}

impl ErrorInfo {
    pub fn save_failed(path: &Path, error: &CodecError) -> Self {
        let hint = match error {
            CodecError::Write(_) => "check that the folder exists and is writable",
            CodecError::UnsupportedExtension(_) => "use a .png, .jpg or .jpeg file name",
            _ => "try saving as png instead",
        };
        Self {
            title: "save failed".into(),
            message: vec![
                "the image could not be saved".into(),
                "".into(),
                format!("file: {}", path.display()).into(),
                "".into(),
                format!("error: {error}").into(),
            ],
            hint: Some(hint.into()),
        }
    }
}

/// Centered popup over whatever is already in `area`
pub fn render_error_popup(theme: &Theme, error_info: &ErrorInfo, area: Rect, buf: &mut Buffer) {
    let message_block = Block::default()
        .borders(Borders::ALL)
        .border_type(utils::DEFAULT_BORDER_TYPE)
        .border_style(theme.error_fg)
        .bg(theme.error_bg)
        .title(error_info.title.as_ref())
        .title(Line::from("[esc/enter]").fg(theme.key_hint).right_aligned())
        .title_alignment(Alignment::Center);

    let content_height = error_info.message.len() + if error_info.hint.is_some() { 3 } else { 1 };
    let content_width = error_info
        .message
        .iter()
        .chain(error_info.hint.iter())
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let box_height = (content_height as u16 + 2).min(area.height);
    let box_width = (content_width as u16 + 6).max(30).min(area.width);

    let popup_area = utils::center(
        area,
        Constraint::Length(box_width),
        Constraint::Length(box_height),
    );

    Clear.render(popup_area, buf);
    let inner = message_block.inner(popup_area);
    message_block.render(popup_area, buf);

    let mut message_lines = vec![Line::from("")];

    for (i, line) in error_info.message.iter().enumerate() {
        let style = if i == 0 {
            Style::default()
                .fg(theme.content)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.content)
        };
        message_lines.push(Line::from(line.as_ref()).style(style));
    }

    if let Some(hint) = &error_info.hint {
        message_lines.push(Line::from(""));
        message_lines
            .push(Line::from(hint.as_ref()).style(Style::default().fg(theme.content).italic()));
    }

    let [msg_area] = Layout::vertical([Constraint::Length(message_lines.len() as u16)])
        .flex(Flex::Center)
        .areas(inner);

    Paragraph::new(message_lines)
        .alignment(Alignment::Center)
        .render(msg_area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_failed_mentions_path_and_cause() {
        let err = CodecError::Write(std::io::Error::other("permission denied"));
        let info = ErrorInfo::save_failed(Path::new("/nope/out.png"), &err);

        assert!(info.message.iter().any(|l| l.contains("/nope/out.png")));
        assert!(info.message.iter().any(|l| l.contains("permission denied")));
        assert_eq!(
            info.hint.as_deref(),
            Some("check that the folder exists and is writable")
        );
    }

    #[test]
    fn popup_fits_in_small_areas() {
        let err = CodecError::Write(std::io::Error::other("x"));
        let info = ErrorInfo::save_failed(Path::new("out.png"), &err);
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);

        render_error_popup(&Theme::dark(), &info, area, &mut buf);
    }
}

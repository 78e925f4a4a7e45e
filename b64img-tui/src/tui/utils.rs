use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Style, Styled},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

use crate::tui::Theme;

pub fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
    let [area] = Layout::horizontal([horizontal])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
    area
}

pub const DEFAULT_BORDER_TYPE: BorderType = BorderType::Rounded;

pub fn themed_block(title: Option<&str>, theme: &Theme) -> Block<'static> {
    let mut block = Block::default();
    if let Some(title) = title {
        block = block.title(themed_block_title(title, theme));
    }
    block
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(DEFAULT_BORDER_TYPE)
        .border_style(theme.border)
}

pub fn popup_block(title: &str, theme: &Theme) -> Block<'static> {
    let title = Line::from(format!(" {title} ")).set_style(theme.accent);

    Block::default()
        .title(title.centered())
        .borders(Borders::ALL)
        .border_style(theme.accent)
        .border_type(DEFAULT_BORDER_TYPE)
        .style(Style::default().bg(theme.background))
}

pub fn themed_block_title(text: &str, theme: &Theme) -> Line<'static> {
    let title = format!(" {text} ");
    Line::from(title).set_style(theme.content)
}

/// `key: action | key: action` footer line
pub fn key_hints(hints: &[(&'static str, &'static str)], theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(theme.border)));
        }
        spans.push(Span::styled(*key, Style::default().fg(theme.key_hint)));
        spans.push(Span::styled(
            format!(": {action}"),
            Style::default().fg(theme.content),
        ));
    }
    Line::from(spans).centered()
}

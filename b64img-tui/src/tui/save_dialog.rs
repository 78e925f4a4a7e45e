//! Save prompt: destination path plus a file-type filter

use std::path::{Path, PathBuf};

use b64img::{EncodeOptions, OutputFormat, PngCompression};
use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent},
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget},
};
use strum::IntoEnumIterator;

use crate::tui::{
    button::{Button, ButtonVariant},
    text_input::{TextArea, TextInput},
    utils::{self, popup_block},
    Theme,
};

const DEFAULT_FILE_STEM: &str = "image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirm,
    Cancel,
}

#[derive(Debug)]
pub struct SaveDialogState {
    pub path: TextInput,
    pub filter: OutputFormat,
    pub options: EncodeOptions,
    pub error: Option<String>,
    outcome: Option<DialogOutcome>,
}

impl SaveDialogState {
    pub fn new(dir: &Path, filter: OutputFormat, options: EncodeOptions) -> Self {
        let file = dir.join(format!("{DEFAULT_FILE_STEM}.{}", filter.extension()));
        Self {
            path: TextInput::new(file.to_string_lossy()),
            filter,
            options,
            error: None,
            outcome: None,
        }
    }

    pub fn take_outcome(&mut self) -> Option<DialogOutcome> {
        self.outcome.take()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let fine = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Enter => self.outcome = Some(DialogOutcome::Confirm),
            KeyCode::Esc => self.outcome = Some(DialogOutcome::Cancel),
            KeyCode::Tab | KeyCode::BackTab => self.toggle_filter(),
            KeyCode::Up => self.options.adjust(self.filter, true, fine),
            KeyCode::Down => self.options.adjust(self.filter, false, fine),
            _ => {
                if self.path.handle_key(key) {
                    self.error = None;
                }
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.path.insert_str(text.trim());
        self.error = None;
    }

    /// Switch between the JPEG and PNG filters. A path ending in the old
    /// filter's extension is rewritten to the new one.
    pub fn toggle_filter(&mut self) {
        let next = match self.filter {
            OutputFormat::Jpeg => OutputFormat::Png,
            OutputFormat::Png => OutputFormat::Jpeg,
        };

        let path = PathBuf::from(self.path.value());
        if OutputFormat::from_path(&path) == Some(self.filter) {
            self.path
                .set(path.with_extension(next.extension()).to_string_lossy());
        }

        self.filter = next;
        self.error = None;
    }

    /// Destination to hand to the codec.
    ///
    /// A missing extension gets the filter's; anything other than
    /// .png/.jpg/.jpeg is refused here, before the codec sees it.
    pub fn resolve_path(&self) -> Result<PathBuf, String> {
        let raw = self.path.value().trim();
        if raw.is_empty() {
            return Err("enter a file name".into());
        }

        let mut path = expand_home(raw);
        if path.file_name().is_none() {
            return Err("enter a file name, not a folder".into());
        }

        if path.extension().is_none() {
            path.set_extension(self.filter.extension());
        }

        match OutputFormat::from_path(&path) {
            Some(_) => Ok(path),
            None => Err("only .png, .jpg and .jpeg files can be saved".into()),
        }
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        #[allow(deprecated)]
        if let Some(home) = std::env::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

fn filter_label(format: OutputFormat) -> String {
    let patterns = format
        .extensions()
        .iter()
        .map(|ext| format!("*.{ext}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{format} ({patterns})")
}

fn encoder_setting(format: OutputFormat, options: &EncodeOptions) -> String {
    match format {
        OutputFormat::Jpeg => format!("quality {}", options.jpeg_quality),
        OutputFormat::Png => {
            let level = match options.png_compression {
                PngCompression::Fast => "fast",
                PngCompression::Default => "default",
                PngCompression::Best => "best",
            };
            format!("compression {level}")
        }
    }
}

/// What the up/down keys change for `format`
fn setting_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Jpeg => "quality",
        OutputFormat::Png => "compression",
    }
}

pub struct SaveDialog<'a> {
    state: &'a mut SaveDialogState,
    theme: &'a Theme,
    mouse_event: Option<MouseEvent>,
}

impl<'a> SaveDialog<'a> {
    pub fn new(state: &'a mut SaveDialogState, theme: &'a Theme) -> Self {
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

impl Widget for SaveDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let popup_area = utils::center(
            area,
            Constraint::Length(area.width.saturating_sub(4).min(70)),
            Constraint::Length(15.min(area.height)),
        );

        Clear.render(popup_area, buf);
        let block = popup_block("save image", theme);
        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let [path_label, path_area, _, type_area, setting_area, error_area, buttons_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .horizontal_margin(1)
            .areas(inner);

        let label_style = Style::default().fg(theme.border);
        let value_style = Style::default().fg(theme.content);

        Paragraph::new("file name")
            .style(label_style)
            .render(path_label, buf);

        TextArea::new(&self.state.path)
            .style(value_style.bg(theme.muted))
            .render(path_area, buf);

        let mut type_spans = vec![Span::styled("type  ", label_style)];
        for format in OutputFormat::iter() {
            let selected = format == self.state.filter;
            let style = if selected {
                Style::default()
                    .fg(theme.focused)
                    .add_modifier(Modifier::BOLD)
            } else {
                value_style
            };
            let marker = if selected { "● " } else { "○ " };
            type_spans.push(Span::styled(marker, style));
            type_spans.push(Span::styled(filter_label(format), style));
            type_spans.push(Span::raw("  "));
        }
        Paragraph::new(Line::from(type_spans)).render(type_area, buf);

        Paragraph::new(Line::from(vec![
            Span::styled("with  ", label_style),
            Span::styled(
                encoder_setting(self.state.filter, &self.state.options),
                value_style,
            ),
        ]))
        .render(setting_area, buf);

        if let Some(error) = &self.state.error {
            Paragraph::new(error.as_str())
                .style(Style::default().fg(theme.error_fg))
                .render(error_area, buf);
        }

        let [save_area, _, cancel_area] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(buttons_area);

        let state = &mut *self.state;
        Button::new("save", theme)
            .key("enter")
            .mouse_event(self.mouse_event)
            .on_click(|| state.outcome = Some(DialogOutcome::Confirm))
            .render(save_area, buf);

        Button::new("cancel", theme)
            .key("esc")
            .variant(ButtonVariant::Secondary)
            .mouse_event(self.mouse_event)
            .on_click(|| state.outcome = Some(DialogOutcome::Cancel))
            .render(cancel_area, buf);

        utils::key_hints(
            &[("tab", "file type"), ("↑/↓", setting_name(state.filter))],
            theme,
        )
        .render(hints_area, buf);
    }
}

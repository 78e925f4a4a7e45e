//! Single-field text editor, hard-wrapped at the area width

use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Editable text with a cursor measured in chars.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::new(value);
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map_or(self.value.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    /// Insert pasted text at the cursor. Carriage returns are dropped so
    /// CRLF clipboard content behaves like LF.
    pub fn insert_str(&mut self, text: &str) {
        let text: String = text.chars().filter(|&c| c != '\r').collect();
        let idx = self.byte_index(self.cursor);
        self.value.insert_str(idx, &text);
        self.cursor += text.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index(self.cursor);
        self.value.remove(idx);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let idx = self.byte_index(self.cursor);
            self.value.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.len();
    }

    /// Apply an editing key. Returns false for keys it doesn't handle.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => self.home(),
            KeyCode::Char('e') if ctrl => self.end(),
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char(_) if ctrl => return false,
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => return false,
        }
        true
    }
}

/// First wrapped line to show so the cursor line stays visible
fn first_visible_line(cursor: usize, width: usize, height: usize) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    let cursor_line = cursor / width;
    (cursor_line + 1).saturating_sub(height)
}

/// Renders a [`TextInput`] hard-wrapped every `area.width` chars. Only the
/// visible window is materialized, so multi-megabyte pastes stay cheap.
pub struct TextArea<'a> {
    input: &'a TextInput,
    style: Style,
    placeholder: Option<(&'a str, Style)>,
}

impl<'a> TextArea<'a> {
    pub fn new(input: &'a TextInput) -> Self {
        Self {
            input,
            style: Style::default(),
            placeholder: None,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn placeholder(mut self, text: &'a str, style: Style) -> Self {
        self.placeholder = Some((text, style));
        self
    }
}

impl Widget for TextArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width as usize;
        let height = area.height as usize;
        if width == 0 || height == 0 {
            return;
        }

        buf.set_style(area, self.style);

        let cursor_style = self.style.add_modifier(Modifier::REVERSED);

        if self.input.is_empty() {
            if let Some((text, style)) = self.placeholder {
                Paragraph::new(text).style(style).render(area, buf);
                buf[(area.x, area.y)].set_style(cursor_style);
                return;
            }
        }

        let first_line = first_visible_line(self.input.cursor(), width, height);
        let start = first_line * width;

        let visible: Vec<char> = self
            .input
            .value()
            .chars()
            .skip(start)
            .take(width * height)
            .collect();

        let mut lines = Vec::with_capacity(height);
        for (row, chunk) in visible.chunks(width).enumerate() {
            let mut spans = Vec::with_capacity(3);
            let row_start = start + row * width;
            let text: String = chunk.iter().map(|&c| display_char(c)).collect();

            let cursor = self.input.cursor();
            if (row_start..row_start + chunk.len()).contains(&cursor) {
                let col = cursor - row_start;
                let before: String = text.chars().take(col).collect();
                let at: String = text.chars().skip(col).take(1).collect();
                let after: String = text.chars().skip(col + 1).collect();
                spans.push(Span::styled(before, self.style));
                spans.push(Span::styled(at, cursor_style));
                spans.push(Span::styled(after, self.style));
            } else {
                spans.push(Span::styled(text, self.style));
            }
            lines.push(Line::from(spans));
        }

        // cursor sits after the last char
        if self.input.cursor() == self.input.len() {
            let end_offset = self.input.cursor() - start;
            if end_offset % width == 0 && lines.len() < height {
                lines.push(Line::from(Span::styled(" ", cursor_style)));
            } else if let Some(last) = lines.last_mut() {
                last.spans.push(Span::styled(" ", cursor_style));
            }
        }

        Paragraph::new(lines).render(area, buf);
    }
}

fn display_char(c: char) -> char {
    match c {
        '\n' => '↵',
        '\t' => '→',
        c if c.is_control() => '�',
        c => c,
    }
}

use std::path::PathBuf;
use std::sync::mpsc;

use b64img::DecodedImage;
use ratatui::{
    buffer::Buffer,
    crossterm::event::{KeyCode, KeyEvent, MouseEvent},
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, StatefulWidget, Widget},
};
use ratatui_image::{
    picker::Picker,
    thread::{ResizeRequest, ResizeResponse, ThreadProtocol},
    FilterType, Resize, ResizeEncodeRender, StatefulImage,
};

use crate::tui::{
    button::Button,
    error::{render_error_popup, ErrorInfo},
    save_dialog::{SaveDialog, SaveDialogState},
    utils::{self, themed_block},
    Action, Theme,
};

#[derive(Debug)]
pub enum Status {
    Saved(PathBuf),
    Failed(ErrorInfo),
}

/// Shows one decoded image, scaled to the terminal, with a save button
pub struct ViewerState {
    image: DecodedImage,
    font_size: (u16, u16),
    thread_protocol: ThreadProtocol,
    // false until the first scaled frame arrives from the resize worker
    preview_ready: bool,
    pub save_dialog: Option<SaveDialogState>,
    pub status: Option<Status>,
    action: Option<Action>,
}

impl ViewerState {
    pub fn new(image: DecodedImage, picker: &Picker, resize_tx: mpsc::Sender<ResizeRequest>) -> Self {
        let protocol = picker.new_resize_protocol(image.to_dynamic());
        let thread_protocol = ThreadProtocol::new(resize_tx, Some(protocol));

        Self {
            image,
            font_size: picker.font_size(),
            thread_protocol,
            preview_ready: false,
            save_dialog: None,
            status: None,
            action: None,
        }
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if let Some(dialog) = &mut self.save_dialog {
            dialog.handle_key(key);
            return None;
        }

        if matches!(self.status, Some(Status::Failed(_))) {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                self.status = None;
            }
            return None;
        }

        match key.code {
            KeyCode::Char('s') => Some(Action::OpenSaveDialog),
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseViewer),
            _ => None,
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        if let Some(dialog) = &mut self.save_dialog {
            dialog.handle_paste(text);
        }
    }

    pub fn handle_resize_complete(&mut self, response: ResizeResponse) {
        if self.thread_protocol.update_resized_protocol(response) {
            self.preview_ready = true;
        }
    }

    pub fn take_action(&mut self) -> Option<Action> {
        if let Some(dialog) = &mut self.save_dialog {
            if let Some(outcome) = dialog.take_outcome() {
                return Some(Action::SaveDialog(outcome));
            }
        }
        self.action.take()
    }
}

/// Largest rect inside `area` with the image's aspect ratio, centered.
///
/// Terminal cells are not square, so the ratio is corrected by the font's
/// cell size.
pub fn fit_image_area(area: Rect, image: (u32, u32), font_size: (u16, u16)) -> Rect {
    let (img_w, img_h) = image;
    let (font_w, font_h) = font_size;
    if img_w == 0 || img_h == 0 || font_w == 0 || font_h == 0 || area.is_empty() {
        return area;
    }

    // size in cells at 1:1 pixel scale
    let cells_w = img_w as f64 / font_w as f64;
    let cells_h = img_h as f64 / font_h as f64;

    let scale = (area.width as f64 / cells_w).min(area.height as f64 / cells_h);
    let width = ((cells_w * scale).round() as u16).clamp(1, area.width);
    let height = ((cells_h * scale).round() as u16).clamp(1, area.height);

    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;

    Rect::new(x, y, width, height)
}

pub struct ViewerScreen<'a> {
    state: &'a mut ViewerState,
    theme: &'a Theme,
    mouse_event: Option<MouseEvent>,
}

impl<'a> ViewerScreen<'a> {
    pub fn new(state: &'a mut ViewerState, theme: &'a Theme) -> Self {
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

impl Widget for ViewerScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        buf.set_style(area, Style::default().bg(theme.background));

        let [image_area, status_area, button_area, footer_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        let (width, height) = self.state.image.dimensions();
        let source = self
            .state
            .image
            .source_format()
            .map(|f| format!(" {f:?}"))
            .unwrap_or_default();
        let title = format!("converted image · {width}x{height}{source}");
        let block = themed_block(Some(&title), theme);
        let inner = block.inner(image_area);
        block.render(image_area, buf);

        let fitted = fit_image_area(inner, (width, height), self.state.font_size);
        render_preview(
            &mut self.state.thread_protocol,
            self.state.preview_ready,
            fitted,
            buf,
            theme,
        );

        match &self.state.status {
            Some(Status::Saved(path)) => {
                Paragraph::new(Line::from(vec![
                    Span::styled("saved ", Style::default().fg(theme.success)),
                    Span::styled(
                        path.display().to_string(),
                        Style::default().fg(theme.content),
                    ),
                ]))
                .alignment(Alignment::Center)
                .render(status_area, buf);
            }
            Some(Status::Failed(_)) | None => {}
        }

        let modal_open = self.state.save_dialog.is_some()
            || matches!(self.state.status, Some(Status::Failed(_)));

        let [button_area] = Layout::horizontal([Constraint::Length(20)])
            .flex(ratatui::layout::Flex::Center)
            .areas(button_area);

        let action = &mut self.state.action;
        Button::new("save", theme)
            .key("s")
            .enabled(!modal_open)
            .mouse_event(self.mouse_event)
            .on_click(|| *action = Some(Action::OpenSaveDialog))
            .render(button_area, buf);

        utils::key_hints(&[("s", "save"), ("esc/q", "back"), ("ctrl+c", "quit")], theme)
            .render(footer_area, buf);

        if let Some(dialog) = &mut self.state.save_dialog {
            SaveDialog::new(dialog, theme)
                .mouse_event(self.mouse_event)
                .render(area, buf);
        } else if let Some(Status::Failed(info)) = &self.state.status {
            render_error_popup(theme, info, area, buf);
        }
    }
}

fn render_preview(
    thread_protocol: &mut ThreadProtocol,
    ready: bool,
    area: Rect,
    buf: &mut Buffer,
    theme: &Theme,
) {
    let resize = Resize::Scale(Some(FilterType::Lanczos3));
    if ready {
        let image = StatefulImage::new().resize(resize);
        StatefulWidget::render(image, area, buf, thread_protocol);
        return;
    }

    if let Some(rect) = thread_protocol.needs_resize(&resize, area) {
        thread_protocol.resize_encode(&resize, rect);
    }
    render_image_placeholder(area, buf, theme);
}

fn render_image_placeholder(area: Rect, buf: &mut Buffer, theme: &Theme) {
    buf.set_style(area, Style::default().bg(theme.placeholder));
    let [middle] = Layout::vertical([Constraint::Length(1)])
        .flex(ratatui::layout::Flex::Center)
        .areas(area);
    Paragraph::new("scaling…")
        .style(
            Style::default()
                .fg(theme.border)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center)
        .render(middle, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_fills_width() {
        // 800x200 px with 8x16 cells = 100x12.5 cells
        let area = Rect::new(0, 0, 50, 40);
        let fitted = fit_image_area(area, (800, 200), (8, 16));
        assert_eq!(fitted.width, 50);
        assert_eq!(fitted.height, 6);
        assert_eq!(fitted.y, 17);
    }

    #[test]
    fn tall_image_fills_height() {
        let area = Rect::new(2, 1, 100, 20);
        let fitted = fit_image_area(area, (100, 400), (8, 16));
        assert_eq!(fitted.height, 20);
        assert_eq!(fitted.width, 10);
        assert_eq!(fitted.x, 2 + 45);
        assert_eq!(fitted.y, 1);
    }

    #[test]
    fn small_images_scale_up() {
        let area = Rect::new(0, 0, 40, 20);
        let fitted = fit_image_area(area, (8, 16), (8, 16));
        assert_eq!((fitted.width, fitted.height), (20, 20));
    }

    #[test]
    fn degenerate_inputs_return_area() {
        let area = Rect::new(0, 0, 40, 20);
        assert_eq!(fit_image_area(area, (0, 10), (8, 16)), area);
        assert_eq!(fit_image_area(area, (10, 10), (0, 16)), area);
    }
}

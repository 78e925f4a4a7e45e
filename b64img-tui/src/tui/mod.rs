pub mod button;
pub mod error;
pub mod input;
pub mod save_dialog;
pub mod text_input;
pub mod theme;
pub mod utils;
pub mod viewer;

pub use theme::Theme;

use std::{path::PathBuf, sync::mpsc, time::Instant};

use b64img::ImageCodec;
use ratatui::{
    backend::Backend,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind},
    style::{palette, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Terminal,
};
use ratatui_image::{picker::Picker, thread::ResizeRequest};
use tracing_error::SpanTrace;

use crate::{config::ViewerConfig, Event};
use error::ErrorInfo;
use input::{InputScreen, InputState};
use save_dialog::{DialogOutcome, SaveDialogState};
use viewer::{Status, ViewerScreen, ViewerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Convert,
    Clear,
    Quit,
    CloseViewer,
    OpenSaveDialog,
    SaveDialog(DialogOutcome),
    ToggleTheme,
}

pub struct App {
    pub theme: Theme,
    pub config: ViewerConfig,
    config_path: Option<PathBuf>,
    picker: Picker,
    resize_tx: mpsc::Sender<ResizeRequest>,
    pub input: InputState,
    pub viewer: Option<ViewerState>,
    last_mouse_click: Option<MouseEvent>,
}

impl App {
    pub fn new(
        theme: Theme,
        config: ViewerConfig,
        config_path: Option<PathBuf>,
        picker: Picker,
        resize_tx: mpsc::Sender<ResizeRequest>,
    ) -> Self {
        Self {
            theme,
            config,
            config_path,
            picker,
            resize_tx,
            input: InputState::default(),
            viewer: None,
            last_mouse_click: None,
        }
    }

    /// Global shortcuts first, then whichever screen is showing
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return Some(Action::Quit),
                KeyCode::Char('t') => return Some(Action::ToggleTheme),
                _ => {}
            }
        }

        match &mut self.viewer {
            Some(viewer) => viewer.handle_key(key),
            None => self.input.handle_key(key),
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if matches!(
            mouse.kind,
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Up(MouseButton::Left)
        ) {
            self.last_mouse_click = Some(mouse);
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        match &mut self.viewer {
            Some(viewer) => viewer.handle_paste(text),
            None => self.input.handle_paste(text),
        }
    }

    /// Action produced by a button during the last draw
    pub fn take_action(&mut self) -> Option<Action> {
        match &mut self.viewer {
            Some(viewer) => viewer.take_action(),
            None => self.input.take_action(),
        }
    }

    /// Returns false when the app should exit
    pub fn apply(&mut self, action: Action) -> bool {
        tracing::debug!(?action, "apply");
        match action {
            Action::Quit => return false,
            Action::ToggleTheme => self.theme.toggle(),
            Action::Clear => self.input.clear(),
            Action::Convert => self.convert(),
            Action::CloseViewer => self.viewer = None,
            Action::OpenSaveDialog => {
                if let Some(viewer) = &mut self.viewer {
                    if viewer.save_dialog.is_none() {
                        viewer.status = None;
                        viewer.save_dialog = Some(SaveDialogState::new(
                            &self.config.save_dir(),
                            self.config.save_format,
                            self.config.encode,
                        ));
                    }
                }
            }
            Action::SaveDialog(DialogOutcome::Cancel) => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.save_dialog = None;
                }
            }
            Action::SaveDialog(DialogOutcome::Confirm) => self.save(),
        }
        true
    }

    fn convert(&mut self) {
        let codec = ImageCodec::new(self.config.encode);
        match codec.decode(self.input.text.value()) {
            Ok(image) => {
                let (width, height) = image.dimensions();
                tracing::info!(width, height, source = ?image.source_format(), "decoded image");
                self.input.error = None;
                self.viewer = Some(ViewerState::new(
                    image,
                    &self.picker,
                    self.resize_tx.clone(),
                ));
            }
            Err(err) => {
                tracing::warn!(error = ?err, "decode failed");
                self.input.show_error(&err);
            }
        }
    }

    fn save(&mut self) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        let Some(dialog) = &mut viewer.save_dialog else {
            return;
        };

        let path = match dialog.resolve_path() {
            Ok(path) => path,
            Err(msg) => {
                dialog.error = Some(msg);
                return;
            }
        };
        let (options, filter) = (dialog.options, dialog.filter);

        let span = tracing::info_span!("save", path = %path.display());
        let _guard = span.enter();

        let started = Instant::now();
        let result = ImageCodec::new(options).save(viewer.image(), &path);
        viewer.save_dialog = None;

        match result {
            Ok(format) => {
                tracing::info!(%format, elapsed = ?started.elapsed(), "saved");

                self.config.encode = options;
                self.config.save_format = filter;
                self.config.last_dir = path.parent().map(PathBuf::from);
                if let Some(config_path) = &self.config_path {
                    if self.config.save_to(config_path).is_none() {
                        tracing::warn!("could not write {}", config_path.display());
                    }
                }

                viewer.status = Some(Status::Saved(path));
            }
            Err(err) => {
                let trace = SpanTrace::capture();
                tracing::error!(error = ?err, "save failed\n{trace}");
                viewer.status = Some(Status::Failed(ErrorInfo::save_failed(&path, &err)));
            }
        }
    }
}

pub fn run(
    terminal: &mut Terminal<impl Backend>,
    app: &mut App,
    event_rx: mpsc::Receiver<Event>,
) -> anyhow::Result<()> {
    let mut pending_events = Vec::new();
    let mut redraw = true;

    'outer: loop {
        // Collect all pending events
        while let Ok(event) = event_rx.try_recv() {
            pending_events.push(event);
        }
        redraw |= !pending_events.is_empty();

        if !process_events(terminal, app, &mut pending_events)? {
            break 'outer;
        }

        if redraw {
            draw(terminal, app)?;
            redraw = false;

            // buttons report clicks while rendering
            while let Some(action) = app.take_action() {
                if !app.apply(action) {
                    break 'outer;
                }
                redraw = true;
            }
            if redraw {
                continue;
            }
        }

        // Wait for next event
        match event_rx.recv() {
            Ok(event) => pending_events.push(event),
            Err(_) => break 'outer,
        }
    }

    Ok(())
}

fn draw(terminal: &mut Terminal<impl Backend>, app: &mut App) -> anyhow::Result<()> {
    terminal.draw(|frame| {
        let render_start = Instant::now();
        let area = frame.area();
        let mouse = app.last_mouse_click.take();

        match &mut app.viewer {
            Some(viewer) => ViewerScreen::new(viewer, &app.theme)
                .mouse_event(mouse)
                .render(area, frame.buffer_mut()),
            None => InputScreen::new(&mut app.input, &app.theme)
                .mouse_event(mouse)
                .render(area, frame.buffer_mut()),
        }

        let render_time = render_start.elapsed();
        if render_time > std::time::Duration::from_millis(50) {
            tracing::warn!("Render closure took {:?}", render_time);
        }
    })?;
    Ok(())
}

fn process_events(
    terminal: &mut Terminal<impl Backend>,
    app: &mut App,
    pending_events: &mut Vec<Event>,
) -> anyhow::Result<bool> {
    for event in pending_events.drain(..) {
        match event {
            Event::Key(key) => {
                if let Some(action) = app.handle_key(key) {
                    if !app.apply(action) {
                        return Ok(false);
                    }
                }
            }
            Event::Mouse(mouse) => app.handle_mouse(mouse),
            Event::Paste(text) => app.handle_paste(&text),
            Event::Resize => {
                terminal.autoresize()?;
            }
            Event::ResizeComplete(response) => {
                if let Some(viewer) = &mut app.viewer {
                    viewer.handle_resize_complete(response);
                }
            }
        }
    }
    Ok(true)
}

/// Encodes preview frames off the UI thread. Only the newest request is
/// served, older ones are stale by the time the worker gets to them.
pub fn resize_worker(rx: mpsc::Receiver<ResizeRequest>, tx: mpsc::Sender<Event>) {
    while let Ok(request) = rx.recv() {
        let request = get_latest(&rx).unwrap_or(request);
        match request.resize_encode() {
            Ok(response) => {
                if tx.send(Event::ResizeComplete(response)).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("resize_worker: Resize error: {:?}", e);
            }
        }
    }
}

fn get_latest<T>(rx: &mpsc::Receiver<T>) -> Option<T> {
    let mut latest = None;
    while let Ok(event) = rx.try_recv() {
        latest = Some(event);
    }
    latest
}

pub fn render_title(theme: &Theme) -> impl Widget {
    let modifier = Modifier::BOLD | Modifier::ITALIC;
    let shades = if theme.is_dark() {
        [
            palette::tailwind::SLATE.c100,
            palette::tailwind::SLATE.c200,
            palette::tailwind::SLATE.c300,
            palette::tailwind::SLATE.c400,
        ]
    } else {
        [
            palette::tailwind::SLATE.c900,
            palette::tailwind::SLATE.c800,
            palette::tailwind::SLATE.c700,
            palette::tailwind::SLATE.c600,
        ]
    };

    let styled_title = Line::from(
        "b64img"
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let color = shades[(i * shades.len()) / 6];
                Span::styled(
                    c.to_string(),
                    Style::default().fg(color).add_modifier(modifier),
                )
            })
            .collect::<Vec<_>>(),
    );

    Paragraph::new(styled_title.centered())
        .block(Block::new().borders(Borders::ALL).border_style(theme.border))
}

#[cfg(test)]
mod tests {
    use super::*;
    use b64img::OutputFormat;

    // 1x1 opaque PNG
    const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    fn app() -> App {
        let (resize_tx, _resize_rx) = mpsc::channel();
        App::new(
            Theme::dark(),
            ViewerConfig::default(),
            None,
            Picker::from_fontsize((8, 16)),
            resize_tx,
        )
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn invalid_input_shows_error_and_stays_on_input() {
        let mut app = app();
        app.input.text.set("not an image");
        assert!(app.apply(Action::Convert));
        assert!(app.viewer.is_none());
        assert_eq!(app.input.error.as_deref(), Some("Invalid Base64 string."));

        app.input.text.clear();
        app.apply(Action::Convert);
        assert_eq!(
            app.input.error.as_deref(),
            Some("Please enter a Base64 string.")
        );
    }

    #[test]
    fn valid_input_opens_viewer() {
        let mut app = app();
        app.input.text.set(PIXEL_PNG);
        app.apply(Action::Convert);

        let viewer = app.viewer.as_ref().expect("viewer");
        assert_eq!(viewer.image().dimensions(), (1, 1));
        assert!(app.input.error.is_none());

        app.apply(Action::CloseViewer);
        assert!(app.viewer.is_none());
        assert_eq!(app.input.text.value(), PIXEL_PNG);
    }

    #[test]
    fn global_keys() {
        let mut app = app();
        assert_eq!(
            app.handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(
            app.handle_key(key(KeyCode::Char('t'), KeyModifiers::CONTROL)),
            Some(Action::ToggleTheme)
        );
        assert!(!app.apply(Action::Quit));
        app.apply(Action::ToggleTheme);
        assert!(!app.theme.is_dark());
    }

    #[test]
    fn save_writes_file_and_remembers_choice() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let mut app = app();
        app.config_path = Some(config_path.clone());
        app.input.text.set(PIXEL_PNG);
        app.apply(Action::Convert);
        app.apply(Action::OpenSaveDialog);

        let target = dir.path().join("out.jpg");
        {
            let dialog = app
                .viewer
                .as_mut()
                .and_then(|v| v.save_dialog.as_mut())
                .expect("dialog");
            dialog.path.set(target.to_string_lossy());
            dialog.filter = OutputFormat::Jpeg;
        }
        app.apply(Action::SaveDialog(DialogOutcome::Confirm));

        let viewer = app.viewer.as_ref().unwrap();
        assert!(viewer.save_dialog.is_none());
        assert!(matches!(&viewer.status, Some(Status::Saved(p)) if *p == target));
        assert!(target.is_file());

        let saved = ViewerConfig::load_from(&config_path).unwrap();
        assert_eq!(saved.save_format, OutputFormat::Jpeg);
        assert_eq!(saved.last_dir.as_deref(), Some(dir.path()));
    }

    #[test]
    fn failed_save_shows_popup() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.input.text.set(PIXEL_PNG);
        app.apply(Action::Convert);
        app.apply(Action::OpenSaveDialog);

        let target = dir.path().join("missing").join("out.png");
        app.viewer
            .as_mut()
            .and_then(|v| v.save_dialog.as_mut())
            .unwrap()
            .path
            .set(target.to_string_lossy());
        app.apply(Action::SaveDialog(DialogOutcome::Confirm));

        let viewer = app.viewer.as_mut().unwrap();
        assert!(matches!(viewer.status, Some(Status::Failed(_))));
        assert!(!target.exists());

        // popup swallows keys until dismissed
        assert_eq!(viewer.handle_key(key(KeyCode::Char('s'), KeyModifiers::NONE)), None);
        viewer.handle_key(key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(viewer.status.is_none());
    }

    #[test]
    fn bad_path_keeps_dialog_open() {
        let mut app = app();
        app.input.text.set(PIXEL_PNG);
        app.apply(Action::Convert);
        app.apply(Action::OpenSaveDialog);
        app.viewer
            .as_mut()
            .and_then(|v| v.save_dialog.as_mut())
            .unwrap()
            .path
            .set("/tmp/out.bmp");
        app.apply(Action::SaveDialog(DialogOutcome::Confirm));

        let dialog = app.viewer.as_ref().unwrap().save_dialog.as_ref().unwrap();
        assert!(dialog.error.is_some());
    }
}

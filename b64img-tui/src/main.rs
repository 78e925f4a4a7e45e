mod config;
mod tui;

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::{mpsc, Mutex},
    thread,
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ratatui::crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste,
        EnableMouseCapture, KeyEventKind,
    },
    execute,
};
use ratatui_image::{picker::Picker, thread::ResizeResponse};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use crate::{
    config::ViewerConfig,
    tui::{Action, App, Theme},
};

#[derive(Parser, Debug)]
#[command(
    name = "b64img",
    about = "paste a base64 string, see the image, save it as png or jpeg",
    version
)]
struct Cli {
    /// file holding base64 text to decode on startup ("-" reads stdin)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// color theme
    #[arg(long, value_enum, default_value_t = ThemeChoice::Auto)]
    theme: ThemeChoice,

    /// where to write logs. defaults to b64img.log in the temp dir
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeChoice {
    Auto,
    Dark,
    Light,
}

pub enum Event {
    Key(event::KeyEvent),
    Mouse(event::MouseEvent),
    Paste(String),
    Resize,
    ResizeComplete(ResizeResponse),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("b64img.log"));
    setup_logging(&log_path)?;

    // read before the terminal switches to raw mode
    let initial_input = match &cli.input {
        Some(path) => Some(read_input(path)?),
        None => None,
    };

    let config_path = ViewerConfig::config_path();
    let config = config_path
        .as_deref()
        .and_then(ViewerConfig::load_from)
        .unwrap_or_default();

    // background detection talks to the terminal, so do it before ratatui takes over
    let theme = match cli.theme {
        ThemeChoice::Auto => Theme::detect(),
        ThemeChoice::Dark => Theme::dark(),
        ThemeChoice::Light => Theme::light(),
    };

    let mut terminal = ratatui::init();
    execute!(std::io::stdout(), EnableMouseCapture, EnableBracketedPaste)?;

    let picker = Picker::from_query_stdio().unwrap_or_else(|_| Picker::from_fontsize((8, 16)));
    tracing::info!(font_size = ?picker.font_size(), protocol = ?picker.protocol_type(), "terminal graphics");

    let (event_tx, event_rx) = mpsc::channel();
    let (resize_tx, resize_rx) = mpsc::channel();

    let worker_tx = event_tx.clone();
    thread::spawn(move || tui::resize_worker(resize_rx, worker_tx));

    thread::spawn(move || input_loop(event_tx));

    let mut app = App::new(theme, config, config_path, picker, resize_tx);
    if let Some(text) = initial_input {
        app.input.text.set(text.trim());
        app.apply(Action::Convert);
    }

    let result = tui::run(&mut terminal, &mut app, event_rx);

    execute!(std::io::stdout(), DisableMouseCapture, DisableBracketedPaste)?;
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!("app exited with error: {e:?}");
    }
    result
}

fn input_loop(tx: mpsc::Sender<Event>) {
    loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(e) => {
                tracing::error!("failed to read terminal event: {e}");
                break;
            }
        };

        let event = match event {
            event::Event::Key(key) if key.kind == KeyEventKind::Press => Event::Key(key),
            event::Event::Mouse(mouse) => Event::Mouse(mouse),
            event::Event::Paste(text) => Event::Paste(text),
            event::Event::Resize(_, _) => Event::Resize,
            _ => continue,
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn setup_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)?;

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(tracing_error::ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber)?;
    // route `log` records from the codec crate into the same file
    tracing_log::LogTracer::init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn theme_flag() {
        let cli = Cli::try_parse_from(["b64img", "--theme", "light"]).unwrap();
        assert_eq!(cli.theme, ThemeChoice::Light);
        assert!(Cli::try_parse_from(["b64img", "--theme", "blue"]).is_err());
    }

    #[test]
    fn reads_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, "aGk=\n").unwrap();
        assert_eq!(read_input(&path).unwrap(), "aGk=\n");
        assert!(read_input(&dir.path().join("missing")).is_err());
    }
}

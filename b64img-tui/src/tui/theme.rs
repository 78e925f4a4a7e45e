use ratatui::style::{palette, Color};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeMode {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub mode: ThemeMode,
    pub border: Color,
    pub content: Color,
    pub background: Color,
    pub muted: Color,
    pub focused: Color,
    pub accent: Color,

    pub primary: Color,
    pub primary_bg: Color,
    pub primary_pressed: Color,

    pub secondary: Color,
    pub secondary_bg: Color,
    pub secondary_pressed: Color,

    pub key_hint: Color,
    pub error_fg: Color,
    pub error_bg: Color,
    pub success: Color,
    // placeholder shown while the image is being scaled
    pub placeholder: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            mode: ThemeMode::Dark,
            border: palette::tailwind::SLATE.c400,
            content: palette::tailwind::SLATE.c200,
            background: palette::tailwind::SLATE.c950,
            muted: palette::tailwind::SLATE.c700,
            focused: palette::tailwind::AMBER.c400,
            accent: palette::tailwind::AMBER.c300,
            primary: palette::tailwind::CYAN.c200,
            primary_bg: palette::tailwind::CYAN.c600,
            primary_pressed: palette::tailwind::CYAN.c500,
            secondary: palette::tailwind::FUCHSIA.c300,
            secondary_bg: palette::tailwind::FUCHSIA.c600,
            secondary_pressed: palette::tailwind::FUCHSIA.c500,
            key_hint: palette::tailwind::YELLOW.c300,
            error_fg: palette::tailwind::RED.c400,
            error_bg: palette::tailwind::RED.c800,
            success: palette::tailwind::EMERALD.c400,
            placeholder: palette::tailwind::SLATE.c800,
        }
    }

    pub fn light() -> Self {
        // paper-like theme inspired by solarized light
        Self {
            mode: ThemeMode::Light,
            border: Color::Rgb(101, 123, 131), // Solarized base00
            content: Color::Rgb(88, 110, 117), // Solarized base01
            background: Color::Rgb(253, 246, 227), // Solarized base3
            muted: Color::Rgb(238, 232, 213),  // Solarized base2
            focused: Color::Rgb(181, 137, 0),  // Solarized yellow
            accent: Color::Rgb(203, 75, 22),   // Solarized orange
            primary: palette::tailwind::SKY.c500,
            primary_bg: palette::tailwind::SKY.c200,
            primary_pressed: palette::tailwind::SKY.c100,
            secondary: palette::tailwind::VIOLET.c500,
            secondary_bg: palette::tailwind::VIOLET.c200,
            secondary_pressed: palette::tailwind::VIOLET.c100,
            key_hint: Color::Rgb(133, 153, 0), // Solarized green
            error_fg: palette::tailwind::RED.c800,
            error_bg: palette::tailwind::RED.c100,
            success: palette::tailwind::EMERALD.c700,
            placeholder: Color::Rgb(238, 232, 213),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.mode == ThemeMode::Dark
    }

    pub fn toggle(&mut self) {
        *self = match self.mode {
            ThemeMode::Dark => Self::light(),
            ThemeMode::Light => Self::dark(),
        };
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Detect terminal background and return appropriate theme using termbg
    /// Falls back to dark theme if detection fails or times out
    pub fn detect() -> Self {
        use std::time::Duration;

        match termbg::theme(Duration::from_millis(100)) {
            Ok(termbg::Theme::Light) => Self::light(),
            Ok(termbg::Theme::Dark) => Self::dark(),
            Err(e) => {
                log::debug!("Terminal background detection failed: {e}");
                Self::dark()
            }
        }
    }
}

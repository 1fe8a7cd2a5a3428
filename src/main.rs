//! Clumptui: clear groups of same-coloured tiles in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use clumptui::GameConfig;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let (default_w, default_h) = args.size.dims();
    let config = GameConfig {
        width: args.width.map_or(default_w, usize::from),
        height: args.height.map_or(default_h, usize::from),
        colors: args.colors,
        palette_len: theme::PALETTE_LEN,
    };
    // reject bad sizes before the terminal is switched to raw mode
    config.validate()?;

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("failed to load theme: {e}, using defaults");
        theme::Theme::default()
    });
    log::info!(
        "clumptui {} starting: {}x{} board, {} colours",
        env!("CARGO_PKG_VERSION"),
        config.width,
        config.height,
        config.colors
    );
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Logs go to a file when one is given; stderr would draw over the TUI.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            if std::env::var_os("RUST_LOG").is_none() {
                builder.filter_level(log::LevelFilter::Info);
            }
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            if std::env::var_os("RUST_LOG").is_none() {
                builder.filter_level(log::LevelFilter::Off);
            }
        }
    }
    builder.try_init()?;
    Ok(())
}

/// SameGame-style tile clearing puzzle in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "clumptui",
    version,
    about = "SameGame-style puzzle in the terminal. Clear groups of two or more same-coloured tiles.",
    long_about = "Clumptui is a terminal puzzle in the SameGame family.\n\n\
        Pick a group of two or more touching tiles of one colour to remove it. Tiles above fall \
        down and empty columns close up to the left. A group of n tiles scores n*n; finishing \
        with fewer than 50 tiles left earns 100 bonus points per tile short of 50.\n\n\
        CONTROLS (normal):\n  Arrows      Move cursor   Enter/Space Remove group\n  Mouse       Hover/click   R           Restart\n  P           Pause         Q / Esc     Quit\n\n\
        CONTROLS (vim):\n  h/j/k/l     Move cursor   x           Remove group\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Board size preset.
    #[arg(short, long, default_value = "medium")]
    pub size: BoardSize,

    /// Board width in columns; overrides the preset.
    #[arg(long, value_name = "COLS")]
    pub width: Option<u16>,

    /// Board height in rows; overrides the preset.
    #[arg(long, value_name = "ROWS")]
    pub height: Option<u16>,

    /// Number of tile colours (1 to 6).
    #[arg(short, long, default_value = "4", value_name = "N")]
    pub colors: u8,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Seed for the board generator; the same seed deals the same boards.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Disable removal animation (groups vanish instantly).
    #[arg(long)]
    pub no_animation: bool,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Write logs to this file. Level from RUST_LOG, info by default.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BoardSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl BoardSize {
    pub const ALL: [BoardSize; 3] = [BoardSize::Small, BoardSize::Medium, BoardSize::Large];

    /// Columns and rows.
    pub fn dims(self) -> (usize, usize) {
        match self {
            BoardSize::Small => (10, 8),
            BoardSize::Medium => (15, 10),
            BoardSize::Large => (20, 14),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BoardSize::Small => "Small",
            BoardSize::Medium => "Medium",
            BoardSize::Large => "Large",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["clumptui"]).unwrap();
        assert_eq!(args.size, BoardSize::Medium);
        assert_eq!(args.colors, 4);
        assert_eq!(args.palette, Palette::Normal);
        assert!(args.seed.is_none());
    }

    #[test]
    fn test_size_and_overrides() {
        let args = Args::try_parse_from([
            "clumptui", "--size", "small", "--width", "12", "--palette", "colourblind",
        ])
        .unwrap();
        assert_eq!(args.size.dims(), (10, 8));
        assert_eq!(args.width, Some(12));
        assert_eq!(args.height, None);
        assert_eq!(args.palette, Palette::Colorblind);
    }

    #[test]
    fn test_presets_fit_palette() {
        for size in BoardSize::ALL {
            let (width, height) = size.dims();
            let config = GameConfig {
                width,
                height,
                colors: 6,
                palette_len: theme::PALETTE_LEN,
            };
            assert!(config.validate().is_ok(), "{}", size.label());
        }
    }
}

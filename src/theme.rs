//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use log::warn;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Number of tile colours a theme provides.
pub const PALETTE_LEN: usize = 6;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile colours (index 0..=5): red, blue, yellow, green, magenta, cyan.
    pub tiles: [Color; PALETTE_LEN],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, bonus).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and the cursor over empty cells.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

/// Hex literal known to be valid at compile time.
fn hex(s: &str) -> Color {
    parse_hex(s).unwrap_or(Color::Reset)
}

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            tiles: [
                hex("#E06C75"), // cpu_end / red
                hex("#61AFEF"), // cpu_box / blue
                hex("#E5C07B"), // title / yellow
                hex("#98C379"), // mem_box / green
                hex("#C678DD"), // net_box / magenta
                hex("#56B6C2"), // hi_fg / cyan
            ],
            bg: hex("#31353F"),
            div_line: hex("#3F444F"),
            main_fg: hex("#ABB2BF"),
            title: hex("#E5C07B"),
            inactive_fg: hex("#5C6370"),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            Some(p) => {
                warn!("theme file {} not found, using defaults", p.display());
                return Ok(Self::default_for_palette(palette));
            }
            None => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.tiles = [
                    hex("#FF0000"),
                    hex("#0088FF"),
                    hex("#FFFF00"),
                    hex("#00FF00"),
                    hex("#FF00FF"),
                    hex("#00FFFF"),
                ];
            }
            crate::Palette::Colorblind => {
                // Tol "vibrant": distinguishable without red/green contrast
                self.tiles = [
                    hex("#CC3311"),
                    hex("#0077BB"),
                    hex("#EE7733"),
                    hex("#009988"),
                    hex("#EE3377"),
                    hex("#BBBBBB"),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        Self {
            tiles: [
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(d.tiles[0]),
                get("cpu_box").unwrap_or(d.tiles[1]),
                get("title").or_else(|| get("cpu_mid")).unwrap_or(d.tiles[2]),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(d.tiles[3]),
                get("net_box").unwrap_or(d.tiles[4]),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(d.tiles[5]),
            ],
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Tile colour for a palette index.
    #[inline]
    pub fn tile_color(&self, index: u8) -> Color {
        self.tiles[(index as usize) % PALETTE_LEN]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(&invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

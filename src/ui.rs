//! Layout and drawing: menu, board, sidebar, pause, quit menu, game over.

use crate::app::{GameOverReason, MenuState, MenuTab, QuitOption, Screen};
use crate::theme::Theme;
use crate::BoardSize;
use clumptui::{Board, Cell, GameSession, Position};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position as ScreenPosition, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each tile is two terminal columns wide so it reads roughly square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;
const SIDEBAR_WIDTH: u16 = 26;

/// Duration of the removal fade (TachyonFX) in ms.
const REMOVAL_FADE_MS: u32 = 220;

/// Board size in terminal cells including the border.
fn board_pixel_size(width: usize, height: usize) -> (u16, u16) {
    (
        width as u16 * CELL_WIDTH + 2,
        height as u16 * CELL_HEIGHT + 2,
    )
}

/// Max board size (columns, rows) in tiles that fits the given terminal size.
pub fn max_board_cells_for_terminal(term_cols: u16, term_rows: u16) -> (u16, u16) {
    let max_w = term_cols.saturating_sub(2).saturating_sub(SIDEBAR_WIDTH);
    let max_h = term_rows.saturating_sub(2);
    (max_w / CELL_WIDTH, max_h / CELL_HEIGHT)
}

/// Board size that fits the terminal, at least 1x1.
pub fn board_size_for_terminal_clamped(term_cols: u16, term_rows: u16) -> (u16, u16) {
    let (w, h) = max_board_cells_for_terminal(term_cols, term_rows);
    (w.max(1), h.max(1))
}

/// Outer board rect and sidebar rect, centred in `area`.
fn game_layout(area: Rect, board: &Board) -> (Rect, Rect) {
    let (pw, ph) = board_pixel_size(board.width(), board.height());
    let total_w = pw + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(ph) / 2;
    let board_outer = Rect {
        x,
        y,
        width: pw.min(area.width),
        height: ph.min(area.height),
    };
    let sidebar = Rect {
        x: x + pw,
        y,
        width: SIDEBAR_WIDTH.min(area.width.saturating_sub(pw)),
        height: (area.y + area.height).saturating_sub(y),
    };
    (board_outer, sidebar)
}

/// Board interior (tiles only, no border).
fn board_rect(area: Rect, board: &Board) -> Rect {
    let (outer, _) = game_layout(area, board);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: (board.width() as u16 * CELL_WIDTH).min(outer.width.saturating_sub(2)),
        height: (board.height() as u16 * CELL_HEIGHT).min(outer.height.saturating_sub(2)),
    }
}

/// Board cell under the terminal position (column, row), if any.
pub fn cell_at(area: Rect, board: &Board, column: u16, row: u16) -> Option<Position> {
    let rect = board_rect(area, board);
    if !rect.contains(ScreenPosition::new(column, row)) {
        return None;
    }
    let x = ((column - rect.x) / CELL_WIDTH) as usize;
    let y = ((row - rect.y) / CELL_HEIGHT) as usize;
    board.contains(x, y).then_some(Position::new(x, y))
}

/// Scale an RGB colour; named colours are mapped to RGB first.
fn shade(color: Color, factor: f32) -> Color {
    let (r, g, b) = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Red => (255, 0, 0),
        Color::Green => (0, 255, 0),
        Color::Yellow => (255, 255, 0),
        Color::Blue => (0, 0, 255),
        Color::Magenta => (255, 0, 255),
        Color::Cyan => (0, 255, 255),
        Color::Gray => (128, 128, 128),
        Color::DarkGray => (64, 64, 64),
        Color::White => (255, 255, 255),
        _ => (128, 128, 128),
    };
    Color::Rgb(
        (r as f32 * factor).min(255.0) as u8,
        (g as f32 * factor).min(255.0) as u8,
        (b as f32 * factor).min(255.0) as u8,
    )
}

/// Buffer positions covered by the given board cells.
fn cells_to_buffer_positions(rect: Rect, cells: &[Position]) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for p in cells {
        let x0 = rect.x + p.x as u16 * CELL_WIDTH;
        let y0 = rect.y + p.y as u16 * CELL_HEIGHT;
        for bx in x0..(x0 + CELL_WIDTH).min(rect.x + rect.width) {
            for by in y0..(y0 + CELL_HEIGHT).min(rect.y + rect.height) {
                set.insert((bx, by));
            }
        }
    }
    set
}

/// Create or advance the removal fade: the cells of the chosen cluster fade to the background.
fn apply_removal_effect(
    frame: &mut Frame,
    board: &Board,
    theme: &Theme,
    area: Rect,
    cells: &[Position],
    removal_effect: &mut Option<Effect>,
    removal_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let rect = board_rect(area, board);
    let delta = removal_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *removal_process_time = Some(now);

    if removal_effect.is_none() {
        let positions = cells_to_buffer_positions(rect, cells);
        let filter = CellFilter::PositionFn(ref_count(move |pos: ScreenPosition| {
            positions.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_to(theme.bg, theme.bg, (REMOVAL_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(rect);
        *removal_effect = Some(effect);
    }

    if let Some(effect) = removal_effect {
        frame.render_effect(effect, rect, TfxDuration::from_millis(delta_ms));
    }
}

/// Everything the game screens need besides the frame.
pub struct GameView<'a> {
    pub session: &'a GameSession,
    pub theme: &'a Theme,
    pub colors: u8,
    pub cursor: Position,
    pub paused: bool,
    pub game_start: Instant,
    pub game_over_reason: Option<GameOverReason>,
    pub quit_selected: QuitOption,
    /// Cluster currently fading out, if an animated removal is running.
    pub removing: Option<&'a [Position]>,
}

/// Draw current screen, with pause/quit overlays and the removal fade.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    view: &GameView<'_>,
    menu_state: &MenuState,
    removal_effect: &mut Option<Effect>,
    removal_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    match screen {
        Screen::Menu => draw_menu(frame, view.theme, menu_state, area, now),
        Screen::Playing => {
            draw_game(frame, view, area, now);
            if view.paused {
                draw_pause_overlay(frame, view.theme, area);
            }
            if let Some(cells) = view.removing {
                apply_removal_effect(
                    frame,
                    view.session.snapshot(),
                    view.theme,
                    area,
                    cells,
                    removal_effect,
                    removal_process_time,
                    now,
                );
            }
        }
        Screen::QuitMenu => {
            draw_game(frame, view, area, now);
            draw_quit_menu(frame, view.theme, view.quit_selected);
        }
        Screen::GameOver => {
            draw_game(frame, view, area, now);
            draw_game_over(frame, view, area);
        }
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_menu(frame: &mut Frame, theme: &Theme, menu_state: &MenuState, area: Rect, now: Instant) {
    let popup = centered(area, 48, 20);

    let title = Line::from(vec![
        Span::styled(" Clump ", Style::default().fg(theme.tile_color(0)).bold()),
        Span::styled(" tui ", Style::default().fg(theme.main_fg).bold()),
    ]);

    let highlight_style = Style::default().fg(Color::Black).bg(theme.title).bold();
    let selected_style = Style::default().fg(theme.title).bold();
    let normal_style = Style::default().fg(theme.main_fg);
    let tab_style = |tab: MenuTab, selected: bool| {
        if selected && menu_state.current_tab == tab {
            highlight_style
        } else if selected {
            selected_style
        } else {
            normal_style
        }
    };

    let mut colour_spans = Vec::new();
    for n in crate::app::MENU_COLORS {
        let selected = menu_state.selected_colors == n;
        colour_spans.push(Span::styled(format!(" {n} "), tab_style(MenuTab::Colours, selected)));
        colour_spans.push(Span::from(" "));
    }

    let mut size_spans = Vec::new();
    for size in BoardSize::ALL {
        let (w, h) = size.dims();
        let selected = menu_state.selected_size == size;
        size_spans.push(Span::styled(
            format!(" {} {}×{} ", size.label(), w, h),
            tab_style(MenuTab::Size, selected),
        ));
    }

    let start_style = if menu_state.current_tab == MenuTab::Start {
        highlight_style
    } else {
        normal_style
    };

    // swatch of the colours that will be in play
    let swatch: Vec<Span> = (0..menu_state.selected_colors)
        .map(|i| Span::styled("██ ", Style::default().fg(theme.tile_color(i))))
        .collect();

    let lines = vec![
        Line::from(""),
        title,
        Line::from(""),
        Line::from(Span::styled(" ─ COLOURS ─ ", Style::default().fg(theme.div_line))),
        Line::from(colour_spans),
        Line::from(swatch),
        Line::from(""),
        Line::from(Span::styled(" ─ BOARD ─ ", Style::default().fg(theme.div_line))),
        Line::from(size_spans),
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(" [ START ] ", start_style)),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", Style::default().fg(theme.tile_color(1))),
            Span::from("NAVIGATE   "),
            Span::styled(" ↔ ", Style::default().fg(theme.tile_color(1))),
            Span::from("CHANGE   "),
            Span::styled(" ENTER ", Style::default().fg(theme.tile_color(1))),
            Span::from("PLAY"),
        ]),
        Line::from(""),
        Line::from(Span::styled(" [Q] QUIT ", Style::default().fg(theme.tile_color(0)))),
    ];

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );

    // Startup animation: slide in from bottom, ease-out cubic
    let elapsed = now.duration_since(menu_state.animation_start).as_millis() as u32;
    let t = (elapsed as f32 / 500.0).min(1.0);
    let offset_t = 1.0 - (1.0 - t).powi(3);
    let mut anim_popup = popup;
    anim_popup.y += ((1.0 - offset_t) * 10.0) as u16;
    anim_popup.height = anim_popup
        .height
        .min((area.y + area.height).saturating_sub(anim_popup.y));

    p.render(anim_popup, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Q — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, view: &GameView<'_>, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 32, 12);
    let title = match view.game_over_reason {
        Some(GameOverReason::Cleared) => " Board cleared! ",
        _ => " No moves left ",
    };
    let score = view.session.score();
    let elapsed = view.game_start.elapsed().as_secs();
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", score.score), fg)),
        Line::from(Span::styled(format!(" Bonus: {} ", score.score_left), fg)),
        Line::from(Span::styled(
            format!(" Total: {} ", score.score_total),
            Style::default().fg(theme.title).bold(),
        )),
        Line::from(Span::styled(
            format!(
                " {} tiles left · {} moves · {:02}:{:02} ",
                view.session.cells_remaining(),
                view.session.moves(),
                elapsed / 60,
                elapsed % 60
            ),
            fg,
        )),
        Line::from(""),
        Line::from(Span::styled(" R — Restart    Q — Quit ", fg)),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Clumptui ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

/// Draw game: board + sidebar, centred.
fn draw_game(frame: &mut Frame, view: &GameView<'_>, area: Rect, now: Instant) {
    let board = view.session.snapshot();
    let (board_area, sidebar_area) = game_layout(area, board);
    draw_board(frame, view, board_area, area);
    draw_sidebar(frame, view, sidebar_area, now);
}

fn draw_board(frame: &mut Frame, view: &GameView<'_>, outer: Rect, area: Rect) {
    let theme = view.theme;
    let board = view.session.snapshot();
    let title = format!(" Clumptui  | Moves: {} ", view.session.moves());
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, theme.title))
        .render(outer, frame.buffer_mut());

    let rect = board_rect(area, board);
    let preview: HashSet<Position> = view.session.previewed_cluster().iter().copied().collect();
    let show_cursor = view.removing.is_none();
    let buf = frame.buffer_mut();

    for x in 0..board.width() {
        for y in 0..board.height() {
            let rx = rect.x + x as u16 * CELL_WIDTH;
            let ry = rect.y + y as u16 * CELL_HEIGHT;
            if rx + CELL_WIDTH > rect.x + rect.width || ry >= rect.y + rect.height {
                continue;
            }
            let pos = Position::new(x, y);
            let cell = board.get(x, y).unwrap_or(Cell::Empty);
            let (symbol, style) = match cell {
                Cell::Empty => (" ", Style::default().bg(theme.bg)),
                Cell::Tile(i) => {
                    let base = theme.tile_color(i);
                    if preview.contains(&pos) {
                        ("▓", Style::default().fg(shade(base, 1.3)).bg(shade(base, 0.8)))
                    } else if preview.is_empty() {
                        ("█", Style::default().fg(base).bg(theme.bg))
                    } else {
                        ("█", Style::default().fg(shade(base, 0.75)).bg(theme.bg))
                    }
                }
            };
            for dx in 0..CELL_WIDTH {
                buf[(rx + dx, ry)].set_symbol(symbol).set_style(style);
            }

            if show_cursor && pos == view.cursor {
                let bg = match cell {
                    Cell::Empty => theme.bg,
                    Cell::Tile(i) => theme.tile_color(i),
                };
                let cursor_style = Style::default().fg(theme.main_fg).bg(bg).bold();
                buf[(rx, ry)].set_symbol("[").set_style(cursor_style);
                buf[(rx + CELL_WIDTH - 1, ry)].set_symbol("]").set_style(cursor_style);
            }
        }
    }
}

fn draw_sidebar(frame: &mut Frame, view: &GameView<'_>, area: Rect, now: Instant) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);
    let session = view.session;
    let score = session.score();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Score
            Constraint::Length(1), // gap
            Constraint::Length(6), // Board stats
            Constraint::Length(1), // gap
            Constraint::Length(4), // Colours
        ])
        .split(area);

    // --- Score ---
    let score_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Score ", title_style));
    let score_inner = score_block.inner(chunks[0]);
    score_block.render(chunks[0], frame.buffer_mut());
    let preview_line = if session.preview_points() > 0 {
        Line::from(vec![
            Span::styled("Preview: ", title_style),
            Span::styled(
                format!("+{} ({})", session.preview_points(), session.previewed_cluster().len()),
                Style::default().fg(Color::Yellow).bold(),
            ),
        ])
    } else {
        Line::from(Span::styled("Preview: -", Style::default().fg(theme.inactive_fg)))
    };
    Paragraph::new(Text::from(vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(score.score.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Bonus: ", title_style),
            Span::styled(score.score_left.to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Total: ", title_style),
            Span::styled(score.score_total.to_string(), fg_style.bold()),
        ]),
        preview_line,
    ]))
    .render(score_inner, frame.buffer_mut());

    // --- Board stats ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Board ", title_style));
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let elapsed = now.duration_since(view.game_start).as_secs();
    Paragraph::new(Text::from(vec![
        Line::from(vec![
            Span::styled("Tiles: ", title_style),
            Span::styled(session.cells_remaining().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Groups: ", title_style),
            Span::styled(session.moves_available().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Moves: ", title_style),
            Span::styled(session.moves().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Time: ", title_style),
            Span::styled(format!("{:02}:{:02}", elapsed / 60, elapsed % 60), fg_style),
        ]),
    ]))
    .render(stats_inner, frame.buffer_mut());

    // --- Colours ---
    let colours_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Colours ", title_style));
    let colours_inner = colours_block.inner(chunks[4]);
    colours_block.render(chunks[4], frame.buffer_mut());
    draw_colour_strip(frame, theme, view.colors, colours_inner);
}

/// Draw one block per colour in play.
fn draw_colour_strip(frame: &mut Frame, theme: &Theme, colors: u8, area: Rect) {
    let n = colors.max(1) as u16;
    let block_w = (area.width / n).max(1);
    for i in 0..colors {
        let r = Rect {
            x: area.x + i as u16 * block_w,
            y: area.y,
            width: block_w.saturating_sub(1).max(1),
            height: area.height.min(1),
        }
        .intersection(area);
        let c = theme.tile_color(i);
        Paragraph::new("██████")
            .style(Style::default().fg(c).bg(theme.bg))
            .render(r, frame.buffer_mut());
    }
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title))
        .title(" Quit? ");

    Clear.render(quit_rect, frame.buffer_mut());
    frame
        .buffer_mut()
        .set_style(quit_rect, Style::default().bg(theme.bg));

    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];

    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default().fg(theme.bg).bg(theme.title).bold()
        } else {
            Style::default().fg(theme.title)
        };
        let rx = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        let ry = inner.y + 1 + i as u16 * 2;
        if ry < inner.y + inner.height {
            frame.buffer_mut().set_string(rx, ry, label, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(w: usize, h: usize) -> Board {
        Board::empty(w, h)
    }

    #[test]
    fn test_terminal_fit() {
        // 80x24 terminal: (80 - 2 - 26) / 2 = 26 columns, 22 rows
        assert_eq!(max_board_cells_for_terminal(80, 24), (26, 22));
        assert_eq!(board_size_for_terminal_clamped(10, 2), (1, 1));
    }

    #[test]
    fn test_cell_at_maps_screen_to_board() {
        let area = Rect::new(0, 0, 80, 24);
        let b = board(10, 10);
        let rect = board_rect(area, &b);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.height, 10);
        assert_eq!(cell_at(area, &b, rect.x, rect.y), Some(Position::new(0, 0)));
        assert_eq!(cell_at(area, &b, rect.x + 1, rect.y), Some(Position::new(0, 0)));
        assert_eq!(cell_at(area, &b, rect.x + 2, rect.y + 3), Some(Position::new(1, 3)));
        assert_eq!(
            cell_at(area, &b, rect.x + 19, rect.y + 9),
            Some(Position::new(9, 9))
        );
        assert_eq!(cell_at(area, &b, rect.x + 20, rect.y), None);
        assert_eq!(cell_at(area, &b, rect.x.saturating_sub(1), rect.y), None);
        assert_eq!(cell_at(area, &b, rect.x, rect.y + 10), None);
    }

    #[test]
    fn test_shade_scales_rgb() {
        assert_eq!(shade(Color::Rgb(100, 200, 50), 0.5), Color::Rgb(50, 100, 25));
        assert_eq!(shade(Color::Rgb(200, 200, 200), 2.0), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn test_buffer_positions_cover_cell_width() {
        let rect = Rect::new(5, 5, 20, 10);
        let set = cells_to_buffer_positions(rect, &[Position::new(1, 2)]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&(7, 7)));
        assert!(set.contains(&(8, 7)));
    }
}

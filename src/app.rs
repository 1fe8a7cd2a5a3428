//! App: terminal init, main loop and input handling.

use crate::input::{Action, key_to_action, mouse_to_action};
use crate::theme::Theme;
use crate::ui::{self, GameView};
use crate::{Args, BoardSize};
use anyhow::Result;
use clumptui::{GameConfig, GameSession, Position};
use crossterm::event::{self, Event, KeyEventKind};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Colour counts offered in the menu.
pub const MENU_COLORS: [u8; 4] = [3, 4, 5, 6];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// Tiles remain but none touches another of its colour.
    NoMoves,
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTab {
    Colours,
    Size,
    Start,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub current_tab: MenuTab,
    pub selected_colors: u8,
    pub selected_size: BoardSize,
    pub animation_start: Instant,
}

impl MenuState {
    fn new(colors: u8, size: BoardSize) -> Self {
        Self {
            current_tab: MenuTab::Start,
            selected_colors: colors,
            selected_size: size,
            animation_start: Instant::now(),
        }
    }

    fn cycle_colors(&mut self, forward: bool) {
        let i = MENU_COLORS
            .iter()
            .position(|&n| n == self.selected_colors)
            .unwrap_or(0);
        let n = MENU_COLORS.len();
        let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
        self.selected_colors = MENU_COLORS[next];
    }

    fn cycle_size(&mut self, forward: bool) {
        let all = BoardSize::ALL;
        let i = all.iter().position(|&s| s == self.selected_size).unwrap_or(0);
        let n = all.len();
        let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
        self.selected_size = all[next];
    }

    fn cycle_tab(&mut self, forward: bool) {
        self.current_tab = match (self.current_tab, forward) {
            (MenuTab::Colours, true) | (MenuTab::Start, false) => MenuTab::Size,
            (MenuTab::Size, true) | (MenuTab::Colours, false) => MenuTab::Start,
            (MenuTab::Start, true) | (MenuTab::Size, false) => MenuTab::Colours,
        };
    }
}

/// A cluster that is fading out before the session removes it.
#[derive(Debug, Clone)]
struct PendingRemoval {
    at: Position,
    cells: Vec<Position>,
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    rng: StdRng,
    session: GameSession,
    screen: Screen,
    paused: bool,
    cursor: Position,
    game_start: Instant,
    game_over_reason: Option<GameOverReason>,
    pending_removal: Option<PendingRemoval>,
    /// TachyonFX fade for the removed cluster (created when the animation starts).
    removal_effect: Option<Effect>,
    /// Last time we processed the removal effect (for delta).
    removal_effect_process_time: Option<Instant>,
    menu_state: MenuState,
    quit_selected: QuitOption,
    /// Terminal area of the last frame, for mapping mouse positions to tiles.
    last_area: Rect,
}

impl App {
    pub fn new(args: Args, mut config: GameConfig, theme: Theme) -> Result<Self> {
        // clamp before the first board is allocated
        clamp_to_terminal(&mut config);
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let session = GameSession::new(config, &mut rng)?;
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        let menu_state = MenuState::new(config.colors, args.size);
        Ok(Self {
            args,
            config,
            theme,
            rng,
            session,
            screen,
            paused: false,
            cursor: Position::new(0, 0),
            game_start: Instant::now(),
            game_over_reason: None,
            pending_removal: None,
            removal_effect: None,
            removal_effect_process_time: None,
            menu_state,
            quit_selected: QuitOption::Resume,
            last_area: Rect::default(),
        })
    }

    fn reset_game(&mut self) -> Result<()> {
        self.session = GameSession::new(self.config, &mut self.rng)?;
        self.screen = Screen::Playing;
        self.paused = false;
        self.cursor = Position::new(0, 0);
        self.game_start = Instant::now();
        self.game_over_reason = None;
        self.pending_removal = None;
        self.removal_effect = None;
        self.removal_effect_process_time = None;
        self.session.preview_at(self.cursor.x, self.cursor.y);
        self.check_game_over();
        Ok(())
    }

    /// Start a game with the sizes picked in the menu, clamped to the terminal.
    /// `--width`/`--height` still override the preset.
    fn start_from_menu(&mut self) -> Result<()> {
        let (w, h) = self.menu_state.selected_size.dims();
        self.config.width = self.args.width.map_or(w, usize::from);
        self.config.height = self.args.height.map_or(h, usize::from);
        clamp_to_terminal(&mut self.config);
        self.config.colors = self.menu_state.selected_colors;
        info!(
            "starting from menu: {}x{}, {} colours",
            self.config.width, self.config.height, self.config.colors
        );
        self.reset_game()
    }

    fn check_game_over(&mut self) {
        if !self.session.is_terminal() {
            return;
        }
        let reason = if self.session.snapshot().is_empty() {
            GameOverReason::Cleared
        } else {
            GameOverReason::NoMoves
        };
        debug!("game over: {:?}", reason);
        self.game_over_reason = Some(reason);
        self.screen = Screen::GameOver;
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let board = self.session.snapshot();
        let x = self
            .cursor
            .x
            .saturating_add_signed(dx)
            .min(board.width().saturating_sub(1));
        let y = self
            .cursor
            .y
            .saturating_add_signed(dy)
            .min(board.height().saturating_sub(1));
        self.cursor = Position::new(x, y);
        self.session.preview_at(x, y);
    }

    /// Remove the cluster at the cursor, fading it out first unless animations are off.
    fn select(&mut self) -> Result<()> {
        let Position { x, y } = self.cursor;
        if self.session.preview_at(x, y) == 0 {
            return Ok(());
        }
        if self.args.no_animation {
            return self.commit_removal(self.cursor);
        }
        self.pending_removal = Some(PendingRemoval {
            at: self.cursor,
            cells: self.session.previewed_cluster().to_vec(),
        });
        self.removal_effect = None;
        self.removal_effect_process_time = None;
        Ok(())
    }

    fn commit_removal(&mut self, at: Position) -> Result<()> {
        let removed = self.session.select_at(at.x, at.y)?;
        if removed > 0 {
            debug!("score now {:?}", self.session.score());
        }
        self.check_game_over();
        Ok(())
    }

    fn finish_pending_removal(&mut self) -> Result<()> {
        self.removal_effect = None;
        self.removal_effect_process_time = None;
        match self.pending_removal.take() {
            Some(pending) => self.commit_removal(pending.at),
            None => Ok(()),
        }
    }

    fn hover(&mut self, column: u16, row: u16) {
        match ui::cell_at(self.last_area, self.session.snapshot(), column, row) {
            Some(pos) => {
                self.cursor = pos;
                self.session.preview_at(pos.x, pos.y);
            }
            None => self.session.clear_preview(),
        }
    }

    fn handle_playing(&mut self, action: Action) -> Result<()> {
        if self.paused {
            match action {
                Action::Pause => self.paused = false,
                Action::Quit => {
                    self.screen = Screen::QuitMenu;
                    self.quit_selected = QuitOption::Resume;
                }
                _ => {}
            }
            return Ok(());
        }
        // input is frozen while a cluster fades out; pause and quit cut it short
        if self.pending_removal.is_some() {
            if !matches!(action, Action::Pause | Action::Quit) {
                return Ok(());
            }
            self.finish_pending_removal()?;
            if self.screen != Screen::Playing {
                return Ok(());
            }
        }
        match action {
            Action::Left => self.move_cursor(-1, 0),
            Action::Right => self.move_cursor(1, 0),
            Action::Up => self.move_cursor(0, -1),
            Action::Down => self.move_cursor(0, 1),
            Action::Select => self.select()?,
            Action::Hover(c, r) => self.hover(c, r),
            Action::Click(c, r) => {
                self.hover(c, r);
                if !self.session.previewed_cluster().is_empty() {
                    self.select()?;
                }
            }
            Action::Pause => self.paused = true,
            Action::Restart => self.reset_game()?,
            Action::Quit => {
                self.screen = Screen::QuitMenu;
                self.quit_selected = QuitOption::Resume;
            }
            Action::None => {}
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_action(&mut self, action: Action) -> Result<bool> {
        match self.screen {
            Screen::Menu => match action {
                Action::Quit => return Ok(true),
                Action::Left | Action::Right => {
                    let forward = action == Action::Right;
                    match self.menu_state.current_tab {
                        MenuTab::Colours => self.menu_state.cycle_colors(forward),
                        MenuTab::Size => self.menu_state.cycle_size(forward),
                        MenuTab::Start => {}
                    }
                }
                Action::Down => self.menu_state.cycle_tab(true),
                Action::Up => self.menu_state.cycle_tab(false),
                Action::Select => {
                    if self.menu_state.current_tab == MenuTab::Start {
                        self.start_from_menu()?;
                    } else {
                        self.menu_state.current_tab = MenuTab::Start;
                    }
                }
                _ => {}
            },
            Screen::Playing => self.handle_playing(action)?,
            Screen::QuitMenu => match action {
                Action::Down | Action::Right => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::MainMenu,
                        QuitOption::MainMenu => QuitOption::Exit,
                        QuitOption::Exit => QuitOption::Resume,
                    };
                }
                Action::Up | Action::Left => {
                    self.quit_selected = match self.quit_selected {
                        QuitOption::Resume => QuitOption::Exit,
                        QuitOption::MainMenu => QuitOption::Resume,
                        QuitOption::Exit => QuitOption::MainMenu,
                    };
                }
                Action::Select => match self.quit_selected {
                    QuitOption::Resume => self.screen = Screen::Playing,
                    QuitOption::MainMenu => {
                        self.menu_state.animation_start = Instant::now();
                        self.screen = Screen::Menu;
                    }
                    QuitOption::Exit => return Ok(true),
                },
                Action::Pause | Action::Quit => self.screen = Screen::Playing,
                _ => {}
            },
            Screen::GameOver => match action {
                Action::Quit => return Ok(true),
                Action::Restart => self.reset_game()?,
                _ => {}
            },
        }
        Ok(false)
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        self.reset_game()?;
        if !self.args.no_menu {
            self.screen = Screen::Menu;
        }

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        // ~60 FPS redraw while idle or animating
        let frame_duration = Duration::from_millis(16);
        loop {
            let now = Instant::now();
            let view = GameView {
                session: &self.session,
                theme: &self.theme,
                colors: self.config.colors,
                cursor: self.cursor,
                paused: self.paused,
                game_start: self.game_start,
                game_over_reason: self.game_over_reason,
                quit_selected: self.quit_selected,
                removing: self.pending_removal.as_ref().map(|p| p.cells.as_slice()),
            };
            let mut area = self.last_area;
            terminal.draw(|f| {
                area = f.area();
                ui::draw(
                    f,
                    self.screen,
                    &view,
                    &self.menu_state,
                    &mut self.removal_effect,
                    &mut self.removal_effect_process_time,
                    now,
                );
            })?;
            self.last_area = area;

            if self.pending_removal.is_some()
                && self.removal_effect.as_ref().is_some_and(Effect::done)
            {
                self.finish_pending_removal()?;
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    let action = match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => key_to_action(key),
                        Event::Mouse(mouse) => mouse_to_action(mouse),
                        _ => continue,
                    };
                    if self.handle_action(action)? {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Board size (columns, rows) that fits the current terminal.
fn fit_to_terminal() -> (usize, usize) {
    let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let (w, h) = ui::board_size_for_terminal_clamped(cols, rows);
    (w as usize, h as usize)
}

/// Shrink the board to what the terminal can show; `--width`/`--height` win when they fit.
fn clamp_to_terminal(config: &mut GameConfig) {
    let (fit_w, fit_h) = fit_to_terminal();
    let (w, h) = (config.width.min(fit_w), config.height.min(fit_h));
    if (w, h) != (config.width, config.height) {
        info!(
            "board {}x{} does not fit the terminal, using {}x{}",
            config.width, config.height, w, h
        );
        config.width = w;
        config.height = h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use clumptui::{Board, Cell};

    const R: Cell = Cell::Tile(0);
    const B: Cell = Cell::Tile(1);

    fn app(cli: &[&str]) -> App {
        let args = Args::try_parse_from(cli.iter().copied()).unwrap();
        let (w, h) = args.size.dims();
        let config = GameConfig {
            width: args.width.map_or(w, usize::from),
            height: args.height.map_or(h, usize::from),
            colors: args.colors,
            palette_len: crate::theme::PALETTE_LEN,
        };
        App::new(args, config, Theme::default()).unwrap()
    }

    fn board_dims(app: &App) -> (usize, usize) {
        let board = app.session.snapshot();
        (board.width(), board.height())
    }

    #[test]
    fn test_cli_size_overrides_menu_preset() {
        let mut app = app(&["clumptui", "--seed", "7", "--width", "12", "--height", "5"]);
        app.start_from_menu().unwrap();
        assert_eq!(board_dims(&app), (12, 5));
        assert_eq!(app.screen, Screen::Playing);
    }

    #[test]
    fn test_menu_preset_used_without_overrides() {
        let mut app = app(&["clumptui", "--seed", "7", "--width", "6"]);
        app.menu_state.selected_size = BoardSize::Small;
        app.start_from_menu().unwrap();
        let (fit_w, fit_h) = fit_to_terminal();
        assert_eq!(board_dims(&app), (6.min(fit_w), 8.min(fit_h)));
    }

    #[test]
    fn test_oversized_board_is_clamped_before_first_session() {
        let app = app(&["clumptui", "--seed", "1", "--width", "60000", "--height", "60000"]);
        let (fit_w, fit_h) = fit_to_terminal();
        assert_eq!(board_dims(&app), (fit_w, fit_h));
        assert_eq!((app.config.width, app.config.height), (fit_w, fit_h));
    }

    fn app_with_pending_removal() -> App {
        let mut app = app(&["clumptui", "--seed", "3", "--no-menu"]);
        let board = Board::from_rows(&[vec![R, R, B], vec![B, R, B]]).unwrap();
        app.session = GameSession::from_board(board);
        app.screen = Screen::Playing;
        app.cursor = Position::new(0, 0);
        app.select().unwrap();
        assert!(app.pending_removal.is_some());
        app
    }

    #[test]
    fn test_quit_during_fade_commits_and_opens_quit_menu() {
        let mut app = app_with_pending_removal();
        assert!(!app.handle_action(Action::Quit).unwrap());
        assert!(app.pending_removal.is_none());
        assert_eq!(app.session.moves(), 1);
        assert_eq!(app.screen, Screen::QuitMenu);
    }

    #[test]
    fn test_pause_during_fade_commits_and_pauses() {
        let mut app = app_with_pending_removal();
        app.handle_action(Action::Pause).unwrap();
        assert!(app.pending_removal.is_none());
        assert_eq!(app.session.moves(), 1);
        assert!(app.paused);
    }

    #[test]
    fn test_moves_are_ignored_during_fade() {
        let mut app = app_with_pending_removal();
        app.handle_action(Action::Right).unwrap();
        assert!(app.pending_removal.is_some());
        assert_eq!(app.cursor, Position::new(0, 0));
        assert_eq!(app.session.moves(), 0);
    }

    #[test]
    fn test_menu_cycles_wrap() {
        let mut m = MenuState::new(6, BoardSize::Large);
        m.cycle_colors(true);
        assert_eq!(m.selected_colors, 3);
        m.cycle_colors(false);
        assert_eq!(m.selected_colors, 6);
        m.cycle_size(true);
        assert_eq!(m.selected_size, BoardSize::Small);
        m.cycle_size(false);
        assert_eq!(m.selected_size, BoardSize::Large);
    }

    #[test]
    fn test_menu_tabs_round_trip() {
        let mut m = MenuState::new(4, BoardSize::Medium);
        assert_eq!(m.current_tab, MenuTab::Start);
        m.cycle_tab(true);
        assert_eq!(m.current_tab, MenuTab::Colours);
        m.cycle_tab(true);
        assert_eq!(m.current_tab, MenuTab::Size);
        m.cycle_tab(false);
        assert_eq!(m.current_tab, MenuTab::Colours);
        m.cycle_tab(false);
        assert_eq!(m.current_tab, MenuTab::Start);
    }
}

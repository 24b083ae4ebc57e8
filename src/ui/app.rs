use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use ratatui::{backend::Backend, layout::Rect, Terminal};
use tracing::{error, info};

use super::board_widget::pixel_size;
use super::game_view::{self, GameView};
use super::input::{InputAction, InputController};
use super::mode_select::{self, MenuChoice};
use crate::config::AppConfig;
use crate::engine::EngineWorker;
use crate::game::{Column, GameController, GameMode, TurnState};
use crate::render::{self, color, CameraState, FrameContext, PixelBuffer, Point, Viewport};

enum Screen {
    Menu,
    Playing(GameController),
}

/// Frame loop tying input, the turn controller, the engine worker and the
/// renderer together.
pub struct App {
    config: AppConfig,
    screen: Screen,
    worker: Option<EngineWorker>,
    camera: CameraState,
    input: InputController,
    pointer: Option<Point>,
    hover: Option<Column>,
    pixels: PixelBuffer,
    board_area: Rect,
    message: Option<String>,
    should_quit: bool,
}

impl App {
    /// `mode` skips the menu when given.
    pub fn new(config: AppConfig, worker: EngineWorker, mode: Option<GameMode>) -> Self {
        let mut app = App {
            camera: config.camera.initial_state(),
            input: InputController::new(&config.camera),
            config,
            screen: Screen::Menu,
            worker: Some(worker),
            pointer: None,
            hover: None,
            pixels: PixelBuffer::new(0, 0, color::BACKGROUND),
            board_area: Rect::default(),
            message: None,
            should_quit: false,
        };
        if let Some(mode) = mode {
            app.start(mode);
        }
        app
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        let tick = self.config.ui.tick();
        loop {
            terminal.draw(|f| self.render(f)).map_err(Into::into)?;

            if self.should_quit {
                break;
            }

            self.handle_events(tick)?;
            self.update(Instant::now());
        }
        Ok(())
    }

    fn start(&mut self, mode: GameMode) {
        info!(mode = mode.label(), "starting game");
        let engine = &self.config.engine;
        self.screen = Screen::Playing(GameController::new(
            mode,
            engine.search_depth,
            engine.timeout(),
        ));
        self.message = None;
    }

    /// Wait up to one tick for input, then drain whatever else is queued.
    fn handle_events(&mut self, tick: Duration) -> io::Result<()> {
        let mut wait = tick;
        while event::poll(wait)? {
            let event = event::read()?;
            self.handle_event(&event);
            wait = Duration::ZERO;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        if matches!(self.screen, Screen::Menu) {
            if let Event::Key(key) = event {
                match mode_select::handle_key(key) {
                    Some(MenuChoice::Play(mode)) => self.start(mode),
                    Some(MenuChoice::Quit) => self.should_quit = true,
                    None => {}
                }
            }
            return;
        }

        let Some(action) = self.input.handle(event, self.board_area) else {
            return;
        };
        match action {
            InputAction::Rotate { yaw, pitch } => self.camera.rotate(yaw, pitch),
            InputAction::PointerMoved(pointer) => self.pointer = pointer,
            InputAction::Submit(pointer) => {
                self.pointer = Some(pointer);
                self.drop_piece();
            }
            InputAction::Reset => self.reset(),
            InputAction::Quit => self.should_quit = true,
        }
    }

    fn frame_context(&self, game: &GameController) -> FrameContext {
        let (w, h) = (self.pixels.width() as f64, self.pixels.height() as f64);
        FrameContext {
            camera: self.camera,
            viewport: Viewport::fit(w, h),
            board: *game.board(),
            pointer: self.pointer,
            current_player: game.current_player(),
        }
    }

    /// Drop a piece into the column under the pointer.
    fn drop_piece(&mut self) {
        let Screen::Playing(game) = &self.screen else {
            return;
        };
        if !game.accepts_human_move() {
            return;
        }
        // Resolve against the current camera, not the last drawn frame.
        let hover = render::build_scene(&self.frame_context(game)).hover;
        self.hover = hover;

        let (Screen::Playing(game), Some(worker)) = (&mut self.screen, self.worker.as_mut())
        else {
            return;
        };
        let Some(column) = hover else {
            return;
        };
        match game.submit_move(column, worker, Instant::now()) {
            Ok(()) => self.message = None,
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// A faulted or missing engine is relaunched on reset.
    fn engine_needs_restart(&self) -> bool {
        let faulted =
            matches!(&self.screen, Screen::Playing(game) if game.engine_fault().is_some());
        faulted || self.worker.is_none()
    }

    /// New game; a faulted engine is restarted first.
    fn reset(&mut self) {
        if !matches!(self.screen, Screen::Playing(_)) {
            return;
        }
        if self.engine_needs_restart() {
            info!(path = %self.config.engine.path.display(), "restarting engine");
            // Dropping the old worker ends its engine before the new one starts.
            self.worker = None;
            match EngineWorker::launch(&self.config.engine) {
                Ok(worker) => self.worker = Some(worker),
                Err(e) => {
                    error!(error = %e, "engine restart failed");
                    if let Screen::Playing(game) = &mut self.screen {
                        game.mark_fault(e.to_string());
                    }
                    return;
                }
            }
        }
        let (Screen::Playing(game), Some(worker)) = (&mut self.screen, self.worker.as_mut())
        else {
            return;
        };
        game.reset(worker);
        self.message = None;
    }

    /// Deliver engine replies, enforce the timeout and start engine turns.
    fn update(&mut self, now: Instant) {
        let Screen::Playing(game) = &mut self.screen else {
            return;
        };
        let Some(worker) = self.worker.as_mut() else {
            return;
        };
        while let Some((id, outcome)) = worker.try_recv() {
            game.handle_reply(id, outcome, worker, now);
        }
        game.poll_timeout(worker, now);
        game.step(worker, now);
    }

    /// Render the UI
    fn render(&mut self, frame: &mut ratatui::Frame) {
        let Screen::Playing(game) = &self.screen else {
            mode_select::render(frame);
            return;
        };

        let layout = game_view::layout(frame.area());
        self.board_area = layout.board;
        let (w, h) = pixel_size(layout.board);
        if self.pixels.width() != w || self.pixels.height() != h {
            self.pixels = PixelBuffer::new(w, h, color::BACKGROUND);
        }
        let ctx = self.frame_context(game);
        self.hover = render::render_frame(&ctx, &mut self.pixels);

        let mut status = game.status_line();
        if let Some(note) = self.message.as_deref().or(game.last_error()) {
            status = format!("{}  |  {}", status, note);
        }
        let view = GameView {
            mode: game.mode(),
            current_player: game.current_player(),
            hover: self.hover,
            status: &status,
            faulted: game.engine_fault().is_some(),
            game_over: game.state() == TurnState::GameOver,
            pixels: &self.pixels,
        };
        game_view::render(frame, &layout, &view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fake::{FakeEngine, StalledEngine};
    use crate::engine::{EngineClient, EngineSession, EngineTransport};
    use crate::game::{Column, Player};
    use ratatui::backend::TestBackend;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn config(path: &str, args: &[&str]) -> AppConfig {
        let mut config = AppConfig::default();
        config.engine.path = path.into();
        config.engine.args = args.iter().map(|a| a.to_string()).collect();
        config.engine.timeout_ms = TIMEOUT.as_millis() as u64;
        config
    }

    fn worker(transport: Box<dyn EngineTransport>) -> EngineWorker {
        EngineWorker::spawn(EngineSession::new(EngineClient::new(transport))).unwrap()
    }

    fn app(config: AppConfig, transport: Box<dyn EngineTransport>) -> App {
        App::new(config, worker(transport), Some(GameMode::HumanVsHuman))
    }

    fn game(app: &App) -> &GameController {
        match &app.screen {
            Screen::Playing(game) => game,
            Screen::Menu => panic!("no game running"),
        }
    }

    fn play_first_column(app: &mut App, now: Instant) {
        let (Screen::Playing(game), Some(worker)) = (&mut app.screen, app.worker.as_mut()) else {
            panic!("no game running");
        };
        game.submit_move(Column::new(0, 0).unwrap(), worker, now)
            .unwrap();
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .flat_map(|y| (0..buf.area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_healthy_engine_is_kept_on_reset() {
        let mut app = app(config("/nonexistent/engine", &[]), Box::new(FakeEngine::new()));
        assert!(!app.engine_needs_restart());
        app.reset();
        assert!(app.worker.is_some());
        assert!(game(&app).engine_fault().is_none());
    }

    #[test]
    fn test_failed_restart_keeps_fault() {
        let mut app = app(config("/nonexistent/engine", &[]), Box::new(FakeEngine::new()));
        if let Screen::Playing(game) = &mut app.screen {
            game.mark_fault("engine timed out");
        }
        assert!(app.engine_needs_restart());

        app.reset();
        assert!(app.worker.is_none());
        let fault = game(&app).engine_fault().unwrap();
        assert_ne!(fault, "engine timed out");
        assert!(screen_text(&mut app).contains("Engine unavailable"));

        // Still missing, so the next reset tries again.
        assert!(app.engine_needs_restart());
    }

    #[cfg(unix)]
    #[test]
    fn test_reset_restarts_faulted_engine() {
        let config = config("sh", &["-c", "while read l; do :; done"]);
        let mut app = app(config, Box::new(FakeEngine::new()));
        if let Screen::Playing(game) = &mut app.screen {
            game.mark_fault("engine stopped responding");
        }

        app.reset();
        assert!(app.worker.is_some());
        assert!(game(&app).engine_fault().is_none());
        assert_eq!(game(&app).current_player(), Player::A);
    }

    #[test]
    fn test_update_applies_reply_before_checking_timeout() {
        let mut app = app(config("/nonexistent/engine", &[]), Box::new(FakeEngine::new()));
        let start = Instant::now();
        play_first_column(&mut app, start);
        // Let the worker finish the move and refresh.
        std::thread::sleep(Duration::from_millis(300));

        app.update(start + TIMEOUT * 5);
        let game = game(&app);
        assert!(game.engine_fault().is_none());
        assert_eq!(game.board().owner_a(), 1 << 63);
        assert_eq!(game.current_player(), Player::B);
    }

    #[test]
    fn test_update_times_out_silent_engine() {
        let (engine, _release) = StalledEngine::new();
        let mut app = app(config("/nonexistent/engine", &[]), Box::new(engine));
        let start = Instant::now();
        play_first_column(&mut app, start);

        app.update(start + TIMEOUT / 2);
        assert!(game(&app).engine_fault().is_none());
        app.update(start + TIMEOUT * 2);
        assert_eq!(game(&app).engine_fault(), Some("engine timed out"));
        assert!(!game(&app).is_waiting());
    }

    #[test]
    fn test_engine_vs_engine_turns_start_from_update() {
        let config = config("/nonexistent/engine", &[]);
        let mut app = App::new(
            config,
            worker(Box::new(FakeEngine::new())),
            Some(GameMode::EngineVsEngine),
        );
        app.update(Instant::now());
        assert!(game(&app).is_waiting());
        // Clicks are ignored while the engine owns the turn.
        app.pointer = Some(Point::new(0.0, 0.0));
        app.drop_piece();
        assert!(app.message.is_none());
    }
}

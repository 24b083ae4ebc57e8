use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{BoardState, Column, Player};
use crate::engine::protocol::MoveStatus;
use crate::engine::{AppliedMove, EngineJob, JobId, JobOutcome, JobSink};
use crate::error::ProtocolError;

/// Who controls each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    HumanVsHuman,
    /// Human plays A, the engine plays B.
    HumanVsEngine,
    EngineVsEngine,
}

impl GameMode {
    /// Whether the engine moves for `player` in this mode.
    pub fn is_engine(self, player: Player) -> bool {
        match self {
            GameMode::HumanVsHuman => false,
            GameMode::HumanVsEngine => player == Player::B,
            GameMode::EngineVsEngine => true,
        }
    }

    /// Menu key selecting this mode.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(GameMode::HumanVsHuman),
            '2' => Some(GameMode::HumanVsEngine),
            '3' => Some(GameMode::EngineVsEngine),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameMode::HumanVsHuman => "Human vs Human",
            GameMode::HumanVsEngine => "Human vs Engine",
            GameMode::EngineVsEngine => "Engine vs Engine",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingMove,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    A,
    B,
    Draw,
}

/// Why a requested move was not sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("Game over! Press 'r' to restart.")]
    GameOver,
    #[error("It is the engine's turn.")]
    NotHumanTurn,
    #[error("Waiting for the engine.")]
    EngineBusy,
    #[error("Column is full!")]
    ColumnFull,
    #[error("Engine unavailable, press 'r' to restart it.")]
    EngineUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingKind {
    Move,
    Search,
}

#[derive(Debug, Clone, Copy)]
struct PendingJob {
    id: JobId,
    kind: PendingKind,
    issued: Instant,
}

/// Turn state machine. Owns the board and decides when the engine is asked
/// to move; all engine traffic goes through a [`JobSink`].
pub struct GameController {
    board: BoardState,
    state: TurnState,
    current_player: Player,
    winner: Option<Winner>,
    mode: GameMode,
    search_depth: u32,
    timeout: Duration,
    pending: Option<PendingJob>,
    fault: Option<String>,
    last_error: Option<String>,
}

impl GameController {
    pub fn new(mode: GameMode, search_depth: u32, timeout: Duration) -> Self {
        GameController {
            board: BoardState::new(),
            state: TurnState::AwaitingMove,
            current_player: Player::A,
            winner: None,
            mode,
            search_depth,
            timeout,
            pending: None,
            fault: None,
            last_error: None,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Whether an engine reply is outstanding.
    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Set when the engine stopped answering; cleared by [`GameController::reset`].
    pub fn engine_fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether a human may click a column right now.
    pub fn accepts_human_move(&self) -> bool {
        self.state == TurnState::AwaitingMove
            && !self.mode.is_engine(self.current_player)
            && self.pending.is_none()
            && self.fault.is_none()
    }

    /// Human move request for the current player.
    pub fn submit_move(
        &mut self,
        column: Column,
        engine: &mut dyn JobSink,
        now: Instant,
    ) -> Result<(), TurnError> {
        if self.state == TurnState::GameOver {
            return Err(TurnError::GameOver);
        }
        if self.fault.is_some() {
            return Err(TurnError::EngineUnavailable);
        }
        if self.mode.is_engine(self.current_player) {
            return Err(TurnError::NotHumanTurn);
        }
        if self.pending.is_some() {
            return Err(TurnError::EngineBusy);
        }
        self.send_move(column, engine, now)
    }

    fn send_move(
        &mut self,
        column: Column,
        engine: &mut dyn JobSink,
        now: Instant,
    ) -> Result<(), TurnError> {
        if self.board.is_column_full(column) {
            return Err(TurnError::ColumnFull);
        }
        let job = EngineJob::PlayMove {
            column,
            player: self.current_player,
        };
        if self.dispatch(job, PendingKind::Move, engine, now) {
            Ok(())
        } else {
            Err(TurnError::EngineUnavailable)
        }
    }

    fn dispatch(
        &mut self,
        job: EngineJob,
        kind: PendingKind,
        engine: &mut dyn JobSink,
        now: Instant,
    ) -> bool {
        match engine.submit(job) {
            Ok(id) => {
                self.pending = Some(PendingJob {
                    id,
                    kind,
                    issued: now,
                });
                true
            }
            Err(e) => {
                warn!(error = %e, ?job, "could not reach engine");
                self.fault = Some(e.to_string());
                false
            }
        }
    }

    /// Start an engine turn if the mode hands the current player to the
    /// engine and nothing is in flight. Returns whether a search was issued.
    pub fn step(&mut self, engine: &mut dyn JobSink, now: Instant) -> bool {
        if self.state != TurnState::AwaitingMove
            || self.pending.is_some()
            || self.fault.is_some()
            || !self.mode.is_engine(self.current_player)
        {
            return false;
        }
        debug!(player = ?self.current_player, depth = self.search_depth, "engine turn");
        let job = EngineJob::Search {
            depth: self.search_depth,
            player: self.current_player,
        };
        self.dispatch(job, PendingKind::Search, engine, now)
    }

    /// Feed a finished job back into the state machine. Replies for jobs
    /// that are no longer pending are ignored.
    pub fn handle_reply(
        &mut self,
        id: JobId,
        outcome: JobOutcome,
        engine: &mut dyn JobSink,
        now: Instant,
    ) {
        let Some(pending) = self.pending.filter(|p| p.id == id) else {
            debug!(id, ?outcome, "ignoring reply for stale job");
            return;
        };
        self.pending = None;

        match (pending.kind, outcome) {
            (PendingKind::Move, JobOutcome::MoveApplied(applied)) => self.apply(applied),
            (PendingKind::Search, JobOutcome::BestMove(column)) => {
                if let Err(e) = self.send_move(column, engine, now) {
                    warn!(error = %e, row = column.row, col = column.col, "engine picked an unplayable column");
                    self.last_error = Some(format!("Engine move rejected: {}", e));
                    self.fault
                        .get_or_insert_with(|| "engine chose an illegal move".to_string());
                }
            }
            (_, JobOutcome::Rejected(e)) => self.reject(e),
            (kind, outcome) => {
                warn!(?kind, ?outcome, "reply does not match pending job");
            }
        }
    }

    fn apply(&mut self, applied: AppliedMove) {
        self.board = applied.board;
        self.last_error = None;
        let winner = match applied.status {
            MoveStatus::WinA => Some(Winner::A),
            MoveStatus::WinB => Some(Winner::B),
            MoveStatus::Draw => Some(Winner::Draw),
            MoveStatus::Ongoing => None,
        };
        match winner {
            Some(winner) => {
                info!(?winner, pieces = self.board.piece_count(), "game over");
                self.winner = Some(winner);
                self.state = TurnState::GameOver;
            }
            None => {
                self.current_player = self.current_player.other();
                debug!(next = ?self.current_player, "turn passes");
            }
        }
    }

    fn reject(&mut self, error: ProtocolError) {
        warn!(error = %error, "engine reply rejected, state unchanged");
        if error == ProtocolError::EmptyReply {
            self.fault = Some("engine stopped responding".to_string());
        }
        self.last_error = Some(format!("Move not applied: {}", error));
    }

    /// Abandon the pending job once it has been outstanding longer than the
    /// configured timeout.
    pub fn poll_timeout(&mut self, engine: &mut dyn JobSink, now: Instant) -> bool {
        let Some(pending) = self.pending else {
            return false;
        };
        if now.saturating_duration_since(pending.issued) < self.timeout {
            return false;
        }
        warn!(id = pending.id, kind = ?pending.kind, timeout_ms = self.timeout.as_millis() as u64, "engine timed out");
        engine.cancel(pending.id);
        self.pending = None;
        self.fault = Some("engine timed out".to_string());
        true
    }

    /// Record an engine failure detected outside the reply path.
    pub fn mark_fault(&mut self, reason: impl Into<String>) {
        self.fault = Some(reason.into());
    }

    /// Start a new game. Valid in any state.
    pub fn reset(&mut self, engine: &mut dyn JobSink) {
        if let Some(pending) = self.pending.take() {
            engine.cancel(pending.id);
        }
        self.fault = None;
        if let Err(e) = engine.submit(EngineJob::NewGame) {
            warn!(error = %e, "could not send new game");
            self.fault = Some(e.to_string());
        }
        self.board = BoardState::new();
        self.state = TurnState::AwaitingMove;
        self.current_player = Player::A;
        self.winner = None;
        self.last_error = None;
        info!(mode = self.mode.label(), "new game");
    }

    /// One-line summary for the overlay.
    pub fn status_line(&self) -> String {
        if let Some(winner) = self.winner {
            let result = match winner {
                Winner::A => "Player A Wins!",
                Winner::B => "Player B Wins!",
                Winner::Draw => "Draw!",
            };
            return format!("Game Over! {} (Press R to Reset)", result);
        }
        if let Some(fault) = &self.fault {
            return format!("Engine unavailable: {} (Press R to restart)", fault);
        }
        let turn = format!("Turn: {}", self.current_player.name());
        match self.pending.map(|p| p.kind) {
            Some(PendingKind::Search) => format!("{}  |  engine thinking...", turn),
            Some(PendingKind::Move) => format!("{}  |  waiting for engine...", turn),
            None => turn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    /// Records jobs instead of running them.
    #[derive(Default)]
    struct RecordingSink {
        jobs: Vec<EngineJob>,
        cancelled: Vec<JobId>,
        broken: bool,
    }

    impl JobSink for RecordingSink {
        fn submit(&mut self, job: EngineJob) -> Result<JobId, EngineError> {
            if self.broken {
                return Err(EngineError::WorkerGone);
            }
            self.jobs.push(job);
            Ok(self.jobs.len() as JobId)
        }

        fn cancel(&mut self, id: JobId) {
            self.cancelled.push(id);
        }
    }

    fn col(row: usize, col: usize) -> Column {
        Column::new(row, col).unwrap()
    }

    fn applied(owner_a: u64, owner_b: u64, status: MoveStatus) -> JobOutcome {
        JobOutcome::MoveApplied(AppliedMove {
            board: BoardState::from_bits(owner_a, owner_b).unwrap(),
            status,
        })
    }

    fn controller(mode: GameMode) -> GameController {
        GameController::new(mode, 6, Duration::from_secs(30))
    }

    #[test]
    fn test_initial_state() {
        let game = controller(GameMode::HumanVsHuman);
        assert_eq!(game.state(), TurnState::AwaitingMove);
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(game.winner(), None);
        assert!(game.accepts_human_move());
        assert_eq!(game.status_line(), "Turn: Player A (Red)");
    }

    #[test]
    fn test_move_applies_engine_board_and_flips_turn() {
        let mut game = controller(GameMode::HumanVsHuman);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        game.submit_move(col(0, 0), &mut sink, now).unwrap();
        assert_eq!(
            sink.jobs,
            vec![EngineJob::PlayMove {
                column: col(0, 0),
                player: Player::A
            }]
        );
        assert!(game.is_waiting());
        assert_eq!(
            game.submit_move(col(1, 1), &mut sink, now),
            Err(TurnError::EngineBusy)
        );

        game.handle_reply(1, applied(1 << 63, 0, MoveStatus::Ongoing), &mut sink, now);
        assert_eq!(game.board().owner_a(), 1 << 63);
        assert_eq!(game.current_player(), Player::B);
        assert!(!game.is_waiting());
    }

    #[test]
    fn test_win_a_ends_game_and_blocks_moves() {
        let mut game = controller(GameMode::HumanVsHuman);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        game.submit_move(col(0, 0), &mut sink, now).unwrap();
        game.handle_reply(1, applied(0xF000, 0, MoveStatus::WinA), &mut sink, now);

        assert_eq!(game.state(), TurnState::GameOver);
        assert_eq!(game.winner(), Some(Winner::A));
        assert_eq!(
            game.submit_move(col(1, 1), &mut sink, now),
            Err(TurnError::GameOver)
        );
        assert_eq!(sink.jobs.len(), 1);
        assert_eq!(
            game.status_line(),
            "Game Over! Player A Wins! (Press R to Reset)"
        );
    }

    #[test]
    fn test_win_b_and_draw() {
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        let mut game = controller(GameMode::HumanVsHuman);
        game.submit_move(col(0, 0), &mut sink, now).unwrap();
        game.handle_reply(1, applied(0, 1, MoveStatus::WinB), &mut sink, now);
        assert_eq!(game.winner(), Some(Winner::B));

        let mut sink = RecordingSink::default();
        let mut game = controller(GameMode::HumanVsHuman);
        game.submit_move(col(0, 0), &mut sink, now).unwrap();
        game.handle_reply(1, applied(0, 1, MoveStatus::Draw), &mut sink, now);
        assert_eq!(game.winner(), Some(Winner::Draw));
        assert_eq!(game.state(), TurnState::GameOver);
    }

    #[test]
    fn test_rejected_reply_leaves_state_unchanged() {
        let mut game = controller(GameMode::HumanVsHuman);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        game.submit_move(col(2, 2), &mut sink, now).unwrap();
        game.handle_reply(
            1,
            JobOutcome::Rejected(ProtocolError::Malformed {
                field: "status",
                line: "made_move".to_string(),
            }),
            &mut sink,
            now,
        );
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(game.board(), &BoardState::new());
        assert_eq!(game.engine_fault(), None);
        assert!(game.last_error().is_some());
        assert!(game.accepts_human_move());
    }

    #[test]
    fn test_empty_reply_marks_engine_fault() {
        let mut game = controller(GameMode::EngineVsEngine);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        assert!(game.step(&mut sink, now));
        game.handle_reply(1, JobOutcome::Rejected(ProtocolError::EmptyReply), &mut sink, now);
        assert!(game.engine_fault().is_some());
        // No more searches against a dead engine.
        assert!(!game.step(&mut sink, now));
        assert_eq!(sink.jobs.len(), 1);
        assert_eq!(
            game.submit_move(col(0, 0), &mut sink, now),
            Err(TurnError::EngineUnavailable)
        );
    }

    #[test]
    fn test_human_vs_engine_gating() {
        let mut game = controller(GameMode::HumanVsEngine);
        let mut sink = RecordingSink::default();
        let now = Instant::now();

        // A is human: no automatic search.
        assert!(!game.step(&mut sink, now));
        game.submit_move(col(0, 0), &mut sink, now).unwrap();
        game.handle_reply(1, applied(1 << 63, 0, MoveStatus::Ongoing), &mut sink, now);

        // B is the engine: humans may not move, step searches.
        assert!(!game.accepts_human_move());
        assert_eq!(
            game.submit_move(col(1, 1), &mut sink, now),
            Err(TurnError::NotHumanTurn)
        );
        assert!(game.step(&mut sink, now));
        assert_eq!(
            sink.jobs[1],
            EngineJob::Search {
                depth: 6,
                player: Player::B
            }
        );
        assert!(game.status_line().ends_with("engine thinking..."));

        // The best move goes through the normal move path.
        game.handle_reply(2, JobOutcome::BestMove(col(3, 3)), &mut sink, now);
        assert_eq!(
            sink.jobs[2],
            EngineJob::PlayMove {
                column: col(3, 3),
                player: Player::B
            }
        );
        game.handle_reply(3, applied(1 << 63, 1 << 48, MoveStatus::Ongoing), &mut sink, now);
        assert_eq!(game.current_player(), Player::A);
        assert!(game.accepts_human_move());
    }

    #[test]
    fn test_human_vs_human_never_searches() {
        let mut game = controller(GameMode::HumanVsHuman);
        let mut sink = RecordingSink::default();
        assert!(!game.step(&mut sink, Instant::now()));
        assert!(sink.jobs.is_empty());
    }

    #[test]
    fn test_stale_reply_is_ignored() {
        let mut game = controller(GameMode::HumanVsHuman);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        game.submit_move(col(0, 0), &mut sink, now).unwrap();
        game.handle_reply(42, applied(1 << 63, 0, MoveStatus::WinA), &mut sink, now);
        assert_eq!(game.state(), TurnState::AwaitingMove);
        assert!(game.is_waiting());
    }

    #[test]
    fn test_full_column_is_refused_locally() {
        let mut game = controller(GameMode::HumanVsHuman);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        let column = col(1, 2);
        let mut board = BoardState::new();
        for _ in 0..4 {
            board = board.with_drop(column, Player::A).unwrap().0;
        }
        game.submit_move(col(0, 0), &mut sink, now).unwrap();
        game.handle_reply(
            1,
            JobOutcome::MoveApplied(AppliedMove {
                board,
                status: MoveStatus::Ongoing,
            }),
            &mut sink,
            now,
        );
        assert_eq!(
            game.submit_move(column, &mut sink, now),
            Err(TurnError::ColumnFull)
        );
    }

    #[test]
    fn test_timeout_cancels_and_faults() {
        let mut game = controller(GameMode::EngineVsEngine);
        let mut sink = RecordingSink::default();
        let start = Instant::now();

        assert!(game.step(&mut sink, start));
        assert!(!game.poll_timeout(&mut sink, start + Duration::from_secs(29)));
        assert!(game.poll_timeout(&mut sink, start + Duration::from_secs(30)));
        assert_eq!(sink.cancelled, vec![1]);
        assert_eq!(game.engine_fault(), Some("engine timed out"));
        assert!(!game.is_waiting());

        // A late reply changes nothing.
        game.handle_reply(1, JobOutcome::BestMove(col(0, 0)), &mut sink, start);
        assert_eq!(sink.jobs.len(), 1);
    }

    #[test]
    fn test_reset_from_game_over() {
        let mut game = controller(GameMode::HumanVsHuman);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        game.submit_move(col(0, 0), &mut sink, now).unwrap();
        game.handle_reply(1, applied(0xF, 0x10, MoveStatus::WinA), &mut sink, now);

        game.reset(&mut sink);
        assert_eq!(sink.jobs.last(), Some(&EngineJob::NewGame));
        assert_eq!(game.state(), TurnState::AwaitingMove);
        assert_eq!(game.current_player(), Player::A);
        assert_eq!(game.winner(), None);
        assert_eq!(game.board(), &BoardState::new());
    }

    #[test]
    fn test_reset_cancels_pending_search() {
        let mut game = controller(GameMode::EngineVsEngine);
        let mut sink = RecordingSink::default();
        let now = Instant::now();
        game.step(&mut sink, now);
        game.reset(&mut sink);
        assert_eq!(sink.cancelled, vec![1]);
        assert!(!game.is_waiting());
        // Engine turn starts again right away.
        assert!(game.step(&mut sink, now));
    }

    #[test]
    fn test_unreachable_worker_is_a_fault() {
        let mut game = controller(GameMode::HumanVsHuman);
        let mut sink = RecordingSink {
            broken: true,
            ..Default::default()
        };
        assert_eq!(
            game.submit_move(col(0, 0), &mut sink, Instant::now()),
            Err(TurnError::EngineUnavailable)
        );
        assert!(game.engine_fault().is_some());
        assert!(!game.is_waiting());
    }

    #[test]
    fn test_mode_keys() {
        assert_eq!(GameMode::from_key('1'), Some(GameMode::HumanVsHuman));
        assert_eq!(GameMode::from_key('2'), Some(GameMode::HumanVsEngine));
        assert_eq!(GameMode::from_key('3'), Some(GameMode::EngineVsEngine));
        assert_eq!(GameMode::from_key('4'), None);
        assert!(GameMode::EngineVsEngine.is_engine(Player::A));
        assert!(!GameMode::HumanVsEngine.is_engine(Player::A));
    }
}

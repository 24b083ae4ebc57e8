//! In-process engine used by tests. Speaks the same line protocol as the real
//! search binary, with trivial move choice.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use super::client::{EngineKiller, EngineTransport};
use crate::game::{BoardState, Cell, Column, Player, SIZE};

/// All 76 four-in-a-row masks of the cube.
pub fn winning_lines() -> Vec<u64> {
    let mut lines = Vec::new();
    for dd in -1i32..=1 {
        for dr in -1i32..=1 {
            for dc in -1i32..=1 {
                // Keep one of each pair of opposite directions.
                let first = [dd, dr, dc].into_iter().find(|&v| v != 0);
                if first != Some(1) {
                    continue;
                }
                for cell in Cell::all() {
                    let mut mask = 0u64;
                    let mut ok = true;
                    for step in 0..SIZE as i32 {
                        let d = cell.depth as i32 + dd * step;
                        let r = cell.row as i32 + dr * step;
                        let c = cell.col as i32 + dc * step;
                        match (d >= 0 && r >= 0 && c >= 0)
                            .then(|| Cell::new(d as usize, r as usize, c as usize))
                            .flatten()
                        {
                            Some(next) => mask |= next.mask(),
                            None => {
                                ok = false;
                                break;
                            }
                        }
                    }
                    if ok {
                        lines.push(mask);
                    }
                }
            }
        }
    }
    lines
}

pub struct FakeEngine {
    board: BoardState,
    alive: bool,
    replies: VecDeque<String>,
    script: VecDeque<String>,
    log: Arc<Mutex<Vec<String>>>,
    lines: Vec<u64>,
}

impl FakeEngine {
    pub fn new() -> Self {
        FakeEngine {
            board: BoardState::new(),
            alive: true,
            replies: VecDeque::new(),
            script: VecDeque::new(),
            log: Arc::new(Mutex::new(Vec::new())),
            lines: winning_lines(),
        }
    }

    /// Answer reply-bearing commands with these lines, in order, before
    /// falling back to simulated play.
    pub fn scripted(script: &[&str]) -> Self {
        let mut engine = Self::new();
        engine.script = script.iter().map(|s| s.to_string()).collect();
        engine
    }

    /// Every command line received so far.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }

    fn status_after(&self, player: Player) -> &'static str {
        let own = match player {
            Player::A => self.board.owner_a(),
            Player::B => self.board.owner_b(),
        };
        if self.lines.iter().any(|&line| own & line == line) {
            match player {
                Player::A => "win_A",
                Player::B => "win_B",
            }
        } else if self.board.is_full() {
            "draw"
        } else {
            "ongoing"
        }
    }

    fn respond(&mut self, line: &str) -> Option<String> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let reply_expected = matches!(parts.first(), Some(&"print_raw" | &"move" | &"search"));
        if reply_expected {
            if let Some(scripted) = self.script.pop_front() {
                return Some(scripted);
            }
        }
        match parts.as_slice() {
            ["new"] => {
                self.board = BoardState::new();
                None
            }
            ["quit"] => {
                self.alive = false;
                None
            }
            ["print_raw"] => Some(format!(
                "board_state {} {}",
                self.board.owner_a(),
                self.board.owner_b()
            )),
            ["move", r, c, p] => {
                let column = Column::new(r.parse().ok()?, c.parse().ok()?)?;
                let player = if *p == "1" { Player::A } else { Player::B };
                match self.board.with_drop(column, player) {
                    Some((next, cell)) => {
                        self.board = next;
                        let status = self.status_after(player);
                        Some(format!(
                            "made_move {} {} {} {} {}",
                            column.row, column.col, cell.depth, p, status
                        ))
                    }
                    None => Some("error column_full".to_string()),
                }
            }
            ["search", _, _] => {
                let column = Column::all().find(|&c| !self.board.is_column_full(c))?;
                let depth = self.board.lowest_free_depth(column)?;
                Some(format!("bestmove {} {} {} 0", column.row, column.col, depth))
            }
            _ => None,
        }
    }
}

impl EngineTransport for FakeEngine {
    fn send_line(&mut self, line: &str) -> std::io::Result<()> {
        self.log.lock().unwrap().push(line.to_string());
        if let Some(reply) = self.respond(line) {
            self.replies.push_back(reply);
        }
        Ok(())
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self.replies.pop_front().map(|line| line + "\n"))
    }

    fn is_alive(&mut self) -> bool {
        self.alive
    }
}

/// Engine whose replies are held back until the test releases them.
pub struct StalledEngine {
    release: mpsc::Receiver<String>,
}

impl StalledEngine {
    pub fn new() -> (Self, mpsc::Sender<String>) {
        let (tx, rx) = mpsc::channel();
        (StalledEngine { release: rx }, tx)
    }
}

impl EngineTransport for StalledEngine {
    fn send_line(&mut self, _line: &str) -> std::io::Result<()> {
        Ok(())
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self.release.recv().ok())
    }

    fn is_alive(&mut self) -> bool {
        true
    }
}

/// Engine that never answers; only its killer ends a pending read.
pub struct HungEngine {
    wake: mpsc::Receiver<()>,
    wake_tx: mpsc::Sender<()>,
    killed: Arc<AtomicBool>,
}

impl HungEngine {
    pub fn new() -> Self {
        let (wake_tx, wake) = mpsc::channel();
        HungEngine {
            wake,
            wake_tx,
            killed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn killed(&self) -> Arc<AtomicBool> {
        self.killed.clone()
    }
}

impl EngineTransport for HungEngine {
    fn send_line(&mut self, _line: &str) -> std::io::Result<()> {
        Ok(())
    }

    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let _ = self.wake.recv();
        Ok(None)
    }

    fn is_alive(&mut self) -> bool {
        !self.killed.load(Ordering::SeqCst)
    }

    fn killer(&self) -> Option<EngineKiller> {
        let killed = self.killed.clone();
        let wake = self.wake_tx.clone();
        Some(Box::new(move || {
            killed.store(true, Ordering::SeqCst);
            let _ = wake.send(());
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_there_are_76_lines() {
        let lines = winning_lines();
        assert_eq!(lines.len(), 76);
        assert!(lines.iter().all(|l| l.count_ones() == 4));
    }
}

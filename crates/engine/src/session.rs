//! Match module - game flow across one or more boards
//!
//! A [`Match`] owns a board per player and the single RNG they share. Every
//! tick it updates the boards that are in play, in player order, then routes
//! their events through the [`GameFlow`] rules:
//!
//! - **Solo**: game over ends the match; a cleared level waits for
//!   [`Match::advance`], which moves on to the next level.
//! - **Link**: trash goes to every other board; the last board standing or the
//!   first to clear its germs wins the round; the first player to
//!   `wins_required` round wins takes the match. [`Match::advance`] restarts the
//!   level on every board for the next round.

use log::debug;

use crate::core::{Board, BoardEvent, GameSettings, SimpleRng};
use crate::types::{BoardInput, PillColor, PlayState, LINK_WINS_REQUIRED};

/// How boards in a match relate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    Solo,
    Link,
}

/// Where the match stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Running,
    Paused,
    /// Waiting for [`Match::advance`] after a cleared level or a finished round
    Intermission { winner: Option<usize> },
    /// The match is decided
    Over { winner: Option<usize> },
    /// Every level was cleared (solo)
    Complete,
}

/// Receiver of board notifications
pub trait GameFlow {
    fn game_over(&mut self, player: usize);
    fn level_complete(&mut self, player: usize);
    fn send_trash(&mut self, origin: usize, colors: &[PillColor]);
    fn game_complete(&mut self, player: usize);
}

/// Deliver board events to a collaborator, in order
pub fn dispatch<F: GameFlow + ?Sized>(events: Vec<BoardEvent>, flow: &mut F) {
    for event in events {
        match event {
            BoardEvent::GameOver { player } => flow.game_over(player),
            BoardEvent::LevelComplete { player } => flow.level_complete(player),
            BoardEvent::SendTrash { player, colors } => flow.send_trash(player, &colors),
            BoardEvent::GameComplete { player } => flow.game_complete(player),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Match {
    mode: MatchMode,
    boards: Vec<Board>,
    wins: Vec<u32>,
    wins_required: u32,
    rng: SimpleRng,
    status: MatchStatus,
}

impl Match {
    /// Create a match with `players` boards (at least one; link needs two)
    pub fn new(mode: MatchMode, players: usize, settings: GameSettings, seed: u32) -> Self {
        let players = match mode {
            MatchMode::Solo => 1,
            MatchMode::Link => players.max(2),
        };
        let boards = (0..players)
            .map(|p| Board::new(p, settings.clone()))
            .collect();
        Self {
            mode,
            boards,
            wins: vec![0; players],
            wins_required: LINK_WINS_REQUIRED,
            rng: SimpleRng::new(seed),
            status: MatchStatus::Running,
        }
    }

    pub fn with_wins_required(mut self, wins: u32) -> Self {
        self.wins_required = wins.max(1);
        self
    }

    /// Start every board at `level` and `difficulty`
    pub fn start(&mut self, level: usize, difficulty: usize) {
        for board in &mut self.boards {
            board.new_game(level, difficulty, &mut self.rng);
        }
        self.wins.iter_mut().for_each(|w| *w = 0);
        self.status = MatchStatus::Running;
        debug!("{:?} match started with {} boards", self.mode, self.boards.len());
    }

    /// Advance every board by one tick.
    ///
    /// `inputs[p]` holds player `p`'s events for this tick; missing entries mean
    /// no input.
    pub fn tick(&mut self, elapsed_ms: u32, inputs: &[&[BoardInput]]) {
        if self.status != MatchStatus::Running {
            return;
        }
        for player in 0..self.boards.len() {
            let events = {
                let board = &mut self.boards[player];
                let input = inputs.get(player).copied().unwrap_or(&[]);
                board.update(elapsed_ms, input, &mut self.rng);
                board.take_events()
            };
            dispatch(events, self);
            if self.status != MatchStatus::Running {
                break;
            }
        }
    }

    /// Toggle pause; only a running match can pause
    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            MatchStatus::Running => MatchStatus::Paused,
            MatchStatus::Paused => MatchStatus::Running,
            other => other,
        };
    }

    /// Continue after an intermission.
    ///
    /// Solo moves to the next level; link restarts the level on every board.
    pub fn advance(&mut self) {
        let MatchStatus::Intermission { .. } = self.status else {
            return;
        };
        self.status = MatchStatus::Running;
        match self.mode {
            MatchMode::Solo => {
                let events = {
                    let board = &mut self.boards[0];
                    board.next_level(&mut self.rng);
                    board.take_events()
                };
                dispatch(events, self);
            }
            MatchMode::Link => {
                for board in &mut self.boards {
                    board.restart_level(&mut self.rng);
                }
            }
        }
    }

    /// Restart the current level on every board, keeping scores and wins
    pub fn restart_level(&mut self) {
        for board in &mut self.boards {
            board.restart_level(&mut self.rng);
        }
        self.status = MatchStatus::Running;
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn board(&self, player: usize) -> Option<&Board> {
        self.boards.get(player)
    }

    pub fn board_mut(&mut self, player: usize) -> Option<&mut Board> {
        self.boards.get_mut(player)
    }

    pub fn wins(&self, player: usize) -> u32 {
        self.wins.get(player).copied().unwrap_or(0)
    }

    pub fn wins_required(&self) -> u32 {
        self.wins_required
    }

    pub fn rng_mut(&mut self) -> &mut SimpleRng {
        &mut self.rng
    }

    fn halt_all(&mut self, state: PlayState) {
        for board in &mut self.boards {
            if board.play_state() == PlayState::InPlay || state == PlayState::GameOver {
                board.halt(state);
            }
        }
    }

    /// Credit a round to `winner` and either end the match or pause for the next round
    fn award_round(&mut self, winner: usize) {
        if let Some(w) = self.wins.get_mut(winner) {
            *w += 1;
        }
        let wins = self.wins(winner);
        debug!("player {} wins the round ({}/{})", winner, wins, self.wins_required);
        if wins >= self.wins_required {
            self.halt_all(PlayState::GameOver);
            self.status = MatchStatus::Over {
                winner: Some(winner),
            };
        } else {
            self.halt_all(PlayState::LevelChange);
            self.status = MatchStatus::Intermission {
                winner: Some(winner),
            };
        }
    }
}

impl GameFlow for Match {
    fn game_over(&mut self, player: usize) {
        match self.mode {
            MatchMode::Solo => {
                self.status = MatchStatus::Over { winner: None };
            }
            MatchMode::Link => {
                let in_play: Vec<usize> = self
                    .boards
                    .iter()
                    .filter(|b| b.play_state() == PlayState::InPlay)
                    .map(|b| b.player())
                    .collect();
                debug!("player {} is out, {} left", player, in_play.len());
                match in_play.as_slice() {
                    [winner] => self.award_round(*winner),
                    [] => {
                        self.halt_all(PlayState::LevelChange);
                        self.status = MatchStatus::Intermission { winner: None };
                    }
                    _ => {}
                }
            }
        }
    }

    fn level_complete(&mut self, player: usize) {
        match self.mode {
            MatchMode::Solo => {
                self.status = MatchStatus::Intermission {
                    winner: Some(player),
                };
            }
            MatchMode::Link => self.award_round(player),
        }
    }

    fn send_trash(&mut self, origin: usize, colors: &[PillColor]) {
        if self.mode != MatchMode::Link {
            return;
        }
        for board in &mut self.boards {
            if board.player() != origin && board.play_state() == PlayState::InPlay {
                board.queue_trash(colors);
            }
        }
    }

    fn game_complete(&mut self, _player: usize) {
        self.status = MatchStatus::Complete;
    }
}

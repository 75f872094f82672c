//! Terminal runner (default binary).
//!
//! One or two players on one keyboard. Uses crossterm for input and the
//! framebuffer renderer from `trash::term`.

use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use log::info;

use trash::core::{BoardSnapshot, GameSettings};
use trash::engine::{Match, MatchMode, MatchStatus};
use trash::input::{handle_key_event, should_quit, Action, InputQueue};
use trash::term::{BoardView, FrameBuffer, HudView, TerminalRenderer, Viewport};
use trash::types::{BoardInput, TICK_MS};

#[derive(Parser, Debug)]
#[command(name = "trash", about = "Clear the germs, send trash to your opponent")]
struct Args {
    /// 1 plays solo, 2 plays a link match on one keyboard
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    players: u8,

    /// Starting level (1-based)
    #[arg(long, default_value_t = 1)]
    level: usize,

    /// Difficulty index: 0 = Very Easy .. 4 = Very Hard
    #[arg(long, default_value_t = 2)]
    difficulty: usize,

    /// RNG seed; taken from the clock when omitted
    #[arg(long)]
    seed: Option<u32>,

    /// JSON settings file (board size, levels, difficulties)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr; RUST_LOG enables them (redirect stderr to keep the screen clean).
    env_logger::init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => GameSettings::from_json_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => GameSettings::default(),
    };
    let seed = args.seed.unwrap_or_else(clock_seed);
    info!("seed {} players {}", seed, args.players);

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &args, settings, seed);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}

fn run(term: &mut TerminalRenderer, args: &Args, settings: GameSettings, seed: u32) -> Result<()> {
    let mode = if args.players > 1 {
        MatchMode::Link
    } else {
        MatchMode::Solo
    };
    let level = args.level.saturating_sub(1);
    let mut game = Match::new(mode, args.players as usize, settings, seed);
    game.start(level, args.difficulty);

    let view = BoardView::default();
    let mut queue = InputQueue::new(game.boards().len());
    let mut snapshots: Vec<BoardSnapshot> = vec![BoardSnapshot::default(); game.boards().len()];
    let mut wins: Vec<u32> = vec![0; game.boards().len()];
    let mut fb = FrameBuffer::new(0, 0);

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        // Render.
        for (board, snap) in game.boards().iter().zip(snapshots.iter_mut()) {
            board.snapshot_into(snap);
        }
        for (player, w) in wins.iter_mut().enumerate() {
            *w = game.wins(player);
        }
        let (paused, winner) = match game.status() {
            MatchStatus::Paused => (true, None),
            MatchStatus::Intermission { winner } | MatchStatus::Over { winner } => (false, winner),
            MatchStatus::Running | MatchStatus::Complete => (false, None),
        };
        let shown_wins: &[u32] = if mode == MatchMode::Link { &wins } else { &[] };
        let hud = HudView {
            paused,
            wins: shown_wins,
            winner,
        };
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snapshots, &hud, Viewport::new(w, h), &mut fb);
        term.present(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    match handle_key_event(key) {
                        Some(Action::Play { player, input }) => {
                            queue.push(player, input);
                        }
                        Some(Action::Pause) => game.toggle_pause(),
                        Some(Action::Restart) => {
                            queue.clear();
                            game.restart_level();
                        }
                        Some(Action::Continue) => match game.status() {
                            MatchStatus::Intermission { .. } => game.advance(),
                            MatchStatus::Over { .. } | MatchStatus::Complete => {
                                game.start(level, args.difficulty)
                            }
                            _ => {}
                        },
                        None => {}
                    }
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            let batches = queue.drain_all();
            let inputs: Vec<&[BoardInput]> = batches.iter().map(|b| b.as_slice()).collect();
            game.tick(TICK_MS, &inputs);
        }
    }
}

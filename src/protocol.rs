//! Text protocol between the engine ("brain") and a tournament manager.
//!
//! The manager sends one command per line on stdin; the engine answers on
//! stdout. Command names are case-insensitive.
//!
//! ## Supported Commands
//!
//! - `START n` / `RECTSTART w,h` - set up an empty board, answer `OK`
//! - `RESTART` - clear the board, answer `OK`
//! - `TURN x,y` - opponent played at `x,y`; think and answer with a move
//! - `BEGIN` - we move first; think and answer with a move
//! - `BOARD` - followed by `x,y,who` lines and `DONE`; load the position and
//!   answer with a move (`who`: 1 ours, 2 opponent's, 3 winning block)
//! - `PLAY x,y` - play a forced move for us and echo it
//! - `TAKEBACK x,y` - remove a stone, answer `OK`
//! - `INFO key value` - match settings; unknown keys are ignored
//! - `ABOUT` - engine identification
//! - `END` - stop thinking and exit
//!
//! Anything else is answered with `UNKNOWN command ...`. Bad arguments are
//! answered with `ERROR ...` and leave the state unchanged.
//!
//! While a move is being computed the reader keeps consuming commands; any
//! command that touches the board first cancels the computation and waits for
//! the worker to report.

use std::io::{self, BufRead};

use log::{debug, info, warn};

use crate::board::{Board, Cell, Point};
use crate::config::MatchConfig;
use crate::constants::DEFAULT_BOARD;
use crate::error::{ProtocolError, SizeError};
use crate::output::Output;
use crate::threat::Evaluator;
use crate::worker::{Job, Outcome, Thinker, WorkerOptions};

/// Where the engine is in a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No board size has been established.
    Uninitialized,
    /// Waiting for the manager.
    Idle,
    /// A move computation is in flight.
    Thinking,
    /// `END` was received or input closed.
    Shutdown,
}

/// Whether the command loop should keep reading.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Clone, Debug, Default)]
pub struct EngineOptions {
    /// Answer fully tied positions with `SUGGEST` instead of moving.
    pub suggest_on_tie: bool,
    /// Answer `INFO evaluate x,y` with a `DEBUG` line.
    pub debug_eval: bool,
    /// Seed for the tie-break generator.
    pub seed: Option<u64>,
}

/// Protocol engine state.
pub struct Engine {
    board: Board,
    config: MatchConfig,
    /// False until a valid `START`/`RECTSTART`, and again after a bad one.
    sized: bool,
    /// Inside a `BOARD` ... `DONE` block.
    loading: bool,
    shutdown: bool,
    evaluator: Evaluator,
    debug_eval: bool,
    thinker: Thinker,
    out: Output,
}

/// Parse `x,y` and check it against the active board.
pub fn parse_coord(text: &str, board: &Board) -> Result<Point, ProtocolError> {
    let mut fields = text.split(',').map(str::trim);
    let (Some(x), Some(y), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ProtocolError::BadCoordinates);
    };
    let (Ok(x), Ok(y)) = (x.parse::<usize>(), y.parse::<usize>()) else {
        return Err(ProtocolError::BadCoordinates);
    };
    let p = Point::new(x, y);
    if board.is_valid(p) {
        Ok(p)
    } else {
        Err(ProtocolError::BadCoordinates)
    }
}

/// Parse a `BOARD` body line `x,y,who`. Bounds are checked on placement.
fn parse_board_line(text: &str) -> Option<(Point, u32)> {
    let mut fields = text.split(',').map(str::trim);
    let (Some(x), Some(y), Some(who), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return None;
    };
    Some((Point::new(x.parse().ok()?, y.parse().ok()?), who.parse().ok()?))
}

/// Parse `w,h` for `RECTSTART`.
fn parse_dimensions(text: &str) -> Option<(usize, usize)> {
    let (w, h) = text.split_once(',')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

impl Engine {
    /// Create an engine and start its compute worker.
    pub fn new(evaluator: Evaluator, options: EngineOptions, out: Output) -> io::Result<Self> {
        let worker_options = WorkerOptions {
            suggest_on_tie: options.suggest_on_tie,
            seed: options.seed,
        };
        let thinker = Thinker::spawn(evaluator.clone(), out.clone(), worker_options)?;
        Ok(Self {
            board: Board::new(),
            config: MatchConfig::default(),
            sized: false,
            loading: false,
            shutdown: false,
            evaluator,
            debug_eval: options.debug_eval,
            thinker,
            out,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Current state. Collects a finished computation without blocking.
    pub fn state(&mut self) -> EngineState {
        if self.shutdown {
            return EngineState::Shutdown;
        }
        if let Some(outcome) = self.thinker.poll() {
            self.commit(outcome);
        }
        if self.thinker.is_thinking() {
            EngineState::Thinking
        } else if self.sized {
            EngineState::Idle
        } else {
            EngineState::Uninitialized
        }
    }

    /// Block until the in-flight computation finishes on its own.
    pub fn settle(&mut self) {
        if let Some(outcome) = self.thinker.wait() {
            self.commit(outcome);
        }
    }

    /// Run the command loop until `END` or end of input.
    pub fn run(&mut self, input: impl BufRead) -> io::Result<()> {
        for line in input.lines() {
            if self.handle_line(&line?)? == Flow::Exit {
                return Ok(());
            }
        }
        debug!("input closed");
        self.end();
        Ok(())
    }

    fn commit(&mut self, outcome: Outcome) {
        debug!("worker reported {outcome:?}");
        if let Outcome::Played(p) = outcome {
            if let Err(e) = self.board.place(p, Cell::Mine) {
                warn!("could not record own move: {e}");
            }
        }
    }

    /// Cancel any computation and take back ownership of the board.
    fn interrupt(&mut self) {
        if let Some(outcome) = self.thinker.stop() {
            self.commit(outcome);
        }
    }

    /// Establish the default board if the manager skipped `START`.
    fn ensure_board(&mut self) {
        if self.sized {
            return;
        }
        warn!("no board size given, assuming {DEFAULT_BOARD}x{DEFAULT_BOARD}");
        match self.board.resize(DEFAULT_BOARD, DEFAULT_BOARD) {
            Ok(()) => {
                self.sized = true;
                self.config.reset_clock();
            }
            Err(e) => warn!("default board rejected: {e}"),
        }
    }

    fn think(&mut self) -> io::Result<()> {
        self.config.start_turn();
        let job = Job {
            board: self.board.clone(),
            turn_budget: self.config.turn_budget(),
        };
        if let Err(e) = self.thinker.start(job) {
            return self.out.error(e);
        }
        Ok(())
    }

    /// Handle one input line.
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let line = line.trim();
        debug!("<- {line}");
        if self.loading {
            self.load_line(line)?;
            return Ok(Flow::Continue);
        }
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (command, args) = match line.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (line, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "info" => self.info(args)?,
            "start" => self.start(args)?,
            "rectstart" => self.rectstart(args)?,
            "restart" => self.restart()?,
            "turn" => self.turn(args)?,
            "play" => self.play(args)?,
            "begin" => self.begin()?,
            "board" => self.begin_board(),
            "takeback" => self.takeback(args)?,
            "about" => self.about()?,
            "end" => {
                self.end();
                return Ok(Flow::Exit);
            }
            _ => self.out.line(format!("UNKNOWN command {line}"))?,
        }
        Ok(Flow::Continue)
    }

    fn info(&mut self, args: &str) -> io::Result<()> {
        let (key, value) = match args.split_once(char::is_whitespace) {
            Some((key, value)) => (key, value.trim()),
            None => (args, ""),
        };
        if key.eq_ignore_ascii_case("evaluate") {
            return self.evaluate(value);
        }
        match self.config.apply_info(key, value) {
            Ok(_) => Ok(()),
            Err(e) => self.out.error(e),
        }
    }

    fn evaluate(&mut self, args: &str) -> io::Result<()> {
        if !self.debug_eval || self.state() != EngineState::Idle {
            debug!("ignoring INFO evaluate");
            return Ok(());
        }
        match parse_coord(args, &self.board) {
            Ok(p) => {
                let b = self.evaluator.breakdown(&self.board, p);
                self.out.line(format!(
                    "DEBUG {p} offense={} defense={} combined={}",
                    b.offense, b.defense, b.combined
                ))
            }
            Err(e) => self.out.error(e),
        }
    }

    /// `malformed` is reported for sizes below the minimum.
    fn init_board(
        &mut self,
        width: usize,
        height: usize,
        malformed: ProtocolError,
    ) -> io::Result<()> {
        match self.board.resize(width, height) {
            Ok(()) => {
                info!("new match on {width}x{height}");
                self.sized = true;
                self.config.reset_clock();
                self.out.ok()
            }
            Err(SizeError::TooSmall(..)) => {
                self.sized = false;
                self.out.error(malformed)
            }
            Err(e) => {
                self.sized = false;
                self.out.error(ProtocolError::from(e))
            }
        }
    }

    fn start(&mut self, args: &str) -> io::Result<()> {
        self.interrupt();
        match args.parse::<usize>() {
            Ok(size) => self.init_board(size, size, ProtocolError::BadStart),
            Err(_) => {
                self.sized = false;
                self.out.error(ProtocolError::BadStart)
            }
        }
    }

    fn rectstart(&mut self, args: &str) -> io::Result<()> {
        self.interrupt();
        match parse_dimensions(args) {
            Some((width, height)) => {
                self.init_board(width, height, ProtocolError::BadRectStart)
            }
            None => {
                self.sized = false;
                self.out.error(ProtocolError::BadRectStart)
            }
        }
    }

    fn restart(&mut self) -> io::Result<()> {
        self.interrupt();
        self.ensure_board();
        self.board.reset();
        self.config.reset_clock();
        self.out.ok()
    }

    fn turn(&mut self, args: &str) -> io::Result<()> {
        self.interrupt();
        self.ensure_board();
        let p = match parse_coord(args, &self.board) {
            Ok(p) => p,
            Err(e) => return self.out.error(e),
        };
        if let Err(e) = self.board.place(p, Cell::Opponent) {
            // Still our move; think on the position as we know it.
            self.out.error(format_args!("opponent's move {e}"))?;
        }
        self.think()
    }

    fn play(&mut self, args: &str) -> io::Result<()> {
        self.interrupt();
        self.ensure_board();
        let p = match parse_coord(args, &self.board) {
            Ok(p) => p,
            Err(e) => return self.out.error(e),
        };
        match self.board.place(p, Cell::Mine) {
            Ok(()) => self.out.line(p),
            Err(e) => self.out.error(format_args!("my move {e}")),
        }
    }

    fn begin(&mut self) -> io::Result<()> {
        self.interrupt();
        self.ensure_board();
        self.think()
    }

    fn begin_board(&mut self) {
        self.interrupt();
        self.ensure_board();
        self.board.reset();
        self.loading = true;
    }

    /// One line of a `BOARD` block.
    fn load_line(&mut self, line: &str) -> io::Result<()> {
        if line.eq_ignore_ascii_case("done") {
            self.loading = false;
            return self.think();
        }
        let Some((p, who)) = parse_board_line(line) else {
            self.loading = false;
            self.out.error(ProtocolError::BadBoardLine)?;
            return self.think();
        };
        let (cell, owner) = match who {
            1 => (Cell::Mine, "my move"),
            2 => (Cell::Opponent, "opponent's move"),
            3 => (Cell::WinningBlock, "winning move"),
            _ => {
                warn!("ignoring BOARD line with owner {who}");
                return Ok(());
            }
        };
        match self.board.place(p, cell) {
            Ok(()) => Ok(()),
            Err(e) => self.out.error(format_args!("{owner} {e}")),
        }
    }

    fn takeback(&mut self, args: &str) -> io::Result<()> {
        self.interrupt();
        self.ensure_board();
        let p = match parse_coord(args, &self.board) {
            Ok(p) => p,
            Err(e) => return self.out.error(e),
        };
        match self.board.clear(p) {
            Ok(()) => self.out.ok(),
            Err(e) => self.out.error(e),
        }
    }

    fn about(&self) -> io::Result<()> {
        self.out.line(format!(
            "name=\"pbrain-threat\", version=\"{}\", author=\"threat-brain developers\", country=\"\", www=\"\"",
            env!("CARGO_PKG_VERSION")
        ))
    }

    fn end(&mut self) {
        self.interrupt();
        self.loading = false;
        self.shutdown = true;
        info!("match over");
    }
}

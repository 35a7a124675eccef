//! Background move computation with cooperative cancellation.
//!
//! The command reader hands a board snapshot to a dedicated worker thread
//! over a single-slot channel and keeps reading commands. The worker writes
//! its move to the shared [`Output`] as soon as it has one, then reports the
//! [`Outcome`] back over a second single-slot channel. The reader commits the
//! outcome to its own board the next time it needs the board.
//!
//! Cancellation sets a shared flag that the worker checks before starting and
//! between candidate cells; the reader then blocks until the worker reports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::board::{Board, Point};
use crate::error::{BoardError, WorkerGone};
use crate::output::Output;
use crate::selector::{Choice, select_move};
use crate::threat::Evaluator;

/// One turn's worth of work.
pub struct Job {
    /// Snapshot of the position to move in.
    pub board: Board,
    /// Advertised per-turn budget. Only used to report overruns.
    pub turn_budget: Option<Duration>,
}

/// What the worker did with a job.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The move was sent and must be committed as our stone.
    Played(Point),
    /// The move was only suggested; the manager will answer with `PLAY`.
    Suggested(Point),
    /// The selected cell was not free; an error was sent instead of a move.
    Refused(Point),
    /// Cancelled before a move was chosen. Nothing was sent.
    Cancelled,
}

#[derive(Clone, Debug, Default)]
pub struct WorkerOptions {
    /// Answer fully tied positions with `SUGGEST` instead of a move.
    pub suggest_on_tie: bool,
    /// Seed for the tie-break generator.
    pub seed: Option<u64>,
}

struct Worker {
    evaluator: Evaluator,
    rng: fastrand::Rng,
    out: Output,
    cancel: Arc<AtomicBool>,
    suggest_on_tie: bool,
}

impl Worker {
    fn run(mut self, jobs: Receiver<Job>, results: SyncSender<Outcome>) {
        for job in jobs {
            let outcome = self.think(&job);
            if results.send(outcome).is_err() {
                break;
            }
        }
        debug!("worker exiting");
    }

    fn think(&mut self, job: &Job) -> Outcome {
        let started = Instant::now();
        let Some(choice) = select_move(&job.board, &self.evaluator, &self.cancel, &mut self.rng)
        else {
            debug!("computation cancelled after {:?}", started.elapsed());
            return Outcome::Cancelled;
        };

        let elapsed = started.elapsed();
        debug!("chose {choice:?} in {elapsed:?}");
        if let Some(budget) = job.turn_budget {
            if elapsed > budget {
                warn!("turn took {elapsed:?}, over the {budget:?} budget");
            }
        }

        let p = choice.point();
        let (outcome, sent) = if !job.board.is_free(p) {
            (Outcome::Refused(p), self.out.error(BoardError::Occupied(p)))
        } else if matches!(choice, Choice::Center(_)) && self.suggest_on_tie {
            (Outcome::Suggested(p), self.out.line(format!("SUGGEST {p}")))
        } else {
            (Outcome::Played(p), self.out.line(p))
        };
        if let Err(e) = sent {
            error!("failed to send move {p}: {e}");
        }
        outcome
    }
}

/// Reader-side handle to the compute worker.
pub struct Thinker {
    jobs: Option<SyncSender<Job>>,
    results: Receiver<Outcome>,
    cancel: Arc<AtomicBool>,
    in_flight: bool,
    handle: Option<JoinHandle<()>>,
}

impl Thinker {
    /// Start the worker thread.
    pub fn spawn(evaluator: Evaluator, out: Output, options: WorkerOptions) -> std::io::Result<Self> {
        let (job_tx, job_rx) = mpsc::sync_channel(1);
        let (result_tx, result_rx) = mpsc::sync_channel(1);
        let cancel = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            evaluator,
            rng: options.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            out,
            cancel: Arc::clone(&cancel),
            suggest_on_tie: options.suggest_on_tie,
        };
        let handle = thread::Builder::new()
            .name("think".to_string())
            .spawn(move || worker.run(job_rx, result_tx))?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            cancel,
            in_flight: false,
            handle: Some(handle),
        })
    }

    pub fn is_thinking(&self) -> bool {
        self.in_flight
    }

    /// Hand a new job to the worker.
    ///
    /// The previous computation must have been collected with [`stop`],
    /// [`wait`] or [`poll`] first.
    ///
    /// [`stop`]: Thinker::stop
    /// [`wait`]: Thinker::wait
    /// [`poll`]: Thinker::poll
    pub fn start(&mut self, job: Job) -> Result<(), WorkerGone> {
        debug_assert!(!self.in_flight, "a computation is already in flight");
        self.cancel.store(false, Ordering::Relaxed);
        let jobs = self.jobs.as_ref().ok_or(WorkerGone)?;
        jobs.send(job).map_err(|_| WorkerGone)?;
        self.in_flight = true;
        Ok(())
    }

    fn collect(&mut self) -> Option<Outcome> {
        if !self.in_flight {
            return None;
        }
        self.in_flight = false;
        match self.results.recv() {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                error!("compute worker stopped without reporting");
                Some(Outcome::Cancelled)
            }
        }
    }

    /// Ask the worker to abandon its computation and wait until it reports.
    pub fn stop(&mut self) -> Option<Outcome> {
        if self.in_flight {
            self.cancel.store(true, Ordering::Relaxed);
        }
        self.collect()
    }

    /// Wait for the in-flight computation to finish on its own.
    pub fn wait(&mut self) -> Option<Outcome> {
        self.collect()
    }

    /// Collect the outcome if the worker has already reported.
    pub fn poll(&mut self) -> Option<Outcome> {
        if !self.in_flight {
            return None;
        }
        match self.results.try_recv() {
            Ok(outcome) => {
                self.in_flight = false;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.in_flight = false;
                error!("compute worker stopped without reporting");
                Some(Outcome::Cancelled)
            }
        }
    }
}

impl Drop for Thinker {
    fn drop(&mut self) {
        self.stop();
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("compute worker panicked");
            }
        }
    }
}

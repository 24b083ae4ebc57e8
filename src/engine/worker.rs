//! Background thread that owns the engine session so the frame loop never
//! blocks on engine IO.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use super::client::{EngineClient, EngineKiller};
use super::session::{AppliedMove, EngineSession};
use crate::config::EngineConfig;
use crate::error::{EngineError, ProtocolError};
use crate::game::{Column, Player};

pub type JobId = u64;

/// Work the UI asks the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineJob {
    PlayMove { column: Column, player: Player },
    Search { depth: u32, player: Player },
    NewGame,
}

/// Result of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    MoveApplied(AppliedMove),
    BestMove(Column),
    Rejected(ProtocolError),
    Done,
}

/// Where the turn controller sends engine work.
pub trait JobSink {
    /// Queue a job, returning its id.
    fn submit(&mut self, job: EngineJob) -> Result<JobId, EngineError>;

    /// Abandon a job; its reply must not be delivered.
    fn cancel(&mut self, id: JobId);
}

enum WorkerRequest {
    Job {
        id: JobId,
        job: EngineJob,
        cancel: Arc<AtomicBool>,
    },
    Shutdown,
}

fn run_job(session: &mut EngineSession, job: EngineJob) -> JobOutcome {
    match job {
        EngineJob::PlayMove { column, player } => match session.play_move(column, player) {
            Ok(applied) => JobOutcome::MoveApplied(applied),
            Err(e) => JobOutcome::Rejected(e),
        },
        EngineJob::Search { depth, player } => match session.search(depth, player) {
            Ok(column) => JobOutcome::BestMove(column),
            Err(e) => JobOutcome::Rejected(e),
        },
        EngineJob::NewGame => {
            session.new_game();
            JobOutcome::Done
        }
    }
}

/// Handle to the engine thread. Jobs run strictly one after another.
pub struct EngineWorker {
    requests: mpsc::Sender<WorkerRequest>,
    replies: mpsc::Receiver<(JobId, JobOutcome)>,
    tokens: HashMap<JobId, Arc<AtomicBool>>,
    /// Jobs the thread has not finished with, cancelled ones included.
    in_flight: Arc<AtomicUsize>,
    next_id: JobId,
    killer: Option<EngineKiller>,
    handle: Option<JoinHandle<()>>,
}

impl EngineWorker {
    /// Start the configured engine process and a worker driving it.
    pub fn launch(config: &EngineConfig) -> Result<Self, EngineError> {
        let client = EngineClient::spawn(&config.path, &config.args)?;
        Self::spawn(EngineSession::new(client))
    }

    /// Move `session` onto a new thread.
    pub fn spawn(mut session: EngineSession) -> Result<Self, EngineError> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<(JobId, JobOutcome)>();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let remaining = in_flight.clone();
        let killer = session.killer();

        let handle = std::thread::Builder::new()
            .name("engine".to_string())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let (id, job, cancel) = match request {
                        WorkerRequest::Job { id, job, cancel } => (id, job, cancel),
                        WorkerRequest::Shutdown => break,
                    };
                    if cancel.load(Ordering::Relaxed) {
                        debug!(id, ?job, "job cancelled before start");
                        remaining.fetch_sub(1, Ordering::AcqRel);
                        continue;
                    }
                    let outcome = run_job(&mut session, job);
                    remaining.fetch_sub(1, Ordering::AcqRel);
                    if cancel.load(Ordering::Relaxed) {
                        debug!(id, ?job, "dropping reply of cancelled job");
                        continue;
                    }
                    if reply_tx.send((id, outcome)).is_err() {
                        break;
                    }
                }
                session.close();
                info!("engine worker stopped");
            })?;

        Ok(EngineWorker {
            requests: request_tx,
            replies: reply_rx,
            tokens: HashMap::new(),
            in_flight,
            next_id: 1,
            killer,
            handle: Some(handle),
        })
    }

    fn accept(&mut self, (id, outcome): (JobId, JobOutcome)) -> Option<(JobId, JobOutcome)> {
        self.tokens.remove(&id).map(|_| (id, outcome))
    }

    /// Next finished job, if any, without blocking.
    pub fn try_recv(&mut self) -> Option<(JobId, JobOutcome)> {
        while let Ok(reply) = self.replies.try_recv() {
            if let Some(reply) = self.accept(reply) {
                return Some(reply);
            }
        }
        None
    }
}

impl JobSink for EngineWorker {
    fn submit(&mut self, job: EngineJob) -> Result<JobId, EngineError> {
        let id = self.next_id;
        self.next_id += 1;
        let cancel = Arc::new(AtomicBool::new(false));
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let sent = self.requests.send(WorkerRequest::Job {
            id,
            job,
            cancel: cancel.clone(),
        });
        if sent.is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return Err(EngineError::WorkerGone);
        }
        self.tokens.insert(id, cancel);
        debug!(id, ?job, "job submitted");
        Ok(id)
    }

    fn cancel(&mut self, id: JobId) {
        if let Some(token) = self.tokens.remove(&id) {
            token.store(true, Ordering::Relaxed);
            debug!(id, "job cancelled");
        }
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        let _ = self.requests.send(WorkerRequest::Shutdown);
        let Some(handle) = self.handle.take() else {
            return;
        };
        let busy = self.in_flight.load(Ordering::Acquire);
        if busy == 0 {
            let _ = handle.join();
            return;
        }
        // The thread may be stuck on a hung engine. Ending the engine gives
        // it EOF, after which it closes the session on its own.
        match self.killer.as_ref() {
            Some(kill) => {
                warn!(busy, "engine busy at shutdown, killing it");
                kill();
            }
            None => warn!(busy, "engine busy at shutdown, not waiting for worker"),
        }
    }
}

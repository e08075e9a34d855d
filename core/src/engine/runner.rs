//! Async driver for a [`TimerEngine`]
//!
//! One tokio task owns the engine. Control calls, cue callbacks and the
//! one-second tick all arrive at that task and are handled one at a time,
//! so the cue-ended and countdown-zero paths can never race.

use hiit_types::{PhaseKind, Settings};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::cues::{CueHandle, CuePlayer};
use crate::events::EventSink;

use super::{EngineError, RunSnapshot, RunnerError, TICK_PERIOD, TimerEngine};

/// Commands accepted by the engine task
#[derive(Debug)]
enum Command {
    Start {
        settings: Settings,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Pause,
    Resume,
    TogglePause,
    Reset {
        reply: oneshot::Sender<()>,
    },
    CueEnded(CueHandle),
    CueFailed(CueHandle),
    CueDurationDiscovered {
        kind: PhaseKind,
        secs: f64,
    },
    CueUnavailable(PhaseKind),
    Snapshot {
        reply: oneshot::Sender<RunSnapshot>,
    },
    Shutdown,
}

/// Cloneable handle for sending commands to the engine task.
///
/// Cue players hold a clone to report cue endings and discovered durations.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

/// Receiving half consumed by [`spawn_engine`]
#[derive(Debug)]
pub struct EngineInbox {
    cmd_rx: mpsc::UnboundedReceiver<Command>,
}

impl EngineHandle {
    /// Create a handle before the engine exists, so collaborators that need
    /// to call back into it can be built first.
    pub fn channel() -> (EngineHandle, EngineInbox) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (EngineHandle { cmd_tx }, EngineInbox { cmd_rx })
    }

    fn send(&self, cmd: Command) -> Result<(), RunnerError> {
        self.cmd_tx.send(cmd).map_err(|_| RunnerError::Closed)
    }

    /// Start a run and wait for the engine to accept or reject it
    pub async fn start(&self, settings: Settings) -> Result<(), RunnerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start { settings, reply })?;
        rx.await.map_err(|_| RunnerError::Closed)??;
        Ok(())
    }

    pub fn pause(&self) -> Result<(), RunnerError> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> Result<(), RunnerError> {
        self.send(Command::Resume)
    }

    pub fn toggle_pause(&self) -> Result<(), RunnerError> {
        self.send(Command::TogglePause)
    }

    /// Reset to idle. Once this returns no further tick reaches the engine.
    pub async fn reset(&self) -> Result<(), RunnerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset { reply })?;
        rx.await.map_err(|_| RunnerError::Closed)
    }

    pub fn cue_ended(&self, handle: CueHandle) -> Result<(), RunnerError> {
        self.send(Command::CueEnded(handle))
    }

    pub fn cue_failed(&self, handle: CueHandle) -> Result<(), RunnerError> {
        self.send(Command::CueFailed(handle))
    }

    pub fn cue_duration_discovered(&self, kind: PhaseKind, secs: f64) -> Result<(), RunnerError> {
        self.send(Command::CueDurationDiscovered { kind, secs })
    }

    pub fn cue_unavailable(&self, kind: PhaseKind) -> Result<(), RunnerError> {
        self.send(Command::CueUnavailable(kind))
    }

    pub async fn snapshot(&self) -> Result<RunSnapshot, RunnerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply })?;
        rx.await.map_err(|_| RunnerError::Closed)
    }

    /// Stop the engine task; the join handle then yields the engine
    pub fn shutdown(&self) {
        let _ = self.send(Command::Shutdown);
    }
}

/// Spawn the task that owns `engine`.
///
/// The task ends when every [`EngineHandle`] is dropped or after
/// [`EngineHandle::shutdown`], returning the engine.
pub fn spawn_engine<P, S>(
    inbox: EngineInbox,
    engine: TimerEngine<P, S>,
) -> JoinHandle<TimerEngine<P, S>>
where
    P: CuePlayer + Send + 'static,
    S: EventSink + Send + 'static,
{
    tokio::spawn(run_engine(inbox, engine))
}

async fn run_engine<P: CuePlayer, S: EventSink>(
    mut inbox: EngineInbox,
    mut engine: TimerEngine<P, S>,
) -> TimerEngine<P, S> {
    let mut ticker: Option<Interval> = None;
    let mut epoch = engine.ticker_epoch();

    loop {
        tokio::select! {
            // Commands first: a reset racing a tick must win
            biased;

            cmd = inbox.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => handle_command(&mut engine, cmd),
                }
            }
            _ = next_tick(&mut ticker) => engine.tick(),
        }

        sync_ticker(&engine, &mut ticker, &mut epoch);
    }

    tracing::debug!("Timer engine task stopped");
    engine
}

fn handle_command<P: CuePlayer, S: EventSink>(engine: &mut TimerEngine<P, S>, cmd: Command) {
    match cmd {
        Command::Start { settings, reply } => {
            let result = engine.start(settings);
            if let Err(ref e) = result {
                tracing::warn!(?settings, error = %e, "Refusing to start workout");
            }
            let _ = reply.send(result);
        }
        Command::Pause => engine.pause(),
        Command::Resume => engine.resume(),
        Command::TogglePause => engine.toggle_pause(),
        Command::Reset { reply } => {
            engine.reset();
            let _ = reply.send(());
        }
        Command::CueEnded(handle) => engine.cue_ended(handle),
        Command::CueFailed(handle) => engine.cue_failed(handle),
        Command::CueDurationDiscovered { kind, secs } => engine.cue_duration_discovered(kind, secs),
        Command::CueUnavailable(kind) => engine.cue_unavailable(kind),
        Command::Snapshot { reply } => {
            let _ = reply.send(engine.snapshot());
        }
        Command::Shutdown => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Match the interval to what the engine wants: dropped when stopped,
/// recreated (first tick one period out) whenever the epoch moves.
fn sync_ticker<P: CuePlayer, S: EventSink>(
    engine: &TimerEngine<P, S>,
    ticker: &mut Option<Interval>,
    epoch: &mut u64,
) {
    if !engine.is_ticking() {
        *ticker = None;
        return;
    }
    if ticker.is_none() || *epoch != engine.ticker_epoch() {
        let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        *ticker = Some(interval);
        *epoch = engine.ticker_epoch();
    }
}

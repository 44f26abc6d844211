//! Tokio driver that turns the sync [`RevealScheduler`] into a live,
//! self-rescheduling timer chain.
//!
//! This follows the actor-style design from
//! [“Actors with Tokio”](https://ryhl.io/blog/actors-with-tokio/): a spawned
//! [`StreamDriver`] task owns the scheduler outright, a cloneable
//! [`StreamHandle`] feeds it commands over an unbounded channel, and revealed
//! [`DisplayUnit`]s flow out over a channel the host supplies at spawn time.
//!
//! Single ownership is what makes cancellation race-free: every command and
//! every timer wakeup is serialized through one `select!` loop, the sleep
//! target is recomputed from the scheduler's own deadline on every
//! iteration, and a wakeup armed under an earlier session generation reveals
//! nothing.

use std::time::Duration;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::config::StreamConfig;
use crate::reveal::DisplayUnit;
use crate::scheduler::RevealScheduler;

/// Current time per the tokio runtime clock, so paused-clock tests and
/// `tokio::time::advance` steer the scheduler; identical to
/// `std::time::Instant::now()` on an unpaused runtime.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[derive(Debug)]
enum Command {
    /// Cumulative incoming text (not a delta).
    Text(String),
    SetConfig(StreamConfig),
    Reset,
}

/// Cloneable handle to a spawned [`StreamDriver`] task.
///
/// Dropping every handle closes the command channel and terminates the task.
#[derive(Clone, Debug)]
pub struct StreamHandle {
    command_tx: mpsc::UnboundedSender<Command>,
}

impl StreamHandle {
    /// Spawns a driver task for one streaming surface. Revealed units are
    /// delivered on `reveal_tx` in arrival order, at their scheduled times.
    pub fn spawn(config: StreamConfig, reveal_tx: mpsc::UnboundedSender<DisplayUnit>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let driver = StreamDriver {
            scheduler: RevealScheduler::new(config, now()),
            command_rx,
            reveal_tx,
        };
        tokio::spawn(driver.run());
        Self { command_tx }
    }

    /// Feeds the cumulative text received so far.
    pub fn sync_text(&self, cumulative: impl Into<String>) {
        let _ = self.command_tx.send(Command::Text(cumulative.into()));
    }

    /// Replaces the configuration; any change restarts the session.
    pub fn set_config(&self, config: StreamConfig) {
        let _ = self.command_tx.send(Command::SetConfig(config));
    }

    /// Tears down the current session: pending tokens are dropped and
    /// outstanding reveal timers become no-ops.
    pub fn reset(&self) {
        let _ = self.command_tx.send(Command::Reset);
    }
}

/// Actor task owning one [`RevealScheduler`].
struct StreamDriver {
    scheduler: RevealScheduler,
    command_rx: mpsc::UnboundedReceiver<Command>,
    reveal_tx: mpsc::UnboundedSender<DisplayUnit>,
}

impl StreamDriver {
    async fn run(mut self) {
        const IDLE: Duration = Duration::from_secs(60 * 60 * 24 * 365);
        loop {
            let generation = self.scheduler.generation();
            let target = self
                .scheduler
                .next_deadline()
                .unwrap_or_else(|| now() + IDLE);
            let deadline = tokio::time::sleep_until(target.into());
            tokio::pin!(deadline);

            tokio::select! {
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        // All handles dropped; exit the driver.
                        break;
                    };
                    self.apply(command, now());
                }
                _ = &mut deadline => {
                    if self.scheduler.generation() != generation {
                        // Stale wakeup from a torn-down session.
                        continue;
                    }
                    for unit in self.scheduler.reveal_due(now()) {
                        if self.reveal_tx.send(unit).is_err() {
                            tracing::debug!("reveal receiver dropped; stopping driver");
                            return;
                        }
                    }
                }
            }
        }
    }

    fn apply(&mut self, command: Command, now: Instant) {
        match command {
            Command::Text(cumulative) => {
                self.scheduler.sync_text(&cumulative, now);
            }
            Command::SetConfig(config) => {
                self.scheduler.set_config(config, now);
            }
            Command::Reset => {
                self.scheduler.reset(now);
            }
        }
    }
}

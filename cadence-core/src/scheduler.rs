//! The reveal scheduler: a session-scoped state machine that smooths bursty
//! token arrivals into a steady reveal cadence.
//!
//! One [`RevealScheduler`] owns all state for one streaming session: the
//! text cursor, the FIFO pending queue, the pacing window, and the schedule
//! high-water mark. Nothing here sleeps or spawns; every operation takes an
//! explicit `now` so the state machine is deterministic under test, and a
//! host (or the [`crate::driver`] actor) supplies real time and timers.
//!
//! The key invariants:
//!
//! - Reveal order is arrival order. The queue is strictly FIFO and deadline
//!   computation is monotone, so jitter can never reorder words.
//! - Scheduled reveal times never regress. Every newly armed deadline is
//!   clamped to the running high-water mark.
//! - A reset invalidates everything at once: queue, window, cursor, and the
//!   generation counter that lets in-flight timer callbacks detect they are
//!   stale.

use std::collections::VecDeque;
use std::time::Duration;
use std::time::Instant;

use crate::config::RevealStrategy;
use crate::config::StreamConfig;
use crate::pacing::PacingWindow;
use crate::pacing::interpolate_batch;
use crate::reveal::DisplayUnit;
use crate::tokenize::tokenize;

/// One token awaiting reveal.
#[derive(Debug)]
struct PendingToken {
    value: String,
    /// Monotonic sequence id, the token's stable rendering identity.
    seq: u64,
    /// Interpolated arrival timestamp (used for queue-age observability).
    arrival: Instant,
    /// Absolute reveal deadline. Under [`RevealStrategy::AbsoluteDeadline`]
    /// this is assigned at enqueue; under [`RevealStrategy::FixedCadence`]
    /// only the queue head is armed and successors are armed as the chain
    /// advances.
    reveal_at: Option<Instant>,
}

/// What one [`RevealScheduler::sync_text`] call did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalOutcome {
    /// Number of tokens extracted from the new suffix and enqueued.
    pub new_tokens: usize,
    /// Whether the call triggered an implicit session reset (the incoming
    /// text was shorter than previously seen, or not a valid extension).
    pub reset: bool,
}

/// Session-scoped reveal scheduler.
#[derive(Debug)]
pub struct RevealScheduler {
    config: StreamConfig,
    /// Byte length of the cumulative incoming text already processed.
    cursor: usize,
    next_seq: u64,
    pending: VecDeque<PendingToken>,
    window: PacingWindow,
    /// Arrival time of the most recent batch (or session start).
    last_arrival: Instant,
    /// Deadline of the most recently revealed token, if any.
    last_reveal: Option<Instant>,
    /// High-water mark over all armed deadlines this session.
    high_water: Option<Instant>,
    /// Reveal delay per token, recomputed at every batch arrival.
    cadence: Duration,
    generation: u64,
}

impl RevealScheduler {
    /// Creates a fresh session with the given configuration.
    pub fn new(config: StreamConfig, now: Instant) -> Self {
        let window = PacingWindow::new(config.window_size);
        Self {
            config,
            cursor: 0,
            next_seq: 0,
            pending: VecDeque::new(),
            window,
            last_arrival: now,
            last_reveal: None,
            high_water: None,
            cadence: Duration::ZERO,
            generation: 0,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Session generation, bumped on every reset. Timer callbacks capture the
    /// generation before suspending and must treat a mismatch as "stale: do
    /// nothing", so a cancelled session can never leak tokens into its
    /// successor.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns whether no tokens are pending (the `Idle` state).
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Current pending-queue depth.
    pub fn queued_len(&self) -> usize {
        self.pending.len()
    }

    /// Effective per-token reveal delay as of the latest batch arrival.
    pub fn current_cadence(&self) -> Duration {
        self.cadence
    }

    /// Replaces the configuration. Any observable change invalidates the
    /// whole pipeline: pending tokens, pacing history, and the text cursor
    /// are discarded and a new session generation begins.
    pub fn set_config(&mut self, config: StreamConfig, now: Instant) {
        if self.config == config {
            return;
        }
        self.config = config;
        self.window = PacingWindow::new(self.config.window_size);
        self.reset(now);
    }

    /// Tears down all session state and starts a new generation. Deadlines
    /// armed before the reset are forgotten; callbacks holding the old
    /// generation become no-ops.
    pub fn reset(&mut self, now: Instant) {
        tracing::debug!(
            generation = self.generation,
            dropped = self.pending.len(),
            "reveal scheduler reset"
        );
        self.generation += 1;
        self.cursor = 0;
        self.pending.clear();
        self.window.clear();
        self.last_arrival = now;
        self.last_reveal = None;
        self.high_water = None;
        self.cadence = Duration::ZERO;
    }

    /// Feeds the cumulative incoming text (not a delta) into the session.
    ///
    /// The suffix beyond the internal cursor is tokenized, timed, and
    /// enqueued. Unchanged input is a no-op. Input shorter than previously
    /// seen (or no longer a valid extension of it) is treated as a new
    /// session, not an error.
    pub fn sync_text(&mut self, incoming: &str, now: Instant) -> ArrivalOutcome {
        let mut outcome = ArrivalOutcome::default();
        if incoming.len() < self.cursor {
            self.reset(now);
            outcome.reset = true;
        }
        if incoming.len() == self.cursor {
            return outcome;
        }
        let delta = match incoming.get(self.cursor..) {
            Some(delta) => delta,
            None => {
                // The cursor no longer falls on a character boundary, so the
                // new text cannot be an extension of what we saw before.
                self.reset(now);
                outcome.reset = true;
                incoming
            }
        };

        let tokens = tokenize(delta, self.config.separator);
        self.cursor = incoming.len();
        if tokens.is_empty() {
            return outcome;
        }
        outcome.new_tokens = tokens.len();

        let stamps = interpolate_batch(self.last_arrival, now, tokens.len());
        if !self.config.smoothing_disabled() {
            for stamp in &stamps {
                self.window.observe(*stamp);
            }
        }
        self.last_arrival = now;
        self.cadence = self
            .window
            .average_interval()
            .mul_f64(self.config.delay_multiplier);

        let was_idle = self.pending.is_empty();
        for (value, arrival) in tokens.into_iter().zip(stamps) {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.pending.push_back(PendingToken {
                value,
                seq,
                arrival,
                reveal_at: None,
            });
        }

        match self.config.strategy {
            RevealStrategy::FixedCadence => {
                if was_idle {
                    self.arm_head(now);
                }
                // Otherwise the existing chain picks the new tokens up as it
                // advances; arming again would create redundant timers.
            }
            RevealStrategy::AbsoluteDeadline => {
                self.assign_absolute_deadlines(now, outcome.new_tokens);
            }
        }

        tracing::trace!(
            new_tokens = outcome.new_tokens,
            queued = self.pending.len(),
            cadence_ms = self.cadence.as_millis() as u64,
            reset = outcome.reset,
            "text batch arrived"
        );
        outcome
    }

    /// Earliest armed reveal deadline, or `None` when the session is idle.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.front().and_then(|token| token.reveal_at)
    }

    /// Reveals every token whose deadline has passed, in arrival order.
    ///
    /// Under fixed cadence this also advances the timer chain: each pop arms
    /// the successor one cadence after the popped token's deadline, so a
    /// late tick drains everything that became due in the meantime while a
    /// punctual tick reveals exactly one token.
    pub fn reveal_due(&mut self, now: Instant) -> Vec<DisplayUnit> {
        let mut revealed = Vec::new();
        while let Some(head) = self.pending.front() {
            let Some(at) = head.reveal_at else { break };
            if at > now {
                break;
            }
            let Some(token) = self.pending.pop_front() else {
                break;
            };
            tracing::trace!(
                seq = token.seq,
                queued_for_ms = at.saturating_duration_since(token.arrival).as_millis() as u64,
                "reveal"
            );
            self.last_reveal = Some(at);
            revealed.push(DisplayUnit {
                content: token.value,
                key: token.seq,
                animation: self.config.animation.clone(),
            });
            if self.config.strategy == RevealStrategy::FixedCadence {
                self.arm_successor(at);
            }
        }
        revealed
    }

    /// Arms the queue head of an idle fixed-cadence chain.
    ///
    /// The natural time is one cadence after the previous reveal (the chain
    /// conceptually stays warm between batches), clamped to `now` going
    /// forward and to the high-water mark going backward.
    fn arm_head(&mut self, now: Instant) {
        let natural = match self.last_reveal {
            Some(last) => (last + self.cadence).max(now),
            None => now,
        };
        let at = self.clamp_to_high_water(natural);
        if let Some(head) = self.pending.front_mut() {
            head.reveal_at = Some(at);
        }
    }

    /// Arms the token after a just-revealed one at `revealed_at + cadence`.
    fn arm_successor(&mut self, revealed_at: Instant) {
        if !self
            .pending
            .front()
            .is_some_and(|next| next.reveal_at.is_none())
        {
            return;
        }
        let at = self.clamp_to_high_water(revealed_at + self.cadence);
        if let Some(next) = self.pending.front_mut() {
            next.reveal_at = Some(at);
        }
    }

    /// Assigns absolute deadlines to the `count` most recently enqueued
    /// tokens: `now + (position + 1) * cadence`, clamped so no deadline
    /// lands before `now` or before an already-armed one.
    fn assign_absolute_deadlines(&mut self, now: Instant, count: usize) {
        let cadence = self.cadence;
        let start = self.pending.len() - count;
        for position in 0..count {
            let natural = now + cadence.mul_f64((position + 1) as f64);
            let at = self.clamp_to_high_water(natural);
            if let Some(token) = self.pending.get_mut(start + position) {
                token.reveal_at = Some(at);
            }
        }
    }

    /// Clamps a candidate deadline to the high-water mark and records the
    /// result as the new mark.
    fn clamp_to_high_water(&mut self, candidate: Instant) -> Instant {
        let at = match self.high_water {
            Some(mark) => candidate.max(mark),
            None => candidate,
        };
        self.high_water = Some(at);
        at
    }
}

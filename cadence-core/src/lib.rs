//! Smoothed token-by-token reveal for incrementally arriving text.
//!
//! Streamed output (for example from a language model) arrives in bursty,
//! jittery batches. This crate diffs each cumulative snapshot against what it
//! has already seen, splits the new suffix into display tokens, estimates the
//! arrival cadence over a trailing window, and schedules each token's reveal
//! so the burstiness is smoothed into a steady, readable rate.
//!
//! The pipeline is one-directional:
//!
//! ```text
//! cumulative text -> tokenize -> pacing window -> reveal scheduler -> display units
//! ```
//!
//! [`RevealScheduler`] is the deterministic core: it never sleeps and takes
//! an explicit `now` everywhere, so hosts with their own event loop can
//! drive it directly (`sync_text` / `next_deadline` / `reveal_due`).
//! [`StreamHandle`] wraps it in a tokio actor task for hosts that just want
//! revealed units on a channel at the right times.

mod config;
mod driver;
mod error;
mod pacing;
mod reveal;
mod scheduler;
mod tokenize;

pub use config::AnimationSpec;
pub use config::RevealStrategy;
pub use config::SeparatorPolicy;
pub use config::StreamConfig;
pub use driver::StreamHandle;
pub use error::ConfigError;
pub use pacing::PacingWindow;
pub use reveal::DisplayUnit;
pub use reveal::RevealedText;
pub use scheduler::ArrivalOutcome;
pub use scheduler::RevealScheduler;
pub use tokenize::tokenize;

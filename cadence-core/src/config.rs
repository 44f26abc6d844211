//! Stream configuration: separator policy, reveal strategy, and animation
//! directives.
//!
//! All fields have defaults and all may change at runtime. A configuration
//! change is a session boundary: [`crate::RevealScheduler::set_config`]
//! tears the whole pipeline down and starts a fresh session, because pacing
//! state measured under one tokenization policy is meaningless under another.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// How an incoming text delta is split into atomic display units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeparatorPolicy {
    /// Split on runs of whitespace, preserving the whitespace runs as their
    /// own tokens (a capturing split).
    #[default]
    Word,
    /// One token per extended grapheme cluster, whitespace and newlines
    /// included.
    Char,
}

impl FromStr for SeparatorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word" => Ok(Self::Word),
            "char" => Ok(Self::Char),
            other => Err(ConfigError::InvalidSeparatorPolicy(other.to_string())),
        }
    }
}

/// How reveal deadlines are computed for queued tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealStrategy {
    /// Each reveal fires a fixed delay after the previous reveal: a pure
    /// self-rescheduling chain. The cadence is recomputed at every batch
    /// arrival, but each token's delay is relative to the previous reveal.
    #[default]
    FixedCadence,
    /// Each token gets an absolute target deadline computed from its batch
    /// arrival time and position, clamped to the running high-water mark so
    /// deadlines never regress.
    AbsoluteDeadline,
}

/// Opaque animation directive attached to revealed display units.
///
/// The pacing core never interprets these values; they are passed through to
/// the rendering layer verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationSpec {
    /// Animation name (an identifier the rendering layer resolves).
    pub name: String,
    /// How long one animation run lasts.
    pub duration: Duration,
    /// Timing curve identifier, also opaque to the core.
    pub timing_function: String,
    /// Number of animation iterations.
    pub iteration_count: u32,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            name: "fadeIn".to_string(),
            duration: Duration::from_secs(1),
            timing_function: "ease-in-out".to_string(),
            iteration_count: 1,
        }
    }
}

/// Full configuration for one streaming session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Tokenization policy for incoming deltas.
    pub separator: SeparatorPolicy,
    /// Reveal timing strategy.
    pub strategy: RevealStrategy,
    /// Animation directive attached to each revealed unit. `None` disables
    /// animation; units are emitted with no directive.
    pub animation: Option<AnimationSpec>,
    /// Number of recent token timestamps used by the moving-average rate
    /// estimator. Values below 2 disable smoothing entirely: every token is
    /// revealed immediately.
    pub window_size: usize,
    /// Slack factor applied to the estimated inter-token interval so reveal
    /// paces slightly slower than arrival, buffering next-batch jitter.
    pub delay_multiplier: f64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            separator: SeparatorPolicy::default(),
            strategy: RevealStrategy::default(),
            animation: Some(AnimationSpec::default()),
            window_size: 30,
            delay_multiplier: 1.05,
        }
    }
}

impl StreamConfig {
    /// Returns whether pacing is effectively disabled and every token should
    /// be revealed as soon as it arrives.
    pub fn smoothing_disabled(&self) -> bool {
        self.window_size < 2
    }
}

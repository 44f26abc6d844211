//! Glues the reveal scheduler to the markdown animator.
//!
//! Pacing happens exactly once, on raw text arrival; the markup tree is
//! rebuilt from the full accumulated revealed text whenever the host wants
//! to redraw. The two layers share one configuration so the paced units and
//! the rendered spans tokenize identically.

use std::time::Instant;

use cadence_core::ArrivalOutcome;
use cadence_core::RevealScheduler;
use cadence_core::RevealedText;
use cadence_core::StreamConfig;

use crate::render::MarkdownAnimator;
use crate::tree::MarkdownNode;

/// One markdown streaming session: scheduler, revealed-text accumulator,
/// and tree renderer.
#[derive(Debug)]
pub struct MarkdownStream {
    scheduler: RevealScheduler,
    revealed: RevealedText,
    animator: MarkdownAnimator,
}

impl MarkdownStream {
    pub fn new(config: StreamConfig, now: Instant) -> Self {
        let animator = MarkdownAnimator::from_config(&config);
        Self {
            scheduler: RevealScheduler::new(config, now),
            revealed: RevealedText::default(),
            animator,
        }
    }

    /// Feeds the cumulative incoming markdown source. An implicit reset
    /// (shorter or non-extending input) clears the revealed text too.
    pub fn sync_text(&mut self, incoming: &str, now: Instant) -> ArrivalOutcome {
        let outcome = self.scheduler.sync_text(incoming, now);
        if outcome.reset {
            tracing::debug!("incoming text no longer extends the document; restarting");
            self.revealed.clear();
        }
        outcome
    }

    /// Earliest pending reveal deadline, for hosts driving their own timers.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Reveals everything due at `now` into the accumulated text. Returns
    /// the number of units revealed so hosts know whether to re-render.
    pub fn tick(&mut self, now: Instant) -> usize {
        let units = self.scheduler.reveal_due(now);
        let count = units.len();
        for unit in units {
            self.revealed.push(unit);
        }
        count
    }

    /// Renders the accumulated revealed text into the animated node tree.
    ///
    /// Idempotent: with no tick or arrival in between, repeated calls yield
    /// structurally identical trees.
    pub fn render_tree(&self) -> Vec<MarkdownNode> {
        self.animator.render(&self.revealed.accumulated())
    }

    /// Revealed-text accumulator, exposed for plain-text consumers.
    pub fn revealed(&self) -> &RevealedText {
        &self.revealed
    }

    /// Replaces the configuration; any change restarts the session and
    /// discards revealed output.
    pub fn set_config(&mut self, config: StreamConfig, now: Instant) {
        if self.scheduler.config() == &config {
            return;
        }
        self.animator = MarkdownAnimator::from_config(&config);
        self.scheduler.set_config(config, now);
        self.revealed.clear();
    }

    /// Tears the session down: pending tokens, pacing history, and revealed
    /// text are all discarded.
    pub fn reset(&mut self, now: Instant) {
        self.scheduler.reset(now);
        self.revealed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::SeparatorPolicy;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn immediate_config() -> StreamConfig {
        StreamConfig {
            window_size: 0,
            ..StreamConfig::default()
        }
    }

    fn plain(nodes: &[MarkdownNode]) -> String {
        let parts: Vec<String> = nodes.iter().map(MarkdownNode::plain_text).collect();
        parts.join("\n")
    }

    #[test]
    fn tree_grows_as_batches_reveal() {
        let t0 = Instant::now();
        let mut stream = MarkdownStream::new(immediate_config(), t0);

        stream.sync_text("# Hello\n\nstreamed ", t0);
        assert!(stream.tick(t0) > 0);
        let first = stream.render_tree();
        assert_eq!(plain(&first), "Hello\nstreamed");

        let t1 = t0 + Duration::from_millis(80);
        stream.sync_text("# Hello\n\nstreamed *text*", t1);
        stream.tick(t1);
        let second = stream.render_tree();
        assert_eq!(plain(&second), "Hello\nstreamed text");
        // The heading from the first render is still the first node.
        assert_eq!(second[0], first[0]);
    }

    #[test]
    fn render_tree_is_idempotent_between_ticks() {
        let t0 = Instant::now();
        let mut stream = MarkdownStream::new(immediate_config(), t0);
        stream.sync_text("Some **bold** claim", t0);
        stream.tick(t0);
        assert_eq!(stream.render_tree(), stream.render_tree());
    }

    #[test]
    fn unrevealed_tokens_do_not_appear_in_the_tree() {
        let t0 = Instant::now();
        // A large window with paced deadlines keeps later tokens pending.
        let config = StreamConfig {
            window_size: 8,
            ..StreamConfig::default()
        };
        let mut stream = MarkdownStream::new(config, t0);
        let t1 = t0 + Duration::from_millis(400);
        stream.sync_text("alpha beta gamma", t1);

        // Only the queue head is due at its own deadline.
        let first_deadline = stream.next_deadline().expect("tokens pending");
        stream.tick(first_deadline);
        assert_eq!(plain(&stream.render_tree()), "alpha");
    }

    #[test]
    fn config_change_discards_revealed_output() {
        let t0 = Instant::now();
        let mut stream = MarkdownStream::new(immediate_config(), t0);
        stream.sync_text("old content", t0);
        stream.tick(t0);
        assert!(!stream.render_tree().is_empty());

        stream.set_config(
            StreamConfig {
                separator: SeparatorPolicy::Char,
                window_size: 0,
                ..StreamConfig::default()
            },
            t0 + Duration::from_millis(5),
        );
        assert!(stream.render_tree().is_empty());

        let t1 = t0 + Duration::from_millis(10);
        stream.sync_text("né", t1);
        stream.tick(t1);
        assert_eq!(plain(&stream.render_tree()), "né");
    }

    #[test]
    fn shrinking_input_restarts_the_document() {
        let t0 = Instant::now();
        let mut stream = MarkdownStream::new(immediate_config(), t0);
        stream.sync_text("a long first document", t0);
        stream.tick(t0);

        let t1 = t0 + Duration::from_millis(20);
        let outcome = stream.sync_text("# new", t1);
        assert!(outcome.reset);
        stream.tick(t1);
        let nodes = stream.render_tree();
        assert_eq!(plain(&nodes), "new");
        assert!(matches!(nodes[0], MarkdownNode::Heading { level: 1, .. }));
    }
}

//! Display-ready output of the reveal pipeline.
//!
//! A [`DisplayUnit`] is one revealed token tagged with a stable identity and
//! an optional animation directive. [`RevealedText`] is the plain-text
//! presentation adapter: the rendering layer keeps already-finished units in
//! a finalized prefix (drawn without animation) and animates only the units
//! still in flight. When an animation finishes the host settles the unit,
//! folding its content into the prefix.

use std::collections::VecDeque;

use crate::config::AnimationSpec;

/// One revealed token, ready for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayUnit {
    /// Token text. A lone `"\n"` renders as a line break, not literal text.
    pub content: String,
    /// Stable rendering identity: a monotonically increasing sequence number
    /// assigned at token creation. Never reused and never derived from
    /// content (content may repeat).
    pub key: u64,
    /// Animation directive, or `None` when animation is disabled.
    pub animation: Option<AnimationSpec>,
}

impl DisplayUnit {
    /// Returns whether this unit should render as a line break.
    pub fn is_line_break(&self) -> bool {
        self.content == "\n"
    }
}

/// Plain-text presentation state: finalized prefix plus animating suffix.
#[derive(Debug, Default)]
pub struct RevealedText {
    completed: String,
    animating: VecDeque<DisplayUnit>,
}

impl RevealedText {
    /// Appends a freshly revealed unit to the animating suffix.
    pub fn push(&mut self, unit: DisplayUnit) {
        self.animating.push_back(unit);
    }

    /// The already-finalized portion, rendered without animation. Newlines
    /// are preserved verbatim.
    pub fn completed(&self) -> &str {
        &self.completed
    }

    /// Units currently in flight, oldest first.
    pub fn animating(&self) -> impl Iterator<Item = &DisplayUnit> {
        self.animating.iter()
    }

    /// Folds every animating unit with `unit.key <= key` into the finalized
    /// prefix. Hosts call this when a unit's animation completes; settling is
    /// prefix-wise because reveal order is arrival order.
    pub fn settle_through(&mut self, key: u64) {
        while self.animating.front().is_some_and(|front| front.key <= key) {
            if let Some(unit) = self.animating.pop_front() {
                self.completed.push_str(&unit.content);
            }
        }
    }

    /// Full revealed text so far: finalized prefix plus in-flight contents.
    pub fn accumulated(&self) -> String {
        let mut out = self.completed.clone();
        for unit in &self.animating {
            out.push_str(&unit.content);
        }
        out
    }

    /// Returns whether nothing has been revealed (or everything was cleared).
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.animating.is_empty()
    }

    /// Drops all state for a fresh session.
    pub fn clear(&mut self) {
        self.completed.clear();
        self.animating.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unit(content: &str, key: u64) -> DisplayUnit {
        DisplayUnit {
            content: content.to_string(),
            key,
            animation: None,
        }
    }

    #[test]
    fn newline_units_are_line_breaks() {
        assert!(unit("\n", 0).is_line_break());
        assert!(!unit("n", 0).is_line_break());
        assert!(!unit("\n\n", 0).is_line_break());
    }

    #[test]
    fn settle_folds_prefix_into_completed() {
        let mut text = RevealedText::default();
        text.push(unit("Hello", 0));
        text.push(unit(" ", 1));
        text.push(unit("world", 2));

        text.settle_through(1);
        assert_eq!(text.completed(), "Hello ");
        let animating: Vec<&str> = text.animating().map(|u| u.content.as_str()).collect();
        assert_eq!(animating, vec!["world"]);
        assert_eq!(text.accumulated(), "Hello world");
    }

    #[test]
    fn settle_with_unknown_key_is_bounded_by_queue() {
        let mut text = RevealedText::default();
        text.push(unit("a", 0));
        text.settle_through(u64::MAX);
        assert_eq!(text.completed(), "a");
        assert_eq!(text.animating().count(), 0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut text = RevealedText::default();
        text.push(unit("a", 0));
        text.settle_through(0);
        text.clear();
        assert!(text.is_empty());
        assert_eq!(text.accumulated(), "");
    }
}

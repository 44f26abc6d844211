//! Markup-mode presentation for paced text streams.
//!
//! While `cadence-core` decides *when* each token becomes visible, this
//! crate decides what the accumulated visible text *is* once interpreted as
//! markdown: a closed tree of typed structural nodes whose leaf text runs
//! are re-tokenized into per-token animated spans. The tree is rebuilt from
//! scratch on every render — the growing source makes incremental tree
//! patching fragile, and a pure rebuild keeps the output idempotent.
//!
//! Rendering the tree visually stays external: animation names, timing
//! curves, and code-block languages pass through as opaque strings.

mod render;
mod stream;
mod tree;

pub use render::MarkdownAnimator;
pub use stream::MarkdownStream;
pub use tree::AnimatedSpan;
pub use tree::MarkdownNode;

//! Typed document tree produced by the markup-mode presentation adapter.
//!
//! The set of node kinds is deliberately closed (an enum, not an open
//! dispatch table) so downstream renderers can match exhaustively and the
//! compiler flags any kind they forgot to handle.

use cadence_core::AnimationSpec;
use serde::Deserialize;
use serde::Serialize;

/// One atomic text token with its animation directive.
///
/// Leaf text runs are re-tokenized under the session's separator policy, so
/// every word (or grapheme) animates in as its own unit. Spans are keyed by
/// position within their parent: the tree is rebuilt from the full
/// accumulated text on every render, which keeps positions stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimatedSpan {
    pub content: String,
    /// `None` when animation is disabled for the session.
    pub animation: Option<AnimationSpec>,
}

/// A node in the rendered markup tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkdownNode {
    /// A run of leaf text, split into per-token animated spans.
    Text(Vec<AnimatedSpan>),
    /// A hard line break.
    LineBreak,
    Paragraph(Vec<MarkdownNode>),
    Heading {
        /// 1 through 6.
        level: u8,
        children: Vec<MarkdownNode>,
    },
    BlockQuote(Vec<MarkdownNode>),
    Emphasis(Vec<MarkdownNode>),
    Strong(Vec<MarkdownNode>),
    Strikethrough(Vec<MarkdownNode>),
    Link {
        url: String,
        children: Vec<MarkdownNode>,
    },
    /// An image. `animate_after_load` carries the directive the renderer
    /// should start only once the asset has finished loading; animating a
    /// placeholder or broken state is worse than no animation.
    Image {
        url: String,
        alt: String,
        animate_after_load: Option<AnimationSpec>,
    },
    List {
        /// Starting number for ordered lists; `None` for bullet lists.
        start: Option<u64>,
        items: Vec<MarkdownNode>,
    },
    ListItem(Vec<MarkdownNode>),
    /// A fenced or indented code block. Code is exempt from per-token
    /// animation: it must render as a stable block for an external syntax
    /// highlighter, so the source text is kept verbatim and untokenized.
    CodeBlock {
        /// Language tag from the fence info string; empty when absent.
        language: String,
        content: String,
    },
    /// An inline code span, rendered as one stable unit.
    InlineCode(String),
    Table(Vec<MarkdownNode>),
    TableRow(Vec<MarkdownNode>),
    TableCell(Vec<MarkdownNode>),
    /// A thematic break, animated as a single block.
    Rule {
        animation: Option<AnimationSpec>,
    },
}

impl MarkdownNode {
    /// Concatenated plain text of this subtree (code content included,
    /// image alt text included). Mostly useful in tests.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(spans) => spans.iter().map(|s| s.content.as_str()).collect(),
            Self::LineBreak => "\n".to_string(),
            Self::Paragraph(children)
            | Self::BlockQuote(children)
            | Self::Emphasis(children)
            | Self::Strong(children)
            | Self::Strikethrough(children)
            | Self::Heading { children, .. }
            | Self::Link { children, .. }
            | Self::ListItem(children)
            | Self::Table(children)
            | Self::TableRow(children)
            | Self::TableCell(children) => children.iter().map(Self::plain_text).collect(),
            Self::List { items, .. } => items.iter().map(Self::plain_text).collect(),
            Self::Image { alt, .. } => alt.clone(),
            Self::CodeBlock { content, .. } => content.clone(),
            Self::InlineCode(content) => content.clone(),
            Self::Rule { .. } => String::new(),
        }
    }
}

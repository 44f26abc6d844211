//! Renders accumulated markdown source into an animated node tree.
//!
//! [`MarkdownAnimator::render`] is a pure fold over `pulldown-cmark` events:
//! the same source always produces a structurally identical tree. That
//! matters because the markup path re-renders the *entire* accumulated
//! revealed text on every update — pacing happened once, upstream, when the
//! raw text arrived, so this layer must be idempotent and side-effect-free.
//!
//! Leaf text runs are re-tokenized through [`cadence_core::tokenize`] and
//! wrapped into per-token [`AnimatedSpan`]s. Structural elements are not
//! individually paced; they inherit the session directive from the renderer
//! (rules and images carry theirs explicitly because their animation is
//! block-level rather than per-token). Fenced code is the one deliberate
//! exception to token animation: it stays a stable verbatim block so an
//! external syntax highlighter can own its presentation.

use cadence_core::AnimationSpec;
use cadence_core::SeparatorPolicy;
use cadence_core::StreamConfig;
use cadence_core::tokenize;
use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::Event;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;

use crate::tree::AnimatedSpan;
use crate::tree::MarkdownNode;

/// Converts markdown source into a tree of [`MarkdownNode`]s with per-token
/// animation directives attached to leaf text.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownAnimator {
    separator: SeparatorPolicy,
    animation: Option<AnimationSpec>,
}

impl MarkdownAnimator {
    pub fn new(separator: SeparatorPolicy, animation: Option<AnimationSpec>) -> Self {
        Self {
            separator,
            animation,
        }
    }

    /// Builds an animator matching a stream session's configuration, so
    /// paced reveal and markup rendering tokenize identically.
    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(config.separator, config.animation.clone())
    }

    /// The session animation directive structural elements inherit.
    pub fn animation(&self) -> Option<&AnimationSpec> {
        self.animation.as_ref()
    }

    /// Renders `source` into a node tree. Pure: no state survives the call,
    /// and identical input yields a structurally identical tree.
    pub fn render(&self, source: &str) -> Vec<MarkdownNode> {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(source, options);
        let mut builder = TreeBuilder::new(self);
        for event in parser {
            builder.on_event(event);
        }
        builder.finish()
    }

    /// Splits a leaf text run into per-token animated spans.
    fn animate_text(&self, text: &str) -> MarkdownNode {
        let spans = tokenize(text, self.separator)
            .into_iter()
            .map(|content| AnimatedSpan {
                content,
                animation: self.animation.clone(),
            })
            .collect();
        MarkdownNode::Text(spans)
    }
}

/// One open container on the builder stack.
#[derive(Debug)]
enum OpenNode {
    Paragraph,
    Heading(u8),
    BlockQuote,
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image { url: String, alt: String },
    List(Option<u64>),
    ListItem,
    CodeBlock { language: String, content: String },
    Table,
    TableRow,
    TableCell,
}

/// Event-stream fold building the node tree.
struct TreeBuilder<'a> {
    animator: &'a MarkdownAnimator,
    /// Parallel stacks of open containers and their accumulated children.
    open: Vec<OpenNode>,
    children: Vec<Vec<MarkdownNode>>,
}

impl<'a> TreeBuilder<'a> {
    fn new(animator: &'a MarkdownAnimator) -> Self {
        Self {
            animator,
            open: Vec::new(),
            // The root's children live at index 0.
            children: vec![Vec::new()],
        }
    }

    fn finish(mut self) -> Vec<MarkdownNode> {
        // Balanced event streams leave only the root level; an unbalanced
        // stream (never produced by the parser) would be folded into it.
        while !self.open.is_empty() {
            self.close();
        }
        self.children.pop().unwrap_or_default()
    }

    fn on_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag_end) => self.end(tag_end),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.push_node(MarkdownNode::InlineCode(code.to_string())),
            // Raw HTML is not interpreted; surface it as animated text like
            // any other run.
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.text("\n"),
            Event::HardBreak => self.push_node(MarkdownNode::LineBreak),
            Event::Rule => {
                let animation = self.animator.animation.clone();
                self.push_node(MarkdownNode::Rule { animation });
            }
            Event::FootnoteReference(_) | Event::TaskListMarker(_) => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => OpenNode::Paragraph,
            Tag::Heading { level, .. } => OpenNode::Heading(level as u8),
            Tag::BlockQuote => OpenNode::BlockQuote,
            Tag::Emphasis => OpenNode::Emphasis,
            Tag::Strong => OpenNode::Strong,
            Tag::Strikethrough => OpenNode::Strikethrough,
            Tag::Link { dest_url, .. } => OpenNode::Link(dest_url.to_string()),
            Tag::Image { dest_url, .. } => OpenNode::Image {
                url: dest_url.to_string(),
                alt: String::new(),
            },
            Tag::List(start) => OpenNode::List(start),
            Tag::Item => OpenNode::ListItem,
            Tag::CodeBlock(kind) => OpenNode::CodeBlock {
                language: match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                },
                content: String::new(),
            },
            Tag::Table(_) => OpenNode::Table,
            // Header cells behave like a regular row in the tree.
            Tag::TableHead | Tag::TableRow => OpenNode::TableRow,
            Tag::TableCell => OpenNode::TableCell,
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => return,
        };
        self.open.push(open);
        self.children.push(Vec::new());
    }

    fn end(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::CodeBlock
            | TagEnd::Table
            | TagEnd::TableHead
            | TagEnd::TableRow
            | TagEnd::TableCell => self.close(),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        match self.open.last_mut() {
            Some(OpenNode::CodeBlock { content, .. }) => content.push_str(text),
            Some(OpenNode::Image { alt, .. }) => alt.push_str(text),
            _ => {
                let node = self.animator.animate_text(text);
                self.push_node(node);
            }
        }
    }

    /// Pops the innermost open container and attaches it to its parent.
    fn close(&mut self) {
        let Some(open) = self.open.pop() else { return };
        let children = self.children.pop().unwrap_or_default();
        let node = match open {
            OpenNode::Paragraph => MarkdownNode::Paragraph(children),
            OpenNode::Heading(level) => MarkdownNode::Heading { level, children },
            OpenNode::BlockQuote => MarkdownNode::BlockQuote(children),
            OpenNode::Emphasis => MarkdownNode::Emphasis(children),
            OpenNode::Strong => MarkdownNode::Strong(children),
            OpenNode::Strikethrough => MarkdownNode::Strikethrough(children),
            OpenNode::Link(url) => MarkdownNode::Link { url, children },
            OpenNode::Image { url, alt } => MarkdownNode::Image {
                url,
                alt,
                animate_after_load: self.animator.animation.clone(),
            },
            OpenNode::List(start) => MarkdownNode::List {
                start,
                items: children,
            },
            OpenNode::ListItem => MarkdownNode::ListItem(children),
            OpenNode::CodeBlock { language, content } => {
                MarkdownNode::CodeBlock { language, content }
            }
            OpenNode::Table => MarkdownNode::Table(children),
            OpenNode::TableRow => MarkdownNode::TableRow(children),
            OpenNode::TableCell => MarkdownNode::TableCell(children),
        };
        self.push_node(node);
    }

    fn push_node(&mut self, node: MarkdownNode) {
        if let Some(siblings) = self.children.last_mut() {
            siblings.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn animator() -> MarkdownAnimator {
        MarkdownAnimator::new(SeparatorPolicy::Word, Some(AnimationSpec::default()))
    }

    fn span_contents(node: &MarkdownNode) -> Vec<String> {
        match node {
            MarkdownNode::Text(spans) => spans.iter().map(|s| s.content.clone()).collect(),
            other => panic!("expected text node, got {other:?}"),
        }
    }

    #[test]
    fn paragraph_text_splits_into_animated_spans() {
        let nodes = animator().render("Hello brave world");
        let MarkdownNode::Paragraph(children) = &nodes[0] else {
            panic!("expected paragraph, got {nodes:?}");
        };
        assert_eq!(
            span_contents(&children[0]),
            vec!["Hello", " ", "brave", " ", "world"]
        );
        let MarkdownNode::Text(spans) = &children[0] else {
            unreachable!()
        };
        assert!(spans.iter().all(|s| s.animation.is_some()));
    }

    #[test]
    fn rendering_is_idempotent() {
        let source = "# Title\n\nSome *emphasis* and `inline` code.\n\n- one\n- two\n";
        let animator = animator();
        assert_eq!(animator.render(source), animator.render(source));
    }

    #[test]
    fn fenced_code_stays_a_stable_block() {
        let source = "```rust\nfn main() {}\nlet x = 1;\n```\n";
        let nodes = animator().render(source);
        assert_eq!(
            nodes,
            vec![MarkdownNode::CodeBlock {
                language: "rust".to_string(),
                content: "fn main() {}\nlet x = 1;\n".to_string(),
            }]
        );
    }

    #[test]
    fn heading_level_is_preserved() {
        let nodes = animator().render("### Deep dive");
        let MarkdownNode::Heading { level, children } = &nodes[0] else {
            panic!("expected heading, got {nodes:?}");
        };
        assert_eq!(*level, 3);
        assert_eq!(span_contents(&children[0]), vec!["Deep", " ", "dive"]);
    }

    #[test]
    fn links_keep_their_url_and_animate_their_text() {
        let nodes = animator().render("see [the docs](https://example.com) now");
        let MarkdownNode::Paragraph(children) = &nodes[0] else {
            panic!("expected paragraph, got {nodes:?}");
        };
        let MarkdownNode::Link { url, children: link_children } = &children[1] else {
            panic!("expected link, got {children:?}");
        };
        assert_eq!(url, "https://example.com");
        assert_eq!(span_contents(&link_children[0]), vec!["the", " ", "docs"]);
    }

    #[test]
    fn images_defer_animation_until_loaded() {
        let nodes = animator().render("![a cat](cat.png)");
        let MarkdownNode::Paragraph(children) = &nodes[0] else {
            panic!("expected paragraph, got {nodes:?}");
        };
        assert_eq!(
            children[0],
            MarkdownNode::Image {
                url: "cat.png".to_string(),
                alt: "a cat".to_string(),
                animate_after_load: Some(AnimationSpec::default()),
            }
        );
    }

    #[test]
    fn ordered_lists_carry_their_start_number() {
        let nodes = animator().render("3. third\n4. fourth\n");
        let MarkdownNode::List { start, items } = &nodes[0] else {
            panic!("expected list, got {nodes:?}");
        };
        assert_eq!(*start, Some(3));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].plain_text(), "third");
    }

    #[test]
    fn tables_become_rows_of_cells() {
        let source = "| a | b |\n| - | - |\n| c | d |\n";
        let nodes = animator().render(source);
        let MarkdownNode::Table(rows) = &nodes[0] else {
            panic!("expected table, got {nodes:?}");
        };
        assert_eq!(rows.len(), 2);
        let MarkdownNode::TableRow(cells) = &rows[1] else {
            panic!("expected row, got {rows:?}");
        };
        assert_eq!(cells[0].plain_text(), "c");
        assert_eq!(cells[1].plain_text(), "d");
    }

    #[test]
    fn disabled_animation_yields_plain_spans() {
        let animator = MarkdownAnimator::new(SeparatorPolicy::Word, None);
        let nodes = animator.render("plain text\n\n---\n");
        let MarkdownNode::Paragraph(children) = &nodes[0] else {
            panic!("expected paragraph, got {nodes:?}");
        };
        let MarkdownNode::Text(spans) = &children[0] else {
            panic!("expected text, got {children:?}");
        };
        assert!(spans.iter().all(|s| s.animation.is_none()));
        assert_eq!(nodes[1], MarkdownNode::Rule { animation: None });
    }

    #[test]
    fn char_separator_keeps_graphemes_whole() {
        let animator = MarkdownAnimator::new(SeparatorPolicy::Char, None);
        let nodes = animator.render("hé🙂");
        let MarkdownNode::Paragraph(children) = &nodes[0] else {
            panic!("expected paragraph, got {nodes:?}");
        };
        assert_eq!(span_contents(&children[0]), vec!["h", "é", "🙂"]);
    }
}

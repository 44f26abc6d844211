//! Splits text deltas into atomic display units.
//!
//! Tokenization is pure and lossless: concatenating the returned tokens in
//! order reconstructs the input exactly, whitespace included. Whitespace runs
//! are never collapsed or trimmed because they are revealed (and animated) as
//! units of their own, exactly like visible text.

use unicode_segmentation::UnicodeSegmentation;

use crate::config::SeparatorPolicy;

/// Splits `delta` into tokens under the given policy.
///
/// - [`SeparatorPolicy::Word`]: alternating runs of non-whitespace and
///   whitespace, each run one token (a capturing split).
/// - [`SeparatorPolicy::Char`]: one token per extended grapheme cluster, so
///   combining sequences and emoji stay intact.
///
/// Never returns zero-length tokens.
pub fn tokenize(delta: &str, policy: SeparatorPolicy) -> Vec<String> {
    match policy {
        SeparatorPolicy::Word => split_preserving_whitespace(delta),
        SeparatorPolicy::Char => delta.graphemes(true).map(str::to_string).collect(),
    }
}

/// Groups consecutive characters by `char::is_whitespace`, emitting each
/// maximal run as one token.
fn split_preserving_whitespace(delta: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_is_ws: Option<bool> = None;

    for ch in delta.chars() {
        let is_ws = ch.is_whitespace();
        if current_is_ws != Some(is_ws) && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current_is_ws = Some(is_ws);
        current.push(ch);
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn word_split_preserves_whitespace_runs() {
        let tokens = tokenize("Hello  world\nand more", SeparatorPolicy::Word);
        assert_eq!(
            tokens,
            vec!["Hello", "  ", "world", "\n", "and", " ", "more"]
        );
    }

    #[test]
    fn word_split_reconstructs_input() {
        let inputs = [
            "",
            " ",
            "  leading and trailing  ",
            "one",
            "line one\n\nline two\t tabbed",
        ];
        for input in inputs {
            let tokens = tokenize(input, SeparatorPolicy::Word);
            assert_eq!(tokens.concat(), input);
            assert!(tokens.iter().all(|t| !t.is_empty()));
        }
    }

    #[test]
    fn char_split_is_one_token_per_grapheme() {
        let tokens = tokenize("hi there\n", SeparatorPolicy::Char);
        assert_eq!(
            tokens,
            vec!["h", "i", " ", "t", "h", "e", "r", "e", "\n"]
        );
        assert_eq!(tokens.len(), "hi there\n".graphemes(true).count());
    }

    #[test]
    fn char_split_keeps_multibyte_graphemes_whole() {
        let tokens = tokenize("é🙂e\u{301}", SeparatorPolicy::Char);
        assert_eq!(tokens, vec!["é", "🙂", "e\u{301}"]);
        assert_eq!(tokens.concat(), "é🙂e\u{301}");
    }

    #[test]
    fn empty_delta_yields_no_tokens() {
        assert_eq!(tokenize("", SeparatorPolicy::Word), Vec::<String>::new());
        assert_eq!(tokenize("", SeparatorPolicy::Char), Vec::<String>::new());
    }
}

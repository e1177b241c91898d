//! Nesting-aware scanning of plan text.
//!
//! Plan text nests `[...]`, `(...)` and `{...}` freely and quotes literals with
//! `'` or `"`. Separators only count at the top level, outside quotes. The
//! scanner is lenient: unbalanced input never fails, the depth simply never
//! returns to zero and the rest of the input stays in one piece.

#[derive(Debug, Default)]
struct Depth {
    brackets: i32,
    parens: i32,
    braces: i32,
    quote: Option<char>,
}

impl Depth {
    /// Update the state with `c`. Returns true if `c` is at the top level and
    /// outside quotes.
    fn step(&mut self, c: char) -> bool {
        if let Some(q) = self.quote {
            if c == q {
                self.quote = None;
            }
            return false;
        }
        match c {
            '"' | '\'' => {
                self.quote = Some(c);
                false
            }
            '[' => {
                self.brackets += 1;
                false
            }
            ']' => {
                self.brackets -= 1;
                false
            }
            '(' => {
                self.parens += 1;
                false
            }
            ')' => {
                self.parens -= 1;
                false
            }
            '{' => {
                self.braces += 1;
                false
            }
            '}' => {
                self.braces -= 1;
                false
            }
            _ => self.brackets == 0 && self.parens == 0 && self.braces == 0,
        }
    }
}

/// Byte offsets of every `target` at the top level, outside quotes.
fn top_level_positions(content: &str, target: char) -> impl Iterator<Item = usize> + '_ {
    let mut depth = Depth::default();
    content
        .char_indices()
        .filter_map(move |(i, c)| (depth.step(c) && c == target).then_some(i))
}

fn push_trimmed<'a>(parts: &mut Vec<&'a str>, part: &'a str) {
    let part = part.trim();
    if !part.is_empty() {
        parts.push(part);
    }
}

/// Split `content` on `separator` wherever it is not nested inside brackets,
/// parentheses, braces or quotes.
///
/// Elements are trimmed and empty elements are dropped.
///
/// ```rust
/// use opensearch_explain::parser::split_respecting_nesting;
///
/// let parts = split_respecting_nesting(
///     "table=[[OpenSearch, employees]], PushDownContext=[[PROJECT->[name]]]",
///     ',',
/// );
/// assert_eq!(
///     parts,
///     vec!["table=[[OpenSearch, employees]]", "PushDownContext=[[PROJECT->[name]]]"]
/// );
/// ```
pub fn split_respecting_nesting(content: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for i in top_level_positions(content, separator) {
        push_trimmed(&mut parts, &content[start..i]);
        start = i + separator.len_utf8();
    }
    push_trimmed(&mut parts, &content[start..]);
    parts
}

/// Find the byte offset of the first `target` that is not nested inside
/// brackets, parentheses, braces or quotes.
///
/// ```rust
/// use opensearch_explain::parser::find_first_unescaped;
///
/// assert_eq!(find_first_unescaped("table=[[OpenSearch, employees]]", '='), Some(5));
/// assert_eq!(find_first_unescaped("[a=1]", '='), None);
/// ```
pub fn find_first_unescaped(content: &str, target: char) -> Option<usize> {
    if content.trim().is_empty() {
        return None;
    }
    top_level_positions(content, target).next()
}

/// True if `s` starts with `open` and ends with `close` as two distinct
/// characters.
pub(crate) fn is_wrapped(s: &str, open: char, close: char) -> bool {
    s.len() >= 2 && s.starts_with(open) && s.ends_with(close)
}

/// The text between the first and last character of a wrapped token, trimmed.
pub(crate) fn unwrap_inner(s: &str) -> &str {
    s[1..s.len() - 1].trim()
}

//! Terminal highlighting for plan reports.
//!
//! Plan text is split into tokens with a small ordered rule set: at each
//! position the first rule that matches wins, and its token is painted with
//! [`colored`]. Header lines starting with `=` are painted as a whole.
//!
//! Whether escape codes are actually emitted follows `colored`'s global
//! control (`NO_COLOR`, `CLICOLOR_FORCE`, terminal detection, or
//! [`colored::control::set_override`]).

use colored::Colorize;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Token classes of plan text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenClass {
    /// A whole `= Header =` line.
    Comment,
    /// Operator names such as `LogicalProject`.
    Function,
    /// Field references such as `$0`.
    Variable,
    /// Double-quoted text, mostly inside expanded JSON.
    String,
    Number,
    /// A `key=` prefix, including the `=`.
    Attribute,
    /// `null`, `true` or `false`.
    Keyword,
    /// Everything else: whitespace, other words and punctuation.
    Text,
}

// Order matters: the regex engine prefers the leftmost alternative, so each
// group shadows the ones after it.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\A(?:(?P<function>[A-Z][a-z]\w+)|(?P<variable>\$\w+)|(?P<string>"[^"]*")|(?P<number>\d+)|(?P<attribute>[a-zA-Z_][\w.#]*=)|(?P<space>\s+)|(?P<keyword>null|true|false)|(?P<word>[\w-]+)|(?P<punct>\W))"#,
    )
    .expect("token pattern is valid")
});

const GROUPS: [(&str, TokenClass); 9] = [
    ("function", TokenClass::Function),
    ("variable", TokenClass::Variable),
    ("string", TokenClass::String),
    ("number", TokenClass::Number),
    ("attribute", TokenClass::Attribute),
    ("space", TokenClass::Text),
    ("keyword", TokenClass::Keyword),
    ("word", TokenClass::Text),
    ("punct", TokenClass::Text),
];

impl TokenClass {
    /// Paint `text` in this class's terminal colour.
    pub fn paint(self, text: &str) -> String {
        match self {
            TokenClass::Comment => text.bright_black().to_string(),
            TokenClass::Function => text.green().to_string(),
            TokenClass::Variable => text.red().to_string(),
            TokenClass::String => text.yellow().to_string(),
            TokenClass::Number | TokenClass::Keyword => text.blue().to_string(),
            TokenClass::Attribute => text.cyan().to_string(),
            TokenClass::Text => text.to_string(),
        }
    }
}

/// Split one line of plan text into classified tokens. The token texts
/// concatenate back to `line`.
pub fn tokenize(line: &str) -> Vec<(TokenClass, &str)> {
    if line.starts_with('=') {
        return vec![(TokenClass::Comment, line)];
    }

    let mut tokens = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let Some((class, len)) = TOKEN.captures(rest).and_then(|caps| first_group(&caps)) else {
            // Unreachable in practice: `\W` and `[\w-]+` cover every char.
            tokens.push((TokenClass::Text, rest));
            break;
        };
        tokens.push((class, &rest[..len]));
        rest = &rest[len..];
    }
    tokens
}

fn first_group(caps: &Captures<'_>) -> Option<(TokenClass, usize)> {
    GROUPS
        .iter()
        .find_map(|(name, class)| caps.name(name).map(|m| (*class, m.end())))
        .filter(|(_, len)| *len > 0)
}

/// Highlight plan text line by line, keeping line breaks as they are.
pub fn highlight_plan(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            tokenize(line)
                .into_iter()
                .map(|(class, token)| class.paint(token))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

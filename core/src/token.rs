//! Command-line tokenization.
//!
//! Splits a command line on whitespace into positioned [`Token`]s. Quotes are
//! not stripped; whitespace inside a matching pair of `"` or `'` does not end
//! a token. Compound `key=value` tokens are kept whole; the matcher splits
//! them later.

use serde::{Deserialize, Serialize};

/// Token that ends flag parsing; it and everything after it is positional.
pub const SEPARATOR: &str = "--";

/// A raw command-line token and its position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Verbatim token text
    pub text: String,
    /// Zero-based position in the token list
    pub index: usize,
}

impl Token {
    /// Creates a token.
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }

    /// Whether this token is the `--` separator.
    pub fn is_separator(&self) -> bool {
        self.text == SEPARATOR
    }
}

/// Splits a command line into tokens.
///
/// # Examples
///
/// ```
/// use typed_argv_core::tokenize;
///
/// let tokens = tokenize("  -n=1 2  'a b' -- rest");
/// let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, ["-n=1", "2", "'a b'", "--", "rest"]);
/// assert_eq!(tokens[4].index, 4);
/// ```
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match quote {
            Some(open) => {
                current.push(ch);
                if ch == open {
                    quote = None;
                }
            }
            None if ch.is_whitespace() => {
                if !current.is_empty() {
                    let index = tokens.len();
                    tokens.push(Token::new(std::mem::take(&mut current), index));
                }
            }
            None => {
                if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                }
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        let index = tokens.len();
        tokens.push(Token::new(current, index));
    }

    tokens
}

/// Wraps a pre-split argument list into tokens without further splitting.
///
/// # Examples
///
/// ```
/// use typed_argv_core::tokens_from_args;
///
/// let tokens = tokens_from_args(["--name", "two words"]);
/// assert_eq!(tokens[1].text, "two words");
/// assert_eq!(tokens[1].index, 1);
/// ```
pub fn tokens_from_args<I, S>(args: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter()
        .enumerate()
        .map(|(index, text)| Token::new(text, index))
        .collect()
}

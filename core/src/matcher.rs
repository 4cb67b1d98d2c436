//! Token classification.
//!
//! Walks the token list once and groups it into [`Segment`]s: flag
//! occurrences (with the value tokens their node consumes), positional
//! tokens, and rejected unknown flags. Consumption is decided by the
//! option's arity: fixed options take one value, variable ones (arrays, or
//! a variadic hint like `<vals..>`) take every following token up to the
//! next recognized flag or the `--` separator.

use std::collections::HashMap;

use crate::{Arity, Schema, Token, UnknownFlags};

/// One appearance of a flag in the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Index of the option in [`Schema::options`]
    pub option: usize,
    /// The flag token itself, verbatim (compound `key=value` included)
    pub head: Token,
    /// Value carried by a compound `key=value` head
    pub inline: Option<String>,
    /// Following tokens consumed as values
    pub values: Vec<Token>,
}

impl Occurrence {
    /// Raw value fragments in encounter order; an occurrence without values
    /// yields a single empty fragment.
    pub fn fragments(&self) -> Vec<&str> {
        let mut fragments: Vec<&str> = self
            .inline
            .as_deref()
            .into_iter()
            .chain(self.values.iter().map(|t| t.text.as_str()))
            .collect();
        if fragments.is_empty() {
            fragments.push("");
        }
        fragments
    }

    /// The head and every consumed value token.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        std::iter::once(&self.head).chain(self.values.iter())
    }
}

/// Classification of a token (or token run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A flag occurrence.
    Flag(Occurrence),
    /// A positional token.
    Positional(Token),
    /// A flag-looking token rejected by [`UnknownFlags::Reject`].
    Unknown(Token),
}

/// Name lookup for one schema.
pub(crate) struct FlagIndex<'s> {
    by_name: HashMap<&'s str, usize>,
}

impl<'s> FlagIndex<'s> {
    pub(crate) fn new(schema: &'s Schema) -> Self {
        let mut by_name = HashMap::new();
        for (idx, spec) in schema.options.iter().enumerate() {
            for name in &spec.names {
                by_name.entry(name.as_str()).or_insert(idx);
            }
        }
        Self { by_name }
    }

    /// Resolves a token to an option and optional inline value.
    ///
    /// A whole-token match wins over a `key=value` match.
    pub(crate) fn recognize<'t>(&self, text: &'t str) -> Option<(usize, Option<&'t str>)> {
        let bare = strip_dashes(text)?;
        if let Some(&idx) = self.by_name.get(bare) {
            return Some((idx, None));
        }
        let (key, value) = bare.split_once('=')?;
        self.by_name.get(key).map(|&idx| (idx, Some(value)))
    }
}

fn strip_dashes(text: &str) -> Option<&str> {
    if text == "-" || text == crate::SEPARATOR {
        return None;
    }
    text.strip_prefix("--")
        .or_else(|| text.strip_prefix('-'))
        .filter(|bare| !bare.is_empty())
}

/// Whether an unrecognized token looks like a flag rather than a value.
/// Negative numbers such as `-5` or `-.5` are values.
fn looks_like_flag(text: &str) -> bool {
    strip_dashes(text)
        .and_then(|bare| bare.chars().next())
        .is_some_and(|ch| !ch.is_ascii_digit() && ch != '.')
}

/// Groups `tokens` into segments according to `schema`.
pub fn match_tokens(schema: &Schema, tokens: &[Token]) -> Vec<Segment> {
    let index = FlagIndex::new(schema);
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        let token = &tokens[pos];
        pos += 1;

        if token.is_separator() {
            segments.extend(tokens[pos - 1..].iter().cloned().map(Segment::Positional));
            break;
        }

        let Some((option, inline)) = index.recognize(&token.text) else {
            let unknown =
                schema.unknown_flags == UnknownFlags::Reject && looks_like_flag(&token.text);
            segments.push(if unknown {
                Segment::Unknown(token.clone())
            } else {
                Segment::Positional(token.clone())
            });
            continue;
        };

        let stops = |t: &Token| t.is_separator() || index.recognize(&t.text).is_some();
        let mut values = Vec::new();
        if schema.options[option].arity() == Arity::Variable {
            while pos < tokens.len() && !stops(&tokens[pos]) {
                values.push(tokens[pos].clone());
                pos += 1;
            }
        } else if inline.is_none() && pos < tokens.len() && !stops(&tokens[pos]) {
            values.push(tokens[pos].clone());
            pos += 1;
        }

        segments.push(Segment::Flag(Occurrence {
            option,
            head: token.clone(),
            inline: inline.map(String::from),
            values,
        }));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OptionSpec, TypeNode, tokenize};

    fn schema() -> Schema {
        Schema::new()
            .array("-a, --array")
            .number_array("-n")
            .option(OptionSpec::from_flags("-s, --single", TypeNode::string()))
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_array_consumes_until_next_flag() {
        let segments = match_tokens(&schema(), &tokenize("-a one two -n=1 2 -- after"));
        assert_eq!(segments.len(), 4);
        let Segment::Flag(first) = &segments[0] else {
            panic!("expected flag");
        };
        assert_eq!(first.option, 0);
        assert_eq!(texts(&first.values), vec!["one", "two"]);

        let Segment::Flag(second) = &segments[1] else {
            panic!("expected flag");
        };
        assert_eq!(second.inline.as_deref(), Some("1"));
        assert_eq!(second.fragments(), vec!["1", "2"]);
        assert_eq!(second.head.text, "-n=1");

        assert_eq!(segments[2], Segment::Positional(Token::new("--", 5)));
        assert_eq!(segments[3], Segment::Positional(Token::new("after", 6)));
    }

    #[test]
    fn test_scalar_takes_one_value() {
        let segments = match_tokens(&schema(), &tokenize("--single x y"));
        let Segment::Flag(occ) = &segments[0] else {
            panic!("expected flag");
        };
        assert_eq!(texts(&occ.values), vec!["x"]);
        assert_eq!(segments[1], Segment::Positional(Token::new("y", 2)));
    }

    #[test]
    fn test_variadic_hint_makes_scalar_consume_greedily() {
        let schema = Schema::new().option(OptionSpec::from_flags(
            "-s, --strs <vals..>",
            TypeNode::string(),
        ));
        let segments = match_tokens(&schema, &tokenize("-s a b c"));
        assert_eq!(segments.len(), 1);
        let Segment::Flag(occ) = &segments[0] else {
            panic!("expected flag");
        };
        assert_eq!(texts(&occ.values), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_scalar_with_inline_value_takes_nothing_else() {
        let segments = match_tokens(&schema(), &tokenize("-s=x y"));
        let Segment::Flag(occ) = &segments[0] else {
            panic!("expected flag");
        };
        assert!(occ.values.is_empty());
        assert_eq!(occ.fragments(), vec!["x"]);
    }

    #[test]
    fn test_flag_without_values_has_empty_fragment() {
        let segments = match_tokens(&schema(), &tokenize("-a -s"));
        let Segment::Flag(occ) = &segments[0] else {
            panic!("expected flag");
        };
        assert_eq!(occ.fragments(), vec![""]);
    }

    #[test]
    fn test_unknown_flags_follow_policy() {
        let open = match_tokens(&schema(), &tokenize("-x -5"));
        assert_eq!(
            open,
            vec![
                Segment::Positional(Token::new("-x", 0)),
                Segment::Positional(Token::new("-5", 1)),
            ]
        );

        let closed = match_tokens(
            &schema().unknown_flags(UnknownFlags::Reject),
            &tokenize("-x -5"),
        );
        assert_eq!(
            closed,
            vec![
                Segment::Unknown(Token::new("-x", 0)),
                Segment::Positional(Token::new("-5", 1)),
            ]
        );
    }

    #[test]
    fn test_whole_name_beats_key_value() {
        let schema = Schema::new().array("--a=b").array("--a");
        let index = FlagIndex::new(&schema);
        assert_eq!(index.recognize("--a=b"), Some((0, None)));
        assert_eq!(index.recognize("--a=c"), Some((1, Some("c"))));
        assert_eq!(index.recognize("a"), None);
    }
}

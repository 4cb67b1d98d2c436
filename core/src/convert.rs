//! Value coercion.
//!
//! Turns the raw fragments of one flag occurrence into a [`Value`] and
//! records which tokens were involved. Provenance is carried explicitly in a
//! [`Provenance`] record next to every converted value.

use serde::Serialize;

use crate::matcher::Occurrence;
use crate::{Kind, Token, TypeNode, Value};

/// The tokens a value was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Token indices, strictly increasing
    pub indices: Vec<usize>,
    /// Verbatim token texts, parallel to `indices`
    pub raw: Vec<String>,
}

impl Provenance {
    /// Records one consumed token.
    pub fn record(&mut self, token: &Token) {
        self.indices.push(token.index);
        self.raw.push(token.text.clone());
    }

    /// Appends a later occurrence's provenance.
    pub fn append(&mut self, other: Provenance) {
        self.indices.extend(other.indices);
        self.raw.extend(other.raw);
    }
}

/// A converted occurrence.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Occurred {
    /// `Value::Array` of this occurrence's elements for array nodes, the
    /// scalar value otherwise
    pub value: Value,
    pub provenance: Provenance,
}

impl TypeNode {
    /// Coerces one fragment with this node's scalar rule.
    ///
    /// Numbers that fail to parse become NaN; the only infinite spellings
    /// accepted are `Infinity`, `+Infinity` and `-Infinity`. Every other
    /// scalar kind keeps the text. An array node converts the fragment as a one-token
    /// occurrence.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_argv_core::{TypeNode, Value};
    ///
    /// assert_eq!(TypeNode::number().coerce(" 2.5 "), Value::Number(2.5));
    /// assert!(TypeNode::number().coerce("one").is_nan());
    /// assert_eq!(TypeNode::path().coerce("a/b"), Value::from("a/b"));
    /// ```
    pub fn coerce(&self, fragment: &str) -> Value {
        match self.kind {
            Kind::Number => Value::Number(parse_number(fragment)),
            Kind::Array => self.convert(&[fragment]),
            Kind::String | Kind::Enum | Kind::Path | Kind::File | Kind::Dir => {
                Value::String(fragment.to_string())
            }
        }
    }

    /// Converts the fragments of one occurrence.
    ///
    /// Array nodes split every fragment on their delimiter. When the element
    /// type is itself an array, all pieces go to it and the occurrence yields
    /// a single nested element. Scalar nodes use the last fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_argv_core::{TypeNode, Value};
    ///
    /// let dash = TypeNode::array().delimiter("-");
    /// assert_eq!(dash.convert(&["a-b-c", "d,e"]), Value::from(vec!["a", "b", "c", "d,e"]));
    ///
    /// let nested = TypeNode::array_of(TypeNode::array()).no_delimiter();
    /// assert_eq!(
    ///     nested.convert(&["c,d"]),
    ///     Value::Array(vec![Value::from(vec!["c", "d"])])
    /// );
    /// ```
    pub fn convert(&self, fragments: &[&str]) -> Value {
        if !self.is_array() {
            return self.coerce(fragments.last().copied().unwrap_or_default());
        }

        let pieces = self.split(fragments);
        let element = self.element_type();
        if element.is_array() {
            Value::Array(vec![element.convert(&pieces)])
        } else {
            Value::Array(pieces.iter().map(|piece| element.coerce(piece)).collect())
        }
    }

    fn split<'f>(&self, fragments: &[&'f str]) -> Vec<&'f str> {
        match self.delimiter.as_deref() {
            Some(delimiter) if !delimiter.is_empty() => fragments
                .iter()
                .copied()
                .flat_map(|fragment| fragment.split(delimiter))
                .collect(),
            _ => fragments.to_vec(),
        }
    }
}

fn parse_number(fragment: &str) -> f64 {
    let text = fragment.trim();
    match text {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // `inf`, `NaN` and friends are not numbers here
        _ if text
            .bytes()
            .any(|b| b.is_ascii_alphabetic() && !matches!(b, b'e' | b'E')) =>
        {
            f64::NAN
        }
        _ => text.parse().unwrap_or(f64::NAN),
    }
}

/// Converts one flag occurrence with `node`.
pub(crate) fn convert_occurrence(node: &TypeNode, occurrence: &Occurrence) -> Occurred {
    let mut provenance = Provenance::default();
    for token in occurrence.tokens() {
        provenance.record(token);
    }
    Occurred {
        value: node.convert(&occurrence.fragments()),
        provenance,
    }
}

/// Converts the positional tokens as a single occurrence, or `None` when
/// there are none.
pub(crate) fn convert_positionals(node: &TypeNode, tokens: &[Token]) -> Option<Occurred> {
    if tokens.is_empty() {
        return None;
    }
    let mut provenance = Provenance::default();
    for token in tokens {
        provenance.record(token);
    }
    let fragments: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    Some(Occurred {
        value: node.convert(&fragments),
        provenance,
    })
}

//! Type node and value definitions.
//!
//! A [`TypeNode`] describes how raw command-line text becomes a typed
//! [`Value`]. Nodes are flat records with a [`Kind`] discriminant; the
//! `array` kind owns exactly one child node, which may itself be an array,
//! so tags such as `array:array:string` compose without a type hierarchy.
//!
//! All types derive [`serde`] traits so schemas can be loaded from JSON or
//! YAML documents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// Delimiter used by array nodes unless configured otherwise.
pub const DEFAULT_DELIMITER: &str = ",";

/// Discriminant of a [`TypeNode`].
///
/// # Examples
///
/// ```
/// use typed_argv_core::Kind;
///
/// assert_eq!(Kind::from_tag("dir"), Some(Kind::Dir));
/// assert_eq!(Kind::Number.tag(), "number");
/// assert!(Kind::File.is_path_like());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Free-form text (the default).
    #[default]
    String,
    /// Floating point number; unparsable input becomes NaN.
    Number,
    /// One of a fixed set of choices.
    Enum,
    /// Any filesystem path.
    Path,
    /// Path expected to name a regular file.
    File,
    /// Path expected to name a directory.
    Dir,
    /// Sequence of values described by a child node.
    Array,
}

impl Kind {
    /// Every kind, scalars first.
    pub const ALL: [Kind; 7] = [
        Kind::String,
        Kind::Number,
        Kind::Enum,
        Kind::Path,
        Kind::File,
        Kind::Dir,
        Kind::Array,
    ];

    /// Returns the tag segment for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Enum => "enum",
            Kind::Path => "path",
            Kind::File => "file",
            Kind::Dir => "dir",
            Kind::Array => "array",
        }
    }

    /// Looks up a kind by its tag segment.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Path, file and dir values are filesystem paths.
    pub fn is_path_like(self) -> bool {
        matches!(self, Kind::Path | Kind::File | Kind::Dir)
    }
}

fn default_delimiter() -> Option<String> {
    Some(DEFAULT_DELIMITER.to_string())
}

fn default_true() -> bool {
    true
}

/// A composable value converter.
///
/// Scalar nodes consume exactly one token per occurrence. Array nodes consume
/// greedily and split every consumed token on their `delimiter`; an array
/// whose child is itself an array turns each occurrence into one element.
///
/// Strictness is fixed per kind:
/// - `number` fails on NaN only when `strict` is set;
/// - `enum` always fails on values outside `choices`;
/// - `path`/`file`/`dir` check existence only when `must_exist` is set, in
///   either direction.
///
/// # Examples
///
/// ```
/// use typed_argv_core::{Kind, TypeNode};
///
/// let nested = TypeNode::array_of(TypeNode::array()).no_delimiter();
/// assert_eq!(nested.tag(), "array:array:string");
///
/// let numbers = TypeNode::from_tag("array:number").unwrap();
/// assert_eq!(numbers.element_type().kind, Kind::Number);
/// assert_eq!(numbers.delimiter.as_deref(), Some(","));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    /// Which converter this node is
    #[serde(default)]
    pub kind: Kind,
    /// Element type (arrays only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<Box<TypeNode>>,
    /// Split consumed tokens on this string; `None` keeps tokens whole
    #[serde(default = "default_delimiter")]
    pub delimiter: Option<String>,
    /// Turn a NaN number into a failure
    #[serde(default)]
    pub strict: bool,
    /// Allowed values (enums only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// `Some(true)` requires the path to exist, `Some(false)` requires it not to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_exist: Option<bool>,
    /// Concatenate repeated occurrences instead of keeping the last one
    #[serde(default = "default_true")]
    pub cumulative: bool,
}

/// Element type used when an array node was built without a child.
static STRING_NODE: TypeNode = TypeNode::scalar(Kind::String);

impl Default for TypeNode {
    fn default() -> Self {
        Self::string()
    }
}

impl TypeNode {
    const fn scalar(kind: Kind) -> Self {
        Self {
            kind,
            child: None,
            delimiter: None,
            strict: false,
            choices: Vec::new(),
            must_exist: None,
            cumulative: true,
        }
    }

    /// Creates a `string` node.
    pub const fn string() -> Self {
        Self::scalar(Kind::String)
    }

    /// Creates a non-strict `number` node.
    pub const fn number() -> Self {
        Self::scalar(Kind::Number)
    }

    /// Creates an `enum` node accepting the given choices.
    pub fn enumeration<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scalar(Kind::Enum).choices(choices)
    }

    /// Creates a `path` node.
    pub const fn path() -> Self {
        Self::scalar(Kind::Path)
    }

    /// Creates a `file` node.
    pub const fn file() -> Self {
        Self::scalar(Kind::File)
    }

    /// Creates a `dir` node.
    pub const fn dir() -> Self {
        Self::scalar(Kind::Dir)
    }

    /// Creates an `array:string` node with the default delimiter.
    pub fn array() -> Self {
        Self::array_of(Self::string())
    }

    /// Creates an array node around `child`.
    pub fn array_of(child: TypeNode) -> Self {
        Self {
            kind: Kind::Array,
            child: Some(Box::new(child)),
            delimiter: default_delimiter(),
            ..Self::scalar(Kind::Array)
        }
    }

    /// Parses a type tag such as `number` or `array:array:enum`.
    ///
    /// A bare `array` means `array:string`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTypeTag`] for unknown segments and for
    /// scalar segments followed by more segments.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_argv_core::{SchemaError, TypeNode};
    ///
    /// assert_eq!(TypeNode::from_tag("array").unwrap().tag(), "array:string");
    /// assert_eq!(
    ///     TypeNode::from_tag("array:bool"),
    ///     Err(SchemaError::UnknownTypeTag("array:bool".into()))
    /// );
    /// ```
    pub fn from_tag(tag: &str) -> Result<Self, SchemaError> {
        let unknown = || SchemaError::UnknownTypeTag(tag.to_string());
        let (head, rest) = match tag.trim().split_once(':') {
            Some((head, rest)) => (head, Some(rest)),
            None => (tag.trim(), None),
        };
        let kind = Kind::from_tag(head).ok_or_else(unknown)?;

        match (kind, rest) {
            (Kind::Array, None) => Ok(Self::array()),
            (Kind::Array, Some(rest)) => {
                let child = Self::from_tag(rest).map_err(|_| unknown())?;
                Ok(Self::array_of(child))
            }
            (_, Some(_)) => Err(unknown()),
            (kind, None) => Ok(Self::scalar(kind)),
        }
    }

    /// Returns the full type tag, e.g. `array:number`.
    pub fn tag(&self) -> String {
        match self.kind {
            Kind::Array => format!("array:{}", self.element_type().tag()),
            kind => kind.tag().to_string(),
        }
    }

    /// Whether this node is an array.
    pub fn is_array(&self) -> bool {
        self.kind == Kind::Array
    }

    /// Element type of an array node (`string` when unset); a scalar node is
    /// its own element type.
    pub fn element_type(&self) -> &TypeNode {
        match (self.kind, self.child.as_deref()) {
            (Kind::Array, Some(child)) => child,
            (Kind::Array, None) => &STRING_NODE,
            _ => self,
        }
    }

    /// Innermost scalar node, following array children.
    pub fn leaf_mut(&mut self) -> &mut TypeNode {
        if !self.is_array() {
            return self;
        }
        self.child
            .get_or_insert_with(|| Box::new(Self::string()))
            .leaf_mut()
    }

    /// Sets the element type.
    pub fn of(mut self, child: TypeNode) -> Self {
        self.child = Some(Box::new(child));
        self
    }

    /// Sets the split delimiter.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Keeps every consumed token whole.
    pub fn no_delimiter(mut self) -> Self {
        self.delimiter = None;
        self
    }

    /// Sets number strictness.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets enum choices.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Enables the existence check for path-like nodes.
    pub fn must_exist(mut self, must_exist: bool) -> Self {
        self.must_exist = Some(must_exist);
        self
    }

    /// Sets the accumulation policy across occurrences.
    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.cumulative = cumulative;
        self
    }
}

/// Where a parsed value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Collected from positional tokens.
    Positional,
    /// Produced by one or more flag occurrences.
    Flag,
    /// Injected default or zero value.
    Default,
}

/// A coerced value.
///
/// Serialized untagged, so `Value::Array(vec![1.0.into()])` becomes `[1.0]`
/// in JSON. NaN serializes as `null`.
///
/// # Examples
///
/// ```
/// use typed_argv_core::Value;
///
/// let v = Value::from(vec!["one", "two"]);
/// assert_eq!(v.to_string(), "one,two");
/// assert_eq!(Value::from(3.0).to_string(), "3");
/// assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent scalar.
    Null,
    /// Number (possibly NaN).
    Number(f64),
    /// Text, enum member or path.
    String(String),
    /// Sequence of values.
    Array(Vec<Value>),
}

impl Value {
    /// Returns the text of a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number of a numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the elements of an array value.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is a numeric NaN.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Number(n) if n.is_nan())
    }

    /// Whether this is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

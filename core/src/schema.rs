//! Option and schema definitions.
//!
//! A [`Schema`] is an ordered list of [`OptionSpec`]s plus parser-level
//! settings. It is immutable during parsing and can be shared between any
//! number of parses, including concurrent ones.
//!
//! # Example
//!
//! ```
//! use typed_argv_core::*;
//!
//! let schema = Schema::new()
//!     .array("-a, --array <vals..>")
//!     .number_array("-n, --numbers")
//!     .option(OptionSpec::from_flags("--level", TypeNode::enumeration(["low", "high"])).required(true));
//!
//! assert_eq!(schema.options.len(), 3);
//! assert_eq!(schema.find("numbers").unwrap().type_tag(), "array:number");
//! assert!(validate_schema(&schema).is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::flags::{FlagDecl, is_variadic_hint};
use crate::{SchemaError, TypeNode, Value};

/// How many values one occurrence of an option takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// Exactly one value.
    Fixed,
    /// Any number of values up to the next flag.
    Variable,
}

/// A declared option.
///
/// Every name in `names` resolves to the same parsed value. The `cumulative`
/// policy lives on the option's top-level [`TypeNode`].
///
/// # Examples
///
/// ```
/// use typed_argv_core::{Arity, OptionSpec, TypeNode};
///
/// let spec = OptionSpec::from_flags("-a, --array <vals..>", TypeNode::array())
///     .cumulative(false)
///     .default_value(vec!["x"]);
/// assert_eq!(spec.names, ["a", "array"]);
/// assert_eq!(spec.canonical_name(), "array");
/// assert_eq!(spec.arity(), Arity::Variable);
/// assert!(!spec.node.cumulative);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Names without leading dashes (e.g. `a`, `array`)
    pub names: Vec<String>,
    /// Converter for this option's values
    #[serde(rename = "type")]
    pub node: TypeNode,
    /// Missing occurrences (without default) are a failure
    #[serde(default)]
    pub required: bool,
    /// Value used when the option never occurs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Value placeholder from the declaration, e.g. `<vals..>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OptionSpec {
    /// Creates an option from bare names.
    pub fn new<I, S>(names: I, node: TypeNode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            node,
            required: false,
            default_value: None,
            hint: None,
            description: None,
        }
    }

    /// Creates an option from a declaration such as `-a, --array <vals..>`.
    pub fn from_flags(decl: &str, node: TypeNode) -> Self {
        let decl = FlagDecl::parse(decl);
        Self {
            hint: decl.hint,
            ..Self::new(decl.names, node)
        }
    }

    /// Marks the option as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the accumulation policy of the top-level node.
    pub fn cumulative(mut self, cumulative: bool) -> Self {
        self.node.cumulative = cumulative;
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets the split delimiter of the top-level node.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.node.delimiter = Some(delimiter.into());
        self
    }

    /// Keeps the top-level node's tokens whole.
    pub fn no_delimiter(mut self) -> Self {
        self.node.delimiter = None;
        self
    }

    /// Sets strictness on the innermost scalar node.
    pub fn strict(mut self, strict: bool) -> Self {
        self.node.leaf_mut().strict = strict;
        self
    }

    /// Sets enum choices on the innermost scalar node.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node.leaf_mut().choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Enables the existence check on the innermost scalar node.
    pub fn must_exist(mut self, must_exist: bool) -> Self {
        self.node.leaf_mut().must_exist = Some(must_exist);
        self
    }

    /// Adds a description.
    pub fn description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Returns the longest name (the first one on ties).
    pub fn canonical_name(&self) -> &str {
        self.names
            .iter()
            .rev()
            .max_by_key(|name| name.len())
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    /// Checks whether `name` (without dashes) is one of this option's names.
    pub fn matches(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Arrays, and options declared with a variadic hint such as
    /// `<vals..>`, take a variable number of values; the rest take one.
    pub fn arity(&self) -> Arity {
        let variadic = self.hint.as_deref().is_some_and(is_variadic_hint);
        if self.node.is_array() || variadic {
            Arity::Variable
        } else {
            Arity::Fixed
        }
    }

    /// Type tag of the option's node.
    pub fn type_tag(&self) -> String {
        self.node.tag()
    }
}

/// Treatment of flag-looking tokens that match no declared option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFlags {
    /// Collect them with the positional tokens (the default).
    #[default]
    Positional,
    /// Report each one as a failure.
    Reject,
}

/// Which options are listed in the diagnostics trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypesListing {
    /// Every declared option, in declaration order (the default).
    #[default]
    Declared,
    /// Only options that occurred or carry a default.
    Referenced,
}

fn default_positional() -> TypeNode {
    TypeNode::array().no_delimiter()
}

/// An ordered option schema with parser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Declared options, in declaration order
    #[serde(default)]
    pub options: Vec<OptionSpec>,
    /// Converter for the synthetic `_` entry
    #[serde(default = "default_positional")]
    pub positional: TypeNode,
    /// Unknown-flag policy
    #[serde(default)]
    pub unknown_flags: UnknownFlags,
    /// Diagnostics listing policy
    #[serde(default)]
    pub types_listing: TypesListing,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            positional: default_positional(),
            unknown_flags: UnknownFlags::default(),
            types_listing: TypesListing::default(),
        }
    }
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option.
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    /// Adds an `array:string` option.
    pub fn array(self, decl: &str) -> Self {
        self.option(OptionSpec::from_flags(decl, TypeNode::array()))
    }

    /// Adds an `array:string` option; alias of [`Schema::array`].
    pub fn string_array(self, decl: &str) -> Self {
        self.array(decl)
    }

    /// Adds an `array:number` option.
    pub fn number_array(self, decl: &str) -> Self {
        self.option(OptionSpec::from_flags(
            decl,
            TypeNode::array_of(TypeNode::number()),
        ))
    }

    /// Adds an option whose type is given as a tag, e.g. `array:enum`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTypeTag`] if the tag is not recognized.
    pub fn typed(self, decl: &str, tag: &str) -> Result<Self, SchemaError> {
        let node = TypeNode::from_tag(tag)?;
        Ok(self.option(OptionSpec::from_flags(decl, node)))
    }

    /// Sets the positional converter.
    pub fn positional(mut self, node: TypeNode) -> Self {
        self.positional = node;
        self
    }

    /// Sets the unknown-flag policy.
    pub fn unknown_flags(mut self, policy: UnknownFlags) -> Self {
        self.unknown_flags = policy;
        self
    }

    /// Sets the diagnostics listing policy.
    pub fn types_listing(mut self, listing: TypesListing) -> Self {
        self.types_listing = listing;
        self
    }

    /// Finds an option by any of its names.
    pub fn find(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|spec| spec.matches(name))
    }

    /// Applies `f` to the most recently added option.
    ///
    /// Convenient after the shorthand builders:
    ///
    /// ```
    /// use typed_argv_core::Schema;
    ///
    /// let schema = Schema::new()
    ///     .number_array("n")
    ///     .last(|spec| spec.strict(true));
    /// assert!(schema.options[0].node.element_type().strict);
    /// ```
    pub fn last(mut self, f: impl FnOnce(OptionSpec) -> OptionSpec) -> Self {
        if let Some(spec) = self.options.pop() {
            self.options.push(f(spec));
        }
        self
    }
}

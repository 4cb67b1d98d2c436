//! Schema validation.
//!
//! Catches programming errors in a [`Schema`] before any token is parsed:
//! missing or malformed names, duplicate names, attributes attached to the
//! wrong kind of node, and defaults that cannot fit their node. These are
//! fatal; the parser reports them through `ParseResult::errors` and stops.
//!
//! # Examples
//!
//! ```
//! use typed_argv_core::*;
//!
//! let schema = Schema::new().array("-a, --array");
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Enum without choices
//! let bad = Schema::new().option(OptionSpec::from_flags("-e", TypeNode::enumeration(Vec::<String>::new())));
//! assert_eq!(validate_schema(&bad), vec![SchemaError::MissingChoices("e".into())]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Kind, OptionSpec, Schema, TypeNode, Value};

/// Name of the synthetic positional entry.
pub const POSITIONAL_NAME: &str = "_";

/// Schema construction errors.
///
/// Each variant names the option (by canonical name) it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An option declares no names.
    #[error("option must declare at least one name")]
    MissingFlagName,
    /// A name contains whitespace or `=`, starts with a dash, or is reserved.
    #[error("invalid flag name: {0}")]
    InvalidFlagName(String),
    /// Two options share a name.
    #[error("duplicate flag name: {0}")]
    DuplicateFlag(String),
    /// A type tag names no known kind.
    #[error("unknown type tag: {0}")]
    UnknownTypeTag(String),
    /// A scalar node carries a child node.
    #[error("{0}: only array types may have an element type")]
    UnexpectedChild(String),
    /// An enum node has no choices.
    #[error("{0}: enum type requires at least one choice")]
    MissingChoices(String),
    /// Choices on a non-enum node.
    #[error("{0}: choices are only valid on enum types")]
    ChoicesOnNonEnum(String),
    /// `must_exist` on a node that is not path-like.
    #[error("{0}: must_exist is only valid on path, file and dir types")]
    MustExistOnNonPath(String),
    /// An array delimiter is the empty string.
    #[error("{0}: delimiter cannot be empty")]
    EmptyDelimiter(String),
    /// A default value does not fit the option's node.
    #[error("{0}: default value does not fit type {1}")]
    InvalidDefault(String, String),
    /// The positional node is not an array.
    #[error("positional type must be an array, got {0}")]
    ScalarPositional(String),
}

/// Validates a schema, returning every problem found.
///
/// An empty vector means the schema is usable.
pub fn validate_schema(schema: &Schema) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for spec in &schema.options {
        validate_names(spec, &mut seen, &mut errors);
        validate_node(spec.canonical_name(), &spec.node, &mut errors);
        validate_default(spec, &mut errors);
    }

    if schema.positional.is_array() {
        validate_node(POSITIONAL_NAME, &schema.positional, &mut errors);
    } else {
        errors.push(SchemaError::ScalarPositional(schema.positional.tag()));
    }

    errors
}

fn validate_names<'s>(
    spec: &'s OptionSpec,
    seen: &mut HashSet<&'s str>,
    errors: &mut Vec<SchemaError>,
) {
    if spec.names.is_empty() {
        errors.push(SchemaError::MissingFlagName);
        return;
    }

    for name in &spec.names {
        let malformed = name.is_empty()
            || name.starts_with('-')
            || name.contains('=')
            || name.chars().any(char::is_whitespace)
            || name == POSITIONAL_NAME;
        if malformed {
            errors.push(SchemaError::InvalidFlagName(name.clone()));
            continue;
        }
        if !seen.insert(name) {
            errors.push(SchemaError::DuplicateFlag(name.clone()));
        }
    }
}

fn validate_node(owner: &str, node: &TypeNode, errors: &mut Vec<SchemaError>) {
    if !node.choices.is_empty() && node.kind != Kind::Enum {
        errors.push(SchemaError::ChoicesOnNonEnum(owner.to_string()));
    }
    if node.must_exist.is_some() && !node.kind.is_path_like() {
        errors.push(SchemaError::MustExistOnNonPath(owner.to_string()));
    }

    match node.kind {
        Kind::Array => {
            if node.delimiter.as_deref() == Some("") {
                errors.push(SchemaError::EmptyDelimiter(owner.to_string()));
            }
            if let Some(child) = &node.child {
                validate_node(owner, child, errors);
            }
        }
        kind => {
            if node.child.is_some() {
                errors.push(SchemaError::UnexpectedChild(owner.to_string()));
            }
            if kind == Kind::Enum && node.choices.is_empty() {
                errors.push(SchemaError::MissingChoices(owner.to_string()));
            }
        }
    }
}

fn validate_default(spec: &OptionSpec, errors: &mut Vec<SchemaError>) {
    let Some(default) = &spec.default_value else {
        return;
    };
    if !spec.node.is_array() && default.is_array() {
        errors.push(SchemaError::InvalidDefault(
            spec.canonical_name().to_string(),
            spec.type_tag(),
        ));
    }
    if spec.node.is_array() && matches!(default, Value::Null) {
        errors.push(SchemaError::InvalidDefault(
            spec.canonical_name().to_string(),
            spec.type_tag(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_duplicate_names_across_options() {
        let schema = Schema::new().array("-a, --array").number_array("-a");
        assert_eq!(
            validate_schema(&schema),
            vec![SchemaError::DuplicateFlag("a".to_string())]
        );
    }

    #[test]
    fn test_validate_rejects_missing_and_reserved_names() {
        let schema = Schema::new()
            .option(OptionSpec::from_flags("<value>", TypeNode::string()))
            .option(OptionSpec::new(["_"], TypeNode::string()))
            .option(OptionSpec::new(["a=b"], TypeNode::string()));
        assert_eq!(
            validate_schema(&schema),
            vec![
                SchemaError::MissingFlagName,
                SchemaError::InvalidFlagName("_".to_string()),
                SchemaError::InvalidFlagName("a=b".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_reports_misplaced_attributes() {
        let schema = Schema::new()
            .option(OptionSpec::new(["n"], TypeNode::number().must_exist(true)))
            .option(OptionSpec::new(["s"], TypeNode::string().choices(["x"])))
            .option(OptionSpec::new(["t"], TypeNode::string().of(TypeNode::string())));
        assert_eq!(
            validate_schema(&schema),
            vec![
                SchemaError::MustExistOnNonPath("n".to_string()),
                SchemaError::ChoicesOnNonEnum("s".to_string()),
                SchemaError::UnexpectedChild("t".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_checks_nested_nodes() {
        let node = TypeNode::array_of(TypeNode::array_of(TypeNode::enumeration(
            Vec::<String>::new(),
        )))
        .delimiter("");
        let schema = Schema::new().option(OptionSpec::new(["deep"], node));
        assert_eq!(
            validate_schema(&schema),
            vec![
                SchemaError::EmptyDelimiter("deep".to_string()),
                SchemaError::MissingChoices("deep".to_string()),
            ]
        );
    }

    #[test]
    fn test_validate_rejects_array_default_for_scalar() {
        let schema = Schema::new()
            .option(OptionSpec::new(["s"], TypeNode::string()).default_value(vec!["a", "b"]));
        assert_eq!(
            validate_schema(&schema),
            vec![SchemaError::InvalidDefault(
                "s".to_string(),
                "string".to_string()
            )]
        );
    }

    #[test]
    fn test_validate_rejects_scalar_positional() {
        let schema = Schema::new().positional(TypeNode::number());
        assert_eq!(
            validate_schema(&schema),
            vec![SchemaError::ScalarPositional("number".to_string())]
        );
    }
}

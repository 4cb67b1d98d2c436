//! Parse results and the diagnostics trail.

use indexmap::IndexMap;
use serde::Serialize;

use crate::accumulate::Folded;
use crate::{Failure, Origin, POSITIONAL_NAME, SchemaError, Value};

/// How one final value was derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDetail {
    /// Every name of the option (`["_"]` for positionals)
    pub names: Vec<String>,
    /// Type tag, e.g. `array:number`
    pub type_tag: String,
    /// Final value
    pub value: Value,
    /// Where the value came from
    pub origin: Origin,
    /// Indices of the consumed tokens, strictly increasing
    pub token_indices: Vec<usize>,
    /// Consumed tokens, verbatim
    pub raw_tokens: Vec<String>,
}

impl TypeDetail {
    pub(crate) fn new(names: Vec<String>, type_tag: String, folded: Folded) -> Self {
        Self {
            names,
            type_tag,
            value: folded.value,
            origin: folded.origin,
            token_indices: folded.provenance.indices,
            raw_tokens: folded.provenance.raw,
        }
    }
}

/// Raw input echo plus the diagnostics trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Details {
    /// All input tokens, verbatim
    pub args: Vec<String>,
    /// Positional entry first, then options
    pub types: Vec<TypeDetail>,
}

/// Outcome of one parse.
///
/// User-input failures only show up in `output` and `code`; `errors` is
/// reserved for schema problems, which abort the parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    /// `_` plus every declared name of every option, mapped to its value
    pub argv: IndexMap<String, Value>,
    /// Input echo and diagnostics trail
    pub details: Details,
    /// Schema errors
    pub errors: Vec<String>,
    /// Exit code
    pub code: i32,
    /// One failure message per line
    pub output: String,
}

impl ParseResult {
    /// Result for a schema that failed validation.
    pub(crate) fn from_schema_errors(args: Vec<String>, errors: &[SchemaError]) -> Self {
        Self {
            details: Details {
                args,
                types: Vec::new(),
            },
            errors: errors.iter().map(ToString::to_string).collect(),
            code: 1,
            ..Self::default()
        }
    }

    /// Builds the final result. Every entry feeds `argv`; only entries
    /// flagged as listed enter the diagnostics trail.
    pub(crate) fn assemble(
        args: Vec<String>,
        entries: Vec<(TypeDetail, bool)>,
        failures: &[Failure],
    ) -> Self {
        let mut argv = IndexMap::new();
        let mut types = Vec::with_capacity(entries.len());
        for (detail, listed) in entries {
            for name in &detail.names {
                argv.insert(name.clone(), detail.value.clone());
            }
            if listed {
                types.push(detail);
            }
        }

        Self {
            argv,
            details: Details { args, types },
            errors: Vec::new(),
            code: exit_code(failures),
            output: failures
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Value bound to `name` (any alias, or `_`).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.argv.get(name)
    }

    /// Positional values.
    pub fn positionals(&self) -> &[Value] {
        self.get(POSITIONAL_NAME)
            .and_then(Value::as_array)
            .unwrap_or_default()
    }

    /// Diagnostics entry for `name` (any alias, or `_`).
    pub fn detail(&self, name: &str) -> Option<&TypeDetail> {
        self.details
            .types
            .iter()
            .find(|detail| detail.names.iter().any(|n| n == name))
    }

    /// No failures and no schema errors.
    pub fn is_success(&self) -> bool {
        self.code == 0 && self.errors.is_empty()
    }
}

/// Maps failures to an exit code: the number of strict failures when there
/// are any, otherwise 1 for missing required options, otherwise 0.
///
/// # Examples
///
/// ```
/// use typed_argv_core::{Failure, exit_code};
///
/// let missing = Failure::MissingRequired(vec!["a".into()]);
/// let unknown = Failure::UnknownArgument("-x".into());
/// assert_eq!(exit_code(&[]), 0);
/// assert_eq!(exit_code(&[missing.clone(), missing.clone()]), 1);
/// assert_eq!(exit_code(&[missing, unknown.clone(), unknown]), 2);
/// ```
pub fn exit_code(failures: &[Failure]) -> i32 {
    let strict = failures.iter().filter(|f| f.is_strict()).count();
    if strict > 0 {
        i32::try_from(strict).unwrap_or(i32::MAX)
    } else if failures.is_empty() {
        0
    } else {
        1
    }
}

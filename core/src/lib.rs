//! Typed argument parsing and coercion.
//!
//! A [`Schema`] declares options, each with one or more names and a typed
//! converter ([`TypeNode`]). Parsing a command line against it yields a
//! [`ParseResult`]:
//!
//! - `argv` maps `_` and every declared name to its final [`Value`].
//! - `details` echoes the input and records, per option, the origin of the
//!   value and the indices and text of the tokens it was built from.
//! - `code` and `output` report strict-mode failures.
//!
//! Array converters split tokens on a delimiter, accumulate across repeated
//! occurrences, and may nest. Number, enum and path converters validate
//! elements when strict. Schema problems ([`validate_schema`]) are reported
//! in `errors` and abort the parse.
//!
//! # Example
//!
//! ```
//! use typed_argv_core::*;
//!
//! let schema = Schema::new()
//!     .array("-a, --array")
//!     .number_array("-n, --numbers")
//!     .option(
//!         OptionSpec::from_flags("-N", TypeNode::array_of(TypeNode::array().cumulative(false)))
//!             .no_delimiter(),
//!     );
//!
//! let result = schema.parse("-a x,y -n 1 2 -N a b -N c,d");
//!
//! assert_eq!(result.get("a"), result.get("array"));
//! assert_eq!(result.get("numbers"), Some(&Value::from(vec![1, 2])));
//! assert_eq!(
//!     result.get("N"),
//!     Some(&Value::Array(vec![Value::from(vec!["a", "b"]), Value::from(vec!["c", "d"])]))
//! );
//! assert_eq!(result.detail("N").unwrap().token_indices, [5, 6, 7, 8, 9]);
//! assert_eq!(result.code, 0);
//! ```

mod accumulate;
mod check;
mod convert;
mod flags;
mod matcher;
mod parser;
mod result;
mod schema;
mod token;
mod types;
mod validate;

pub use check::{Failure, FsProbe, PathKind, PathProbe};
pub use convert::Provenance;
pub use flags::{FlagDecl, flag_form};
pub use matcher::{Occurrence, Segment, match_tokens};
pub use result::{Details, ParseResult, TypeDetail, exit_code};
pub use schema::{Arity, OptionSpec, Schema, TypesListing, UnknownFlags};
pub use token::{SEPARATOR, Token, tokenize, tokens_from_args};
pub use types::*;
pub use validate::{POSITIONAL_NAME, SchemaError, validate_schema};

//! The parse pipeline.
//!
//! tokenize → match → convert per occurrence → fold → check → assemble.
//! Every step is local to one call, so a [`Schema`] can serve concurrent
//! parses.

use tracing::{debug, warn};

use crate::accumulate::{Folded, fold};
use crate::check::check_value;
use crate::convert::{Occurred, convert_occurrence, convert_positionals};
use crate::matcher::{Segment, match_tokens};
use crate::{
    Failure, FsProbe, Origin, POSITIONAL_NAME, ParseResult, PathProbe, Schema, Token, TypeDetail,
    TypesListing, tokenize, tokens_from_args, validate_schema,
};

impl Schema {
    /// Parses a command line, checking paths against the real filesystem.
    ///
    /// # Examples
    ///
    /// ```
    /// use typed_argv_core::{Schema, Value};
    ///
    /// let schema = Schema::new().array("-a, --array").number_array("-n");
    /// let result = schema.parse("-a one two -n=1 2 3,4");
    ///
    /// assert_eq!(result.get("array"), Some(&Value::from(vec!["one", "two"])));
    /// assert_eq!(result.get("n"), Some(&Value::from(vec![1, 2, 3, 4])));
    /// assert_eq!(result.detail("n").unwrap().token_indices, [3, 4, 5]);
    /// assert_eq!(result.code, 0);
    /// ```
    pub fn parse(&self, line: &str) -> ParseResult {
        self.parse_with(tokenize(line), &FsProbe)
    }

    /// Parses a pre-split argument list.
    pub fn parse_args<I, S>(&self, args: I) -> ParseResult
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_with(tokens_from_args(args), &FsProbe)
    }

    /// Parses tokens with an injected path probe.
    pub fn parse_with(&self, tokens: Vec<Token>, probe: &dyn PathProbe) -> ParseResult {
        let args: Vec<String> = tokens.iter().map(|t| t.text.clone()).collect();

        let schema_errors = validate_schema(self);
        if !schema_errors.is_empty() {
            warn!(errors = schema_errors.len(), "schema validation failed; parse aborted");
            return ParseResult::from_schema_errors(args, &schema_errors);
        }

        let mut occurred: Vec<Vec<Occurred>> = vec![Vec::new(); self.options.len()];
        let mut positional: Vec<Token> = Vec::new();
        let mut failures: Vec<Failure> = Vec::new();
        let mut unknown: Vec<Failure> = Vec::new();

        for segment in match_tokens(self, &tokens) {
            match segment {
                Segment::Flag(occurrence) => {
                    let spec = &self.options[occurrence.option];
                    debug!(
                        option = spec.canonical_name(),
                        head = occurrence.head.index,
                        values = occurrence.values.len(),
                        "flag occurrence"
                    );
                    occurred[occurrence.option].push(convert_occurrence(&spec.node, &occurrence));
                }
                Segment::Positional(token) => positional.push(token),
                Segment::Unknown(token) => unknown.push(Failure::UnknownArgument(token.text)),
            }
        }

        let positional = Folded::positional(self, &positional);
        let folded: Vec<Folded> = self
            .options
            .iter()
            .zip(occurred)
            .map(|(spec, occurred)| {
                fold(&spec.node, spec.default_value.as_ref(), occurred, Origin::Flag)
            })
            .collect();

        for (spec, folded) in self.options.iter().zip(&folded) {
            if spec.required && folded.occurrences == 0 && spec.default_value.is_none() {
                failures.push(Failure::MissingRequired(spec.names.clone()));
            }
        }
        failures.append(&mut unknown);
        for (spec, folded) in self.options.iter().zip(&folded) {
            check_value(
                spec.canonical_name(),
                &spec.node,
                &folded.value,
                probe,
                &mut failures,
            );
        }

        let mut entries = vec![(
            TypeDetail::new(
                vec![POSITIONAL_NAME.to_string()],
                self.positional.tag(),
                positional,
            ),
            true,
        )];
        for (spec, folded) in self.options.iter().zip(folded) {
            let listed = match self.types_listing {
                TypesListing::Declared => true,
                TypesListing::Referenced => {
                    folded.occurrences > 0 || spec.default_value.is_some()
                }
            };
            entries.push((
                TypeDetail::new(spec.names.clone(), spec.type_tag(), folded),
                listed,
            ));
        }

        let result = ParseResult::assemble(args, entries, &failures);
        debug!(
            code = result.code,
            failures = failures.len(),
            "parse complete"
        );
        result
    }
}

impl Folded {
    fn positional(schema: &Schema, tokens: &[Token]) -> Self {
        let occurred: Vec<Occurred> = convert_positionals(&schema.positional, tokens)
            .into_iter()
            .collect();
        fold(&schema.positional, None, occurred, Origin::Positional)
    }
}

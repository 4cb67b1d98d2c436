//! Flag declaration parsing.
//!
//! Options are usually declared with a usage-like string such as
//! `-a, --array <vals..>`, `-a|--array` or just `n`. [`FlagDecl::parse`]
//! splits such a string into bare names and an optional value hint.

use std::sync::LazyLock;

use regex::Regex;

static DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<names>[^<\[]*?)\s*(?P<hint>[<\[].*?)?\s*$")
        .expect("static regex must compile")
});

static NAME_SEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,|]+").expect("static regex must compile"));

/// A parsed flag declaration.
///
/// # Examples
///
/// ```
/// use typed_argv_core::FlagDecl;
///
/// let decl = FlagDecl::parse("-n, --numbers <n1 [n2 n3..]>");
/// assert_eq!(decl.names, ["n", "numbers"]);
/// assert_eq!(decl.hint.as_deref(), Some("<n1 [n2 n3..]>"));
/// assert!(decl.is_variadic());
///
/// assert_eq!(FlagDecl::parse("-a|--array").names, ["a", "array"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlagDecl {
    /// Names without leading dashes, in declaration order
    pub names: Vec<String>,
    /// Value placeholder, e.g. `<vals..>`
    pub hint: Option<String>,
}

impl FlagDecl {
    /// Parses a declaration string. Never fails; a declaration without names
    /// yields an empty `names` list, which schema validation reports.
    pub fn parse(decl: &str) -> Self {
        let Some(caps) = DECL_RE.captures(decl) else {
            return Self::default();
        };

        let names = caps
            .name("names")
            .map(|m| {
                NAME_SEP_RE
                    .split(m.as_str())
                    .map(|name| name.trim_start_matches('-'))
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            names,
            hint: caps.name("hint").map(|m| m.as_str().to_string()),
        }
    }

    /// Whether the hint announces a variable number of values.
    pub fn is_variadic(&self) -> bool {
        self.hint.as_deref().is_some_and(is_variadic_hint)
    }
}

/// A hint containing `..` (`<vals..>`, `[n2 n3..]`) announces many values.
pub(crate) fn is_variadic_hint(hint: &str) -> bool {
    hint.contains("..")
}

/// Renders a bare name the way it is typed: `-a` for single characters,
/// `--name` otherwise.
pub fn flag_form(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

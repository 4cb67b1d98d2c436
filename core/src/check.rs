//! Strict-mode checks on final values.
//!
//! Failures are user-input problems: they are collected, never returned as
//! errors, and every option is checked even after earlier failures. Path
//! existence is answered by an injected [`PathProbe`].

use std::path::Path;

use thiserror::Error;

use crate::{Kind, TypeNode, Value};

/// A user-input validation failure. `Display` renders the message line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// A required option never occurred and has no default.
    #[error("Missing required argument: {}", .0.join(" or "))]
    MissingRequired(Vec<String>),
    /// A flag-looking token matched no option under a closed schema.
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
    /// A strict number element is NaN.
    #[error("Value \"{value}\" is invalid for argument {name}. Please specify a number.")]
    NotANumber { value: String, name: String },
    /// An enum element is not one of the choices.
    #[error("Value \"{value}\" is invalid for argument {name}. Choices are: {}", .choices.join(", "))]
    InvalidChoice {
        value: String,
        name: String,
        choices: Vec<String>,
    },
    /// `must_exist: true` and the path is missing.
    #[error("The path does not exist: {0}")]
    PathMissing(String),
    /// `must_exist: false` and the path is present.
    #[error("The path already exists: {0}")]
    PathExists(String),
    /// A `file` element names a directory.
    #[error("The path is not a file: {0}")]
    NotAFile(String),
    /// A `dir` element names something other than a directory.
    #[error("The path is not a directory: {0}")]
    NotADirectory(String),
}

impl Failure {
    /// Whether this failure came from a per-element strict check (or an
    /// unknown flag) rather than a missing required option.
    pub fn is_strict(&self) -> bool {
        !matches!(self, Failure::MissingRequired(_))
    }
}

/// What a probed path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Exists, but the kind is unknown or neither of the above.
    Other,
}

/// Injected filesystem capability used by path-like nodes.
///
/// Any `Fn(&Path) -> bool` closure is a probe that only answers existence:
///
/// ```
/// use std::path::Path;
/// use typed_argv_core::{PathKind, PathProbe};
///
/// let probe = |p: &Path| p == Path::new("/etc");
/// assert!(probe.exists(Path::new("/etc")));
/// assert_eq!(probe.probe(Path::new("/nope")), None);
/// assert_eq!(probe.probe(Path::new("/etc")), Some(PathKind::Other));
/// ```
pub trait PathProbe {
    /// Returns what `path` is, or `None` when it does not exist.
    fn probe(&self, path: &Path) -> Option<PathKind>;

    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool {
        self.probe(path).is_some()
    }
}

/// Probe backed by [`std::fs::metadata`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl PathProbe for FsProbe {
    fn probe(&self, path: &Path) -> Option<PathKind> {
        let meta = std::fs::metadata(path).ok()?;
        Some(if meta.is_file() {
            PathKind::File
        } else if meta.is_dir() {
            PathKind::Dir
        } else {
            PathKind::Other
        })
    }
}

impl<F> PathProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn probe(&self, path: &Path) -> Option<PathKind> {
        self(path).then_some(PathKind::Other)
    }
}

/// Checks a final value against `node`, appending failures to `out`.
///
/// `name` is used in the number and enum messages.
pub(crate) fn check_value(
    name: &str,
    node: &TypeNode,
    value: &Value,
    probe: &dyn PathProbe,
    out: &mut Vec<Failure>,
) {
    match (node.kind, value) {
        (_, Value::Null) => {}
        (Kind::Array, Value::Array(items)) => {
            let element = node.element_type();
            for item in items {
                check_value(name, element, item, probe, out);
            }
        }
        (Kind::Array, scalar) => check_value(name, node.element_type(), scalar, probe, out),
        (Kind::Number, value) => {
            if node.strict && value.is_nan() {
                out.push(Failure::NotANumber {
                    value: value.to_string(),
                    name: name.to_string(),
                });
            }
        }
        (Kind::Enum, value) => {
            let text = value.to_string();
            if !node.choices.iter().any(|choice| *choice == text) {
                out.push(Failure::InvalidChoice {
                    value: text,
                    name: name.to_string(),
                    choices: node.choices.clone(),
                });
            }
        }
        (kind @ (Kind::Path | Kind::File | Kind::Dir), value) => {
            if let Some(must_exist) = node.must_exist {
                check_path(kind, must_exist, &value.to_string(), probe, out);
            }
        }
        (Kind::String, _) => {}
    }
}

fn check_path(
    kind: Kind,
    must_exist: bool,
    path: &str,
    probe: &dyn PathProbe,
    out: &mut Vec<Failure>,
) {
    match (must_exist, probe.probe(Path::new(path))) {
        (true, None) => out.push(Failure::PathMissing(path.to_string())),
        (true, Some(PathKind::Dir)) if kind == Kind::File => {
            out.push(Failure::NotAFile(path.to_string()))
        }
        (true, Some(PathKind::File)) if kind == Kind::Dir => {
            out.push(Failure::NotADirectory(path.to_string()))
        }
        (false, Some(_)) => out.push(Failure::PathExists(path.to_string())),
        _ => {}
    }
}

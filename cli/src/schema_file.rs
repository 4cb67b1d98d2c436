//! Schema files for the command-line front end.
//!
//! A schema file is JSON or YAML (chosen by extension) describing options in
//! declaration order:
//!
//! ```yaml
//! unknown_flags: reject
//! options:
//!   - flags: "-a, --array <vals..>"
//!   - flags: "-n, --numbers"
//!     type: "array:number"
//!     strict: true
//!   - flags: "-N, --nested"
//!     type: "array:array"
//!     delimiter: false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use typed_argv_core::{
    FlagDecl, OptionSpec, Schema, SchemaError, TypeNode, TypesListing, UnknownFlags, Value,
};

/// Errors raised while loading a schema file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Extension is neither JSON nor YAML.
    #[error("unsupported schema file extension: {0}")]
    UnsupportedFormat(String),

    /// A type tag in the file could not be resolved.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Delimiter setting: a string, `true` for the default, `false` to disable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DelimiterSetting {
    Enabled(bool),
    Text(String),
}

/// One option entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionEntry {
    /// Declaration such as `-a, --array <vals..>`
    pub flags: String,
    /// Type tag; when omitted, `array` for a variadic hint such as
    /// `<vals..>`, `string` otherwise
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub cumulative: Option<bool>,
    pub default: Option<Value>,
    pub delimiter: Option<DelimiterSetting>,
    pub strict: Option<bool>,
    #[serde(default)]
    pub choices: Vec<String>,
    pub must_exist: Option<bool>,
    pub description: Option<String>,
}

impl OptionEntry {
    fn node(&self) -> Result<TypeNode, SchemaError> {
        match &self.type_tag {
            Some(tag) => TypeNode::from_tag(tag),
            None if FlagDecl::parse(&self.flags).is_variadic() => Ok(TypeNode::array()),
            None => Ok(TypeNode::string()),
        }
    }

    fn into_spec(self) -> Result<OptionSpec, SchemaError> {
        let mut spec = OptionSpec::from_flags(&self.flags, self.node()?).required(self.required);

        if let Some(cumulative) = self.cumulative {
            spec = spec.cumulative(cumulative);
        }
        if let Some(default) = self.default {
            spec = spec.default_value(default);
        }
        match self.delimiter {
            Some(DelimiterSetting::Text(delimiter)) => spec = spec.delimiter(delimiter),
            Some(DelimiterSetting::Enabled(false)) => spec = spec.no_delimiter(),
            Some(DelimiterSetting::Enabled(true)) | None => {}
        }
        if let Some(strict) = self.strict {
            spec = spec.strict(strict);
        }
        if !self.choices.is_empty() {
            spec = spec.choices(self.choices);
        }
        if let Some(must_exist) = self.must_exist {
            spec = spec.must_exist(must_exist);
        }
        if let Some(desc) = &self.description {
            spec = spec.description(desc);
        }
        Ok(spec)
    }
}

/// Top-level schema file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    #[serde(default)]
    pub options: Vec<OptionEntry>,
    /// Type tag of the positional entry
    pub positional: Option<String>,
    #[serde(default)]
    pub unknown_flags: UnknownFlags,
    #[serde(default)]
    pub types_listing: TypesListing,
}

impl SchemaFile {
    /// Builds the schema. Only tag resolution can fail here; structural
    /// problems are left to schema validation.
    pub fn into_schema(self) -> Result<Schema, SchemaError> {
        let mut schema = Schema::new()
            .unknown_flags(self.unknown_flags)
            .types_listing(self.types_listing);
        if let Some(tag) = &self.positional {
            schema = schema.positional(TypeNode::from_tag(tag)?.no_delimiter());
        }
        for entry in self.options {
            schema = schema.option(entry.into_spec()?);
        }
        Ok(schema)
    }
}

/// Loads a schema from a `.json`, `.yaml` or `.yml` file.
pub fn load(path: &Path) -> Result<Schema, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let file: SchemaFile = match ext.as_str() {
        "json" => serde_json::from_str(&content)?,
        "yaml" | "yml" => serde_yaml::from_str(&content)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    Ok(file.into_schema()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_entries_map_to_builders() {
        let file: SchemaFile = serde_yaml::from_str(
            r#"
unknown_flags: reject
options:
  - flags: "-a, --array"
    type: array
    required: true
    default: [x, y]
  - flags: "--dash"
    type: "array:string"
    delimiter: "-"
  - flags: "-N"
    type: "array:array"
    delimiter: false
  - flags: "-e"
    type: "array:enum"
    choices: [node, rust]
  - flags: "-p"
    type: "array:path"
    must_exist: true
"#,
        )
        .unwrap();
        let schema = file.into_schema().unwrap();

        assert_eq!(schema.unknown_flags, UnknownFlags::Reject);
        assert_eq!(schema.options.len(), 5);
        assert!(schema.options[0].required);
        assert_eq!(
            schema.options[0].default_value,
            Some(Value::from(vec!["x", "y"]))
        );
        assert_eq!(schema.options[1].node.delimiter.as_deref(), Some("-"));
        assert_eq!(schema.options[2].node.delimiter, None);
        assert_eq!(schema.options[2].type_tag(), "array:array:string");
        assert_eq!(schema.options[3].node.element_type().choices, ["node", "rust"]);
        assert_eq!(schema.options[4].node.element_type().must_exist, Some(true));
    }

    #[test]
    fn test_type_defaults_to_string() {
        let file: SchemaFile =
            serde_json::from_str(r#"{"options": [{"flags": "--name"}]}"#).unwrap();
        let schema = file.into_schema().unwrap();
        assert_eq!(schema.options[0].type_tag(), "string");
    }

    #[test]
    fn test_variadic_hint_without_type_means_array() {
        let file: SchemaFile = serde_yaml::from_str(
            r#"
options:
  - flags: "-a, --array <vals..>"
  - flags: "-n <n1 [n2 n3..]>"
  - flags: "--one <value>"
  - flags: "--tagged <vals..>"
    type: number
"#,
        )
        .unwrap();
        let schema = file.into_schema().unwrap();

        let tags: Vec<String> = schema.options.iter().map(OptionSpec::type_tag).collect();
        assert_eq!(tags, ["array:string", "array:string", "string", "number"]);

        let result = schema.parse("before -a x y -n 1 --one z w");
        assert_eq!(result.get("a"), Some(&Value::from(vec!["x", "y"])));
        assert_eq!(result.get("one"), Some(&Value::from("z")));
        assert_eq!(result.positionals(), [Value::from("before"), Value::from("w")]);
    }

    #[test]
    fn test_unknown_tag_is_reported() {
        let file: SchemaFile =
            serde_json::from_str(r#"{"options": [{"flags": "--x", "type": "array:bool"}]}"#)
                .unwrap();
        assert!(matches!(
            file.into_schema(),
            Err(SchemaError::UnknownTypeTag(tag)) if tag == "array:bool"
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.toml");
        fs::write(&path, "").unwrap();
        assert!(matches!(load(&path), Err(LoadError::UnsupportedFormat(ext)) if ext == "toml"));
    }
}

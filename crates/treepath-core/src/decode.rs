//! Decoding forests from JSON, YAML and TOML text.
//!
//! Every format is decoded into a `serde_json::Value` so one search path
//! serves all of them. JSON and YAML documents are taken as-is: the document
//! itself is the forest. A TOML document is always a table, so it is wrapped
//! as a single-root forest.
//!
//! YAML and TOML can express floats JSON cannot (`.inf`, `.nan`, `inf`,
//! `nan`). Those become strings (`"inf"`, `"-inf"`, `"NaN"`) so the node stays
//! a node instead of collapsing into a skipped `null`. TOML datetimes become
//! their RFC 3339 text.

#![allow(clippy::module_name_repetitions)]

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors from decoding input text.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML input: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML input: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown input format '{0}': expected json, yaml or toml")]
    UnknownFormat(String),

    #[error("unsupported YAML mapping key {0}: keys must be scalars")]
    ComplexKey(String),
}

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Json,
    Yaml,
    Toml,
}

impl InputFormat {
    /// Guess the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputFormat {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => Err(DecodeError::UnknownFormat(other.to_string())),
        }
    }
}

/// Decode `text` into a forest value.
///
/// # Errors
///
/// Returns [`DecodeError`] when `text` is not valid in `format`.
pub fn decode_forest(text: &str, format: InputFormat) -> Result<Value, DecodeError> {
    let value = match format {
        InputFormat::Json => serde_json::from_str::<Value>(text)?,
        InputFormat::Yaml => from_yaml(serde_yaml::from_str(text)?)?,
        InputFormat::Toml => Value::Array(vec![from_toml(toml::from_str(text)?)]),
    };
    Ok(value)
}

fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f).map_or_else(|| Value::String(f.to_string()), Value::Number)
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value, DecodeError> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map_or(Value::Null, float_value)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| Ok((yaml_key(key)?, from_yaml(value)?)))
                .collect::<Result<_, DecodeError>>()?,
        ),
        Yaml::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, DecodeError> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(DecodeError::ComplexKey(format!("{other:?}"))),
    }
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => float_value(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, from_toml(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a.json")), Some(InputFormat::Json));
        assert_eq!(InputFormat::from_path(Path::new("a.YML")), Some(InputFormat::Yaml));
        assert_eq!(InputFormat::from_path(Path::new("a.yaml")), Some(InputFormat::Yaml));
        assert_eq!(InputFormat::from_path(Path::new("a.toml")), Some(InputFormat::Toml));
        assert_eq!(InputFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(InputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn format_from_str() {
        assert_eq!("YAML".parse::<InputFormat>().unwrap(), InputFormat::Yaml);
        assert!(matches!(
            "xml".parse::<InputFormat>(),
            Err(DecodeError::UnknownFormat(name)) if name == "xml"
        ));
    }

    #[test]
    fn decodes_json_as_is() {
        let value = decode_forest(r#"[{"id": 1}]"#, InputFormat::Json).unwrap();
        assert_eq!(value, json!([{ "id": 1 }]));
    }

    #[test]
    fn decodes_yaml_forest() {
        let text = "- id: 1\n  children:\n    - id: 2\n    - ~\n";
        let value = decode_forest(text, InputFormat::Yaml).unwrap();
        assert_eq!(value, json!([{ "id": 1, "children": [{ "id": 2 }, null] }]));
    }

    #[test]
    fn wraps_toml_table_as_single_root() {
        let text = "id = 1\n\n[[children]]\nid = 2\n";
        let value = decode_forest(text, InputFormat::Toml).unwrap();
        assert_eq!(value, json!([{ "id": 1, "children": [{ "id": 2 }] }]));
    }

    #[test]
    fn yaml_non_finite_floats_stay_nodes() {
        let text = "- id: .inf\n- id: -.inf\n- id: .nan\n- id: 1.5\n";
        let value = decode_forest(text, InputFormat::Yaml).unwrap();
        assert_eq!(
            value,
            json!([{ "id": "inf" }, { "id": "-inf" }, { "id": "NaN" }, { "id": 1.5 }])
        );

        let bare = decode_forest("- .inf\n- ~\n", InputFormat::Yaml).unwrap();
        let found = crate::find_in_value_default(&bare, |node| node.is_string());
        assert_eq!(found.target(), Some(&json!("inf")));
    }

    #[test]
    fn yaml_scalar_keys_and_tags() {
        let text = "- 1: one\n  true: yes\n  name: !custom tagged\n";
        let value = decode_forest(text, InputFormat::Yaml).unwrap();
        assert_eq!(value, json!([{ "1": "one", "true": "yes", "name": "tagged" }]));
    }

    #[test]
    fn yaml_complex_keys_are_rejected() {
        assert!(matches!(
            decode_forest("? [a, b]\n: 1\n", InputFormat::Yaml),
            Err(DecodeError::ComplexKey(_))
        ));
    }

    #[test]
    fn toml_special_values() {
        let text = "id = 1\nweight = inf\nwhen = 2024-05-01T10:00:00Z\n";
        let value = decode_forest(text, InputFormat::Toml).unwrap();
        assert_eq!(
            value,
            json!([{ "id": 1, "weight": "inf", "when": "2024-05-01T10:00:00Z" }])
        );
    }

    #[test]
    fn reports_syntax_errors() {
        assert!(matches!(
            decode_forest("[{", InputFormat::Json),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_forest("a = ", InputFormat::Toml),
            Err(DecodeError::Toml(_))
        ));
    }
}

//! `tp find`: locate the first matching node and print its ancestor path.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use treepath_core::config::TreepathConfig;
use treepath_core::decode::{InputFormat, decode_forest};
use treepath_core::error::TreepathError;
use treepath_core::matcher::Matcher;
use treepath_core::{FoundPath, SearchOptions};

use crate::output::{OutputMode, Renderable, pretty_kv, pretty_section, render_item};

/// Arguments for `tp find`.
#[derive(Args, Debug)]
pub struct FindArgs {
    /// Input file. Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Clause `FIELD OP VALUE`; repeat to require all of them.
    #[arg(short = 'w', long = "where", value_name = "CLAUSE")]
    pub clauses: Vec<String>,

    /// Field holding each node's children (overrides config).
    #[arg(short = 'k', long)]
    pub children_key: Option<String>,

    /// Field used to label nodes in pretty/text output (overrides config).
    #[arg(short, long)]
    pub label: Option<String>,

    /// Input encoding. Defaults to the file extension, then JSON.
    #[arg(long, value_parser = parse_input_format)]
    pub input_format: Option<InputFormat>,

    /// Exit non-zero when nothing matches.
    #[arg(long)]
    pub fail_on_miss: bool,
}

fn parse_input_format(s: &str) -> Result<InputFormat, String> {
    s.parse().map_err(|err: treepath_core::decode::DecodeError| err.to_string())
}

/// Serialized result of `tp find`.
#[derive(Debug, Serialize)]
pub struct FindReport {
    found: bool,
    depth: usize,
    query: String,
    children_key: String,
    /// Path labels, root first.
    labels: Vec<String>,
    /// Path nodes with their children field removed.
    path: Vec<Value>,
    target: Option<Value>,
}

impl FindReport {
    pub fn new(found: &FoundPath<'_, Value>, matcher: &Matcher, children_key: &str, label: &str) -> Self {
        Self {
            found: found.is_found(),
            depth: found.depth(),
            query: matcher.to_string(),
            children_key: children_key.to_string(),
            labels: found.path().iter().map(|node| node_label(node, label)).collect(),
            path: found
                .path()
                .iter()
                .map(|node| without_children(node, children_key))
                .collect(),
            target: found.target().cloned(),
        }
    }
}

impl Renderable for FindReport {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("find: {}", self.query))?;
        if !self.found {
            return writeln!(w, "no match");
        }
        pretty_kv(w, "depth", self.depth.to_string())?;
        pretty_kv(w, "path", self.labels.join(" > "))?;
        if let Some(target) = self.path.last() {
            pretty_kv(w, "target", target.to_string())?;
        }
        Ok(())
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, self).map_err(io::Error::other)
    }

    fn render_text(&self, w: &mut dyn Write) -> io::Result<()> {
        if self.found {
            writeln!(w, "{}", self.labels.join(" > "))
        } else {
            writeln!(w, "no match")
        }
    }
}

/// Display label for a node: the label field of objects, the value itself
/// for scalars.
fn node_label(node: &Value, label: &str) -> String {
    match node {
        Value::Object(fields) => match fields.get(label) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => format!("<no {label}>"),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn without_children(node: &Value, children_key: &str) -> Value {
    match node {
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .filter(|(key, _)| key.as_str() != children_key)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn read_input(input: Option<&Path>) -> Result<String, TreepathError> {
    match input {
        None => read_stdin(),
        Some(path) if path == Path::new("-") => read_stdin(),
        Some(path) => std::fs::read_to_string(path).map_err(|source| TreepathError::Read {
            source_name: path.display().to_string(),
            source,
        }),
    }
}

fn read_stdin() -> Result<String, TreepathError> {
    io::read_to_string(io::stdin()).map_err(|source| TreepathError::Read {
        source_name: "stdin".to_string(),
        source,
    })
}

/// Execute `tp find`.
pub fn run_find(
    args: &FindArgs,
    config: &TreepathConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let matcher = Matcher::parse_all(&args.clauses).map_err(TreepathError::from)?;

    let options = match &args.children_key {
        Some(key) if key.trim().is_empty() => bail!("--children-key must not be empty"),
        Some(key) => SearchOptions::with_children_key(key.clone()),
        None => config.search.clone(),
    };
    let label = args.label.as_deref().unwrap_or(&config.output.label);

    let format = args
        .input_format
        .or_else(|| args.input.as_deref().and_then(InputFormat::from_path))
        .unwrap_or(InputFormat::Json);
    let text = read_input(args.input.as_deref())?;
    let forest = decode_forest(&text, format).map_err(TreepathError::from)?;
    debug!(%format, children_key = %options.children_key, query = %matcher, "searching forest");

    let found = options.find(&forest, |node| matcher.matches(node));
    debug!(found = found.is_found(), depth = found.depth(), "search finished");

    let report = FindReport::new(&found, &matcher, &options.children_key, label);
    render_item(&report, output)?;

    if args.fail_on_miss && !found.is_found() {
        return Err(TreepathError::NoMatch(matcher.to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::render_item_to;
    use serde_json::json;

    fn report(forest: &Value, clauses: &[&str]) -> FindReport {
        let matcher = Matcher::parse_all(clauses).unwrap();
        let found = SearchOptions::default().find(forest, |n| matcher.matches(n));
        FindReport::new(&found, &matcher, "children", "name")
    }

    fn sample() -> Value {
        json!([{
            "id": 1,
            "name": "root",
            "children": [{ "id": 2, "name": "leaf", "children": [] }]
        }])
    }

    fn rendered(report: &FindReport, mode: OutputMode) -> String {
        let mut buf = Vec::new();
        render_item_to(report, mode, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_output_is_label_chain() {
        let report = report(&sample(), &["id==2"]);
        assert_eq!(rendered(&report, OutputMode::Text), "root > leaf\n");
    }

    #[test]
    fn text_output_on_miss() {
        let report = report(&sample(), &["id==9"]);
        assert_eq!(rendered(&report, OutputMode::Text), "no match\n");
    }

    #[test]
    fn pretty_output_has_sections() {
        let report = report(&sample(), &["id==2"]);
        let text = rendered(&report, OutputMode::Pretty);
        assert!(text.starts_with("find: id==2\n"));
        assert!(text.contains("depth:       2\n"));
        assert!(text.contains("path:        root > leaf\n"));
    }

    #[test]
    fn json_output_strips_children_from_path() {
        let report = report(&sample(), &["id==2"]);
        let value: Value = serde_json::from_str(&rendered(&report, OutputMode::Json)).unwrap();
        assert_eq!(value["found"], true);
        assert_eq!(value["depth"], 2);
        assert_eq!(value["labels"], json!(["root", "leaf"]));
        assert_eq!(value["path"][0], json!({ "id": 1, "name": "root" }));
        assert_eq!(value["target"], json!({ "id": 2, "name": "leaf", "children": [] }));
    }

    #[test]
    fn labels_fall_back_for_scalars_and_missing_fields() {
        assert_eq!(node_label(&json!({ "name": 5 }), "name"), "5");
        assert_eq!(node_label(&json!({ "id": 5 }), "name"), "<no name>");
        assert_eq!(node_label(&json!("plain"), "name"), "plain");
        assert_eq!(node_label(&json!(7), "name"), "7");
    }
}

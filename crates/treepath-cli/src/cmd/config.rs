//! `tp config`: show the effective configuration and where it came from.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use treepath_core::config::{PROJECT_CONFIG_FILE, TreepathConfig, user_config_path};

use crate::output::{OutputMode, Renderable, pretty_kv, pretty_section, render_item};

/// Arguments for `tp config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {}

#[derive(Debug, Serialize)]
struct ConfigReport {
    children_key: String,
    label: String,
    format: Option<String>,
    project_file: Option<String>,
    user_file: Option<String>,
}

impl ConfigReport {
    fn new(config: &TreepathConfig, project_root: &Path) -> Self {
        let existing = |path: &Path| path.exists().then(|| path.display().to_string());
        Self {
            children_key: config.search.children_key.clone(),
            label: config.output.label.clone(),
            format: config
                .output
                .format
                .and_then(|f| serde_json::to_value(f).ok())
                .and_then(|v| v.as_str().map(str::to_string)),
            project_file: existing(&project_root.join(PROJECT_CONFIG_FILE)),
            user_file: user_config_path().as_deref().and_then(existing),
        }
    }
}

impl Renderable for ConfigReport {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, "configuration")?;
        pretty_kv(w, "children", &self.children_key)?;
        pretty_kv(w, "label", &self.label)?;
        pretty_kv(w, "format", self.format.as_deref().unwrap_or("auto"))?;
        pretty_kv(w, "project", self.project_file.as_deref().unwrap_or("-"))?;
        pretty_kv(w, "user", self.user_file.as_deref().unwrap_or("-"))
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *w, self).map_err(io::Error::other)
    }

    fn render_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "search.children_key={}", self.children_key)?;
        writeln!(w, "output.label={}", self.label)?;
        writeln!(w, "output.format={}", self.format.as_deref().unwrap_or("auto"))
    }
}

/// Execute `tp config`.
pub fn run_config(
    _args: &ConfigArgs,
    config: &TreepathConfig,
    project_root: &Path,
    output: OutputMode,
) -> Result<()> {
    render_item(&ConfigReport::new(config, project_root), output)?;
    Ok(())
}

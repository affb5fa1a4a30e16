use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::value::{DEFAULT_CHILDREN_KEY, SearchOptions};

/// Project config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = ".treepath.toml";

/// Output format preference stored in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pretty,
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreepathConfig {
    pub search: SearchOptions,
    pub output: OutputConfig,
}

impl Default for TreepathConfig {
    fn default() -> Self {
        Self {
            search: SearchOptions::default(),
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    /// Field used to label nodes in human output.
    pub label: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            label: default_label(),
        }
    }
}

fn default_label() -> String {
    "id".to_string()
}

/// One config file as written; unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub search: SearchLayer,
    pub output: OutputLayer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchLayer {
    pub children_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputLayer {
    pub format: Option<OutputFormat>,
    pub label: Option<String>,
}

impl ConfigLayer {
    /// Overlay `self` on `base`: fields set here win.
    #[must_use]
    pub fn over(self, base: Self) -> Self {
        Self {
            search: SearchLayer {
                children_key: self.search.children_key.or(base.search.children_key),
            },
            output: OutputLayer {
                format: self.output.format.or(base.output.format),
                label: self.output.label.or(base.output.label),
            },
        }
    }

    /// Fill unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Fails when a configured key or label is blank.
    pub fn resolve(self) -> Result<TreepathConfig> {
        let children_key = self
            .search
            .children_key
            .unwrap_or_else(|| DEFAULT_CHILDREN_KEY.to_string());
        if children_key.trim().is_empty() {
            bail!("search.children_key must not be empty");
        }
        let label = self.output.label.unwrap_or_else(default_label);
        if label.trim().is_empty() {
            bail!("output.label must not be empty");
        }

        Ok(TreepathConfig {
            search: SearchOptions::with_children_key(children_key),
            output: OutputConfig {
                format: self.output.format,
                label,
            },
        })
    }
}

/// Read one layer; a missing file is an empty layer.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_layer(path: &Path) -> Result<ConfigLayer> {
    if !path.exists() {
        return Ok(ConfigLayer::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ConfigLayer>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Location of the per-user config file, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("treepath/config.toml"))
}

/// Merge project config over user config over defaults.
///
/// # Errors
///
/// Fails when either file is unreadable, unparsable or holds blank values.
pub fn load_config_from(project_root: &Path, user_config: Option<&Path>) -> Result<TreepathConfig> {
    let user = match user_config {
        Some(path) => load_layer(path)?,
        None => ConfigLayer::default(),
    };
    let project = load_layer(&project_root.join(PROJECT_CONFIG_FILE))?;
    project.over(user).resolve()
}

/// [`load_config_from`] with the platform user config location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_effective_config(project_root: &Path) -> Result<TreepathConfig> {
    let user_path = user_config_path();
    let config = load_config_from(project_root, user_path.as_deref())?;
    tracing::debug!(
        children_key = %config.search.children_key,
        label = %config.output.label,
        "configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(dir.path(), None).unwrap();
        assert_eq!(config, TreepathConfig::default());
        assert_eq!(config.search.children_key, "children");
        assert_eq!(config.output.label, "id");
        assert!(config.output.format.is_none());
    }

    #[test]
    fn project_overrides_user_field_by_field() {
        let dir = TempDir::new().unwrap();
        let user = dir.path().join("user.toml");
        fs::write(
            &user,
            "[search]\nchildren_key = \"nodes\"\n\n[output]\nformat = \"json\"\nlabel = \"name\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "[search]\nchildren_key = \"items\"\n",
        )
        .unwrap();

        let config = load_config_from(dir.path(), Some(user.as_path())).unwrap();
        assert_eq!(config.search.children_key, "items");
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert_eq!(config.output.label, "name");
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILE), "[search\n").unwrap();
        let err = load_config_from(dir.path(), None).unwrap_err();
        assert!(format!("{err:#}").contains(PROJECT_CONFIG_FILE));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILE), "[search]\nchildrenKey = \"x\"\n").unwrap();
        assert!(load_config_from(dir.path(), None).is_err());
    }

    #[test]
    fn blank_children_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILE), "[search]\nchildren_key = \" \"\n").unwrap();
        let err = load_config_from(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("children_key"));
    }

    #[test]
    fn missing_user_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(dir.path(), Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(config, TreepathConfig::default());
    }
}

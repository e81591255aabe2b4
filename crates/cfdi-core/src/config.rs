//! Optional TOML configuration: project file, then user file, then defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CfdiError, Result};

pub const PROJECT_CONFIG_PATH: &str = ".cfdi/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub invoices: InvoicesConfig,
    #[serde(default)]
    pub open: OpenConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicesConfig {
    #[serde(default = "default_invoices_dir")]
    pub dir: PathBuf,
}

impl Default for InvoicesConfig {
    fn default() -> Self {
        Self {
            dir: default_invoices_dir(),
        }
    }
}

/// Program used to open a source document. The document path is appended
/// after `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenConfig {
    #[serde(default = "default_open_command")]
    pub command: String,
    #[serde(default = "default_open_args")]
    pub args: Vec<String>,
}

impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            command: default_open_command(),
            args: default_open_args(),
        }
    }
}

/// Parse one configuration file, or `None` if it does not exist.
///
/// # Errors
///
/// [`CfdiError::Io`] if the file exists but cannot be read, and
/// [`CfdiError::Config`] if it is not valid TOML for [`Config`].
pub fn load_config_file(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|source| CfdiError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<Config>(&content)
        .map(Some)
        .map_err(|e| CfdiError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// # Errors
///
/// See [`load_config_file`].
pub fn load_project_config(project_root: &Path) -> Result<Option<Config>> {
    load_config_file(&project_root.join(PROJECT_CONFIG_PATH))
}

/// # Errors
///
/// See [`load_config_file`].
pub fn load_user_config() -> Result<Option<Config>> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(None);
    };
    load_config_file(&config_dir.join("cfdi/config.toml"))
}

/// Effective configuration: the project file if present, else the user
/// file, else defaults. Missing keys take their defaults.
///
/// # Errors
///
/// Propagates read and parse failures of whichever file was chosen.
pub fn load_config(project_root: &Path) -> Result<Config> {
    if let Some(config) = load_project_config(project_root)? {
        tracing::debug!(root = %project_root.display(), "using project config");
        return Ok(config);
    }
    if let Some(config) = load_user_config()? {
        tracing::debug!("using user config");
        return Ok(config);
    }
    Ok(Config::default())
}

fn default_invoices_dir() -> PathBuf {
    PathBuf::from("cfdis")
}

fn default_open_command() -> String {
    if cfg!(target_os = "windows") {
        "cmd".to_string()
    } else if cfg!(target_os = "macos") {
        "open".to_string()
    } else {
        "xdg-open".to_string()
    }
}

fn default_open_args() -> Vec<String> {
    if cfg!(target_os = "windows") {
        vec!["/c".to_string(), "start".to_string()]
    } else {
        Vec::new()
    }
}

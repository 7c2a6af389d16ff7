//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treeprint/treeprint.toml`
//! 3. Explicit config file passed on the command line
//! 4. Environment variables: `TREEPRINT_*` prefix, `__` between sections
//!    (e.g. `TREEPRINT_RENDER__INDENT_SIZE=2`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::{TreePrintError, TreePrintResult};
use crate::render::RenderConfig;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "TREEPRINT";

/// Unified configuration for treeprint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Include dot-files when scanning directories
    pub show_hidden: bool,
    /// Maximum directory depth, unlimited if unset
    pub max_depth: Option<usize>,
    /// Show file sizes as node metadata
    pub sizes: bool,
    /// Glyphs and indentation
    pub render: RenderConfig,
}

/// Get the XDG config directory for treeprint.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treeprint").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treeprint.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}` in a path given by the user.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist if given
    pub fn load(config_file: Option<&Path>) -> TreePrintResult<Self> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_layers(global.as_deref(), config_file, ENV_PREFIX)
    }

    /// Load from explicit layers. Missing global file is skipped, a missing
    /// explicit file is an error.
    #[instrument(level = "debug")]
    pub fn load_layers(
        global: Option<&Path>,
        config_file: Option<&Path>,
        env_prefix: &str,
    ) -> TreePrintResult<Self> {
        let mut builder = Config::builder();

        if let Some(global) = global {
            debug!("global config: {}", global.display());
            builder = builder.add_source(
                File::from(global)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(file) = config_file {
            let file = expand_path(file);
            if !file.exists() {
                return Err(TreePrintError::NotFound(file));
            }
            debug!("explicit config: {}", file.display());
            builder = builder.add_source(
                File::from(file.as_path())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> TreePrintResult<String> {
        toml::to_string_pretty(self).map_err(|e| TreePrintError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treeprint configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treeprint/treeprint.toml
#   File:   --config <FILE>
#   Env:    TREEPRINT_* environment variables, e.g. TREEPRINT_RENDER__INDENT_SIZE=2

# Include dot-files
# show_hidden = false

# Limit directory depth
# max_depth = 3

# Show file sizes as [bytes] metadata
# sizes = false

[render]
# Spaces after the vertical link on each level
# indent_size = 3

[render.glyphs]
# link = "│"
# mid = "├─"
# end = "└─"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> TreePrintError {
    TreePrintError::Config {
        message: e.to_string(),
    }
}

use crate::decorate::BetaStrategy;
use crate::domain::{default_beta_prefixes, ModuleScope};
use crate::error::{GitSemverError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Represents the complete configuration for git-semver.
///
/// Everything defaults: an empty (or absent) `gitsemver.toml` yields a
/// working single-module setup on `main` with timestamp betas.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Base branch whose builds count as main-line
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    /// Branch name prefixes rendered as beta builds
    #[serde(default = "default_beta_prefixes")]
    pub beta_prefixes: Vec<String>,

    /// How beta identifiers are generated
    #[serde(default)]
    pub beta_strategy: BetaStrategy,

    /// Remote used for fetch and push
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Monorepo sub-modules, keyed by name
    #[serde(default)]
    pub modules: HashMap<String, ModuleConfig>,
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Per-module configuration.
///
/// The tag suffix defaults to the module's name in the `[modules.<name>]`
/// table; `paths` are the directories whose changes warrant a release.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ModuleConfig {
    #[serde(default)]
    pub tag: Option<String>,

    #[serde(default)]
    pub paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_branch: default_base_branch(),
            beta_prefixes: default_beta_prefixes(),
            beta_strategy: BetaStrategy::default(),
            remote: default_remote(),
            modules: HashMap::new(),
        }
    }
}

impl Config {
    /// Resolve a configured module into a [ModuleScope]
    pub fn module_scope(&self, name: &str) -> Option<ModuleScope> {
        self.modules.get(name).map(|module| {
            ModuleScope::new(
                module.tag.clone().unwrap_or_else(|| name.to_string()),
                module.paths.clone(),
            )
        })
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitsemver.toml` in current directory
/// 3. `.gitsemver.toml` in the user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./gitsemver.toml").exists() {
        fs::read_to_string("./gitsemver.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".gitsemver.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| GitSemverError::config(format!("Cannot parse configuration: {}", e)))
}

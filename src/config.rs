use anyhow::{bail, Context as _, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File looked up in the tree root when no config path is given.
pub const CONFIG_FILE: &str = "moltres.toml";

/// Namespace a descriptor must declare to enter the registry.
pub const DEFAULT_NAMESPACE: &str = "moltres";

/// Shim body when no template is configured.
pub const DEFAULT_SHIM_TEMPLATE: &str = "module.exports = require({{ path | tojson }})";

/// Candidate config locations, most specific first:
/// `MOLTRES_LINK_CONFIG`, `<root>/moltres.toml`, then the user config dir.
pub fn config_candidates(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(p) = std::env::var("MOLTRES_LINK_CONFIG") {
        if !p.is_empty() {
            out.push(PathBuf::from(p));
        }
    }
    out.push(root.join(CONFIG_FILE));
    if let Some(dir) = dirs::config_dir() {
        out.push(dir.join("moltres-link").join("config.toml"));
    }
    out
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Ignore patterns for target manifests. Absent = accept all.
    #[serde(default)]
    pub ignore: Option<Vec<String>>,

    /// Paths left out when the CLI walks a tree (gitignore syntax).
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default)]
    pub path_mode: PathMode,

    /// Generated-modules directory created next to each target.
    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,

    #[serde(default = "default_entry_file")]
    pub entry_file: String,

    #[serde(default)]
    pub shim_template: Option<String>,

    #[serde(default)]
    pub cycles: CyclePolicy,

    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore: None,
            exclude: default_exclude(),
            namespace: default_namespace(),
            layout: Layout::default(),
            path_mode: PathMode::default(),
            modules_dir: default_modules_dir(),
            entry_file: default_entry_file(),
            shim_template: None,
            cycles: CyclePolicy::default(),
            log_filter: None,
        }
    }
}

impl Config {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let cfg: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Explicit path if given (must exist), else the first existing
    /// candidate, else defaults.
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(p) = explicit {
            return Ok((Self::load_from_path(p)?, Some(p.to_path_buf())));
        }
        for p in config_candidates(root) {
            if p.is_file() {
                return Ok((Self::load_from_path(&p)?, Some(p)));
            }
        }
        Ok((Self::default(), None))
    }

    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            bail!("namespace cannot be empty");
        }
        if self.modules_dir.trim().is_empty() {
            bail!("modules_dir cannot be empty");
        }
        if self.entry_file.trim().is_empty() || self.entry_file.contains('/') {
            bail!("entry_file must be a plain file name: '{}'", self.entry_file);
        }
        Ok(())
    }

    pub fn shim_template(&self) -> &str {
        self.shim_template
            .as_deref()
            .unwrap_or(DEFAULT_SHIM_TEMPLATE)
    }
}

fn default_exclude() -> Vec<String> {
    vec![".git".to_string(), "node_modules".to_string()]
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_modules_dir() -> String {
    "node_modules".to_string()
}

fn default_entry_file() -> String {
    "index.js".to_string()
}

/// Where a shim lands below the generated-modules directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `<modules_dir>/@<namespace>/<type>/<name>`
    #[default]
    Namespaced,
    /// `<modules_dir>/<type>/<name>`
    Flat,
}

/// How the emitted file's `path` is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    /// Relative to the dependency's `cwd`.
    #[default]
    Relative,
    /// Absolute.
    Resolved,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Fail the run when a module reaches itself again.
    #[default]
    Reject,
    /// Treat a module already being installed as done.
    Tolerate,
}

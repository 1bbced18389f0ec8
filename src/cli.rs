use clap::Parser;
use moltres_link::{
    config::{Config, Layout, PathMode},
    report::ReportMode,
};

#[derive(Parser, Debug)]
#[command(name = "moltres-link", version, about)]
pub struct Args {
    /// Root of the source tree to scan
    #[arg(default_value = ".")]
    pub root: std::path::PathBuf,

    /// Path to a config file (overrides MOLTRES_LINK_CONFIG and <root>/moltres.toml)
    #[arg(long)]
    pub config: Option<std::path::PathBuf>,

    /// Ignore pattern for target manifests; repeatable, replaces the config list
    #[arg(long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Shim directory layout
    #[arg(long, value_enum)]
    pub layout: Option<Layout>,

    /// How emitted paths are expressed
    #[arg(long, value_enum)]
    pub path_mode: Option<PathMode>,

    /// Resolve and report, but do not write shims
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Print a report after linking
    #[arg(long, value_enum, default_value_t = ReportMode::Off)]
    pub report: ReportMode,

    /// Log filter (RUST_LOG takes precedence)
    #[arg(long)]
    pub log: Option<String>,
}

impl Args {
    /// Command-line flags win over the config file.
    pub fn apply(&self, cfg: &mut Config) {
        if !self.ignore.is_empty() {
            cfg.ignore = Some(self.ignore.clone());
        }
        if let Some(layout) = self.layout {
            cfg.layout = layout;
        }
        if let Some(mode) = self.path_mode {
            cfg.path_mode = mode;
        }
        if self.log.is_some() {
            cfg.log_filter = self.log.clone();
        }
    }
}

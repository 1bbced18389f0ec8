use anyhow::{Context as _, Result};
use minijinja::Environment;
use serde_json::json;
use std::path::PathBuf;
use tracing::debug;

use crate::{
    config::{Config, Layout, PathMode},
    deps::InstalledSet,
    error::LinkError,
    file::{FileStat, SourceFile},
    paths,
    registry::{Module, ModuleKey, Target},
};

/// Where shims go and how their `path` is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModulePathStrategy {
    pub layout: Layout,
    pub path_mode: PathMode,
}

impl ModulePathStrategy {
    /// Generated directory for `key` below `target_dir`.
    pub fn module_dir(&self, target_dir: &str, modules_dir: &str, key: &ModuleKey) -> String {
        let rel = match self.layout {
            Layout::Namespaced => format!(
                "{modules_dir}/@{}/{}/{}",
                key.namespace, key.kind, key.name
            ),
            Layout::Flat => format!("{modules_dir}/{}/{}", key.kind, key.name),
        };
        paths::resolve(target_dir, &rel)
    }

    /// `path` of the emitted file, given the shim's absolute entry point.
    pub fn emitted_path(&self, entry: &str, module_cwd: &str) -> String {
        match self.path_mode {
            PathMode::Relative => paths::relative(module_cwd, entry),
            PathMode::Resolved => entry.to_string(),
        }
    }
}

/// Specifier written into a shim: the installed directory as seen from the
/// shim's directory. Always starts with `.` so it is never looked up as a
/// package name.
pub fn require_path(module_dir: &str, installed_dir: &str) -> String {
    let rel = paths::relative(module_dir, installed_dir);
    if rel.is_empty() {
        ".".to_string()
    } else if rel == ".." || rel.starts_with("../") {
        rel
    } else {
        format!("./{rel}")
    }
}

/// Builds one generated file per installed module of a target.
#[derive(Debug, Clone)]
pub struct ShimEmitter {
    strategy: ModulePathStrategy,
    modules_dir: String,
    entry_file: String,
    template: String,
}

impl ShimEmitter {
    pub fn new(
        strategy: ModulePathStrategy,
        modules_dir: impl Into<String>,
        entry_file: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<Self> {
        let template = template.into();
        check_template(&template)
            .with_context(|| format!("invalid shim template: {template}"))?;

        Ok(Self {
            strategy,
            modules_dir: modules_dir.into(),
            entry_file: entry_file.into(),
            template,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(
            ModulePathStrategy {
                layout: cfg.layout,
                path_mode: cfg.path_mode,
            },
            cfg.modules_dir.clone(),
            cfg.entry_file.clone(),
            cfg.shim_template(),
        )
    }

    pub fn emit_all(
        &self,
        target: &Target,
        installed: &InstalledSet<'_>,
    ) -> Result<Vec<SourceFile>, LinkError> {
        installed
            .iter()
            .map(|(_, module)| self.emit(target, module))
            .collect()
    }

    pub fn emit(&self, target: &Target, module: &Module) -> Result<SourceFile, LinkError> {
        let key = module.key();
        let module_dir = self
            .strategy
            .module_dir(&target.location.dir(), &self.modules_dir, &key);
        let installed_dir = module.location.dir();
        let entry = paths::join(&module_dir, &self.entry_file);

        let spec = require_path(&module_dir, &installed_dir);
        let version = target.dependencies.version(&key.kind, &key.name);
        let ctx = json!({
            "path": spec,
            "namespace": key.namespace,
            "type": key.kind,
            "name": key.name,
            "version": version,
            "target": target.data,
        });
        let text = render_shim(&self.template, &ctx).map_err(|e| {
            LinkError::plugin(Some(PathBuf::from(&module.location.path)), e)
        })?;

        let path = self.strategy.emitted_path(&entry, &module.location.cwd);
        debug!(module = %key, shim = %entry, "shim emitted");

        Ok(SourceFile::new(
            path,
            module.location.cwd.clone(),
            module.location.base.clone(),
        )
        .with_contents(text.into_bytes())
        .with_stat(FileStat::regular_file()))
    }
}

fn shim_environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();

    // JSON string literal, which is also a valid JS string literal.
    env.add_filter("tojson", |s: String| -> Result<String, minijinja::Error> {
        serde_json::to_string(&s).map_err(|e| {
            minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, e.to_string())
        })
    });
    env
}

fn check_template(source: &str) -> Result<()> {
    let mut env = shim_environment();
    env.add_template("shim", source)?;
    Ok(())
}

fn render_shim(source: &str, ctx_json: &serde_json::Value) -> Result<String> {
    let mut env = shim_environment();
    env.add_template("shim", source)?;
    let tpl = env.get_template("shim")?;
    let v = minijinja::value::Value::from_serialize(ctx_json);
    Ok(tpl.render(v)?)
}

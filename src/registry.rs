use std::{collections::BTreeMap, fmt, path::Path};

use anyhow::{Context as _, Result};
use tracing::warn;

use crate::{
    manifest::{DependencyTable, ModuleDescriptor},
    paths,
};

/// Identity of a module: `(namespace, type, name)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleKey {
    pub namespace: String,
    pub kind: String,
    pub name: String,
}

impl ModuleKey {
    pub fn new(namespace: &str, kind: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }

    /// `namespace.type.name`, the registry rendering.
    pub fn prop_path(&self) -> String {
        format!("{}.{}.{}", self.namespace, self.kind, self.name)
    }

    /// `type:name`, as reported in errors.
    pub fn short(&self) -> String {
        format!("{}:{}", self.kind, self.name)
    }
}

/// `namespace:type:name`, the installed-set rendering.
impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.kind, self.name)
    }
}

/// Where a manifest was found, normalized to `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub cwd: String,
    pub base: String,
}

impl Location {
    pub fn from_paths(path: &Path, cwd: &Path, base: &Path) -> Result<Self> {
        let utf8 = |p: &Path| {
            p.to_str()
                .map(|_| paths::unix_style(p))
                .with_context(|| format!("path is not valid UTF-8: {}", p.display()))
        };
        Ok(Self {
            path: utf8(path)?,
            cwd: utf8(cwd)?,
            base: utf8(base)?,
        })
    }

    /// Absolute manifest path; relative paths are taken from `cwd`.
    pub fn absolute(&self) -> String {
        paths::resolve(&self.cwd, &self.path)
    }

    /// Directory holding the manifest.
    pub fn dir(&self) -> String {
        paths::dirname(&self.absolute())
    }
}

#[derive(Debug, Clone)]
pub struct Module {
    pub descriptor: ModuleDescriptor,
    pub location: Location,
}

impl Module {
    pub fn key(&self) -> ModuleKey {
        self.descriptor.key()
    }
}

#[derive(Debug, Clone)]
pub struct Target {
    pub location: Location,
    /// Raw parsed `moltres.json`; shim templates see it as `target`.
    pub data: serde_json::Value,
    pub dependencies: DependencyTable,
}

#[derive(Debug, Default)]
pub struct Registry {
    modules: BTreeMap<ModuleKey, Module>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; a replaced entry is only logged.
    pub fn insert(&mut self, module: Module) {
        let key = module.key();
        if let Some(prev) = self.modules.insert(key.clone(), module) {
            warn!(
                module = %key.prop_path(),
                replaced = %prev.location.path,
                "duplicate module descriptor, keeping the later one"
            );
        }
    }

    pub fn get(&self, key: &ModuleKey) -> Option<&Module> {
        self.modules.get(key)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleKey, &Module)> {
        self.modules.iter()
    }
}

/// Targets keyed by their normalized manifest path, so iteration is sorted by
/// path.
#[derive(Debug, Default)]
pub struct TargetSet {
    targets: BTreeMap<String, Target>,
}

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: Target) {
        self.targets.insert(target.location.path.clone(), target);
    }

    pub fn get(&self, path: &str) -> Option<&Target> {
        self.targets.get(path)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }
}

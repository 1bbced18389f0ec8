//! Dependency closure for a single target.
//!
//! Installation is depth-first in declaration order. A module is marked
//! in-progress *before* its own dependencies are walked and installed after,
//! so a module reached again while still in progress is a cycle, and one
//! reached again after completion (a diamond) is a no-op.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    config::CyclePolicy,
    error::LinkError,
    manifest::DependencyTable,
    registry::{Module, ModuleKey, Registry, Target},
};

/// Modules needed by one target, keyed by identity. Iterates in key order.
#[derive(Debug, Default)]
pub struct InstalledSet<'a> {
    modules: BTreeMap<ModuleKey, &'a Module>,
}

impl<'a> InstalledSet<'a> {
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModuleKey, &'a Module)> + '_ {
        self.modules.iter().map(|(k, m)| (k, *m))
    }

    /// `namespace:type:name` of every installed module.
    pub fn keys(&self) -> Vec<String> {
        self.modules.keys().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InstallState {
    InProgress,
    Installed,
}

#[derive(Default)]
struct Walk<'a> {
    state: BTreeMap<ModuleKey, InstallState>,
    stack: Vec<ModuleKey>,
    installed: InstalledSet<'a>,
}

pub struct Resolver<'a> {
    registry: &'a Registry,
    namespace: &'a str,
    cycles: CyclePolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry, namespace: &'a str) -> Self {
        Self {
            registry,
            namespace,
            cycles: CyclePolicy::default(),
        }
    }

    pub fn with_cycle_policy(mut self, cycles: CyclePolicy) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn resolve(&self, target: &Target) -> Result<InstalledSet<'a>, LinkError> {
        let mut walk = Walk::default();
        self.install_all(&target.dependencies, &mut walk)?;

        debug!(
            target = %target.location.path,
            modules = walk.installed.len(),
            "dependency closure resolved"
        );
        Ok(walk.installed)
    }

    fn install_all(&self, deps: &DependencyTable, walk: &mut Walk<'a>) -> Result<(), LinkError> {
        for (kind, name, _) in deps.installable() {
            self.install(ModuleKey::new(self.namespace, kind, name), walk)?;
        }
        Ok(())
    }

    fn install(&self, key: ModuleKey, walk: &mut Walk<'a>) -> Result<(), LinkError> {
        match walk.state.get(&key) {
            Some(InstallState::Installed) => return Ok(()),
            Some(InstallState::InProgress) => {
                return match self.cycles {
                    CyclePolicy::Tolerate => Ok(()),
                    CyclePolicy::Reject => Err(LinkError::cyclic(cycle_chain(&walk.stack, &key))),
                };
            }
            None => {}
        }

        let module = self
            .registry
            .get(&key)
            .ok_or_else(|| LinkError::module_not_found(&key.kind, &key.name))?;

        walk.state.insert(key.clone(), InstallState::InProgress);
        walk.installed.modules.insert(key.clone(), module);
        walk.stack.push(key.clone());

        self.install_all(&module.descriptor.dependencies, walk)?;

        walk.stack.pop();
        walk.state.insert(key, InstallState::Installed);
        Ok(())
    }
}

fn cycle_chain(stack: &[ModuleKey], again: &ModuleKey) -> Vec<String> {
    let start = stack.iter().position(|k| k == again).unwrap_or(0);
    stack[start..]
        .iter()
        .chain(std::iter::once(again))
        .map(ModuleKey::short)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        manifest::ModuleDescriptor,
        registry::Location,
    };
    use std::collections::BTreeMap;

    fn table(entries: &[(&str, &str)]) -> DependencyTable {
        let mut t: BTreeMap<String, BTreeMap<String, serde_json::Value>> = BTreeMap::new();
        for (kind, name) in entries {
            t.entry(kind.to_string())
                .or_default()
                .insert(name.to_string(), serde_json::json!("1.0.0"));
        }
        DependencyTable(t)
    }

    fn add(reg: &mut Registry, name: &str, deps: &[(&str, &str)]) {
        reg.insert(Module {
            descriptor: ModuleDescriptor {
                namespace: "moltres".into(),
                kind: "plugin".into(),
                name: name.into(),
                dependencies: table(deps),
            },
            location: Location {
                path: format!("/p/mods/{name}/{name}.json"),
                cwd: "/p".into(),
                base: "/p".into(),
            },
        });
    }

    fn target(deps: &[(&str, &str)]) -> Target {
        Target {
            location: Location {
                path: "/p/app/moltres.json".into(),
                cwd: "/p".into(),
                base: "/p".into(),
            },
            data: serde_json::json!({}),
            dependencies: table(deps),
        }
    }

    #[test]
    fn empty_target_installs_nothing() {
        let reg = Registry::new();
        let set = Resolver::new(&reg, "moltres").resolve(&target(&[])).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn diamond_installs_shared_module_once() {
        let mut reg = Registry::new();
        add(&mut reg, "a", &[("plugin", "b"), ("plugin", "c")]);
        add(&mut reg, "b", &[("plugin", "d")]);
        add(&mut reg, "c", &[("plugin", "d")]);
        add(&mut reg, "d", &[]);

        let set = Resolver::new(&reg, "moltres")
            .resolve(&target(&[("plugin", "a")]))
            .unwrap();
        assert_eq!(
            set.keys(),
            vec![
                "moltres:plugin:a",
                "moltres:plugin:b",
                "moltres:plugin:c",
                "moltres:plugin:d"
            ]
        );
    }

    #[test]
    fn missing_module_names_type_and_name() {
        let mut reg = Registry::new();
        add(&mut reg, "a", &[("plugin", "ghost")]);

        let err = Resolver::new(&reg, "moltres")
            .resolve(&target(&[("plugin", "a")]))
            .unwrap_err();
        match err {
            LinkError::ModuleNotFound { kind, name, .. } => {
                assert_eq!(kind, "plugin");
                assert_eq!(name, "ghost");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn npm_dependencies_are_skipped() {
        let reg = Registry::new();
        let set = Resolver::new(&reg, "moltres")
            .resolve(&target(&[("npm", "left-pad")]))
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn indirect_cycle_is_reported() {
        let mut reg = Registry::new();
        add(&mut reg, "a", &[("plugin", "b")]);
        add(&mut reg, "b", &[("plugin", "c")]);
        add(&mut reg, "c", &[("plugin", "a")]);

        let err = Resolver::new(&reg, "moltres")
            .resolve(&target(&[("plugin", "a")]))
            .unwrap_err();
        match err {
            LinkError::CyclicDependency { chain, .. } => {
                assert_eq!(chain, vec!["plugin:a", "plugin:b", "plugin:c", "plugin:a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tolerated_cycle_still_installs_each_module_once() {
        let mut reg = Registry::new();
        add(&mut reg, "a", &[("plugin", "b")]);
        add(&mut reg, "b", &[("plugin", "a")]);

        let set = Resolver::new(&reg, "moltres")
            .with_cycle_policy(CyclePolicy::Tolerate)
            .resolve(&target(&[("plugin", "a")]))
            .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut reg = Registry::new();
        add(&mut reg, "a", &[("plugin", "a")]);

        let err = Resolver::new(&reg, "moltres")
            .resolve(&target(&[("plugin", "a")]))
            .unwrap_err();
        assert!(matches!(err, LinkError::CyclicDependency { .. }));
    }
}

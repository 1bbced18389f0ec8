//! Manifest parsing.
//!
//! A `.json` file is read in two steps: first as arbitrary JSON, then
//! validated against the descriptor or target schema. Either step may reject
//! the file; the scanner decides whether that is worth a warning.

use std::collections::BTreeMap;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::registry::ModuleKey;

/// File name that marks a build target.
pub const TARGET_MANIFEST: &str = "moltres.json";

/// Dependency kind that is left to npm and never installed here.
pub const NPM_KIND: &str = "npm";

#[derive(Debug, Error)]
pub enum Rejection {
    #[error("not valid JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    #[error("does not match the manifest schema: {0}")]
    Schema(serde_json::Error),
}

/// kind -> (module name -> version). Versions are opaque and kept verbatim.
///
/// The npm section belongs to npm: it is dropped while parsing, whatever its
/// shape, so it can never make a manifest invalid. A `null` table is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyTable(pub BTreeMap<String, BTreeMap<String, Value>>);

impl<'de> Deserialize<'de> for DependencyTable {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = Option::<BTreeMap<String, Value>>::deserialize(de)?.unwrap_or_default();

        let mut table = BTreeMap::new();
        for (kind, set) in raw {
            if kind == NPM_KIND {
                continue;
            }
            let set = BTreeMap::<String, Value>::deserialize(set)
                .map_err(|e| D::Error::custom(format!("dependencies.{kind}: {e}")))?;
            table.insert(kind, set);
        }
        Ok(Self(table))
    }
}

impl DependencyTable {
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|set| set.is_empty())
    }

    /// `(kind, name, version)` for every entry this linker installs, i.e.
    /// everything outside the npm kind.
    pub fn installable(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.0
            .iter()
            .filter(|(kind, _)| kind.as_str() != NPM_KIND)
            .flat_map(|(kind, set)| {
                set.iter()
                    .map(move |(name, version)| (kind.as_str(), name.as_str(), version))
            })
    }

    /// Version a manifest lists for `kind:name`, if any.
    pub fn version(&self, kind: &str, name: &str) -> Option<&Value> {
        self.0.get(kind).and_then(|set| set.get(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub namespace: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub name: String,

    #[serde(default)]
    pub dependencies: DependencyTable,
}

impl ModuleDescriptor {
    pub fn key(&self) -> ModuleKey {
        ModuleKey::new(&self.namespace, &self.kind, &self.name)
    }

    pub fn from_value(value: &Value) -> Result<Self, Rejection> {
        Self::deserialize(value).map_err(Rejection::Schema)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TargetManifest {
    #[serde(default)]
    pub dependencies: DependencyTable,
}

impl TargetManifest {
    pub fn from_value(value: &Value) -> Result<Self, Rejection> {
        Self::deserialize(value).map_err(Rejection::Schema)
    }
}

pub fn parse_json(bytes: &[u8]) -> Result<Value, Rejection> {
    Ok(serde_json::from_slice(bytes)?)
}

/// The `namespace` a JSON object claims, if it is a string.
pub fn declared_namespace(value: &Value) -> Option<&str> {
    value.get("namespace").and_then(Value::as_str)
}

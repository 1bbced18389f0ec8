use anyhow::Result;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::LinkError,
    file::SourceFile,
    ignore::IgnoreFilter,
    manifest::{self, ModuleDescriptor, Rejection, TargetManifest, TARGET_MANIFEST},
    paths,
    registry::{Location, Module, Registry, Target, TargetSet},
};

/// Counters collected while scanning, for the run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub files: usize,
    pub json_files: usize,
    pub targets: usize,
    pub ignored_targets: usize,
    pub modules: usize,
    /// JSON that parsed but is not a module of our namespace.
    pub foreign_json: usize,
    /// JSON that failed to parse or failed schema validation.
    pub rejected: usize,
}

/// First pipeline stage: classifies `.json` items and fills the registry and
/// target set. Owns both tables for the length of one run.
#[derive(Debug)]
pub struct Scanner {
    namespace: String,
    ignore: IgnoreFilter,
    registry: Registry,
    targets: TargetSet,
    stats: ScanStats,
}

impl Scanner {
    pub fn new(namespace: impl Into<String>, ignore: IgnoreFilter) -> Self {
        Self {
            namespace: namespace.into(),
            ignore,
            registry: Registry::new(),
            targets: TargetSet::new(),
            stats: ScanStats::default(),
        }
    }

    /// Scan one item and hand it back for the output stream. Only streamed
    /// content and unexpected failures are errors; a JSON file that does not
    /// look like a manifest just passes through.
    pub fn scan(&mut self, mut file: SourceFile) -> Result<SourceFile, LinkError> {
        self.stats.files += 1;

        if file.is_null() || file.moltres.is_some() {
            return Ok(file);
        }

        if file.is_stream() {
            return Err(LinkError::streaming_unsupported());
        }

        if file.extension().as_deref() == Some(".json") {
            self.scan_json(&mut file)
                .map_err(|e| LinkError::plugin(Some(file.path.clone()), e))?;
        }

        Ok(file)
    }

    fn scan_json(&mut self, file: &mut SourceFile) -> Result<()> {
        self.stats.json_files += 1;

        let Some(bytes) = file.bytes() else {
            return Ok(());
        };
        let is_target = file.file_name() == Some(TARGET_MANIFEST);

        let value = match manifest::parse_json(bytes) {
            Ok(v) => v,
            Err(r) => {
                self.reject(file, is_target, &r);
                return Ok(());
            }
        };

        let location = Location::from_paths(&file.path, &file.cwd, &file.base)?;

        if is_target {
            self.record_target(file, location, value);
        } else {
            self.record_module(file, location, &value);
        }
        Ok(())
    }

    fn record_target(&mut self, file: &SourceFile, location: Location, data: Value) {
        let rel = paths::unix_style(file.relative());
        if self.ignore.is_ignored(&rel, false) {
            debug!(path = %location.path, "target ignored");
            self.stats.ignored_targets += 1;
            return;
        }

        let manifest = match TargetManifest::from_value(&data) {
            Ok(m) => m,
            Err(r) => {
                self.reject(file, true, &r);
                return;
            }
        };

        debug!(path = %location.path, "target recorded");
        self.stats.targets += 1;
        self.targets.insert(Target {
            location,
            data,
            dependencies: manifest.dependencies,
        });
    }

    fn record_module(&mut self, file: &mut SourceFile, location: Location, data: &Value) {
        if manifest::declared_namespace(data) != Some(self.namespace.as_str()) {
            self.stats.foreign_json += 1;
            return;
        }

        let descriptor = match ModuleDescriptor::from_value(data) {
            Ok(d) => d,
            Err(r) => {
                self.reject(file, false, &r);
                return;
            }
        };

        debug!(
            module = %descriptor.key().prop_path(),
            path = %location.path,
            "module recorded"
        );
        self.stats.modules += 1;
        file.moltres = Some(location.clone());
        self.registry.insert(Module {
            descriptor,
            location,
        });
    }

    fn reject(&mut self, file: &SourceFile, is_target: bool, why: &Rejection) {
        self.stats.rejected += 1;
        if is_target {
            warn!(path = %file.path.display(), "skipping target manifest: {why}");
        } else {
            debug!(path = %file.path.display(), "not a manifest: {why}");
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn into_parts(self) -> (Registry, TargetSet, ScanStats) {
        (self.registry, self.targets, self.stats)
    }
}

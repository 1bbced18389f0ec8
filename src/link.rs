use anyhow::Result;
use tracing::info;

use crate::{
    config::{Config, CyclePolicy},
    deps::Resolver,
    error::LinkError,
    file::SourceFile,
    ignore::IgnoreFilter,
    report::{LinkReport, TargetReport},
    scan::Scanner,
    shim::ShimEmitter,
};

/// What the resolver phase produced.
#[derive(Debug)]
pub struct Flushed {
    pub shims: Vec<SourceFile>,
    pub report: LinkReport,
}

/// Everything that came out of a full run: inputs first, shims after.
#[derive(Debug)]
pub struct LinkOutput {
    pub files: Vec<SourceFile>,
    pub report: LinkReport,
}

impl LinkOutput {
    /// The generated part of `files`.
    pub fn shims(&self) -> &[SourceFile] {
        &self.files[self.files.len() - self.report.shims..]
    }
}

/// One linker run. Items go through [`Linker::transform`] one at a time;
/// [`Linker::flush`] consumes the linker, so resolution can only start once
/// scanning is over.
#[derive(Debug)]
pub struct Linker {
    scanner: Scanner,
    emitter: ShimEmitter,
    namespace: String,
    cycles: CyclePolicy,
}

impl Linker {
    pub fn new(cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        let ignore = IgnoreFilter::new(cfg.ignore.as_deref())?;
        Ok(Self {
            scanner: Scanner::new(cfg.namespace.clone(), ignore),
            emitter: ShimEmitter::from_config(cfg)?,
            namespace: cfg.namespace.clone(),
            cycles: cfg.cycles,
        })
    }

    pub fn transform(&mut self, file: SourceFile) -> Result<SourceFile, LinkError> {
        self.scanner.scan(file)
    }

    /// Resolve every recorded target and emit its shims. The first failure in
    /// any target aborts the whole run.
    pub fn flush(self) -> Result<Flushed, LinkError> {
        let (registry, targets, scan) = self.scanner.into_parts();
        let resolver = Resolver::new(&registry, &self.namespace).with_cycle_policy(self.cycles);

        let mut shims = Vec::new();
        let mut reports = Vec::with_capacity(targets.len());

        for target in targets.iter() {
            let installed = resolver.resolve(target)?;
            let emitted = self.emitter.emit_all(target, &installed)?;

            info!(
                target = %target.location.path,
                shims = emitted.len(),
                "target linked"
            );
            reports.push(TargetReport {
                path: target.location.path.clone(),
                modules: installed.keys(),
            });
            shims.extend(emitted);
        }

        let report = LinkReport {
            scan,
            registry: registry.iter().map(|(k, _)| k.prop_path()).collect(),
            shims: shims.len(),
            targets: reports,
        };
        Ok(Flushed { shims, report })
    }

    pub fn run<I>(mut self, files: I) -> Result<LinkOutput, LinkError>
    where
        I: IntoIterator<Item = SourceFile>,
    {
        let mut out = Vec::new();
        for file in files {
            out.push(self.transform(file)?);
        }

        let Flushed { shims, report } = self.flush()?;
        out.extend(shims);
        Ok(LinkOutput { files: out, report })
    }
}

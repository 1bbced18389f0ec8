pub mod config;
pub mod deps;
pub mod error;
pub mod file;
pub mod ignore;
pub mod link;
pub mod logging;
pub mod manifest;
pub mod paths;
pub mod registry;
pub mod report;
pub mod scan;
pub mod shim;
pub mod tree;

pub use config::{Config, CyclePolicy, Layout, PathMode};
pub use deps::{InstalledSet, Resolver};
pub use error::{LinkError, PLUGIN_NAME};
pub use file::{Contents, FileStat, SourceFile};
pub use link::{Flushed, LinkOutput, Linker};
pub use registry::{Location, Module, ModuleKey, Registry, Target, TargetSet};
pub use report::{build_report, LinkReport, ReportMode};
pub use scan::{ScanStats, Scanner};
pub use shim::{ModulePathStrategy, ShimEmitter};

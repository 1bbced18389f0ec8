use crate::scan::ScanStats;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportMode {
    #[default]
    Off,
    Summary,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub path: String,
    /// `namespace:type:name` of every installed module.
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub scan: ScanStats,
    /// `namespace.type.name` of every registered module.
    pub registry: Vec<String>,
    pub targets: Vec<TargetReport>,
    pub shims: usize,
}

pub fn build_report(report: &LinkReport, mode: ReportMode) -> String {
    match mode {
        ReportMode::Off => String::new(),
        ReportMode::Summary => summary(report),
        ReportMode::Full => full(report),
    }
}

fn summary(r: &LinkReport) -> String {
    let mut out = String::new();

    out.push_str("moltres-link report (summary)\n");
    out.push_str("=============================\n");
    out.push_str(&format!(
        "files: {} (json={}, rejected={}, foreign={})\n",
        r.scan.files, r.scan.json_files, r.scan.rejected, r.scan.foreign_json
    ));
    out.push_str(&format!("modules: {}\n", r.scan.modules));
    out.push_str(&format!(
        "targets: {} (ignored={})\n",
        r.scan.targets, r.scan.ignored_targets
    ));
    for t in &r.targets {
        out.push_str(&format!("  - {} ({} modules)\n", t.path, t.modules.len()));
    }
    out.push_str(&format!("shims: {}\n", r.shims));

    out
}

fn full(r: &LinkReport) -> String {
    let mut out = summary(r);

    out.push_str("\nregistry\n");
    for key in &r.registry {
        out.push_str(&format!("  {key}\n"));
    }

    out.push_str("\ntargets\n");
    for t in &r.targets {
        out.push_str(&format!("  {}\n", t.path));
        for m in &t.modules {
            out.push_str(&format!("    - {m}\n"));
        }
    }

    out
}

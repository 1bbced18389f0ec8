mod cli;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;

use moltres_link::{
    build_report, ignore::IgnoreFilter, logging::init_logging, tree, Config, Linker,
};

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let (mut cfg, cfg_path) = Config::discover(args.config.as_deref(), &args.root)?;
    args.apply(&mut cfg);
    init_logging(cfg.log_filter.as_deref());

    if let Some(p) = cfg_path.as_ref() {
        info!(config = %p.display(), "config loaded");
    }

    let cwd = std::env::current_dir().context("could not determine current directory")?;
    let exclude = IgnoreFilter::new(Some(cfg.exclude.as_slice()))?;
    let files = tree::load_tree(&args.root, &cwd, &exclude)?;

    let linker = Linker::new(&cfg)?;
    let output = linker.run(files)?;

    let written = tree::write_outputs(output.shims(), args.dry_run)?;
    info!(
        targets = output.report.targets.len(),
        shims = output.report.shims,
        written,
        dry_run = args.dry_run,
        "link complete"
    );

    let report = build_report(&output.report, args.report);
    if !report.is_empty() {
        print!("{report}");
    }
    Ok(())
}

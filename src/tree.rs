//! Filesystem glue for the CLI: turns a directory tree into pipeline items and
//! writes generated shims back out.

use anyhow::{Context as _, Result};
use std::{fs, path::Path};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{
    file::{Contents, SourceFile},
    ignore::IgnoreFilter,
    paths,
};

/// Every entry below `root` in sorted order, as items with `base = root`.
/// Entries hit by `exclude` (matched relative to `root`) are left out, and
/// excluded directories are not descended into.
pub fn load_tree(root: &Path, cwd: &Path, exclude: &IgnoreFilter) -> Result<Vec<SourceFile>> {
    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        cwd.join(root)
    };
    if !root.is_dir() {
        anyhow::bail!("not a directory: {}", root.display());
    }

    let walker = WalkDir::new(&root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let rel = entry.path().strip_prefix(&root).unwrap_or(entry.path());
            !exclude.is_ignored(&paths::unix_style(rel), entry.file_type().is_dir())
        });

    let mut out = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        let path = entry.path();

        let mut file = SourceFile::new(path, cwd, &root);
        if entry.file_type().is_file() {
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            file.contents = Contents::Buffer(bytes);
        }
        out.push(file);
    }

    debug!(root = %root.display(), files = out.len(), "tree loaded");
    Ok(out)
}

/// Write `files` to their absolute paths. Files whose current content is
/// already identical are left alone. Returns how many were written.
pub fn write_outputs(files: &[SourceFile], dry_run: bool) -> Result<usize> {
    let mut written = 0;

    for file in files {
        let Some(bytes) = file.bytes() else {
            continue;
        };
        let dest = file.absolute_path();

        if fs::read(&dest).ok().as_deref() == Some(bytes) {
            debug!(path = %dest.display(), "unchanged");
            continue;
        }

        if dry_run {
            info!(path = %dest.display(), "would write");
            written += 1;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&dest, bytes).with_context(|| format!("failed to write {}", dest.display()))?;
        debug!(path = %dest.display(), "written");
        written += 1;
    }

    Ok(written)
}

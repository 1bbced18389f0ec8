//! End-to-end tests: walk a real directory, link it, write the shims

use moltres_link::{ignore::IgnoreFilter, tree, Config, Linker};
use std::{fs, path::Path};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let p = root.join(rel);
    fs::create_dir_all(p.parent().unwrap()).unwrap();
    fs::write(p, body).unwrap();
}

fn project(root: &Path) {
    write(
        root,
        "apps/site/moltres.json",
        r#"{"dependencies":{"plugin":{"auth":"^2.0.0"},"npm":{"lodash":"4"}}}"#,
    );
    write(
        root,
        "modules/auth/auth.json",
        r#"{"namespace":"moltres","type":"plugin","name":"auth","dependencies":{"service":{"session":"1"}}}"#,
    );
    write(root, "modules/auth/index.js", "module.exports = {}");
    write(
        root,
        "modules/session/session.json",
        r#"{"namespace":"moltres","type":"service","name":"session"}"#,
    );
    write(root, "package.json", r#"{"name":"demo"}"#);
}

fn link(root: &Path) -> usize {
    let cfg = Config::default();
    let exclude = IgnoreFilter::new(Some(cfg.exclude.as_slice())).unwrap();
    let files = tree::load_tree(root, root, &exclude).unwrap();
    let out = Linker::new(&cfg).unwrap().run(files).unwrap();
    tree::write_outputs(out.shims(), false).unwrap()
}

#[test]
fn test_links_a_tree_on_disk() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    project(root);

    assert_eq!(link(root), 2);

    let auth = root.join("apps/site/node_modules/@moltres/plugin/auth/index.js");
    let session = root.join("apps/site/node_modules/@moltres/service/session/index.js");
    assert_eq!(
        fs::read_to_string(&auth).unwrap(),
        r#"module.exports = require("../../../../../../modules/auth")"#
    );
    assert!(session.exists());
    assert!(!root.join("apps/site/node_modules/@moltres/npm").exists());
}

#[test]
fn test_second_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    project(root);

    assert_eq!(link(root), 2);
    assert_eq!(link(root), 0);
}

#[test]
fn test_excluded_directories_are_not_scanned() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, ".git/moltres.json", r#"{"dependencies":{"plugin":{"ghost":"1"}}}"#);
    write(root, "app/moltres.json", "{}");

    let exclude = IgnoreFilter::new(Some(&[".git".to_string()][..])).unwrap();
    let files = tree::load_tree(root, root, &exclude).unwrap();
    assert!(files.iter().all(|f| !f.path.starts_with(root.join(".git"))));

    let out = Linker::new(&Config::default()).unwrap().run(files).unwrap();
    assert!(out.shims().is_empty());
}

#[test]
fn test_default_exclude_skips_node_modules() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    project(root);
    write(
        root,
        "node_modules/stale/moltres.json",
        r#"{"dependencies":{"plugin":{"ghost":"1"}}}"#,
    );

    assert_eq!(link(root), 2);
}

#[test]
fn test_excluded_directory_wins_over_reinclude() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "vendor/keep/moltres.json", "{}");
    write(root, "vendor/other.txt", "x");
    write(root, "app/moltres.json", "{}");

    let pats = vec!["vendor".to_string(), "!vendor/keep".to_string()];
    let exclude = IgnoreFilter::new(Some(pats.as_slice())).unwrap();
    let files = tree::load_tree(root, root, &exclude).unwrap();

    let rel: Vec<_> = files
        .iter()
        .map(|f| f.path.strip_prefix(root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        rel,
        vec![
            Path::new("app").to_path_buf(),
            Path::new("app/moltres.json").to_path_buf()
        ]
    );
}

#[test]
fn test_dry_run_leaves_disk_untouched() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    project(root);

    let cfg = Config::default();
    let files = tree::load_tree(root, root, &IgnoreFilter::default()).unwrap();
    let out = Linker::new(&cfg).unwrap().run(files).unwrap();

    assert_eq!(tree::write_outputs(out.shims(), true).unwrap(), 2);
    assert!(!root.join("apps/site/node_modules").exists());
}

#[test]
fn test_load_tree_rejects_missing_root() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");
    assert!(tree::load_tree(&missing, temp.path(), &IgnoreFilter::default()).is_err());
}

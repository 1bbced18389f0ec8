//! Forward-slash path arithmetic.
//!
//! Every location the linker records is converted to `/`-separated form at
//! record time, so module paths, shim paths and the relative path written into
//! a shim come out the same on every platform. These helpers never touch the
//! filesystem.

use std::path::{Path, MAIN_SEPARATOR};

/// Render a platform path with `/` separators.
pub fn unix_style(path: &Path) -> String {
    let s = path.to_string_lossy();
    if MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.split(MAIN_SEPARATOR).collect::<Vec<_>>().join("/")
    }
}

/// `/x/...` or a drive-prefixed `C:/...`.
pub fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let b = path.as_bytes();
    b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && b[2] == b'/'
}

fn split_root(path: &str) -> (&str, &str) {
    if path.starts_with('/') {
        ("/", &path[1..])
    } else if is_absolute(path) {
        (&path[..3], &path[3..])
    } else {
        ("", path)
    }
}

/// Collapse `.`/`..` segments and duplicate separators.
pub fn normalize(path: &str) -> String {
    let (root, rest) = split_root(path);
    let mut parts: Vec<&str> = Vec::new();

    for seg in rest.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(p) if *p != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }

    let body = parts.join("/");
    match (root.is_empty(), body.is_empty()) {
        (true, true) => ".".to_string(),
        (true, false) => body,
        (false, _) => format!("{root}{body}"),
    }
}

pub fn join(base: &str, rel: &str) -> String {
    if base.is_empty() {
        return normalize(rel);
    }
    normalize(&format!("{base}/{rel}"))
}

/// Resolve `rel` against `base`; an absolute `rel` wins outright.
pub fn resolve(base: &str, rel: &str) -> String {
    if is_absolute(rel) {
        normalize(rel)
    } else {
        join(base, rel)
    }
}

pub fn dirname(path: &str) -> String {
    let norm = normalize(path);
    let (root, rest) = split_root(&norm);
    match rest.rfind('/') {
        Some(idx) => format!("{root}{}", &rest[..idx]),
        None if !root.is_empty() => root.to_string(),
        None => ".".to_string(),
    }
}

/// Path from `from` to `to`, both taken as directories. Identical inputs give
/// an empty string; when no relative path exists `to` comes back as is.
pub fn relative(from: &str, to: &str) -> String {
    let from = normalize(from);
    let to = normalize(to);
    match pathdiff::diff_paths(Path::new(&to), Path::new(&from)) {
        Some(rel) => unix_style(&rel),
        None => to,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_dots() {
        assert_eq!(normalize("/a/./b/../c/"), "/a/c");
        assert_eq!(normalize("a//b/.."), "a");
        assert_eq!(normalize("../a/../../b"), "../../b");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(normalize(""), ".");
        assert_eq!(normalize("C:/x/../y"), "C:/y");
    }

    #[test]
    fn dirname_of_files() {
        assert_eq!(dirname("/p/app/moltres.json"), "/p/app");
        assert_eq!(dirname("/moltres.json"), "/");
        assert_eq!(dirname("moltres.json"), ".");
    }

    #[test]
    fn resolve_prefers_absolute() {
        assert_eq!(resolve("/p/app", "node_modules/x"), "/p/app/node_modules/x");
        assert_eq!(resolve("/p/app", "/abs/y"), "/abs/y");
    }

    #[test]
    fn relative_walks_up_then_down() {
        assert_eq!(
            relative("/p/app/node_modules/@moltres/plugin/foo", "/p/mods/foo"),
            "../../../../../mods/foo"
        );
        assert_eq!(relative("/p/a", "/p/a/b/c"), "b/c");
        assert_eq!(relative("/p/a", "/p/a"), "");
        assert_eq!(relative("/", "/x"), "x");
        assert_eq!(relative("/p/./a/../b", "/p/c"), "../c");
    }

    #[test]
    fn relative_round_trips_through_resolve() {
        let from = "/work/site/node_modules/plugin/bar";
        let to = "/work/libs/bar/src";
        assert_eq!(resolve(from, &relative(from, to)), to);
    }
}

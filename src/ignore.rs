use anyhow::{Context as _, Result};
use ::ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Filter applied to `moltres.json` paths before they become targets, and to
/// the tree walk.
///
/// Patterns are gitignore lines. As in git, once a directory is excluded
/// nothing below it can be re-included with `!`.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    matcher: Gitignore,
}

impl Default for IgnoreFilter {
    fn default() -> Self {
        Self {
            matcher: Gitignore::empty(),
        }
    }
}

impl IgnoreFilter {
    /// `None` means no filter was configured. Either way an empty rule set
    /// accepts every path.
    pub fn new(patterns: Option<&[String]>) -> Result<Self> {
        let Some(patterns) = patterns else {
            return Ok(Self::default());
        };

        let mut builder = GitignoreBuilder::new("");
        for p in patterns {
            builder
                .add_line(None, p)
                .with_context(|| format!("invalid ignore pattern: {p}"))?;
        }
        let matcher = builder.build().context("failed to build ignore filter")?;

        Ok(Self { matcher })
    }

    /// `rel_path` is `/`-separated and relative to the walk or scan base.
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        let path = Path::new(rel_path.trim_start_matches('/'));
        if path.as_os_str().is_empty() || self.matcher.is_empty() {
            return false;
        }

        // Outermost directory first: an excluded parent wins over any later
        // re-include of something inside it.
        let mut parents: Vec<&Path> = path
            .ancestors()
            .skip(1)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        parents.reverse();

        parents
            .into_iter()
            .any(|dir| self.matcher.matched(dir, true).is_ignore())
            || self.matcher.matched(path, is_dir).is_ignore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(patterns: &[&str]) -> IgnoreFilter {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        IgnoreFilter::new(Some(owned.as_slice())).unwrap()
    }

    #[test]
    fn absent_and_empty_both_accept_everything() {
        let absent = IgnoreFilter::new(None).unwrap();
        let empty = filter(&[]);
        assert!(!absent.is_ignored("a/moltres.json", false));
        assert!(!empty.is_ignored("a/moltres.json", false));
    }

    #[test]
    fn bare_name_matches_any_directory_level() {
        let f = filter(&["fixtures"]);
        assert!(f.is_ignored("test/fixtures/app/moltres.json", false));
        assert!(!f.is_ignored("src/app/moltres.json", false));
    }

    #[test]
    fn slash_patterns_are_anchored() {
        let f = filter(&["/src/legacy", "apps/*/moltres.json"]);
        assert!(f.is_ignored("src/legacy/moltres.json", false));
        assert!(!f.is_ignored("lib/src/legacy/moltres.json", false));
        assert!(f.is_ignored("apps/web/moltres.json", false));
        assert!(!f.is_ignored("apps/web/nested/moltres.json", false));
    }

    #[test]
    fn trailing_slash_only_matches_directories() {
        let f = filter(&["moltres.json/", "build/"]);
        assert!(!f.is_ignored("app/moltres.json", false));
        assert!(f.is_ignored("build", true));
        assert!(f.is_ignored("build/app/moltres.json", false));
    }

    #[test]
    fn negation_reincludes_and_last_rule_wins() {
        let f = filter(&["**/moltres.json", "!keep/moltres.json"]);
        assert!(f.is_ignored("drop/moltres.json", false));
        assert!(!f.is_ignored("keep/moltres.json", false));
    }

    #[test]
    fn excluded_parent_cannot_be_reincluded() {
        let f = filter(&["fixtures", "!fixtures/keep"]);
        assert!(f.is_ignored("fixtures/keep/moltres.json", false));
        assert!(f.is_ignored("fixtures/keep", true));

        let g = filter(&["fixtures/*", "!fixtures/keep"]);
        assert!(!g.is_ignored("fixtures/keep/moltres.json", false));
        assert!(g.is_ignored("fixtures/drop/moltres.json", false));
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let f = filter(&["# comment", "   ", "node_modules"]);
        assert!(f.is_ignored("node_modules/x/moltres.json", false));
        assert!(!f.is_ignored("# comment", false));
    }

    #[test]
    fn leading_slash_in_input_is_dropped() {
        let f = filter(&["/src"]);
        assert!(f.is_ignored("/src/moltres.json", false));
    }
}

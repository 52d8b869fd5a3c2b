//! Source discovery helpers for hexbuild-core (made by FontLab https://www.fontlab.com/)

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

/// Trait for enumerating build inputs from some backing store.
pub trait FileDiscovery {
    fn discover(&self) -> Result<Vec<PathBuf>>;
}

/// Glob-driven filesystem lookup. Returned paths are relative to `base`.
///
/// Wildcards never match a leading dot unless the pattern spells it out, per
/// path component, as a shell would.
#[derive(Debug, Clone)]
pub struct GlobDiscovery {
    base: PathBuf,
    pattern: String,
    follow_symlinks: bool,
    sorted: bool,
}

impl GlobDiscovery {
    pub fn new(base: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim_start_matches("./");
        if trimmed.starts_with('/') || Path::new(trimmed).is_absolute() {
            return Err(anyhow!("glob pattern must be relative: {pattern}"));
        }
        Pattern::new(trimmed).with_context(|| format!("invalid glob pattern: {pattern}"))?;

        Ok(Self {
            base: base.into(),
            pattern: trimmed.to_string(),
            follow_symlinks: false,
            sorted: false,
        })
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Sort results lexicographically instead of keeping walk order.
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    fn rooted_pattern(&self) -> Result<String> {
        let base = self
            .base
            .to_str()
            .ok_or_else(|| anyhow!("base directory is not UTF-8: {}", self.base.display()))?;
        let base = Pattern::escape(base.trim_end_matches('/'));
        Ok(if base.is_empty() {
            self.pattern.clone()
        } else {
            format!("{base}/{}", self.pattern)
        })
    }
}

impl FileDiscovery for GlobDiscovery {
    fn discover(&self) -> Result<Vec<PathBuf>> {
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        };

        let rooted = self.rooted_pattern()?;
        let mut found = Vec::new();

        for entry in glob::glob_with(&rooted, options)? {
            let path = entry.with_context(|| format!("expanding {}", self.pattern))?;
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&self.base)?.to_path_buf();
            if !self.follow_symlinks && through_symlinked_dir(&self.base, &relative) {
                debug!(path = %relative.display(), "skipping file behind a symlinked directory");
                continue;
            }

            found.push(relative);
        }

        if self.sorted {
            found.sort();
        }

        if found.is_empty() {
            warn!(pattern = %self.pattern, "pattern matched no files");
        } else {
            debug!(pattern = %self.pattern, count = found.len(), "discovered files");
        }

        Ok(found)
    }
}

// Any directory between `base` and the file that is itself a symlink.
fn through_symlinked_dir(base: &Path, relative: &Path) -> bool {
    let mut current = base.to_path_buf();
    let Some(parent) = relative.parent() else {
        return false;
    };

    parent.components().any(|component| {
        current.push(component);
        current
            .symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    })
}

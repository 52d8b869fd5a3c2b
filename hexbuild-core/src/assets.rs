//! Static asset copy (made by FontLab https://www.fontlab.com/)

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Skip files whose destination is at least as new as the source.
    pub update: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyStats {
    pub files_copied: usize,
    pub files_skipped: usize,
    pub dirs_created: usize,
    pub bytes: u64,
}

/// Merge `src` into `dst`: same-named files are overwritten, files present
/// only in `dst` are left alone. Symlinks in `src` are copied as their
/// targets, and copied files keep the source modification time.
///
/// `dst` may not be `src` or lie inside it.
pub fn copy_tree(src: &Path, dst: &Path, opts: &CopyOptions) -> Result<CopyStats> {
    if !src.is_dir() {
        return Err(anyhow!(
            "static asset directory does not exist: {}",
            src.display()
        ));
    }

    let src_real = src
        .canonicalize()
        .with_context(|| format!("resolving {}", src.display()))?;
    let dst_real = resolve(dst)?;
    if dst_real.starts_with(&src_real) {
        return Err(anyhow!(
            "output directory {} overlaps static asset directory {}",
            dst.display(),
            src.display()
        ));
    }

    let mut stats = CopyStats::default();
    ensure_dir(dst, &mut stats)?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.with_context(|| format!("walking {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target, &mut stats)?;
            continue;
        }

        if !entry.file_type().is_file() {
            debug!(path = %entry.path().display(), "skipping special file");
            continue;
        }

        if opts.update && is_up_to_date(entry.path(), &target)? {
            stats.files_skipped += 1;
            continue;
        }

        let bytes = fs::copy(entry.path(), &target).with_context(|| {
            format!(
                "copying {} to {}",
                entry.path().display(),
                target.display()
            )
        })?;
        preserve_mtime(entry.path(), &target)?;
        stats.files_copied += 1;
        stats.bytes += bytes;
    }

    info!(
        src = %src.display(),
        dst = %dst.display(),
        copied = stats.files_copied,
        skipped = stats.files_skipped,
        "copied static assets"
    );

    Ok(stats)
}

// Canonical form of a path that may not exist yet: the deepest existing
// ancestor is canonicalized and the missing tail appended.
fn resolve(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("resolving {}", path.display()));
    }

    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            Ok(resolve(parent)?.join(name))
        }
        (_, Some(name)) => Ok(resolve(Path::new("."))?.join(name)),
        _ => Err(anyhow!("cannot resolve {}", path.display())),
    }
}

fn preserve_mtime(src: &Path, dst: &Path) -> Result<()> {
    let modified = fs::metadata(src)
        .and_then(|m| m.modified())
        .with_context(|| format!("reading mtime of {}", src.display()))?;
    File::options()
        .write(true)
        .open(dst)
        .and_then(|f| f.set_modified(modified))
        .with_context(|| format!("setting mtime of {}", dst.display()))
}

fn ensure_dir(dir: &Path, stats: &mut CopyStats) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    stats.dirs_created += 1;
    Ok(())
}

fn is_up_to_date(src: &Path, dst: &Path) -> Result<bool> {
    let Ok(dst_meta) = fs::metadata(dst) else {
        return Ok(false);
    };
    let src_modified = fs::metadata(src)
        .and_then(|m| m.modified())
        .with_context(|| format!("reading mtime of {}", src.display()))?;
    let dst_modified = dst_meta
        .modified()
        .with_context(|| format!("reading mtime of {}", dst.display()))?;
    Ok(dst_modified >= src_modified)
}

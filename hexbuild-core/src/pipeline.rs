//! The build pipeline: discover, assemble, echo, compile, copy
//! (made by FontLab https://www.fontlab.com/)

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assets::{copy_tree, CopyOptions, CopyStats};
use crate::config::{BuildConfig, FailurePolicy};
use crate::discovery::{FileDiscovery, GlobDiscovery};
use crate::execute::{execute, CompileStatus};
use crate::invocation::CompilerInvocation;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Echo the command but neither compile nor copy.
    pub dry_run: bool,
    pub copy: CopyOptions,
}

/// Discovered inputs and the compiler call built from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPlan {
    pub base: PathBuf,
    pub sources: Vec<PathBuf>,
    pub libraries: Vec<PathBuf>,
    pub loaders: Vec<PathBuf>,
    pub invocation: CompilerInvocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub command: String,
    pub compile: CompileStatus,
    /// `None` when the copy did not run.
    pub assets: Option<CopyStats>,
}

impl BuildReport {
    /// True when the compiler succeeded, or was intentionally not run.
    pub fn is_success(&self) -> bool {
        matches!(
            self.compile,
            CompileStatus::Succeeded | CompileStatus::Skipped
        )
    }
}

impl BuildPlan {
    pub fn prepare(base: &Path, config: &BuildConfig) -> Result<Self> {
        let sources = discover(base, &config.sources, config)?;
        let loaders = discover(base, &config.loaders, config)?;
        let invocation = CompilerInvocation::build(
            &config.compiler,
            &config.out_dir,
            &sources,
            &config.libraries,
            &loaders,
        );

        Ok(Self {
            base: base.to_path_buf(),
            sources,
            libraries: config.libraries.clone(),
            loaders,
            invocation,
        })
    }

    pub fn command_line(&self) -> String {
        self.invocation.command_line()
    }

    /// Echo the command to `console`, run the compiler, then merge the static
    /// assets into the output directory according to the failure policy.
    pub fn run(
        &self,
        config: &BuildConfig,
        opts: &RunOptions,
        mut console: impl Write,
    ) -> Result<BuildReport> {
        let command = self.command_line();
        writeln!(console, "Building TypeScript: {command}")?;
        console.flush()?;

        if opts.dry_run {
            return Ok(BuildReport {
                command,
                compile: CompileStatus::Skipped,
                assets: None,
            });
        }

        let compile = execute(&self.invocation, &self.base)?;

        if !compile.is_success() && config.on_compile_failure == FailurePolicy::Abort {
            warn!(?compile, "compile did not succeed, skipping static asset copy");
            return Ok(BuildReport {
                command,
                compile,
                assets: None,
            });
        }

        let assets = copy_tree(
            &self.base.join(&config.static_dir),
            &self.base.join(&config.out_dir),
            &opts.copy,
        )?;
        info!(?compile, "build finished");

        Ok(BuildReport {
            command,
            compile,
            assets: Some(assets),
        })
    }
}

/// Prepare and run in one go.
pub fn build(
    base: &Path,
    config: &BuildConfig,
    opts: &RunOptions,
    console: impl Write,
) -> Result<BuildReport> {
    BuildPlan::prepare(base, config)?.run(config, opts, console)
}

fn discover(base: &Path, pattern: &str, config: &BuildConfig) -> Result<Vec<PathBuf>> {
    GlobDiscovery::new(base, pattern)?
        .follow_symlinks(config.follow_symlinks)
        .sorted(config.sorted)
        .discover()
}

//! Compiler process execution (made by FontLab https://www.fontlab.com/)

use std::io;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::invocation::CompilerInvocation;

/// Outcome of running the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompileStatus {
    Succeeded,
    /// Exited non-zero; `code` is `None` when killed by a signal.
    Failed { code: Option<i32> },
    /// The compiler program could not be found.
    NotFound,
    /// Not run (dry run).
    Skipped,
}

impl CompileStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, CompileStatus::Succeeded)
    }
}

/// Run the compiler in `cwd` and wait for it to exit.
pub fn execute(invocation: &CompilerInvocation, cwd: &Path) -> Result<CompileStatus> {
    if !cwd.is_dir() {
        return Err(anyhow!("base directory does not exist: {}", cwd.display()));
    }

    info!(program = %invocation.program, args = invocation.args.len(), "running compiler");

    match invocation.command(cwd).status() {
        Ok(status) if status.success() => Ok(CompileStatus::Succeeded),
        Ok(status) => {
            warn!(code = ?status.code(), "compiler exited with failure");
            Ok(CompileStatus::Failed {
                code: status.code(),
            })
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(program = %invocation.program, "compiler not found");
            Ok(CompileStatus::NotFound)
        }
        Err(err) => {
            Err(err).with_context(|| format!("spawning compiler {}", invocation.program))
        }
    }
}

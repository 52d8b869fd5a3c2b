//! Compiler command construction (made by FontLab https://www.fontlab.com/)

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

/// Flags passed to the TypeScript compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerOptions {
    pub program: String,
    /// Placed right after the program, before any flag (`npx` + `tsc`).
    pub program_args: Vec<String>,
    pub allow_js: bool,
    pub module: String,
    pub target: String,
    pub source_map: bool,
    pub always_strict: bool,
    /// Appended after the fixed flags, before any input files.
    pub extra_args: Vec<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            program: "tsc".to_string(),
            program_args: Vec::new(),
            allow_js: true,
            module: "ES6".to_string(),
            target: "ES6".to_string(),
            source_map: true,
            always_strict: true,
            extra_args: Vec::new(),
        }
    }
}

/// A fully assembled compiler call, kept as an argument vector so paths never
/// pass through a shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl CompilerInvocation {
    /// Assemble program args and flags, then TypeScript sources, then fixed libraries, then
    /// loader modules.
    pub fn build(
        options: &CompilerOptions,
        out_dir: &Path,
        ts_files: &[PathBuf],
        libraries: &[PathBuf],
        js_files: &[PathBuf],
    ) -> Self {
        let mut args = options.program_args.clone();

        if options.allow_js {
            args.push("--allowJs".to_string());
        }
        args.extend(["-m".to_string(), options.module.clone()]);
        args.extend(["-t".to_string(), options.target.clone()]);
        args.extend(["--outDir".to_string(), path_arg(out_dir)]);
        if options.source_map {
            args.push("--sourceMap".to_string());
        }
        if options.always_strict {
            args.push("--alwaysStrict".to_string());
        }
        args.extend(options.extra_args.iter().cloned());

        args.extend(ts_files.iter().map(|p| path_arg(p)));
        args.extend(libraries.iter().map(|p| path_arg(p)));
        args.extend(js_files.iter().map(|p| path_arg(p)));

        Self {
            program: options.program.clone(),
            args,
        }
    }

    /// Printable command line; words are quoted only when a shell would split
    /// or interpret them.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Process builder running in `cwd`, inheriting environment and stdio.
    pub fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(cwd);
        cmd
    }
}

/// Shorthand for `CompilerInvocation::build(..).command_line()`.
pub fn build_command(
    options: &CompilerOptions,
    out_dir: &Path,
    ts_files: &[PathBuf],
    libraries: &[PathBuf],
    js_files: &[PathBuf],
) -> String {
    CompilerInvocation::build(options, out_dir, ts_files, libraries, js_files).command_line()
}

/// POSIX single-quote a word unless it is made only of shell-inert characters.
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    let inert = |c: char| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c);
    if !word.is_empty() && word.chars().all(inert) {
        return Cow::Borrowed(word);
    }

    Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

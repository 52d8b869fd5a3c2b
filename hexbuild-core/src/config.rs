//! Build configuration (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::invocation::CompilerOptions;

/// Looked up in the base directory when no explicit config is given.
pub const CONFIG_FILE_NAME: &str = "hexbuild.json";

/// What to do with the asset copy when the compiler does not succeed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Skip the copy; the failure is reported to the caller.
    #[default]
    Abort,
    /// Copy anyway; the failure is still reported.
    Continue,
}

/// Everything the pipeline needs; all paths are relative to the base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Glob for TypeScript sources.
    pub sources: String,
    /// Fixed inputs placed between the sources and the loaders.
    pub libraries: Vec<PathBuf>,
    /// Glob for JavaScript loader modules.
    pub loaders: String,
    pub static_dir: PathBuf,
    pub out_dir: PathBuf,
    pub compiler: CompilerOptions,
    pub on_compile_failure: FailurePolicy,
    pub follow_symlinks: bool,
    pub sorted: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            sources: "src/hexcraft/*.ts".to_string(),
            libraries: vec![PathBuf::from("src/lib/vue/vue.js")],
            loaders: "src/lib/threejs/examples/jsm/loaders/*.js".to_string(),
            static_dir: PathBuf::from("src/hexcraft/static"),
            out_dir: PathBuf::from("dist"),
            compiler: CompilerOptions::default(),
            on_compile_failure: FailurePolicy::default(),
            follow_symlinks: false,
            sorted: false,
        }
    }
}

impl BuildConfig {
    /// Load `explicit` if given (it must exist), else `<base>/hexbuild.json`
    /// when present, else defaults.
    pub fn load(base: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(anyhow!("config file does not exist: {}", path.display()));
                }
                path.to_path_buf()
            }
            None => {
                let candidate = base.join(CONFIG_FILE_NAME);
                if !candidate.is_file() {
                    debug!(base = %base.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config =
            Self::from_json_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BuildConfig::from_json_str(
            r#"{ "out_dir": "build", "compiler": { "target": "ES2020" }, "on_compile_failure": "continue" }"#,
        )
        .expect("parse");

        assert_eq!(config.out_dir, PathBuf::from("build"));
        assert_eq!(config.compiler.target, "ES2020");
        assert_eq!(config.compiler.module, "ES6");
        assert_eq!(config.on_compile_failure, FailurePolicy::Continue);
        assert_eq!(config.sources, "src/hexcraft/*.ts");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(BuildConfig::from_json_str(r#"{ "outdir": "x" }"#).is_err());
    }

    #[test]
    fn load_prefers_explicit_then_base_file() {
        let tmp = tempdir().expect("tempdir");
        assert_eq!(
            BuildConfig::load(tmp.path(), None).expect("defaults"),
            BuildConfig::default()
        );

        fs::write(tmp.path().join(CONFIG_FILE_NAME), r#"{ "out_dir": "www" }"#).unwrap();
        let from_base = BuildConfig::load(tmp.path(), None).expect("base file");
        assert_eq!(from_base.out_dir, PathBuf::from("www"));

        let explicit = tmp.path().join("other.json");
        fs::write(&explicit, r#"{ "sorted": true }"#).unwrap();
        let from_explicit = BuildConfig::load(tmp.path(), Some(explicit.as_path())).expect("explicit");
        assert!(from_explicit.sorted);
        assert_eq!(from_explicit.out_dir, PathBuf::from("dist"));

        assert!(BuildConfig::load(tmp.path(), Some(tmp.path().join("missing.json").as_path())).is_err());
    }
}

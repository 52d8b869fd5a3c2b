//! hexbuild-core: the stage crew behind every hexcraft build
//!
//! Before the curtain rises on the hexcraft web app, somebody has to gather
//! the scripts, hand them to the TypeScript compiler, and set the props on
//! stage. This library is that crew. It does one show a night, in order,
//! and it never improvises.
//!
//! ## The Running Order
//!
//! **Discovery**: Glob the TypeScript sources and the three.js loader
//! modules, relative to an explicit base directory.
//!
//! **Invocation**: Assemble a single `tsc` call as an argument list, so a
//! path with a space in it stays one argument instead of two.
//!
//! **Execution**: Run the compiler and report how it went. The asset copy
//! is skipped on failure unless the config says to carry on regardless.
//!
//! **Assets**: Merge the static directory into the output directory.
//! Same-named files are overwritten; anything else already there stays.
//!
//! ## A Sample Evening
//!
//! ```rust,no_run
//! use std::path::Path;
//! use hexbuild_core::config::BuildConfig;
//! use hexbuild_core::pipeline::{BuildPlan, RunOptions};
//!
//! let base = Path::new("/work/hexcraft");
//! let config = BuildConfig::load(base, None)?;
//! let plan = BuildPlan::prepare(base, &config)?;
//!
//! let report = plan.run(&config, &RunOptions::default(), std::io::stdout())?;
//! if !report.is_success() {
//!     eprintln!("compile status: {:?}", report.compile);
//! }
//! #
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## The Cast
//!
//! - [`discovery::GlobDiscovery`]: expands `src/hexcraft/*.ts` and hands back matching files
//! - [`invocation::CompilerInvocation`]: the compiler call, printable and runnable
//! - [`execute::CompileStatus`]: what the compiler had to say for itself
//! - [`assets::copy_tree`]: the additive copy into `dist`
//! - [`pipeline::BuildPlan`]: the whole running order in one place
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod assets;
pub mod config;
pub mod discovery;
pub mod execute;
pub mod invocation;
pub mod output;
pub mod pipeline;

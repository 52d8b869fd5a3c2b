//! hexbuild CLI (made by FontLab https://www.fontlab.com/)

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use hexbuild_core::assets::CopyOptions;
use hexbuild_core::config::{BuildConfig, FailurePolicy};
use hexbuild_core::execute::CompileStatus;
use hexbuild_core::output::{write_json_pretty, write_ndjson};
use hexbuild_core::pipeline::{BuildPlan, BuildReport, RunOptions};

/// Overrides `compiler.program` from the config.
pub const COMPILER_ENV: &str = "HEXBUILD_TSC";
/// `tracing` filter directives; takes precedence over `-v`.
pub const LOG_ENV: &str = "HEXBUILD_LOG";

/// CLI entrypoint for hexbuild.
#[derive(Debug, Parser)]
#[command(
    name = "hexbuild",
    about = "Compile the hexcraft TypeScript sources and stage static assets (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Discover sources, run the compiler, copy static assets
    Build(BuildArgs),
    /// Show discovered inputs and the compiler command without running it
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
struct ProjectArgs {
    /// Base directory that patterns and configured paths are relative to
    #[arg(short = 'C', long = "base", default_value = ".", value_hint = ValueHint::DirPath)]
    base: PathBuf,

    /// Config file (defaults to <base>/hexbuild.json when present)
    #[arg(long = "config", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Compiler program to run instead of the configured one
    #[arg(long = "tsc", value_hint = ValueHint::CommandName)]
    tsc: Option<String>,

    /// Sort discovered files instead of keeping filesystem order
    #[arg(long = "sorted", action = ArgAction::SetTrue)]
    sorted: bool,

    /// Follow symlinks while walking source directories
    #[arg(long = "follow-symlinks", action = ArgAction::SetTrue)]
    follow_symlinks: bool,
}

#[derive(Debug, Args)]
struct BuildArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Copy static assets even when the compiler fails
    #[arg(long = "keep-going", action = ArgAction::SetTrue)]
    keep_going: bool,

    /// Print the compiler command without running anything
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    dry_run: bool,

    /// Only copy assets that are newer than their destination
    #[arg(short = 'u', long = "update", action = ArgAction::SetTrue)]
    update: bool,

    /// Emit the build report as JSON on stdout
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct PlanArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Emit the plan as a single JSON object
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit one JSON object per input file
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum InputKind {
    Source,
    Library,
    Loader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct PlanEntry<'a> {
    kind: InputKind,
    path: &'a PathBuf,
}

/// Parse CLI args, execute the selected command, and return the process exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build(args) => run_build(args),
        Command::Plan(args) => run_plan(args).map(|()| 0),
    }
}

fn init_logging(verbose: u8) {
    let filter = match env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }),
    };

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(project: &ProjectArgs, compiler_env: Option<String>) -> Result<BuildConfig> {
    let mut config = BuildConfig::load(&project.base, project.config.as_deref())?;

    if let Some(program) = compiler_env.filter(|p| !p.trim().is_empty()) {
        config.compiler.program = program;
    }
    if let Some(program) = &project.tsc {
        config.compiler.program = program.clone();
    }
    if project.sorted {
        config.sorted = true;
    }
    if project.follow_symlinks {
        config.follow_symlinks = true;
    }

    Ok(config)
}

fn run_build(args: BuildArgs) -> Result<i32> {
    let mut config = load_config(&args.project, env::var(COMPILER_ENV).ok())?;
    if args.keep_going {
        config.on_compile_failure = FailurePolicy::Continue;
    }

    let opts = RunOptions {
        dry_run: args.dry_run,
        copy: CopyOptions {
            update: args.update,
        },
    };
    let plan = BuildPlan::prepare(&args.project.base, &config)?;

    let report = if args.json {
        // Keep stdout parseable; the echoed command goes to stderr instead.
        let report = plan.run(&config, &opts, io::stderr().lock())?;
        write_json_pretty(&report, io::stdout().lock())?;
        report
    } else {
        plan.run(&config, &opts, io::stdout().lock())?
    };

    Ok(exit_code(&report))
}

fn run_plan(args: PlanArgs) -> Result<()> {
    let config = load_config(&args.project, env::var(COMPILER_ENV).ok())?;
    let plan = BuildPlan::prepare(&args.project.base, &config)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.json {
        write_json_pretty(&plan, &mut handle)?;
    } else if args.ndjson {
        write_ndjson(&plan_entries(&plan), &mut handle)?;
    } else {
        write_plan(&plan, &mut handle)?;
    }

    Ok(())
}

fn plan_entries(plan: &BuildPlan) -> Vec<PlanEntry<'_>> {
    tagged(InputKind::Source, &plan.sources)
        .chain(tagged(InputKind::Library, &plan.libraries))
        .chain(tagged(InputKind::Loader, &plan.loaders))
        .collect()
}

fn tagged(kind: InputKind, paths: &[PathBuf]) -> impl Iterator<Item = PlanEntry<'_>> {
    paths.iter().map(move |path| PlanEntry { kind, path })
}

fn write_plan(plan: &BuildPlan, mut w: impl Write) -> Result<()> {
    for (label, paths) in [
        ("sources", &plan.sources),
        ("libraries", &plan.libraries),
        ("loaders", &plan.loaders),
    ] {
        writeln!(w, "{label} ({}):", paths.len())?;
        for path in paths {
            writeln!(w, "  {}", path.display())?;
        }
    }
    writeln!(w, "command: {}", plan.command_line())?;
    Ok(())
}

fn exit_code(report: &BuildReport) -> i32 {
    match report.compile {
        CompileStatus::Succeeded | CompileStatus::Skipped => 0,
        CompileStatus::Failed { code } => code.filter(|c| *c != 0).unwrap_or(1),
        CompileStatus::NotFound => 127,
    }
}

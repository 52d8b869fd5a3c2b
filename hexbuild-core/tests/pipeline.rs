//! End-to-end runs with a stand-in compiler script (unix only).
#![cfg(unix)]

use std::fs;
use std::path::Path;

use hexbuild_core::config::{BuildConfig, FailurePolicy};
use hexbuild_core::execute::CompileStatus;
use hexbuild_core::pipeline::{build, BuildPlan, RunOptions};

// Writes `<name>.js` into --outDir for every `.ts` argument.
const FAKE_TSC: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --outDir) out="$2"; shift 2; continue ;;
    -m|-t) shift 2; continue ;;
    --*) shift; continue ;;
  esac
  case "$1" in
    *.ts) mkdir -p "$out"; cp "$1" "$out/$(basename "$1" .ts).js" ;;
  esac
  shift
done
"#;

const FAILING_TSC: &str = "#!/bin/sh\necho 'error TS1005' >&2\nexit 2\n";

// Run through `sh` so the freshly written script is never exec'd directly
// (a concurrent fork could still hold it open for writing).
fn use_script(config: &mut BuildConfig, dir: &Path, body: &str) {
    let path = dir.join("tsc.sh");
    fs::write(&path, body).unwrap();
    config.compiler.program = "sh".to_string();
    config.compiler.program_args = vec![path.display().to_string()];
}

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

fn hexcraft_project(root: &Path) {
    write(root, "src/hexcraft/a.ts", "export const a = 1;");
    write(root, "src/hexcraft/b.ts", "export const b = 2;");
    write(root, "src/lib/vue/vue.js", "// vue");
    write(root, "src/lib/threejs/examples/jsm/loaders/LoaderX.js", "// loader");
    write(root, "src/hexcraft/static/index.html", "<html></html>");
}

#[test]
fn builds_sources_and_copies_static_assets() {
    let project = tempfile::tempdir().expect("tempdir");
    let tools = tempfile::tempdir().expect("tempdir");
    hexcraft_project(project.path());

    let mut config = BuildConfig::default();
    use_script(&mut config, tools.path(), FAKE_TSC);

    let plan = BuildPlan::prepare(project.path(), &config).expect("plan");
    let command = plan.command_line();
    for needle in [
        "src/hexcraft/a.ts",
        "src/hexcraft/b.ts",
        "src/lib/vue/vue.js",
        "src/lib/threejs/examples/jsm/loaders/LoaderX.js",
    ] {
        assert!(command.contains(needle), "{needle} missing from {command}");
    }

    let mut console = Vec::new();
    let report = plan
        .run(&config, &RunOptions::default(), &mut console)
        .expect("run");

    assert_eq!(report.compile, CompileStatus::Succeeded);
    assert!(report.is_success());
    assert_eq!(
        String::from_utf8(console).unwrap(),
        format!("Building TypeScript: {command}\n")
    );

    let dist = project.path().join("dist");
    assert_eq!(
        fs::read_to_string(dist.join("a.js")).unwrap(),
        "export const a = 1;"
    );
    assert!(dist.join("b.js").is_file());
    assert_eq!(
        fs::read_to_string(dist.join("index.html")).unwrap(),
        "<html></html>"
    );
    assert_eq!(report.assets.map(|s| s.files_copied), Some(1));
}

#[test]
fn failed_compile_skips_copy_unless_continuing() {
    let project = tempfile::tempdir().expect("tempdir");
    let tools = tempfile::tempdir().expect("tempdir");
    hexcraft_project(project.path());

    let mut config = BuildConfig::default();
    use_script(&mut config, tools.path(), FAILING_TSC);

    let report = build(project.path(), &config, &RunOptions::default(), Vec::new()).expect("run");
    assert_eq!(report.compile, CompileStatus::Failed { code: Some(2) });
    assert!(report.assets.is_none());
    assert!(!project.path().join("dist/index.html").exists());

    config.on_compile_failure = FailurePolicy::Continue;
    let report = build(project.path(), &config, &RunOptions::default(), Vec::new()).expect("run");
    assert_eq!(report.compile, CompileStatus::Failed { code: Some(2) });
    assert!(!report.is_success());
    assert!(project.path().join("dist/index.html").is_file());
}

#[test]
fn missing_static_directory_fails_after_compiling() {
    let project = tempfile::tempdir().expect("tempdir");
    let tools = tempfile::tempdir().expect("tempdir");
    write(project.path(), "src/hexcraft/a.ts", "export {};");

    let mut config = BuildConfig::default();
    use_script(&mut config, tools.path(), FAKE_TSC);

    let err = build(project.path(), &config, &RunOptions::default(), Vec::new()).unwrap_err();
    assert!(err.to_string().contains("static asset directory"));
    assert!(project.path().join("dist/a.js").is_file());
}

#[test]
fn paths_with_spaces_reach_the_compiler_intact() {
    let project = tempfile::tempdir().expect("tempdir");
    let tools = tempfile::tempdir().expect("tempdir");
    write(project.path(), "src/hexcraft/my tile.ts", "export {};");
    write(project.path(), "src/hexcraft/static/index.html", "");

    let mut config = BuildConfig::default();
    config.libraries.clear();
    use_script(&mut config, tools.path(), FAKE_TSC);

    let report = build(project.path(), &config, &RunOptions::default(), Vec::new()).expect("run");
    assert!(report.is_success());
    assert!(report.command.contains("'src/hexcraft/my tile.ts'"));
    assert!(project.path().join("dist/my tile.js").is_file());
}

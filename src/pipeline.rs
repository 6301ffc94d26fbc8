//! # Build Pipeline
//!
//! This module contains the core orchestration logic for Shipwright. It is
//! responsible for:
//! 1. Cleaning a stale publish directory (`clean_output`).
//! 2. Driving the toolchain through restore, build, and publish (`run`).
//! 3. Assembling the publish argument vector (`publish_args`).
//!
//! Control flow is a strictly ordered chain of gated steps: the first step
//! whose runner call reports failure aborts the whole run with a one-line
//! diagnostic. There are no retries and no timeouts.

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::invariant::assert_invariant;
use crate::paths::{BuildPaths, PROJECT_NAME};
use crate::runner::CommandRunner;

/// Build configuration passed to every toolchain invocation.
const CONFIGURATION: &str = "Release";

/// Publish property enabling dead-code trimming. Appended unless the user
/// opted out with `--no-trim`.
const TRIM_FLAG: &str = "-p:PublishTrimmed=true";

/// Options parsed once from the command line. Never mutated afterwards.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Force-delete the publish directory before building.
    pub clean: bool,
    /// Omit the trimming property from the publish invocation.
    pub no_trim: bool,
    /// Runtime identifier the executable is published for.
    pub runtime: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            clean: false,
            no_trim: false,
            runtime: "win-x64".to_string(),
        }
    }
}

/// Run the full pipeline: clean (if applicable), restore, build, publish.
///
/// Each toolchain step runs in the project directory and must exit zero for
/// the next one to start. Whatever the tools print goes straight to the
/// console; on failure the returned error names the step that broke.
pub fn run(options: &BuildOptions, paths: &BuildPaths, runner: &impl CommandRunner) -> Result<()> {
    print_banner(options, paths);

    clean_output(options, paths)?;

    info!("Restoring packages...");
    if !runner.run(&restore_args(), Some(&paths.project_dir)) {
        bail!("Failed to restore packages");
    }

    info!("Building {} configuration...", CONFIGURATION);
    if !runner.run(&build_args(), Some(&paths.project_dir)) {
        bail!("Failed to build project");
    }

    info!("Publishing self-contained executable...");
    if !runner.run(&publish_args(options, paths), Some(&paths.project_dir)) {
        bail!("Failed to publish executable");
    }

    Ok(())
}

/// Delete a previous publish directory.
///
/// Triggered by `--clean`, or by a missing project directory (a checkout in
/// that state has nothing the old output could belong to). **Destructive**:
/// the directory is removed recursively with no confirmation prompt.
fn clean_output(options: &BuildOptions, paths: &BuildPaths) -> Result<()> {
    if !options.clean && paths.project_dir.exists() {
        return Ok(());
    }
    if !paths.publish_dir.exists() {
        debug!("No previous build output at {:?}", paths.publish_dir);
        return Ok(());
    }

    info!("Cleaning previous build at {:?}", paths.publish_dir);
    std::fs::remove_dir_all(&paths.publish_dir)
        .with_context(|| format!("could not remove {:?}", paths.publish_dir))?;
    Ok(())
}

fn restore_args() -> Vec<String> {
    vec!["dotnet".to_string(), "restore".to_string()]
}

fn build_args() -> Vec<String> {
    ["dotnet", "build", "--configuration", CONFIGURATION, "--no-restore"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Assemble the publish argument vector.
///
/// The output is always a release-configuration, self-contained, single-file,
/// ready-to-run executable for the requested runtime. Trimming is opt-out.
pub fn publish_args(options: &BuildOptions, paths: &BuildPaths) -> Vec<String> {
    let mut args: Vec<String> = ["dotnet", "publish", "--configuration", CONFIGURATION]
        .iter()
        .map(|s| s.to_string())
        .collect();

    args.push("--runtime".to_string());
    args.push(options.runtime.clone());
    args.push("--self-contained".to_string());
    args.push("-p:PublishSingleFile=true".to_string());
    args.push("-p:PublishReadyToRun=true".to_string());
    args.push("--output".to_string());
    args.push(paths.publish_dir.display().to_string());

    if !options.no_trim {
        args.push(TRIM_FLAG.to_string());
    }

    assert_invariant(
        args.iter().any(|a| a == "--self-contained")
            && args.iter().any(|a| a == "-p:PublishSingleFile=true"),
        "publish output is always self-contained and single-file",
        Some("Pipeline"),
    );
    assert_invariant(
        args.iter().any(|a| a == TRIM_FLAG) != options.no_trim,
        "trim flag mirrors the --no-trim option",
        Some("Pipeline"),
    );

    args
}

/// Print the run header with the resolved configuration.
fn print_banner(options: &BuildOptions, paths: &BuildPaths) {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                     {} Build", PROJECT_NAME);
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("Project Directory: {}", paths.project_dir.display());
    println!("Build Output:      {}", paths.publish_dir.display());
    println!("Runtime:           {}", options.runtime);
    println!("Trim Binary:       {}", !options.no_trim);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariant::{clear_invariant_log, contract_test};
    use crate::runner::MockRunner;
    use proptest::prelude::*;
    use std::fs;
    use std::path::Path;

    fn paths_in(dir: &Path, with_project: bool) -> BuildPaths {
        let paths = BuildPaths::resolve(dir);
        if with_project {
            fs::create_dir_all(&paths.project_dir).unwrap();
        }
        paths
    }

    #[test]
    fn test_steps_run_in_order_inside_project_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths_in(tmp.path(), true);
        let mock = MockRunner::new();

        run(&BuildOptions::default(), &paths, &mock).unwrap();

        assert_eq!(mock.subcommands(), vec!["restore", "build", "publish"]);
        for call in mock.calls.lock().unwrap().iter() {
            assert_eq!(call.cwd.as_deref(), Some(paths.project_dir.as_path()));
        }
    }

    #[test]
    fn test_restore_failure_stops_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths_in(tmp.path(), true);
        let mock = MockRunner::failing_on("restore");

        let err = run(&BuildOptions::default(), &paths, &mock).unwrap_err();

        assert!(err.to_string().contains("restore"));
        assert_eq!(mock.subcommands(), vec!["restore"]);
    }

    #[test]
    fn test_build_failure_skips_publish() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths_in(tmp.path(), true);
        let mock = MockRunner::failing_on("build");

        let err = run(&BuildOptions::default(), &paths, &mock).unwrap_err();

        assert!(err.to_string().contains("build"));
        assert_eq!(mock.subcommands(), vec!["restore", "build"]);
    }

    #[test]
    fn test_clean_removes_previous_output() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths_in(tmp.path(), true);
        fs::create_dir_all(&paths.publish_dir).unwrap();
        fs::write(paths.executable(), b"old artifact").unwrap();

        let options = BuildOptions {
            clean: true,
            ..Default::default()
        };
        run(&options, &paths, &MockRunner::new()).unwrap();

        // The mock "publish" creates nothing, so the directory must be gone.
        assert!(!paths.publish_dir.exists());
    }

    #[test]
    fn test_missing_project_dir_also_triggers_clean() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths_in(tmp.path(), false);
        fs::create_dir_all(&paths.publish_dir).unwrap();

        run(&BuildOptions::default(), &paths, &MockRunner::new()).unwrap();

        assert!(!paths.publish_dir.exists());
    }

    #[test]
    fn test_previous_output_kept_without_clean() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths_in(tmp.path(), true);
        fs::create_dir_all(&paths.publish_dir).unwrap();

        run(&BuildOptions::default(), &paths, &MockRunner::new()).unwrap();

        assert!(paths.publish_dir.exists());
    }

    #[test]
    fn test_default_options_publish_with_trim_and_win_x64() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = paths_in(tmp.path(), true);

        let args = publish_args(&BuildOptions::default(), &paths);

        assert!(args.contains(&TRIM_FLAG.to_string()));
        let runtime_pos = args.iter().position(|a| a == "--runtime").unwrap();
        assert_eq!(args[runtime_pos + 1], "win-x64");
    }

    proptest! {
        #[test]
        fn test_publish_args_properties(
            runtime in "[a-z]{3,5}-[a-z0-9]{2,6}",
            no_trim: bool,
            clean: bool
        ) {
            clear_invariant_log(); // Clear previous runs

            let options = BuildOptions { clean, no_trim, runtime: runtime.clone() };
            let paths = BuildPaths::resolve(Path::new("anchor"));

            let args = publish_args(&options, &paths);

            // The requested runtime is passed through literally.
            let runtime_pos = args.iter().position(|a| a == "--runtime").unwrap();
            prop_assert_eq!(&args[runtime_pos + 1], &runtime);

            // Trimming is present exactly when it was not disabled.
            prop_assert_eq!(args.contains(&TRIM_FLAG.to_string()), !no_trim);

            // The output directory is the resolved publish dir.
            let output_pos = args.iter().position(|a| a == "--output").unwrap();
            prop_assert_eq!(&args[output_pos + 1], &paths.publish_dir.display().to_string());

            contract_test("publish_args", &[
                "publish output is always self-contained and single-file",
                "trim flag mirrors the --no-trim option",
            ]);
        }
    }
}

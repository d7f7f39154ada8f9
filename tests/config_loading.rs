// tests/config_loading.rs

//! Configuration loading, validation failures, and the `--list-targets`
//! entry point end to end.

use std::fs;

use clap::Parser;
use kicheck::cli::CliArgs;
use kicheck::config::{load_and_validate, load_from_path};
use kicheck::errors::{exit_codes, KicheckError};
use kicheck_test_utils::init_tracing;
use tempfile::TempDir;

#[test]
fn defaults_apply_on_a_minimal_config() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Kicheck.toml");
    fs::write(&path, "[global]\nschematic = \"main.kicad_sch\"\n").unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.global.out_dir, std::path::PathBuf::from("."));
    assert!(cfg.global.use_dir_for_preflights);
    assert!(cfg.global.output.is_none());
    assert!(cfg.preflight.is_empty());
    assert!(cfg.render.is_none());
}

#[test]
fn tool_sections_are_parsed_per_command() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Kicheck.toml");
    fs::write(
        &path,
        "[global]\nschematic = \"main.kicad_sch\"\n\
         [tools.pcbnew_do]\nfindings_max = 90\nretry_on = [3, 4]\nmax_attempts = 3\n",
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();
    let section = cfg.tool_section("pcbnew_do");
    assert_eq!(section.findings_max, Some(90));
    assert_eq!(section.retry_on, vec![3, 4]);
    assert_eq!(section.max_attempts, 3);
    // Unconfigured commands fall back to the defaults.
    let other = cfg.tool_section("eeschema_do");
    assert_eq!(other.findings_max, None);
    assert_eq!(other.max_attempts, 1);
}

#[test]
fn missing_file_reports_the_path() {
    let err = load_from_path("/nonexistent/Kicheck.toml").unwrap_err();
    assert!(err.to_string().contains("/nonexistent/Kicheck.toml"));
}

#[test]
fn malformed_toml_is_a_config_failure() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Kicheck.toml");
    fs::write(&path, "[global\nschematic = ").unwrap();

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, KicheckError::Toml(_)));
    assert_eq!(err.exit_code(), exit_codes::BAD_CONFIG);
}

#[test]
fn semantic_validation_failures_map_to_bad_config() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Kicheck.toml");
    fs::write(
        &path,
        "[global]\nschematic = \"main.kicad_sch\"\n\
         [tools.eeschema_do]\nfindings_max = 0\n",
    )
    .unwrap();

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, KicheckError::Config(_)));
    assert_eq!(err.exit_code(), exit_codes::BAD_CONFIG);
}

#[test]
fn cli_parses_skip_and_verbosity() {
    let args = CliArgs::try_parse_from([
        "kicheck",
        "--config",
        "custom.toml",
        "--skip",
        "run_erc",
        "--skip",
        "run_drc",
        "-vv",
        "--list-targets",
    ])
    .unwrap();
    assert_eq!(args.config, "custom.toml");
    assert_eq!(args.skip, vec!["run_erc".to_string(), "run_drc".to_string()]);
    assert_eq!(args.verbose, 2);
    assert!(args.list_targets);
}

fn args_for(config: &std::path::Path, list_targets: bool) -> CliArgs {
    CliArgs {
        config: config.display().to_string(),
        list_targets,
        skip: Vec::new(),
        verbose: 0,
        log_level: None,
    }
}

#[test]
fn list_targets_runs_no_tools() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let sch = tmp.path().join("main.kicad_sch");
    fs::write(&sch, "(kicad_sch (reference \"R1\"))").unwrap();
    let out = tmp.path().join("out");
    let path = tmp.path().join("Kicheck.toml");
    fs::write(
        &path,
        format!(
            "[global]\nschematic = {sch:?}\nout_dir = {out:?}\n[preflight]\nrun_erc = true\n",
            sch = sch.display().to_string(),
            out = out.display().to_string(),
        ),
    )
    .unwrap();

    // No tools are installed on this machine's PATH under these names;
    // listing must still succeed because nothing resolves or spawns.
    kicheck::run(args_for(&path, true)).unwrap();
    assert!(!out.exists(), "listing must create no directories");
}

#[test]
fn unknown_preflight_key_fails_the_run_early() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("Kicheck.toml");
    fs::write(
        &path,
        "[global]\nschematic = \"main.kicad_sch\"\n[preflight]\nrun_frobnicate = true\n",
    )
    .unwrap();

    let err = kicheck::run(args_for(&path, false)).unwrap_err();
    assert_eq!(err.exit_code(), exit_codes::BAD_CONFIG);
    assert!(err.to_string().contains("run_frobnicate"));
}

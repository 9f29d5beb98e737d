//! Config-file + CLI-flag layering exercised against a real TOML file on
//! disk (§13: "defaults -> config file -> CLI flags, CLI wins").

use clap::Parser;
use std::io::Write;

use tg_cli::args::CliArgs;
use tg_cli::config::{self, FileConfig};

fn write_toml(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("typegraph.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn config_file_supplies_packages_when_cli_gives_none() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_toml(
        &dir,
        r#"
            packages = ["example.com/mod/pkg"]
            scan_mode = ["basic"]
        "#,
    );

    let args = CliArgs::parse_from(["tg", "--config", config_path.to_str().unwrap()]);
    let file = FileConfig::load(&config_path).unwrap();
    let options = config::resolve(&args, Some(file)).unwrap();

    assert_eq!(options.packages, vec!["example.com/mod/pkg".to_string()]);
}

#[test]
fn cli_positional_packages_override_config_file_packages() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_toml(&dir, r#"packages = ["example.com/mod/from-file"]"#);

    let args = CliArgs::parse_from([
        "tg",
        "from-cli.json",
        "--config",
        config_path.to_str().unwrap(),
    ]);
    let file = FileConfig::load(&config_path).unwrap();
    let options = config::resolve(&args, Some(file)).unwrap();

    assert_eq!(options.packages, vec!["from-cli.json".to_string()]);
}

#[test]
fn cli_log_level_overrides_config_file_log_level() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_toml(
        &dir,
        r#"
            packages = ["example.com/mod/pkg"]
            log_level = "error"
        "#,
    );

    let args = CliArgs::parse_from([
        "tg",
        "--config",
        config_path.to_str().unwrap(),
        "--log-level",
        "debug",
    ]);
    let file = FileConfig::load(&config_path).unwrap();
    let options = config::resolve(&args, Some(file)).unwrap();

    assert_eq!(options.log_level, tg_common::LogLevel::Debug);
}

#[test]
fn missing_config_file_reports_a_config_error() {
    let err = FileConfig::load(std::path::Path::new("/does/not/exist.toml")).unwrap_err();
    assert!(matches!(err, tg_common::ScanError::Config(_)));
}

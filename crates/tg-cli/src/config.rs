//! Configuration layering (§13): defaults -> `typegraph.toml` -> CLI flags,
//! CLI always wins. Produces the `ScanOptions` the core actually consumes.
//!
//! Deliberately not a port of `tsconfig.json`'s semantics (string-union
//! inheritance, `extends`, path mapping): a standalone analyzer ships a
//! flat TOML file instead, the way a tool like this would if it weren't
//! also a drop-in replacement for an existing compiler's config format.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tg_common::{ExternalPackagesOptions, LogLevel, OutOfScopeAction, ScanError, ScanMode, ScanOptions, Visibility};

use crate::args::CliArgs;

/// On-disk shape of `typegraph.toml`. Every field optional so a config file
/// only needs to mention what it wants to override.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub packages: Option<Vec<String>>,
    pub scan_mode: Option<Vec<String>>,
    pub visibility: Option<VisibilityName>,
    pub external: Option<FileExternalConfig>,
    pub log_level: Option<LogLevelName>,
    pub max_concurrency: Option<usize>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExternalConfig {
    pub scan_mode: Option<Vec<String>>,
    pub parse_files: Option<bool>,
    pub visibility: Option<VisibilityName>,
    pub max_distance: Option<u32>,
    pub out_of_scope: Option<OutOfScopeName>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityName {
    Exported,
    Unexported,
    Both,
}

impl From<VisibilityName> for Visibility {
    fn from(value: VisibilityName) -> Self {
        match value {
            VisibilityName::Exported => Visibility::Exported,
            VisibilityName::Unexported => Visibility::Unexported,
            VisibilityName::Both => Visibility::Both,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfScopeName {
    Ignore,
    Warn,
    Error,
}

impl From<OutOfScopeName> for OutOfScopeAction {
    fn from(value: OutOfScopeName) -> Self {
        match value {
            OutOfScopeName::Ignore => OutOfScopeAction::Ignore,
            OutOfScopeName::Warn => OutOfScopeAction::Warn,
            OutOfScopeName::Error => OutOfScopeAction::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevelName {
    Debug,
    Info,
    Warn,
    Error,
    None,
}

impl From<LogLevelName> for LogLevel {
    fn from(value: LogLevelName) -> Self {
        match value {
            LogLevelName::Debug => LogLevel::Debug,
            LogLevelName::Info => LogLevel::Info,
            LogLevelName::Warn => LogLevel::Warn,
            LogLevelName::Error => LogLevel::Error,
            LogLevelName::None => LogLevel::None,
        }
    }
}

impl FileConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ScanError> {
        toml::from_str(text).map_err(|err| ScanError::Config(format!("invalid typegraph.toml: {err}")))
    }

    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| ScanError::Config(format!("failed to read {}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

fn parse_scan_mode(names: &[String], who: &str) -> Result<ScanMode, ScanError> {
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    ScanMode::from_names(&refs).ok_or_else(|| ScanError::Config(format!("unknown scan_mode name in {who}: {names:?}")))
}

/// Layers defaults, an optional config file and CLI flags into a validated
/// `ScanOptions` (CLI wins over file, file wins over defaults). Returns
/// `ScanError::Config` for an invalid scan-mode name or an empty package
/// list, before any scan work starts (§7 "Configuration failure").
pub fn resolve(args: &CliArgs, file: Option<FileConfig>) -> Result<ScanOptions, ScanError> {
    let file = file.unwrap_or_default();
    let mut options = ScanOptions::default();

    if let Some(names) = &file.scan_mode {
        options.scan_mode = parse_scan_mode(names, "scan_mode")?;
    }
    if let Some(visibility) = file.visibility {
        options.visibility = visibility.into();
    }
    if let Some(level) = file.log_level {
        options.log_level = level.into();
    }
    if let Some(concurrency) = file.max_concurrency {
        options.max_concurrency = concurrency;
    }
    if let Some(external) = &file.external {
        apply_file_external(&mut options.external_packages_options, external)?;
    }

    if let Some(names) = &args.scan_mode {
        options.scan_mode = parse_scan_mode(names, "--scan-mode")?;
    }
    if let Some(visibility) = args.visibility {
        options.visibility = visibility.into();
    }
    if let Some(level) = args.log_level {
        options.log_level = level.into();
    }
    if let Some(concurrency) = args.max_concurrency {
        options.max_concurrency = concurrency;
    }
    apply_cli_external(&mut options.external_packages_options, args)?;

    let package_paths: Vec<String> = args
        .packages
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    options.packages = if !package_paths.is_empty() {
        package_paths
    } else {
        file.packages.unwrap_or_default()
    };

    if options.packages.is_empty() {
        return Err(ScanError::Config("no packages given (pass a manifest path or set packages in typegraph.toml)".into()));
    }

    Ok(options)
}

fn apply_file_external(
    out: &mut ExternalPackagesOptions,
    external: &FileExternalConfig,
) -> Result<(), ScanError> {
    if let Some(names) = &external.scan_mode {
        out.scan_mode = parse_scan_mode(names, "external.scan_mode")?;
    }
    if let Some(parse_files) = external.parse_files {
        out.parse_files = parse_files;
    }
    if let Some(visibility) = external.visibility {
        out.visibility = visibility.into();
    }
    if let Some(max_distance) = external.max_distance {
        out.max_distance = max_distance;
    }
    if let Some(out_of_scope) = external.out_of_scope {
        out.out_of_scope = out_of_scope.into();
    }
    Ok(())
}

fn apply_cli_external(out: &mut ExternalPackagesOptions, args: &CliArgs) -> Result<(), ScanError> {
    if let Some(names) = &args.external_scan_mode {
        out.scan_mode = parse_scan_mode(names, "--external-scan-mode")?;
    }
    out.parse_files = out.parse_files || args.external_parse_files;
    if let Some(visibility) = args.external_visibility {
        out.visibility = visibility.into();
    }
    if let Some(max_distance) = args.external_max_distance {
        out.max_distance = max_distance;
    }
    if let Some(out_of_scope) = args.out_of_scope {
        out.out_of_scope = out_of_scope.into();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn rejects_empty_package_list() {
        let args = CliArgs::parse_from(["tg"]);
        let err = resolve(&args, None).unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn cli_scan_mode_overrides_file_scan_mode() {
        let args = CliArgs::parse_from(["tg", "pkg.json", "--scan-mode", "full"]);
        let file = FileConfig {
            scan_mode: Some(vec!["basic".to_string()]),
            ..Default::default()
        };
        let options = resolve(&args, Some(file)).unwrap();
        assert!(options.scan_mode.contains(ScanMode::DOCS));
    }

    #[test]
    fn file_fills_in_what_cli_leaves_unset() {
        let args = CliArgs::parse_from(["tg", "pkg.json"]);
        let file = FileConfig {
            visibility: Some(VisibilityName::Exported),
            max_concurrency: Some(4),
            ..Default::default()
        };
        let options = resolve(&args, Some(file)).unwrap();
        assert_eq!(options.visibility, Visibility::Exported);
        assert_eq!(options.max_concurrency, 4);
    }

    #[test]
    fn rejects_unknown_scan_mode_name() {
        let args = CliArgs::parse_from(["tg", "pkg.json", "--scan-mode", "bogus"]);
        let err = resolve(&args, None).unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn toml_parses_a_full_file() {
        let text = r#"
            packages = ["example.com/mod/pkg"]
            scan_mode = ["types", "methods"]
            log_level = "debug"
            max_concurrency = 8

            [external]
            parse_files = true
            max_distance = 3
            out_of_scope = "warn"
        "#;
        let file = FileConfig::from_toml_str(text).unwrap();
        assert_eq!(file.packages, Some(vec!["example.com/mod/pkg".to_string()]));
        assert_eq!(file.max_concurrency, Some(8));
        assert_eq!(file.external.unwrap().max_distance, Some(3));
    }
}

//! Command-line arguments (§13 "`tg-cli::args::CliArgs` is a `clap::Parser`
//! struct exposing every recognized option in §6's Configuration table").
//!
//! Mirrors `tsz-cli/src/args.rs`'s derive style: long flag names, `alias`
//! for the occasional shorthand, `value_delimiter` for list-valued flags,
//! small local `ValueEnum` wrappers around the core's own option enums.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Arguments for the `tg` binary.
#[derive(Parser, Debug)]
#[command(
    name = "tg",
    version,
    about = "Materializes a package graph of types, values and comments"
)]
pub struct CliArgs {
    /// Package manifest files to scan (see `tg-cli::manifest` for the JSON
    /// shape); each one becomes a scanned root at distance 0.
    pub packages: Vec<PathBuf>,

    /// Path to a `typegraph.toml` configuration file.
    #[arg(long = "config", short = 'c')]
    pub config: Option<PathBuf>,

    /// Scan-mode flags, comma-separated (types, methods, fields, functions,
    /// docs, comments, constants, variables) or a preset (basic, default,
    /// full).
    #[arg(long = "scanMode", alias = "scan-mode", value_delimiter = ',')]
    pub scan_mode: Option<Vec<String>>,

    /// Which members survive visibility filtering.
    #[arg(long, value_enum, ignore_case = true)]
    pub visibility: Option<VisibilityArg>,

    /// Scan mode applied to types reached only via imports, outside the
    /// scanned roots.
    #[arg(
        long = "externalScanMode",
        alias = "external-scan-mode",
        value_delimiter = ','
    )]
    pub external_scan_mode: Option<Vec<String>>,

    /// Visibility filter for external types.
    #[arg(long = "externalVisibility", alias = "external-visibility", value_enum, ignore_case = true)]
    pub external_visibility: Option<VisibilityArg>,

    /// Whether to parse external packages' ASTs for comments.
    #[arg(long = "externalParseFiles", alias = "external-parse-files")]
    pub external_parse_files: bool,

    /// Upper bound on distance at which external types are materialized.
    #[arg(long = "externalMaxDistance", alias = "external-max-distance")]
    pub external_max_distance: Option<u32>,

    /// What happens when an external reference exceeds the max distance.
    #[arg(long = "outOfScope", alias = "out-of-scope", value_enum, ignore_case = true)]
    pub out_of_scope: Option<OutOfScopeArg>,

    /// Logging verbosity.
    #[arg(long = "logLevel", alias = "log-level", value_enum, ignore_case = true)]
    pub log_level: Option<LogLevelArg>,

    /// Worker count; 0 (the default) means available parallelism.
    #[arg(long = "maxConcurrency", alias = "max-concurrency")]
    pub max_concurrency: Option<usize>,

    /// Write two-space-indented JSON instead of the compact default.
    #[arg(long)]
    pub pretty: bool,

    /// Write the output tree here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Read/write the gzip cache envelope at this path, reusing a fresh
    /// cache instead of re-scanning when none of `packages` is newer.
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Render nested spans (per-package, per-descriptor) indented via
    /// `tracing-tree` instead of flat `tracing-subscriber` formatting.
    #[arg(long = "traceTree", alias = "trace-tree")]
    pub trace_tree: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum VisibilityArg {
    Exported,
    Unexported,
    Both,
}

impl From<VisibilityArg> for tg_common::Visibility {
    fn from(value: VisibilityArg) -> Self {
        match value {
            VisibilityArg::Exported => tg_common::Visibility::Exported,
            VisibilityArg::Unexported => tg_common::Visibility::Unexported,
            VisibilityArg::Both => tg_common::Visibility::Both,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutOfScopeArg {
    Ignore,
    Warn,
    Error,
}

impl From<OutOfScopeArg> for tg_common::OutOfScopeAction {
    fn from(value: OutOfScopeArg) -> Self {
        match value {
            OutOfScopeArg::Ignore => tg_common::OutOfScopeAction::Ignore,
            OutOfScopeArg::Warn => tg_common::OutOfScopeAction::Warn,
            OutOfScopeArg::Error => tg_common::OutOfScopeAction::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LogLevelArg {
    Debug,
    Info,
    Warn,
    Error,
    #[value(name = "none")]
    None,
}

impl From<LogLevelArg> for tg_common::LogLevel {
    fn from(value: LogLevelArg) -> Self {
        match value {
            LogLevelArg::Debug => tg_common::LogLevel::Debug,
            LogLevelArg::Info => tg_common::LogLevel::Info,
            LogLevelArg::Warn => tg_common::LogLevel::Warn,
            LogLevelArg::Error => tg_common::LogLevel::Error,
            LogLevelArg::None => tg_common::LogLevel::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parses_packages_and_scan_mode() {
        let args = CliArgs::parse_from([
            "tg",
            "pkg.json",
            "--scan-mode",
            "types,methods",
            "--visibility",
            "exported",
        ]);
        assert_eq!(args.packages, vec![PathBuf::from("pkg.json")]);
        assert_eq!(args.scan_mode, Some(vec!["types".to_string(), "methods".to_string()]));
        assert_eq!(args.visibility, Some(VisibilityArg::Exported));
    }
}

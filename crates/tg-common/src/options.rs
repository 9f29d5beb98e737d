//! Scan configuration recognized by the core (§6 "Configuration (consumed)").
//!
//! The CLI (`tg-cli::config`) is responsible for merging a TOML file with
//! command-line flags into a `ScanOptions`; this module only defines the
//! shape the core actually consumes, plus validation helpers shared by both
//! the CLI and any embedder calling `tg_scan::scan` directly.

use serde::{Deserialize, Serialize};

/// Bitmask over {types, methods, fields, functions, docs, comments,
/// constants, variables}, per §6.
///
/// Modeled as a plain bitflag struct (mirrors `FileFeatures` in the
/// teacher's binder) rather than pulling in the `bitflags` crate, since the
/// set is small, closed, and never grows at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMode(u16);

impl ScanMode {
    pub const NONE: Self = Self(0);
    pub const TYPES: Self = Self(1 << 0);
    pub const METHODS: Self = Self(1 << 1);
    pub const FIELDS: Self = Self(1 << 2);
    pub const FUNCTIONS: Self = Self(1 << 3);
    pub const DOCS: Self = Self(1 << 4);
    pub const COMMENTS: Self = Self(1 << 5);
    pub const CONSTANTS: Self = Self(1 << 6);
    pub const VARIABLES: Self = Self(1 << 7);

    /// Preset: types only, no members, no docs.
    pub const BASIC: Self = Self(Self::TYPES.0);
    /// Preset: types, methods, fields, functions - no docs/comments.
    pub const DEFAULT: Self = Self(
        Self::TYPES.0 | Self::METHODS.0 | Self::FIELDS.0 | Self::FUNCTIONS.0 | Self::CONSTANTS.0,
    );
    /// Preset: everything.
    pub const FULL: Self = Self(
        Self::TYPES.0
            | Self::METHODS.0
            | Self::FIELDS.0
            | Self::FUNCTIONS.0
            | Self::DOCS.0
            | Self::COMMENTS.0
            | Self::CONSTANTS.0
            | Self::VARIABLES.0,
    );

    #[must_use]
    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// The maximum of two scan modes, bit-wise - used when merging the
    /// configured mode with every installed processor's effective mode
    /// (§4.5 step 2).
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        self.union(other)
    }

    pub fn from_names(names: &[&str]) -> Option<Self> {
        let mut mode = Self::NONE;
        for name in names {
            let flag = match *name {
                "types" => Self::TYPES,
                "methods" => Self::METHODS,
                "fields" => Self::FIELDS,
                "functions" => Self::FUNCTIONS,
                "docs" => Self::DOCS,
                "comments" => Self::COMMENTS,
                "constants" => Self::CONSTANTS,
                "variables" => Self::VARIABLES,
                "basic" => Self::BASIC,
                "default" => Self::DEFAULT,
                "full" => Self::FULL,
                _ => return None,
            };
            mode = mode.union(flag);
        }
        Some(mode)
    }
}

impl Default for ScanMode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which members survive visibility filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Exported,
    Unexported,
    #[default]
    Both,
}

impl Visibility {
    #[must_use]
    pub const fn admits(self, exported: bool) -> bool {
        match self {
            Visibility::Exported => exported,
            Visibility::Unexported => !exported,
            Visibility::Both => true,
        }
    }
}

/// What happens when an external reference exceeds `max_distance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfScopeAction {
    #[default]
    Ignore,
    Warn,
    Error,
}

/// Scan-mode/visibility policy applied to types reached only via imports,
/// outside the scanned roots.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalPackagesOptions {
    pub scan_mode: ScanMode,
    pub parse_files: bool,
    pub visibility: Visibility,
    pub max_distance: u32,
    pub out_of_scope: OutOfScopeAction,
}

impl Default for ExternalPackagesOptions {
    fn default() -> Self {
        Self {
            scan_mode: ScanMode::BASIC,
            parse_files: false,
            visibility: Visibility::Exported,
            max_distance: u32::MAX,
            out_of_scope: OutOfScopeAction::Ignore,
        }
    }
}

/// Full set of options recognized by `tg_scan::scan`, per §6.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Ordered include/exclude patterns (`!` prefix excludes). Resolved to
    /// an ordered package list by the front-end, not by the core.
    pub packages: Vec<String>,
    pub scan_mode: ScanMode,
    pub visibility: Visibility,
    pub external_packages_options: ExternalPackagesOptions,
    pub log_level: LogLevel,
    /// 0 means "available parallelism".
    pub max_concurrency: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            scan_mode: ScanMode::default(),
            visibility: Visibility::default(),
            external_packages_options: ExternalPackagesOptions::default(),
            log_level: LogLevel::default(),
            max_concurrency: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    None,
}

impl LogLevel {
    pub const fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::None => "off",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_ordered_subsets() {
        assert!(ScanMode::FULL.contains(ScanMode::DEFAULT) || ScanMode::FULL.contains(ScanMode::BASIC));
        assert!(ScanMode::DEFAULT.contains(ScanMode::TYPES));
        assert!(ScanMode::DEFAULT.contains(ScanMode::METHODS));
        assert!(!ScanMode::BASIC.contains(ScanMode::METHODS));
    }

    #[test]
    fn max_takes_union() {
        let a = ScanMode::TYPES;
        let b = ScanMode::METHODS;
        let merged = a.max(b);
        assert!(merged.contains(ScanMode::TYPES));
        assert!(merged.contains(ScanMode::METHODS));
    }

    #[test]
    fn visibility_admits() {
        assert!(Visibility::Exported.admits(true));
        assert!(!Visibility::Exported.admits(false));
        assert!(Visibility::Unexported.admits(false));
        assert!(Visibility::Both.admits(true) && Visibility::Both.admits(false));
    }

    #[test]
    fn from_names_rejects_unknown() {
        assert!(ScanMode::from_names(&["types", "docs"]).is_some());
        assert!(ScanMode::from_names(&["bogus"]).is_none());
    }
}

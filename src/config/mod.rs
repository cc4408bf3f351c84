//! Generation settings: config file loading and resolution against the
//! command line.
//!
//! Precedence is command line, then `.compatgen.toml`, then built-in
//! defaults.

mod core;
pub mod loader;

pub use core::FileConfig;
pub use loader::{directory_ancestors, discover_config, load_config, parse_config, CONFIG_FILE_NAME};

use crate::engine::{parse_epoch_date, VersionSpec};
use crate::errors::Result;
use crate::history::{HistoryBackend, TextHistory};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Default prior and output table file name.
pub const DEFAULT_TABLE_FILE: &str = "natives_global_client_compat.lua";

/// Default epoch date for build numbers.
pub const DEFAULT_START_DATE: &str = "2023-01-01";

/// Sentinel value for `--in` / `--out` disabling the file.
pub const SKIP: &str = "skip";

/// A table file location, or explicitly none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TablePath {
    Skip,
    File(PathBuf),
}

impl TablePath {
    pub fn parse(value: &str) -> Self {
        if value == SKIP {
            Self::Skip
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Skip => None,
            Self::File(path) => Some(path),
        }
    }
}

impl Default for TablePath {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_TABLE_FILE))
    }
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<String>,
    pub output: Option<String>,
    pub version: Option<String>,
    pub start_date: Option<String>,
    pub use_history: Option<bool>,
    pub ignore_missing_input: Option<bool>,
    pub force: Option<bool>,
    pub backend: Option<HistoryBackend>,
    pub repo: Option<PathBuf>,
    pub history_from: Option<PathBuf>,
    pub no_fence_filter: bool,
}

/// Fully resolved settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub input: TablePath,
    pub output: TablePath,
    pub version: VersionSpec,
    pub epoch: NaiveDate,
    pub use_history: bool,
    pub ignore_missing_input: bool,
    pub force: bool,
    pub repo: PathBuf,
    pub backend: HistoryBackend,
    /// Read history text from here instead of the repository
    pub history_from: Option<TextHistory>,
    pub fence_filter: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            input: TablePath::default(),
            output: TablePath::default(),
            version: VersionSpec::default(),
            epoch: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            use_history: false,
            ignore_missing_input: false,
            force: false,
            repo: PathBuf::from("."),
            backend: HistoryBackend::default(),
            history_from: None,
            fence_filter: true,
        }
    }
}

impl GenerateOptions {
    /// Merge command line values over the config file over the defaults.
    pub fn resolve(cli: ConfigOverrides, file: FileConfig) -> Result<Self> {
        let defaults = Self::default();

        let input = cli
            .input
            .or(file.input)
            .map_or(defaults.input, |v| TablePath::parse(&v));
        let output = cli
            .output
            .or(file.output)
            .map_or(defaults.output, |v| TablePath::parse(&v));

        let version = match cli.version.or(file.version) {
            Some(text) => text.parse()?,
            None => defaults.version,
        };
        let epoch = parse_epoch_date(
            cli.start_date
                .or(file.start_date)
                .as_deref()
                .unwrap_or(DEFAULT_START_DATE),
        )?;

        Ok(Self {
            input,
            output,
            version,
            epoch,
            use_history: cli.use_history.or(file.use_history).unwrap_or_default(),
            ignore_missing_input: cli
                .ignore_missing_input
                .or(file.ignore_missing_input)
                .unwrap_or_default(),
            force: cli.force.or(file.force).unwrap_or_default(),
            repo: cli.repo.unwrap_or(defaults.repo),
            backend: cli.backend.or(file.backend).unwrap_or_default(),
            history_from: cli.history_from.map(TextHistory::from_arg),
            fence_filter: !cli.no_fence_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Version;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_without_any_source() {
        let options =
            GenerateOptions::resolve(ConfigOverrides::default(), FileConfig::default()).unwrap();
        assert_eq!(options, GenerateOptions::default());
        assert_eq!(
            options.epoch,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_cli_overrides_file_overrides_defaults() {
        let file = FileConfig {
            input: Some("file_in.lua".into()),
            output: Some("file_out.lua".into()),
            force: Some(true),
            use_history: Some(true),
            ..FileConfig::default()
        };
        let cli = ConfigOverrides {
            input: Some("cli_in.lua".into()),
            force: Some(false),
            ..ConfigOverrides::default()
        };

        let options = GenerateOptions::resolve(cli, file).unwrap();

        assert_eq!(options.input, TablePath::File("cli_in.lua".into()));
        assert_eq!(options.output, TablePath::File("file_out.lua".into()));
        assert!(!options.force);
        assert!(options.use_history);
    }

    #[test]
    fn test_skip_sentinel() {
        let cli = ConfigOverrides {
            input: Some("skip".into()),
            output: Some("skip".into()),
            ..ConfigOverrides::default()
        };
        let options = GenerateOptions::resolve(cli, FileConfig::default()).unwrap();
        assert_eq!(options.input, TablePath::Skip);
        assert!(options.output.as_path().is_none());
    }

    #[test]
    fn test_exact_version_from_file() {
        let file = FileConfig {
            version: Some("1.2.3.4".into()),
            ..FileConfig::default()
        };
        let options = GenerateOptions::resolve(ConfigOverrides::default(), file).unwrap();
        assert_eq!(
            options.version,
            VersionSpec::Exact(Version::from_parts([1, 2, 3, 4]).unwrap())
        );
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let bad_version = FileConfig {
            version: Some("7".into()),
            ..FileConfig::default()
        };
        let err = GenerateOptions::resolve(ConfigOverrides::default(), bad_version).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let bad_date = ConfigOverrides {
            start_date: Some("yesterday".into()),
            ..ConfigOverrides::default()
        };
        let err = GenerateOptions::resolve(bad_date, FileConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_history_from_dash_is_stdin() {
        let cli = ConfigOverrides {
            history_from: Some("-".into()),
            no_fence_filter: true,
            ..ConfigOverrides::default()
        };
        let options = GenerateOptions::resolve(cli, FileConfig::default()).unwrap();
        assert_eq!(options.history_from, Some(TextHistory::Stdin));
        assert!(!options.fence_filter);
    }
}

use crate::config::ConfigOverrides;
use crate::history::HistoryBackend;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "compatgen")]
#[command(
    about = "Generate the native function compatibility table from version-control history",
    long_about = None
)]
#[command(version)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Previous table to start from and append to (`skip` for none)
    /// [default: natives_global_client_compat.lua]
    #[arg(long = "in", value_name = "PATH|skip", env = "COMPATGEN_IN")]
    pub input: Option<String>,

    /// Where to write the new table (`skip` to only report)
    /// [default: natives_global_client_compat.lua]
    #[arg(long = "out", value_name = "PATH|skip", env = "COMPATGEN_OUT")]
    pub output: Option<String>,

    /// Write the table even if no changes were found
    #[arg(
        short = 'f',
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub force: Option<bool>,

    /// Version to write: `major.minor` derives build and revision, four
    /// numbers are used as is [default: 2.0]
    #[arg(long = "set-version", value_name = "VERSION")]
    pub set_version: Option<String>,

    /// Epoch for build numbers and start of the scanned history, YYYY-MM-DD
    /// [default: 2023-01-01]
    #[arg(long = "start-date", value_name = "DATE")]
    pub start_date: Option<String>,

    /// Scan every commit since the start date instead of only the latest one
    #[arg(
        short = 'h',
        long = "use-history",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub use_history: Option<bool>,

    /// Continue with an empty table when the input file does not exist
    #[arg(
        short = 'i',
        long = "ignore-missing-in",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub ignore_missing_in: Option<bool>,

    /// Repository to read history from
    #[arg(long, value_name = "PATH", env = "COMPATGEN_REPO")]
    pub repo: Option<PathBuf>,

    /// How to read the repository history
    #[arg(long, value_enum)]
    pub backend: Option<HistoryBackend>,

    /// Read patch text from a file, or stdin with `-`, instead of the repository
    #[arg(long = "history-from", value_name = "PATH|-")]
    pub history_from: Option<PathBuf>,

    /// Scan every line instead of only fenced ```c blocks
    #[arg(long = "no-fence-filter")]
    pub no_fence_filter: bool,

    /// Config file to use instead of searching for .compatgen.toml
    #[arg(long, value_name = "PATH", env = "COMPATGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbosity: u8,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// Options given on the command line, for merging with the config file.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            output: self.output.clone(),
            version: self.set_version.clone(),
            start_date: self.start_date.clone(),
            use_history: self.use_history,
            ignore_missing_input: self.ignore_missing_in,
            force: self.force,
            backend: self.backend,
            repo: self.repo.clone(),
            history_from: self.history_from.clone(),
            no_fence_filter: self.no_fence_filter,
        }
    }

    /// Default log filter directive for the chosen verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["compatgen"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_h_is_use_history() {
        let cli = parse(&["-h"]);
        assert_eq!(cli.use_history, Some(true));
    }

    #[test]
    fn test_boolean_options_accept_values() {
        let cli = parse(&["--force=false", "--use-history=1", "-i=0"]);
        assert_eq!(cli.force, Some(false));
        assert_eq!(cli.use_history, Some(true));
        assert_eq!(cli.ignore_missing_in, Some(false));
    }

    #[test]
    fn test_bare_flags_mean_true() {
        let cli = parse(&["-f", "--ignore-missing-in"]);
        assert_eq!(cli.force, Some(true));
        assert_eq!(cli.ignore_missing_in, Some(true));
        assert_eq!(cli.use_history, None);
    }

    #[test]
    fn test_in_out_and_version() {
        let cli = parse(&["--in=skip", "--out", "new.lua", "--set-version=2.0.5.1"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.input.as_deref(), Some("skip"));
        assert_eq!(overrides.output.as_deref(), Some("new.lua"));
        assert_eq!(overrides.version.as_deref(), Some("2.0.5.1"));
    }

    #[test]
    fn test_backend_value() {
        let cli = parse(&["--backend", "libgit2"]);
        assert_eq!(cli.backend, Some(HistoryBackend::Libgit2));
        assert!(Cli::try_parse_from(["compatgen", "--backend", "svn"]).is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&[]).log_level(), "warn");
        assert_eq!(parse(&["-v"]).log_level(), "info");
        assert_eq!(parse(&["-vv"]).log_level(), "debug");
        assert_eq!(parse(&["-vvvv"]).log_level(), "trace");
    }

    #[test]
    fn test_long_help_is_available() {
        let err = Cli::try_parse_from(["compatgen", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}

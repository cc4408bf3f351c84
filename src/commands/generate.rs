use crate::config::GenerateOptions;
use crate::core::Version;
use crate::engine::merge;
use crate::errors::Result;
use crate::extraction::signature_stream;
use crate::history::{repository_source, HistoryMode, HistorySource};
use crate::io::{load_file, serialize, write_atomically};
use crate::observability::{set_current_file, set_history_source, set_phase, GenerationPhase};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    /// Identifiers read from the prior table
    pub loaded: usize,
    /// Signatures added by this run
    pub changes: usize,
    /// Version of the generated table
    pub version: Version,
    /// Where the table was written, if it was
    pub written: Option<PathBuf>,
}

/// History source selected by `options`.
pub fn history_source(options: &GenerateOptions) -> Box<dyn HistorySource> {
    if let Some(text) = &options.history_from {
        return Box::new(text.clone());
    }
    let mode = if options.use_history {
        HistoryMode::Since(options.epoch)
    } else {
        HistoryMode::LatestCommit
    };
    repository_source(options.backend, &options.repo, mode)
}

/// Run a generation with the current time.
pub fn run_generate(options: &GenerateOptions) -> Result<GenerateOutcome> {
    run_generate_at(options, Utc::now())
}

/// Run a generation as if it happened at `now`.
///
/// The output file is written only when new signatures were found or
/// `force` is set, and never when the output is `skip`.
pub fn run_generate_at(options: &GenerateOptions, now: DateTime<Utc>) -> Result<GenerateOutcome> {
    let loaded = {
        let _phase = set_phase(GenerationPhase::LoadingPriorTable);
        let _span = tracing::info_span!("load_prior_table").entered();
        let _file = options.input.as_path().map(set_current_file);
        load_file(options.input.as_path(), options.ignore_missing_input)?
    };
    tracing::debug!(
        signatures = loaded.signature_count,
        entries = loaded.table.len(),
        version = %loaded.version,
        "prior table loaded"
    );

    let version = {
        let _phase = set_phase(GenerationPhase::ResolvingVersion);
        options.version.resolve(options.epoch, loaded.version, now)?
    };
    tracing::debug!(%version, "version resolved");

    let loaded_count = loaded.table.len();
    let mut table = loaded.table;
    let changes = {
        let _phase = set_phase(GenerationPhase::ScanningHistory);
        let source = history_source(options);
        let description = source.describe();
        let _source = set_history_source(description.clone());
        let _span = tracing::info_span!("scan_history", source = %description).entered();

        let mut stream = signature_stream(source.open()?, options.fence_filter);
        let changes = merge(&mut table, &mut stream);
        let stats = stream.stats();
        tracing::debug!(
            lines = stats.lines,
            markers = stats.markers,
            invalid_markers = stats.invalid_markers,
            signatures = stats.signatures,
            orphaned = stats.orphaned,
            noise = stats.noise,
            changes,
            "history scanned"
        );
        changes
    };

    let mut written = None;
    if changes > 0 || options.force {
        if let Some(path) = options.output.as_path() {
            let _phase = set_phase(GenerationPhase::Writing);
            let _span = tracing::info_span!("write_table", path = %path.display()).entered();
            let _file = set_current_file(path);
            write_atomically(path, &serialize(&table, &version))?;
            written = Some(path.to_path_buf());
        }
    }

    Ok(GenerateOutcome {
        loaded: loaded_count,
        changes,
        version,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TablePath;
    use crate::history::TextHistory;
    use chrono::TimeZone;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const PATCH: &str = indoc! {r#"
        +```c
        +// 0x1f3c2d9a
        +void SET_ENTITY_COORDS(Entity entity, Vector3 pos, BOOL* ok);
        +```
    "#};

    fn options_in(dir: &TempDir) -> GenerateOptions {
        let history = dir.path().join("history.patch");
        fs::write(&history, PATCH).unwrap();
        GenerateOptions {
            input: TablePath::File(dir.path().join("in.lua")),
            output: TablePath::File(dir.path().join("out.lua")),
            ignore_missing_input: true,
            history_from: Some(TextHistory::File(history)),
            ..GenerateOptions::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 11, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_generates_table_from_history_text() {
        let dir = TempDir::new().unwrap();
        let options = options_in(&dir);

        let outcome = run_generate_at(&options, now()).unwrap();

        assert_eq!(outcome.loaded, 0);
        assert_eq!(outcome.changes, 1);
        assert_eq!(outcome.version.parts(), [2, 0, 10, 0]);
        let written = fs::read_to_string(dir.path().join("out.lua")).unwrap();
        assert!(written.contains("[0x1f3c2d9a] = {\n"));
        assert!(written.contains(
            "\t{ \"void\", \"ulong\", \"ulong\", \"ulong\", \"ulong\", \"ulong*\" },\n"
        ));
    }

    #[test]
    fn test_no_changes_skips_write() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        run_generate_at(&options, now()).unwrap();
        options.input = options.output.clone();
        options.output = TablePath::File(dir.path().join("second.lua"));

        let outcome = run_generate_at(&options, now()).unwrap();

        assert_eq!(outcome.loaded, 1);
        assert_eq!(outcome.changes, 0);
        assert_eq!(outcome.written, None);
        assert!(!dir.path().join("second.lua").exists());
    }

    #[test]
    fn test_loaded_counts_identifiers_not_signatures() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        let prior = dir.path().join("in.lua");
        fs::write(
            &prior,
            indoc! {r#"
                version = { 2, 0, 10, 0 }
                compatibility = {
                [0x1f3c2d9a] = {
                    { "void", "ulong" },
                    { "void", "ulong", "ulong" },
                },
                }
            "#},
        )
        .unwrap();
        options.input = TablePath::File(prior);

        let outcome = run_generate_at(&options, now()).unwrap();

        assert_eq!(outcome.loaded, 1);
        assert_eq!(outcome.changes, 1);
    }

    #[test]
    fn test_force_writes_without_changes() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        run_generate_at(&options, now()).unwrap();
        options.input = options.output.clone();
        options.force = true;

        let outcome = run_generate_at(&options, now()).unwrap();

        assert_eq!(outcome.changes, 0);
        assert_eq!(outcome.version.parts(), [2, 0, 10, 1]);
        assert!(outcome.written.is_some());
    }

    #[test]
    fn test_output_skip_never_writes() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        options.output = TablePath::Skip;
        options.force = true;

        let outcome = run_generate_at(&options, now()).unwrap();

        assert_eq!(outcome.changes, 1);
        assert_eq!(outcome.written, None);
    }

    #[test]
    fn test_missing_input_is_fatal_without_ignore() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        options.ignore_missing_input = false;

        let err = run_generate_at(&options, now()).unwrap_err();

        assert_eq!(err.exit_code(), 3);
        assert!(!dir.path().join("out.lua").exists());
    }

    #[test]
    fn test_history_mode_follows_use_history() {
        let options = GenerateOptions {
            use_history: true,
            ..GenerateOptions::default()
        };
        assert!(history_source(&options).describe().contains("git log"));

        let latest = GenerateOptions::default();
        assert!(history_source(&latest).describe().contains("diff-tree"));
    }
}

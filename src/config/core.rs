use crate::history::HistoryBackend;
use serde::Deserialize;

/// Contents of a `.compatgen.toml` file.
///
/// Every key is optional; missing keys fall back to the built-in defaults
/// and command line options override whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Prior table path, or `skip`
    #[serde(default)]
    pub input: Option<String>,

    /// Output table path, or `skip`
    #[serde(default)]
    pub output: Option<String>,

    /// `major.minor` or a full four-part version
    #[serde(default)]
    pub version: Option<String>,

    /// Epoch date for build numbers, `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub use_history: Option<bool>,

    #[serde(default)]
    pub ignore_missing_input: Option<bool>,

    #[serde(default)]
    pub force: Option<bool>,

    #[serde(default)]
    pub backend: Option<HistoryBackend>,
}

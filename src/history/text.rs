use super::lines::LossyLines;
use super::HistorySource;
use crate::errors::{CompatError, Result};
use crate::extraction::Lines;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// History text supplied from a file, or from stdin for `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextHistory {
    Stdin,
    File(PathBuf),
}

impl TextHistory {
    pub fn from_arg(arg: impl Into<PathBuf>) -> Self {
        let path = arg.into();
        if path.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(path)
        }
    }
}

impl HistorySource for TextHistory {
    fn describe(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    fn open(&self) -> Result<Lines> {
        match self {
            Self::Stdin => Ok(Box::new(LossyLines::new(BufReader::new(std::io::stdin())))),
            Self::File(path) => {
                let file = File::open(path).map_err(|e| {
                    CompatError::history(
                        format!("Failed to open history text {}", path.display()),
                        e,
                    )
                })?;
                Ok(Box::new(LossyLines::new(BufReader::new(file))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_means_stdin() {
        assert_eq!(TextHistory::from_arg("-"), TextHistory::Stdin);
        assert_eq!(
            TextHistory::from_arg("log.patch"),
            TextHistory::File(PathBuf::from("log.patch"))
        );
    }

    #[test]
    fn test_reads_file_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("history.patch");
        std::fs::write(&path, "// 0x10\n+int A();\n").unwrap();

        let lines: Vec<String> = TextHistory::File(path).open().unwrap().collect();
        assert_eq!(lines, vec!["// 0x10", "+int A();"]);
    }

    #[test]
    fn test_missing_file_is_history_error() {
        let err = TextHistory::File(PathBuf::from("/nonexistent/history.patch"))
            .open()
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 9);
    }
}

use std::io::{BufRead, ErrorKind};

/// Line iterator that never fails.
///
/// Invalid UTF-8 is replaced rather than rejected (history contains
/// arbitrary file content), and a read error ends the stream as if the input
/// had been truncated there. Line terminators are removed.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
    done: bool,
    truncated: bool,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            done: false,
            truncated: false,
        }
    }

    /// Whether the stream ended on a read error instead of end of input.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        self.buf.clear();
        loop {
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {
                    while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                        self.buf.pop();
                    }
                    return Some(String::from_utf8_lossy(&self.buf).into_owned());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "history stream ended early");
                    self.done = true;
                    self.truncated = true;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    #[test]
    fn test_strips_terminators() {
        let lines: Vec<String> = LossyLines::new(Cursor::new("a\r\nb\nc")).collect();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let bytes: &[u8] = b"+int A();\n\xff\xfe\n// 0x1\n";
        let lines: Vec<String> = LossyLines::new(Cursor::new(bytes)).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "// 0x1");
    }

    struct FailingAfter {
        data: Cursor<&'static [u8]>,
    }

    impl Read for FailingAfter {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(std::io::Error::new(ErrorKind::BrokenPipe, "killed")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_error_is_end_of_input() {
        let reader = BufReader::new(FailingAfter {
            data: Cursor::new(b"one\ntwo"),
        });
        let mut lines = LossyLines::new(reader);
        assert_eq!(lines.next().as_deref(), Some("one"));
        assert_eq!(lines.next(), None);
        assert!(lines.truncated());
        assert_eq!(lines.next(), None);
    }
}

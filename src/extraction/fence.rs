//! Code-fence pre-filter for documentation diffs.
//!
//! Native declarations live in "```c" blocks of markdown documentation. When
//! scanning patches, only the lines inside such a block are of interest; the
//! surrounding prose regularly contains text that would otherwise look like
//! a call.

/// True for an added or unchanged line that opens a C code block.
fn opens_block(line: &str) -> bool {
    line.ends_with("+```c") || line.ends_with(" ```c")
}

/// True for an added or unchanged fence line. Removed fences (`-````) keep
/// the block open.
fn closes_block(line: &str) -> bool {
    line.contains("+```") || line.contains(" ```")
}

/// Iterator adapter yielding only the lines inside C code blocks.
///
/// Fence lines themselves are never yielded.
pub struct CodeFenceFilter<I> {
    lines: I,
    inside: bool,
}

impl<I> CodeFenceFilter<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            inside: false,
        }
    }
}

impl<I> Iterator for CodeFenceFilter<I>
where
    I: Iterator<Item = String>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for line in self.lines.by_ref() {
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if !self.inside {
                self.inside = opens_block(trimmed);
                continue;
            }
            if closes_block(trimmed) {
                self.inside = false;
                continue;
            }
            if trimmed.ends_with("```") {
                continue;
            }
            return Some(line);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn filter(text: &str) -> Vec<String> {
        CodeFenceFilter::new(text.lines().map(str::to_string)).collect()
    }

    #[test]
    fn test_only_block_contents_pass() {
        let text = indoc! {"
            +Some prose that mentions CALL(x) in passing
            +```c
            +// 0x1234
            +int FOO(int a);
            +```
            +More prose FOO(y)
        "};
        assert_eq!(filter(text), vec!["+// 0x1234", "+int FOO(int a);"]);
    }

    #[test]
    fn test_context_fences_open_and_close() {
        let text = " ```c\n-int OLD(int a);\n+int NEW(int a, int b);\n ```\n+int AFTER();\n";
        assert_eq!(filter(text), vec!["-int OLD(int a);", "+int NEW(int a, int b);"]);
    }

    #[test]
    fn test_removed_fences_do_not_toggle() {
        let text = "+```c\n+int A();\n-```\n+int B();\n+```\n+int C();\n";
        assert_eq!(filter(text), vec!["+int A();", "+int B();"]);
    }

    #[test]
    fn test_removed_opening_fence_does_not_open() {
        let text = "-```c\n-int A();\n-```\n";
        assert!(filter(text).is_empty());
    }

    #[test]
    fn test_unterminated_block_yields_until_end() {
        let text = "+```c\n+int A();\n+int B();";
        assert_eq!(filter(text), vec!["+int A();", "+int B();"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let lines = ["+```c\r", "+int A();\r", "+```\r"].map(str::to_string);
        let kept: Vec<String> = CodeFenceFilter::new(lines.into_iter()).collect();
        assert_eq!(kept, vec!["+int A();\r"]);
    }
}

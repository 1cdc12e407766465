//! Presenting compiler diagnostics.

use std::io::{self, Write};

use tracing::trace;

use crate::compiler::CompileResult;

/// Header printed before a full diagnostic dump.
pub const FULL_DUMP_HEADER: &str = ">>> Compilation error";

/// Marks a diagnostic reported against the wrapping `main` function.
const ENTRY_POINT_MARKER: &str = "int main()";

const FALLBACK_MESSAGE: &str = "compilation failed";

/// How diagnostics are shown after a failed compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Header plus the compiler's output verbatim
    Full,
    /// One best-guess line for sources that look complete
    #[default]
    Context,
}

/// Print `result` in the given mode.
pub fn report<W: Write>(mode: ReportMode, result: &CompileResult, out: &mut W) -> io::Result<()> {
    match mode {
        ReportMode::Full => full_dump(result, out),
        ReportMode::Context => print_context(result, out),
    }
}

/// Header line followed by the merged compiler output.
pub fn full_dump<W: Write>(result: &CompileResult, out: &mut W) -> io::Result<()> {
    writeln!(out, "{FULL_DUMP_HEADER}")?;
    out.write_all(result.merged_output.as_bytes())?;
    out.flush()
}

/// Print the contextual line, if the source calls for one.
pub fn print_context<W: Write>(result: &CompileResult, out: &mut W) -> io::Result<()> {
    if let Some(line) = context_line(result) {
        writeln!(out, "{line}")?;
        out.flush()?;
    }
    Ok(())
}

/// Single most useful diagnostic line.
///
/// `None` while the source still looks unfinished, i.e. does not end with
/// `;` or `}`; interactive fragments are expected to fail until then.
pub fn context_line(result: &CompileResult) -> Option<String> {
    let source = result.source_used.trim();
    if !(source.ends_with(';') || source.ends_with('}')) {
        trace!(target: "cxxrun::report", "source looks incomplete, diagnostics suppressed");
        return None;
    }

    let lines: Vec<&str> = result.merged_output.split('\n').collect();
    let first = lines.first().copied().unwrap_or_default();
    let chosen = if first.contains(ENTRY_POINT_MARKER) {
        lines.get(1).copied().unwrap_or_default()
    } else {
        first
    };

    let message = strip_location(chosen.trim_end());
    if !message.trim().is_empty() {
        return Some(message.to_string());
    }

    let fallback = lines
        .iter()
        .filter(|l| !l.contains(ENTRY_POINT_MARKER))
        .map(|l| strip_location(l.trim_end()))
        .find(|l| !l.trim().is_empty())
        .unwrap_or(FALLBACK_MESSAGE);
    Some(fallback.to_string())
}

/// Drop a leading `file:line:col: ` prefix.
fn strip_location(line: &str) -> &str {
    match line.find(": ") {
        Some(idx) if idx > 0 => &line[idx + 2..],
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(source: &str, output: &str) -> CompileResult {
        CompileResult {
            succeeded: false,
            merged_output: output.to_string(),
            source_used: source.to_string(),
        }
    }

    const GCC_OUTPUT: &str = "<stdin>: In function 'int main()':\n\
                              <stdin>:3:5: error: 'foo' was not declared in this scope\n\
                              \x20   3 |     foo();\n";

    #[test]
    fn test_full_dump() {
        let mut out = Vec::new();
        full_dump(&failed("x", "line one\nline two\n"), &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ">>> Compilation error\nline one\nline two\n"
        );
    }

    #[test]
    fn test_entry_point_line_is_skipped() {
        let line = context_line(&failed("foo();", GCC_OUTPUT)).unwrap();
        assert_eq!(line, "error: 'foo' was not declared in this scope");
    }

    #[test]
    fn test_first_line_used_when_not_anchored() {
        let output = "prog.cpp:1:9: error: expected ';' at end of declaration\n";
        let line = context_line(&failed("int x = 1 }", output)).unwrap();
        assert_eq!(line, "error: expected ';' at end of declaration");
    }

    #[test]
    fn test_incomplete_source_is_silent() {
        assert!(context_line(&failed("for (int i = 0; i < 3; ++i) {", GCC_OUTPUT)).is_none());
        assert!(context_line(&failed("int x = ", GCC_OUTPUT)).is_none());

        let mut out = Vec::new();
        print_context(&failed("int x = ", GCC_OUTPUT), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_complete_source_prints_one_line() {
        let mut out = Vec::new();
        report(ReportMode::Context, &failed("  int y;  ", GCC_OUTPUT), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!text.trim().is_empty());
    }

    #[test]
    fn test_never_empty_for_complete_source() {
        assert_eq!(context_line(&failed("x;", "")).unwrap(), "compilation failed");
        assert_eq!(
            context_line(&failed("x;", "<stdin>: In function 'int main()':\n\nld: cannot find -lfoo\n")).unwrap(),
            "cannot find -lfoo"
        );
    }

    #[test]
    fn test_line_without_prefix_is_kept() {
        assert_eq!(strip_location("no location here"), "no location here");
        assert_eq!(strip_location(": leading"), ": leading");
    }
}

//! Loading program text from a script file.

use std::path::Path;

use crate::error::{RunnerError, RunnerResult};

/// Read a source file and drop a leading `#!` line.
pub fn read_program(path: &Path) -> RunnerResult<String> {
    let contents = std::fs::read_to_string(path).map_err(|source| RunnerError::SourceRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(program_text(&contents))
}

/// Program body of a script: without its shebang line if it has one,
/// otherwise the whole text with the first line trimmed.
pub fn program_text(contents: &str) -> String {
    let (first, rest) = contents.split_once('\n').unwrap_or((contents, ""));
    let first = first.trim();
    if first.starts_with("#!") {
        rest.to_string()
    } else {
        format!("{first}\n{rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shebang_is_dropped() {
        let text = program_text("#!/usr/bin/env cxxrun\nint main() { return 0; }\n");
        assert_eq!(text, "int main() { return 0; }\n");
    }

    #[test]
    fn test_first_line_is_kept_without_shebang() {
        let text = program_text("#include <cstdio>\nint main() {}\n");
        assert_eq!(text, "#include <cstdio>\nint main() {}\n");
    }

    #[test]
    fn test_crlf_first_line() {
        let text = program_text("#!cxxrun\r\nint x;\r\n");
        assert_eq!(text, "int x;\r\n");
    }

    #[test]
    fn test_single_line_file() {
        assert_eq!(program_text("int main(){}"), "int main(){}\n");
        assert_eq!(program_text("#!/bin/cxxrun"), "");
    }

    #[test]
    fn test_missing_file() {
        let err = read_program(Path::new("/definitely/not/here.cpp")).unwrap_err();
        assert!(matches!(err, RunnerError::SourceRead { .. }));
    }
}

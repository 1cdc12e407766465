//! Build directives embedded in source comments.
//!
//! ```text
//! // CompileOptions: -O2 -lm
//! // CXX: clang++
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

static COMPILE_OPTIONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)//\s*CompileOptions\s*:([^\n]*)").expect("valid regex"));

static CXX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//\s*CXX\s*:([^\n]*)").expect("valid regex"));

/// Directives found in a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAnnotations {
    /// Raw text after `CompileOptions:`, appended to the default flags
    pub compile_options: String,
    /// Compiler named by a `CXX:` directive, trimmed and non-empty
    pub compiler: Option<String>,
}

impl SourceAnnotations {
    /// Scan `source` for directives.
    ///
    /// Returns `None` without a `CompileOptions` directive; a `CXX` line on
    /// its own is not an override. The first occurrence of each directive wins.
    pub fn scan(source: &str) -> Option<Self> {
        let compile_options = COMPILE_OPTIONS_RE.captures(source)?.get(1)?.as_str().to_string();

        let compiler = CXX_RE
            .captures(source)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Some(Self {
            compile_options,
            compiler,
        })
    }

    /// The `CXX` override, or `default` when the source names none.
    pub fn compiler_or(&self, default: String) -> String {
        self.compiler.clone().unwrap_or(default)
    }
}

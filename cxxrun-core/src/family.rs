//! Known compiler families and the flags each one needs.

use std::path::Path;

/// A compiler driver recognized by its executable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerFamily {
    Gcc,
    Gxx,
    Clang,
    Clangxx,
    Msvc,
    Generic,
}

impl CompilerFamily {
    /// Classify a compiler command such as `/usr/bin/g++-13` or `ccache clang++`.
    ///
    /// The last whitespace-separated word names the driver, so wrapper
    /// launchers in front of it do not hide the family.
    pub fn from_command(command: &str) -> Self {
        let Some(word) = command.split_whitespace().last() else {
            return CompilerFamily::Generic;
        };
        let name = Path::new(word)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(word);
        let name = name.strip_suffix(".exe").unwrap_or(name);

        match strip_version_suffix(name) {
            "gcc" => CompilerFamily::Gcc,
            "g++" => CompilerFamily::Gxx,
            "clang" => CompilerFamily::Clang,
            "clang++" => CompilerFamily::Clangxx,
            "cl" => CompilerFamily::Msvc,
            _ => CompilerFamily::Generic,
        }
    }

    /// Flag that makes the driver treat stdin as the right source language.
    pub fn input_language_flag(self) -> Option<&'static str> {
        match self {
            CompilerFamily::Gcc | CompilerFamily::Clang => Some("-xc"),
            CompilerFamily::Gxx | CompilerFamily::Clangxx => Some("-xc++"),
            CompilerFamily::Msvc | CompilerFamily::Generic => None,
        }
    }

    /// Language standard used when the configuration does not pick one.
    pub fn default_standard_flag(self) -> Option<&'static str> {
        match self {
            CompilerFamily::Gxx => Some("-std=c++0x"),
            CompilerFamily::Clangxx => Some("-std=c++11"),
            CompilerFamily::Gcc
            | CompilerFamily::Clang
            | CompilerFamily::Msvc
            | CompilerFamily::Generic => None,
        }
    }
}

/// `g++-13` -> `g++`, `clang-17.0` -> `clang`; other names are left alone.
fn strip_version_suffix(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((base, version))
            if !base.is_empty()
                && !version.is_empty()
                && version.chars().all(|c| c.is_ascii_digit() || c == '.') =>
        {
            base
        }
        _ => name,
    }
}

// Licensed under the Apache-2.0 license

//! Generated output.
//!
//! Backends never touch the filesystem; they return [`Artifact`]s that are
//! persisted by [`crate::writer`].

use std::fmt;
use std::path::PathBuf;

/// Language of a generated artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Rust,
    Python,
    Json,
    Markdown,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::C => "C",
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::Json => "JSON",
            Language::Markdown => "Markdown",
        })
    }
}

/// One generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the output directory.
    pub path: PathBuf,
    pub language: Language,
    pub content: String,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, language: Language, content: String) -> Self {
        Self {
            path: path.into(),
            language,
            content,
        }
    }
}

//! Language registry mapping logical language names to backend runtimes
//!
//! The backend needs an entry file name and a pinned runtime version for every
//! submission. The set of languages is closed: the tool schema advertises
//! exactly [`Language::ALL`], and anything else is rejected before a request
//! is built.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CodaveriError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Java,
    C,
    Cpp,
    Typescript,
    Go,
    Rust,
    Csharp,
}

/// Entry file and runtime version the backend expects for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageDescriptor {
    pub language: Language,
    pub path: &'static str,
    pub version: &'static str,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::Python,
        Language::Javascript,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::Typescript,
        Language::Go,
        Language::Rust,
        Language::Csharp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Typescript => "typescript",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Csharp => "csharp",
        }
    }

    pub fn descriptor(&self) -> LanguageDescriptor {
        let (path, version) = match self {
            Language::Python => ("main.py", "3.12"),
            Language::Javascript => ("main.js", "22.16.0"),
            Language::Java => ("main.java", "17.0"),
            Language::C => ("main.c", "10.2"),
            Language::Cpp => ("main.cpp", "10.2"),
            Language::Typescript => ("main.ts", "5.8.3"),
            Language::Go => ("main.go", "1.16.2"),
            Language::Rust => ("main.rs", "1.68.2"),
            Language::Csharp => ("main.cs", "5.0.201"),
        };
        LanguageDescriptor {
            language: *self,
            path,
            version,
        }
    }

    /// Identifiers in schema order, used to build the tool's `enum`
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Language::as_str).collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CodaveriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|language| language.as_str() == s)
            .ok_or_else(|| CodaveriError::UnsupportedLanguage(s.to_string()))
    }
}

/// Resolve a logical language name to its backend descriptor
pub fn resolve(language: &str) -> Result<LanguageDescriptor, CodaveriError> {
    language.parse::<Language>().map(|l| l.descriptor())
}

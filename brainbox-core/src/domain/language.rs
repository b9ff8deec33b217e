//! Language domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Programming language accepted by the judge
///
/// Serializes to the judge's language codes (e.g. `PYTHON3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "PYTHON3")]
    Python3,
    #[serde(rename = "JAVA8")]
    Java8,
    #[serde(rename = "CPP14")]
    Cpp14,
    #[serde(rename = "CPP17")]
    Cpp17,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "JAVASCRIPT_NODE")]
    JavascriptNode,
    #[serde(rename = "TYPESCRIPT")]
    Typescript,
    #[serde(rename = "PHP")]
    Php,
}

impl Language {
    /// All supported languages, in menu order
    pub const ALL: [Language; 8] = [
        Language::Python3,
        Language::Java8,
        Language::Cpp14,
        Language::Cpp17,
        Language::C,
        Language::JavascriptNode,
        Language::Typescript,
        Language::Php,
    ];

    /// The judge's code for this language
    pub fn code(&self) -> &'static str {
        match self {
            Language::Python3 => "PYTHON3",
            Language::Java8 => "JAVA8",
            Language::Cpp14 => "CPP14",
            Language::Cpp17 => "CPP17",
            Language::C => "C",
            Language::JavascriptNode => "JAVASCRIPT_NODE",
            Language::Typescript => "TYPESCRIPT",
            Language::Php => "PHP",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Language::Python3 => "Python 3",
            Language::Java8 => "Java 8",
            Language::Cpp14 => "C++14",
            Language::Cpp17 => "C++17",
            Language::C => "C",
            Language::JavascriptNode => "JavaScript (Node.js)",
            Language::Typescript => "TypeScript",
            Language::Php => "PHP",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error returned when a language name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown language '{}'", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Parses either a judge code (`CPP14`) or an editor alias (`cpp`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python3" | "python" | "py" => Ok(Language::Python3),
            "java8" | "java" => Ok(Language::Java8),
            "cpp14" | "cpp" | "c++" => Ok(Language::Cpp14),
            "cpp17" => Ok(Language::Cpp17),
            "c" => Ok(Language::C),
            "javascript_node" | "javascript" | "js" | "node" => Ok(Language::JavascriptNode),
            "typescript" | "ts" => Ok(Language::Typescript),
            "php" => Ok(Language::Php),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_judge_codes() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>(), Ok(lang));
        }
    }

    #[test]
    fn test_parse_editor_aliases() {
        assert_eq!("python".parse::<Language>(), Ok(Language::Python3));
        assert_eq!("cpp".parse::<Language>(), Ok(Language::Cpp14));
        assert_eq!("javascript".parse::<Language>(), Ok(Language::JavascriptNode));
        assert_eq!("Java".parse::<Language>(), Ok(Language::Java8));
    }

    #[test]
    fn test_parse_unknown() {
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_serializes_to_judge_code() {
        let json = serde_json::to_string(&Language::JavascriptNode).unwrap();
        assert_eq!(json, "\"JAVASCRIPT_NODE\"");
    }
}

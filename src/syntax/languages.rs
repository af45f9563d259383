//! Language identification and detection
//!
//! Maps file extensions to language names and language names to grammar
//! root scopes.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::registry::GrammarRegistry;

/// Well-known extensions, independent of which grammars are installed
const BUILTIN_EXTENSIONS: &[(&str, &str)] = &[
    ("bash", "shell"),
    ("c", "c"),
    ("cc", "cpp"),
    ("cjs", "javascript"),
    ("cpp", "cpp"),
    ("css", "css"),
    ("go", "go"),
    ("h", "c"),
    ("hpp", "cpp"),
    ("htm", "html"),
    ("html", "html"),
    ("java", "java"),
    ("js", "javascript"),
    ("json", "json"),
    ("lua", "lua"),
    ("markdown", "markdown"),
    ("md", "markdown"),
    ("mjs", "javascript"),
    ("php", "php"),
    ("py", "python"),
    ("rb", "ruby"),
    ("rs", "rust"),
    ("sh", "shell"),
    ("toml", "toml"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("vim", "vim"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
];

/// Errors from resolving a file to a grammar scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageError {
    /// The path has no extension, or one no language claims
    UnknownExtension(PathBuf),
    /// The language is known but no grammar provides it
    UnknownLanguage(String),
}

impl fmt::Display for LanguageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageError::UnknownExtension(path) => {
                write!(f, "Unknown extension: {}", path.display())
            }
            LanguageError::UnknownLanguage(name) => write!(f, "Unknown language: {}", name),
        }
    }
}

impl std::error::Error for LanguageError {}

/// Extension and scope lookup tables
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    /// Lowercase extension → language name
    extensions: HashMap<String, String>,
    /// Language name → grammar root scope
    scopes: HashMap<String, String>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry {
    /// Builtin extension table, no grammars
    pub fn new() -> Self {
        Self {
            extensions: BUILTIN_EXTENSIONS
                .iter()
                .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
                .collect(),
            scopes: HashMap::new(),
        }
    }

    /// Builtin extensions plus every language provided by `grammars`
    pub fn from_grammars(grammars: &GrammarRegistry) -> Self {
        let mut registry = Self::new();
        for def in grammars.definitions() {
            registry.register_language(&def.name, &def.scope, &def.file_types);
        }
        registry
    }

    /// Associate a language with a grammar scope and extra file types
    pub fn register_language(&mut self, name: &str, scope: &str, file_types: &[String]) {
        let name = name.to_lowercase();
        for ext in file_types {
            self.extensions.insert(ext.to_lowercase(), name.clone());
        }
        self.scopes.insert(name, scope.to_string());
    }

    /// Detect language name from file path
    pub fn language_for_path(&self, path: &Path) -> Result<&str, LanguageError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.extensions.get(&ext.to_lowercase()))
            .map(String::as_str)
            .ok_or_else(|| LanguageError::UnknownExtension(path.to_path_buf()))
    }

    /// Grammar root scope for a language name
    pub fn scope_for_language(&self, name: &str) -> Result<&str, LanguageError> {
        self.scopes
            .get(&name.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| LanguageError::UnknownLanguage(name.to_string()))
    }

    /// Grammar root scope for a file path
    pub fn scope_for_path(&self, path: &Path) -> Result<&str, LanguageError> {
        let language = self.language_for_path(path)?;
        self.scope_for_language(language)
    }
}

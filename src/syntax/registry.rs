//! Grammar registry
//!
//! Holds grammar definitions by root scope and compiles them on first use.
//!
//! Loading priority (later registrations replace earlier ones):
//! 1. Embedded: built-in grammars compiled into the binary
//! 2. User: `~/.config/scopeline/grammars/*.yaml` and configured directories

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::grammar::{Grammar, GrammarError, GrammarLoader};
use super::rules::{GrammarDefinition, RuleGrammar};

// Embedded grammar files
pub const JSON_GRAMMAR_YAML: &str = include_str!("../../grammars/json.yaml");
pub const TOML_GRAMMAR_YAML: &str = include_str!("../../grammars/toml.yaml");

/// Registry of all built-in grammars
pub const BUILTIN_GRAMMARS: &[&str] = &[JSON_GRAMMAR_YAML, TOML_GRAMMAR_YAML];

/// Scope-keyed grammar store with lazy compilation
#[derive(Default)]
pub struct GrammarRegistry {
    definitions: HashMap<String, GrammarDefinition>,
    compiled: HashMap<String, Arc<dyn Grammar>>,
    /// Compile errors, kept until the scope is registered again
    failed: HashMap<String, GrammarError>,
}

impl GrammarRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the embedded grammars
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for yaml in BUILTIN_GRAMMARS {
            if let Err(e) = registry.register_yaml(yaml) {
                tracing::error!("Failed to register builtin grammar: {}", e);
            }
        }
        registry
    }

    /// Register a grammar definition, replacing any with the same scope.
    ///
    /// Returns the grammar's root scope.
    pub fn register_definition(&mut self, def: GrammarDefinition) -> String {
        let scope = def.scope.clone();
        self.compiled.remove(&scope);
        self.failed.remove(&scope);
        if self.definitions.insert(scope.clone(), def).is_some() {
            tracing::debug!("Grammar {} replaced by a later registration", scope);
        }
        scope
    }

    pub fn register_yaml(&mut self, yaml: &str) -> Result<String, GrammarError> {
        Ok(self.register_definition(GrammarDefinition::from_yaml(yaml)?))
    }

    pub fn register_file(&mut self, path: &Path) -> Result<String, GrammarError> {
        let content = std::fs::read_to_string(path).map_err(|e| GrammarError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let scope = self.register_yaml(&content)?;
        tracing::info!("Registered grammar {} from {}", scope, path.display());
        Ok(scope)
    }

    /// Register an already constructed grammar (e.g. a full TextMate
    /// interpreter). It has no definition, so it contributes no file types.
    pub fn register_grammar(&mut self, grammar: Arc<dyn Grammar>) {
        let scope = grammar.scope_name().to_string();
        self.definitions.remove(&scope);
        self.failed.remove(&scope);
        self.compiled.insert(scope, grammar);
    }

    /// Register every `*.yaml` / `*.yml` file in a directory.
    ///
    /// Unreadable or invalid files are logged and skipped. Returns the number
    /// of grammars registered.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("No grammars loaded from {}: {}", dir.display(), e);
                return 0;
            }
        };

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
            })
            .collect();
        // Deterministic order when two files claim the same scope
        paths.sort();

        let mut count = 0;
        for path in paths {
            match self.register_file(&path) {
                Ok(_) => count += 1,
                Err(e) => tracing::warn!("Skipping grammar {}: {}", path.display(), e),
            }
        }
        count
    }

    pub fn contains(&self, scope_name: &str) -> bool {
        self.definitions.contains_key(scope_name) || self.compiled.contains_key(scope_name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &GrammarDefinition> {
        self.definitions.values()
    }

    /// Registered root scopes, sorted
    pub fn scopes(&self) -> Vec<&str> {
        let mut scopes: Vec<&str> = self
            .definitions
            .keys()
            .chain(self.compiled.keys())
            .map(String::as_str)
            .collect();
        scopes.sort_unstable();
        scopes.dedup();
        scopes
    }
}

impl GrammarLoader for GrammarRegistry {
    fn load_grammar(&mut self, scope_name: &str) -> Result<Arc<dyn Grammar>, GrammarError> {
        if let Some(grammar) = self.compiled.get(scope_name) {
            return Ok(grammar.clone());
        }
        if let Some(err) = self.failed.get(scope_name) {
            return Err(err.clone());
        }

        let def = self
            .definitions
            .get(scope_name)
            .ok_or_else(|| GrammarError::UnknownScope(scope_name.to_string()))?;

        let compiled = match RuleGrammar::from_definition(def) {
            Ok(compiled) => compiled,
            Err(e) => {
                tracing::warn!("Grammar {} failed to compile: {}", scope_name, e);
                self.failed.insert(scope_name.to_string(), e.clone());
                return Err(e);
            }
        };
        tracing::debug!("Compiled grammar {} ({})", scope_name, compiled.name());

        let grammar: Arc<dyn Grammar> = Arc::new(compiled);
        self.compiled
            .insert(scope_name.to_string(), grammar.clone());
        Ok(grammar)
    }
}

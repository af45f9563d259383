//! Highlight configuration persistence
//!
//! Stores user preferences in `~/.config/scopeline/config.yaml`:
//!
//! ```yaml
//! rules:
//!   string.quoted.double: StringDQ
//!   comment.line: LineComment
//! grammar_dirs:
//!   - ~/work/grammars
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::syntax::{GrammarRegistry, ScopeResolver};

/// Highlight configuration that persists across sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighlightConfig {
    /// Scope prefix → highlight group, merged over the built-in rules
    #[serde(default)]
    pub rules: HashMap<String, String>,
    /// Extra directories searched for grammar files
    #[serde(default)]
    pub grammar_dirs: Vec<PathBuf>,
}

impl HighlightConfig {
    /// Load config from the default location, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to `path`
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Set a single rule override
    pub fn set_rule(&mut self, scope: &str, group: &str) {
        self.rules.insert(scope.to_string(), group.to_string());
    }

    /// Resolver with this config's rules merged over the defaults
    pub fn resolver(&self) -> ScopeResolver {
        ScopeResolver::new(&self.rules)
    }

    /// Built-in grammars plus user and configured grammar directories
    pub fn grammar_registry(&self) -> GrammarRegistry {
        let mut registry = GrammarRegistry::with_builtins();
        let user_dir = crate::config_paths::grammars_dir();
        for dir in user_dir.iter().chain(&self.grammar_dirs) {
            let count = registry.load_dir(dir);
            if count > 0 {
                tracing::info!("Loaded {} grammars from {}", count, dir.display());
            }
        }
        registry
    }
}

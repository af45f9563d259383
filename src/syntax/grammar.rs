//! Grammar interface consumed by the incremental tokenizer
//!
//! The tokenizer never looks inside a grammar: it loads one by scope name and
//! asks it to tokenize a single line given the state left by the previous one.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Opaque parser state left behind after tokenizing a line.
///
/// Cloning shares the underlying state; grammars never mutate a state once
/// it has been handed out.
#[derive(Clone)]
pub struct StateStack(Arc<dyn Any + Send + Sync>);

impl StateStack {
    /// Wrap a grammar-specific state value
    pub fn new<T: Any + Send + Sync>(state: T) -> Self {
        Self(Arc::new(state))
    }

    /// Access the grammar-specific state, if it is of type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether both handles share the same state
    pub fn ptr_eq(&self, other: &StateStack) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StateStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateStack(..)")
    }
}

/// A token as reported by a grammar, in character indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    /// Start character index (inclusive)
    pub start: usize,
    /// End character index (exclusive)
    pub end: usize,
    /// Scope names, most general first
    pub scopes: Vec<String>,
}

/// Result of tokenizing one line
#[derive(Debug, Clone)]
pub struct LineTokens {
    pub tokens: Vec<RawToken>,
    /// State to resume from on the following line
    pub next_state: StateStack,
}

/// A loaded grammar capable of tokenizing one line at a time.
pub trait Grammar: Send + Sync {
    /// Root scope of the grammar (e.g. `source.json`)
    fn scope_name(&self) -> &str;

    /// Tokenize `line`, resuming from `prior` (`None` for the first line).
    fn tokenize_line(&self, line: &str, prior: Option<&StateStack>) -> LineTokens;
}

/// Resolves scope names to grammars.
///
/// Implementations are expected to cache: the tokenizer calls this on every
/// parse that has work to do.
pub trait GrammarLoader {
    fn load_grammar(&mut self, scope_name: &str) -> Result<Arc<dyn Grammar>, GrammarError>;
}

/// Errors produced while locating or compiling a grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// No grammar is registered under this scope name
    UnknownScope(String),
    /// The grammar file could not be read
    Io { path: PathBuf, message: String },
    /// The grammar file is not a valid grammar definition
    Parse(String),
    /// A pattern in the grammar failed to compile
    InvalidPattern { pattern: String, message: String },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::UnknownScope(scope) => write!(f, "Unknown grammar scope: {}", scope),
            GrammarError::Io { path, message } => {
                write!(f, "Failed to read grammar {}: {}", path.display(), message)
            }
            GrammarError::Parse(e) => write!(f, "Parse error: {}", e),
            GrammarError::InvalidPattern { pattern, message } => {
                write!(f, "Invalid pattern '{}': {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

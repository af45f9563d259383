//! Syntax tokenization module
//!
//! Provides TextMate-style scope tokenization with:
//! - Language detection from file extensions
//! - Incremental per-buffer re-tokenization from the first changed line
//! - Scope to highlight group resolution
//!
//! ## Architecture
//!
//! ```text
//! Buffer change → IncrementalTokenizer::parse(buffer, scope, lines)
//!              → (GrammarLoader → Grammar::tokenize_line per dirty line)
//!              → tokens → ScopeResolver::resolve(token.scopes) → highlight group
//! ```

mod grammar;
mod languages;
mod registry;
mod rules;
mod scopes;
mod token;
mod tokenizer;

pub use grammar::{Grammar, GrammarError, GrammarLoader, LineTokens, RawToken, StateStack};
pub use languages::{LanguageError, LanguageRegistry};
pub use registry::{GrammarRegistry, BUILTIN_GRAMMARS};
pub use rules::{GrammarDefinition, PatternDefinition, RuleGrammar};
pub use scopes::{merge_rules, resolve_scopes, ScopeResolver, DEFAULT_RULES};
pub use token::{byte_to_char_col, char_to_byte_col, ByteColumns, Token};
pub use tokenizer::{BufferId, BufferState, IncrementalTokenizer, ParseOutcome};

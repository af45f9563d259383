//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scopeline::syntax::{
    Grammar, GrammarError, GrammarLoader, IncrementalTokenizer, LineTokens, RawToken, StateStack,
};

pub const FAKE_SCOPE: &str = "source.fake";

/// Deterministic hand-written grammar.
///
/// - `fn` and `let` are `keyword.fake`
/// - digit runs are `constant.numeric.fake`
/// - `"` opens a string that may continue onto following lines
/// - other non-space runs are `variable.fake`
pub struct FakeGrammar {
    pub tokenize_calls: Arc<AtomicUsize>,
}

/// Carried between lines: are we inside an unterminated string?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeState {
    pub in_string: bool,
}

fn scopes(inner: &str) -> Vec<String> {
    vec![FAKE_SCOPE.to_string(), inner.to_string()]
}

impl Grammar for FakeGrammar {
    fn scope_name(&self) -> &str {
        FAKE_SCOPE
    }

    fn tokenize_line(&self, line: &str, prior: Option<&StateStack>) -> LineTokens {
        self.tokenize_calls.fetch_add(1, Ordering::SeqCst);

        let chars: Vec<char> = line.chars().collect();
        let mut in_string = prior
            .and_then(|s| s.downcast_ref::<FakeState>())
            .is_some_and(|s| s.in_string);
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let start = i;
            if in_string || chars[i] == '"' {
                if !in_string {
                    i += 1;
                }
                in_string = true;
                while i < chars.len() {
                    if chars[i] == '"' {
                        i += 1;
                        in_string = false;
                        break;
                    }
                    i += 1;
                }
                tokens.push(RawToken {
                    start,
                    end: i,
                    scopes: scopes("string.quoted.double.fake"),
                });
            } else if chars[i].is_whitespace() {
                i += 1;
            } else {
                while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '"' {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let inner = if word == "fn" || word == "let" {
                    "keyword.fake"
                } else if word.chars().all(|c| c.is_ascii_digit()) {
                    "constant.numeric.fake"
                } else {
                    "variable.fake"
                };
                tokens.push(RawToken {
                    start,
                    end: i,
                    scopes: scopes(inner),
                });
            }
        }

        LineTokens {
            tokens,
            next_state: StateStack::new(FakeState { in_string }),
        }
    }
}

/// Loader serving [`FakeGrammar`] under [`FAKE_SCOPE`], with call counters
#[derive(Clone, Default)]
pub struct FakeLoader {
    pub loads: Arc<AtomicUsize>,
    pub tokenize_calls: Arc<AtomicUsize>,
    pub fail_with: Option<GrammarError>,
}

impl FakeLoader {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn tokenize_calls(&self) -> usize {
        self.tokenize_calls.load(Ordering::SeqCst)
    }
}

impl GrammarLoader for FakeLoader {
    fn load_grammar(&mut self, scope_name: &str) -> Result<Arc<dyn Grammar>, GrammarError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        if scope_name != FAKE_SCOPE {
            return Err(GrammarError::UnknownScope(scope_name.to_string()));
        }
        Ok(Arc::new(FakeGrammar {
            tokenize_calls: self.tokenize_calls.clone(),
        }))
    }
}

/// Tokenizer over a fresh [`FakeLoader`], plus a handle sharing its counters
pub fn fake_tokenizer() -> (IncrementalTokenizer<FakeLoader>, FakeLoader) {
    let loader = FakeLoader::default();
    (IncrementalTokenizer::new(loader.clone()), loader)
}

/// Ten-line sample document
pub fn sample_lines() -> Vec<String> {
    vec![
        "fn main".to_string(),
        "let x 1".to_string(),
        "let s \"hello".to_string(),
        "world\" y".to_string(),
        "fn helper".to_string(),
        "let z 42".to_string(),
        "z".to_string(),
        "".to_string(),
        "let q \"done\"".to_string(),
        "fn end".to_string(),
    ]
}

//! Declarative rule grammars
//!
//! A small TextMate-flavoured grammar format: single-line `match` rules and
//! `begin`/`end` blocks that may span lines. Good enough for data formats and
//! simple languages; richer grammars plug in through [`Grammar`] directly.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::grammar::{Grammar, GrammarError, LineTokens, RawToken, StateStack};
use super::token::byte_to_char_col;

/// Root structure of a grammar YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarDefinition {
    /// Language name (e.g. "json")
    pub name: String,
    /// Root scope (e.g. "source.json")
    pub scope: String,
    /// File extensions handled by this grammar, without the dot
    #[serde(default)]
    pub file_types: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<PatternDefinition>,
}

/// A single rule entry from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDefinition {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub scope: String,
}

impl GrammarDefinition {
    pub fn from_yaml(yaml: &str) -> Result<Self, GrammarError> {
        serde_yaml::from_str(yaml).map_err(|e| GrammarError::Parse(e.to_string()))
    }
}

#[derive(Debug)]
enum Rule {
    Match {
        regex: Regex,
        scope: String,
    },
    Block {
        begin: Regex,
        end: Regex,
        scope: String,
    },
}

impl Rule {
    fn opener(&self) -> &Regex {
        match self {
            Rule::Match { regex, .. } => regex,
            Rule::Block { begin, .. } => begin,
        }
    }

    fn scope(&self) -> &str {
        match self {
            Rule::Match { scope, .. } | Rule::Block { scope, .. } => scope,
        }
    }
}

/// Grammar state carried between lines: the block rule still open, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RuleState {
    open_block: Option<usize>,
}

fn compile(pattern: &str) -> Result<Regex, GrammarError> {
    Regex::new(pattern).map_err(|e| GrammarError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Maps increasing byte offsets on one line to char offsets, counting only
/// the chars between consecutive calls.
struct CharCursor<'a> {
    line: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            byte: 0,
            chars: 0,
        }
    }

    fn char_col(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            return byte_to_char_col(self.line, byte);
        }
        self.chars += self.line[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// Byte index of the char boundary following `pos`
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

/// A compiled rule grammar
#[derive(Debug)]
pub struct RuleGrammar {
    name: String,
    scope: String,
    rules: Vec<Rule>,
}

impl RuleGrammar {
    /// Compile all patterns of a definition
    pub fn from_definition(def: &GrammarDefinition) -> Result<Self, GrammarError> {
        let mut rules = Vec::with_capacity(def.patterns.len());

        for pattern in &def.patterns {
            let rule = match (&pattern.match_pattern, &pattern.begin, &pattern.end) {
                (Some(m), None, None) => Rule::Match {
                    regex: compile(m)?,
                    scope: pattern.scope.clone(),
                },
                (None, Some(begin), Some(end)) => Rule::Block {
                    begin: compile(begin)?,
                    end: compile(end)?,
                    scope: pattern.scope.clone(),
                },
                _ => {
                    return Err(GrammarError::Parse(format!(
                        "pattern '{}' in {} needs either `match` or both `begin` and `end`",
                        pattern.scope, def.scope
                    )))
                }
            };
            rules.push(rule);
        }

        Ok(Self {
            name: def.name.clone(),
            scope: def.scope.clone(),
            rules,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, GrammarError> {
        Self::from_definition(&GrammarDefinition::from_yaml(yaml)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn push_token(
        &self,
        tokens: &mut Vec<RawToken>,
        cursor: &mut CharCursor<'_>,
        start: usize,
        end: usize,
        scope: Option<&str>,
    ) {
        if end <= start {
            return;
        }
        let mut scopes = vec![self.scope.clone()];
        scopes.extend(scope.map(str::to_string));
        tokens.push(RawToken {
            start: cursor.char_col(start),
            end: cursor.char_col(end),
            scopes,
        });
    }
}

impl Grammar for RuleGrammar {
    fn scope_name(&self) -> &str {
        &self.scope
    }

    fn tokenize_line(&self, line: &str, prior: Option<&StateStack>) -> LineTokens {
        let mut open_block = prior
            .and_then(|s| s.downcast_ref::<RuleState>())
            .and_then(|s| s.open_block);
        let mut tokens = Vec::new();
        let mut cursor = CharCursor::new(line);
        let mut pos = 0;

        while pos < line.len() {
            if let Some(idx) = open_block {
                let Some(Rule::Block { end, scope, .. }) = self.rules.get(idx) else {
                    open_block = None;
                    continue;
                };
                let block_end = match end.find_at(line, pos) {
                    Some(m) => {
                        open_block = None;
                        m.end()
                    }
                    None => line.len(),
                };
                self.push_token(&mut tokens, &mut cursor, pos, block_end, Some(scope.as_str()));
                pos = block_end;
                continue;
            }

            // Earliest match wins, ties go to the rule listed first
            let best = self
                .rules
                .iter()
                .enumerate()
                .filter_map(|(i, rule)| rule.opener().find_at(line, pos).map(|m| (i, m)))
                .min_by_key(|(i, m)| (m.start(), *i));

            let Some((idx, m)) = best else {
                self.push_token(&mut tokens, &mut cursor, pos, line.len(), None);
                break;
            };

            if m.is_empty() {
                let next = next_char_boundary(line, m.start());
                self.push_token(&mut tokens, &mut cursor, pos, next, None);
                pos = next;
                continue;
            }

            let rule = &self.rules[idx];
            self.push_token(&mut tokens, &mut cursor, pos, m.start(), None);
            self.push_token(&mut tokens, &mut cursor, m.start(), m.end(), Some(rule.scope()));
            if matches!(rule, Rule::Block { .. }) {
                open_block = Some(idx);
            }
            pos = m.end();
        }

        LineTokens {
            tokens,
            next_state: StateStack::new(RuleState { open_block }),
        }
    }
}

//! Incremental line tokenizer with per-buffer state caching
//!
//! Each buffer keeps the line snapshot it was last tokenized from, the grammar
//! state after every line, and the tokens produced so far. A parse request
//! finds the first line that differs from the snapshot, drops everything from
//! that line on, and resumes the grammar from the state cached just above it.

use std::collections::HashMap;

use super::grammar::{GrammarError, GrammarLoader, LineTokens, StateStack};
use super::token::{ByteColumns, Token};

/// Host-assigned buffer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

/// Cached tokenization state for one buffer
#[derive(Debug, Default)]
pub struct BufferState {
    /// Grammar the cache was built with
    scope_name: String,
    /// Line contents covered by `stacks`
    lines: Vec<String>,
    /// `stacks[i]` is the grammar state after tokenizing `lines[i]`
    stacks: Vec<StateStack>,
    /// Tokens in document order
    tokens: Vec<Token>,
}

impl BufferState {
    fn new(scope_name: &str) -> Self {
        Self {
            scope_name: scope_name.to_owned(),
            ..Self::default()
        }
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Grammar state after the given 0-indexed line, if cached
    pub fn stack_after(&self, row: usize) -> Option<&StateStack> {
        self.stacks.get(row)
    }

    /// Number of lines with a cached grammar state
    pub fn cached_stack_count(&self) -> usize {
        self.stacks.len()
    }
}

/// Result of a parse request
#[derive(Debug, Clone, Copy)]
pub struct ParseOutcome<'a> {
    /// Every token for the buffer, in document order
    pub tokens: &'a [Token],
    /// First 0-indexed line that was re-tokenized, `None` if nothing changed
    pub changed_from: Option<usize>,
}

impl<'a> ParseOutcome<'a> {
    pub fn is_unchanged(&self) -> bool {
        self.changed_from.is_none()
    }

    /// Tokens on a 1-indexed line
    pub fn tokens_on_line(&self, line: usize) -> &'a [Token] {
        let start = self.tokens.partition_point(|t| t.line < line);
        let end = self.tokens.partition_point(|t| t.line <= line);
        &self.tokens[start..end]
    }
}

/// Find the first 0-indexed line where `current` differs from `cached`.
///
/// When one side is a prefix of the other, the shorter length is the first
/// changed line. Returns `None` for identical contents.
fn first_changed_line<S: AsRef<str>>(cached: &[String], current: &[S]) -> Option<usize> {
    let common = cached.len().min(current.len());
    (0..common)
        .find(|&i| cached[i] != current[i].as_ref())
        .or_else(|| (cached.len() != current.len()).then_some(common))
}

/// Tokenizes buffers incrementally, one cache entry per buffer.
///
/// Parsing takes `&mut self`, so calls on a tokenizer are serialized; hosts
/// that share one across threads wrap it in a lock.
pub struct IncrementalTokenizer<L> {
    loader: L,
    buffers: HashMap<BufferId, BufferState>,
}

impl<L: GrammarLoader> IncrementalTokenizer<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            buffers: HashMap::new(),
        }
    }

    /// Tokenize `lines` for `buffer`, reusing cached work above the first
    /// changed line.
    ///
    /// If the grammar cannot be loaded the buffer gets no tokens for this
    /// call and `changed_from` is `Some(0)`; the cache stays usable.
    pub fn parse<S: AsRef<str>>(
        &mut self,
        buffer: BufferId,
        scope_name: &str,
        lines: &[S],
    ) -> ParseOutcome<'_> {
        match self.try_parse(buffer, scope_name, lines) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    "No highlighting for buffer {:?} ({}): {}",
                    buffer,
                    scope_name,
                    e
                );
                ParseOutcome {
                    tokens: &[],
                    changed_from: Some(0),
                }
            }
        }
    }

    /// Like [`parse`](Self::parse), but returns grammar load failures.
    pub fn try_parse<S: AsRef<str>>(
        &mut self,
        buffer: BufferId,
        scope_name: &str,
        lines: &[S],
    ) -> Result<ParseOutcome<'_>, GrammarError> {
        let state = self
            .buffers
            .entry(buffer)
            .or_insert_with(|| BufferState::new(scope_name));

        if state.scope_name != scope_name {
            tracing::debug!(
                "Grammar changed from {} to {} for buffer {:?}, discarding cache",
                state.scope_name,
                scope_name,
                buffer
            );
            *state = BufferState::new(scope_name);
        }

        let Some(start) = first_changed_line(&state.lines, lines) else {
            tracing::trace!("Buffer {:?} unchanged, reusing cached tokens", buffer);
            return Ok(ParseOutcome {
                tokens: &state.tokens,
                changed_from: None,
            });
        };

        // Tokens are in document order, so everything from `start` on is a suffix.
        // The snapshot is cut too: if loading fails below, the next call must
        // still see every line from `start` on as changed.
        let keep = state.tokens.partition_point(|t| t.line <= start);
        state.tokens.truncate(keep);
        state.stacks.truncate(start);
        state.lines.truncate(start);

        let grammar = self.loader.load_grammar(scope_name)?;

        debug_assert_eq!(state.stacks.len(), start);
        let mut prior = start
            .checked_sub(1)
            .and_then(|row| state.stacks.get(row))
            .cloned();

        for (row, line) in lines.iter().enumerate().skip(start) {
            let line = line.as_ref();
            let LineTokens { tokens, next_state } = grammar.tokenize_line(line, prior.as_ref());

            let mut columns = ByteColumns::new(line);
            state.tokens.extend(
                tokens
                    .into_iter()
                    .map(|raw| columns.token(row, raw.start, raw.end, raw.scopes)),
            );
            state.stacks.push(next_state.clone());
            prior = Some(next_state);
        }

        state
            .lines
            .extend(lines[start..].iter().map(|l| l.as_ref().to_owned()));

        tracing::trace!(
            "Tokenized buffer {:?} from line {}: {} lines, {} tokens",
            buffer,
            start,
            lines.len().saturating_sub(start),
            state.tokens.len()
        );

        Ok(ParseOutcome {
            tokens: &state.tokens,
            changed_from: Some(start),
        })
    }

    /// Drop the cache for a buffer (call when the buffer is closed).
    ///
    /// Returns whether anything was cached.
    pub fn evict(&mut self, buffer: BufferId) -> bool {
        let removed = self.buffers.remove(&buffer).is_some();
        if removed {
            tracing::debug!("Evicted tokenizer cache for buffer {:?}", buffer);
        }
        removed
    }

    /// Cached state for a buffer, if it has been parsed
    pub fn buffer(&self, buffer: BufferId) -> Option<&BufferState> {
        self.buffers.get(&buffer)
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }
}

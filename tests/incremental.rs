//! Incremental tokenizer tests
//!
//! Tests for change detection, cache reuse, state threading and byte offsets.

mod common;

use common::{fake_tokenizer, sample_lines, FakeGrammar, FAKE_SCOPE};
use scopeline::syntax::{BufferId, Grammar, GrammarError, StateStack, Token};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

const BUF: BufferId = BufferId(1);

/// Tokenize every line from an initial state, without any caching
fn tokenize_from_scratch(lines: &[String]) -> Vec<Token> {
    let grammar = FakeGrammar {
        tokenize_calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut state: Option<StateStack> = None;
    let mut tokens = Vec::new();
    for (row, line) in lines.iter().enumerate() {
        let result = grammar.tokenize_line(line, state.as_ref());
        tokens.extend(
            result
                .tokens
                .into_iter()
                .map(|raw| Token::from_char_span(line, row, raw.start, raw.end, raw.scopes)),
        );
        state = Some(result.next_state);
    }
    tokens
}

fn inner_scopes(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.scopes[1].as_str()).collect()
}

// ========================================================================
// Change Detection Tests
// ========================================================================

#[test]
fn test_first_parse_reports_line_zero() {
    let (mut tokenizer, _) = fake_tokenizer();
    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &sample_lines());
    assert_eq!(outcome.changed_from, Some(0));
    assert!(!outcome.tokens.is_empty());
}

#[test]
fn test_unchanged_parse_is_noop() {
    let (mut tokenizer, loader) = fake_tokenizer();
    let lines = sample_lines();

    let first = tokenizer.parse(BUF, FAKE_SCOPE, &lines).tokens.to_vec();
    let calls = loader.tokenize_calls();
    let loads = loader.loads();

    let second = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
    assert!(second.is_unchanged());
    assert_eq!(second.changed_from, None);
    assert_eq!(second.tokens, first.as_slice());
    assert_eq!(loader.tokenize_calls(), calls);
    assert_eq!(loader.loads(), loads);
}

#[test]
fn test_edit_line_five_of_ten() {
    let (mut tokenizer, loader) = fake_tokenizer();
    let mut lines = sample_lines();
    let before = tokenizer.parse(BUF, FAKE_SCOPE, &lines).tokens.to_vec();
    assert_eq!(loader.tokenize_calls(), 10);

    lines[4] = "fn renamed".to_string();
    let after = tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    assert_eq!(after.changed_from, Some(4));
    // Lines 5-10 re-tokenized, 1-4 reused
    assert_eq!(loader.tokenize_calls(), 16);

    let prefix_before: Vec<&Token> = before.iter().filter(|t| t.line <= 4).collect();
    let prefix_after: Vec<&Token> = after.tokens.iter().filter(|t| t.line <= 4).collect();
    assert_eq!(prefix_before, prefix_after);
    assert_eq!(after.tokens_on_line(5)[1].length, "renamed".len());
}

#[test]
fn test_prefix_stability_for_every_line() {
    let base = sample_lines();
    for k in 0..base.len() {
        let (mut tokenizer, _) = fake_tokenizer();
        let before = tokenizer.parse(BUF, FAKE_SCOPE, &base).tokens.to_vec();

        let mut edited = base.clone();
        edited[k].push_str(" 7");
        let after = tokenizer.parse(BUF, FAKE_SCOPE, &edited);

        assert_eq!(after.changed_from, Some(k));
        let keep = |t: &&Token| t.line < k + 1;
        assert_eq!(
            before.iter().filter(keep).collect::<Vec<_>>(),
            after.tokens.iter().filter(keep).collect::<Vec<_>>(),
            "prefix changed when editing line {}",
            k
        );
    }
}

#[test]
fn test_deleting_trailing_lines_is_a_change() {
    let (mut tokenizer, _) = fake_tokenizer();
    let lines = sample_lines();
    tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &lines[..6]);
    assert_eq!(outcome.changed_from, Some(6));
    assert!(outcome.tokens.iter().all(|t| t.line <= 6));
    assert_eq!(outcome.tokens, tokenize_from_scratch(&lines[..6]).as_slice());

    let state = tokenizer.buffer(BUF).unwrap();
    assert_eq!(state.lines().len(), 6);
    assert_eq!(state.cached_stack_count(), 6);
}

#[test]
fn test_appending_lines_only_tokenizes_new_ones() {
    let (mut tokenizer, loader) = fake_tokenizer();
    let mut lines = sample_lines();
    tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    lines.push("let extra 1".to_string());
    lines.push("fn tail".to_string());
    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    assert_eq!(outcome.changed_from, Some(10));
    assert_eq!(loader.tokenize_calls(), 12);
    assert_eq!(inner_scopes(outcome.tokens_on_line(12)), vec!["keyword.fake", "variable.fake"]);
}

// ========================================================================
// Equivalence Tests
// ========================================================================

#[test]
fn test_cold_parse_matches_scratch_tokenization() {
    let (mut tokenizer, _) = fake_tokenizer();
    let lines = sample_lines();
    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
    assert_eq!(outcome.tokens, tokenize_from_scratch(&lines).as_slice());
}

#[test]
fn test_edit_sequence_matches_scratch_tokenization() {
    let (mut tokenizer, _) = fake_tokenizer();
    let mut lines = sample_lines();
    tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    let edits: Vec<Box<dyn Fn(&mut Vec<String>)>> = vec![
        Box::new(|l: &mut Vec<String>| l[2] = "let s \"closed\"".to_string()),
        Box::new(|l: &mut Vec<String>| l.insert(0, "\"open".to_string())),
        Box::new(|l: &mut Vec<String>| {
            l.remove(5);
        }),
        Box::new(|l: &mut Vec<String>| l[7].push_str(" 99")),
        Box::new(|l: &mut Vec<String>| l.truncate(3)),
        Box::new(|l: &mut Vec<String>| l.extend(["fn a".to_string(), "b\"".to_string()])),
    ];

    for (i, edit) in edits.iter().enumerate() {
        edit(&mut lines);
        let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
        assert_eq!(
            outcome.tokens,
            tokenize_from_scratch(&lines).as_slice(),
            "mismatch after edit {}",
            i
        );
    }
}

#[test]
fn test_state_change_propagates_to_later_lines() {
    let (mut tokenizer, _) = fake_tokenizer();
    let mut lines = sample_lines();
    let before = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
    // Line 4 continues the string opened on line 3
    assert_eq!(before.tokens_on_line(4)[0].scopes[1], "string.quoted.double.fake");

    lines[2] = "let s \"hello\"".to_string();
    let after = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
    assert_eq!(after.changed_from, Some(2));
    assert_eq!(after.tokens_on_line(4)[0].scopes[1], "variable.fake");
}

// ========================================================================
// Byte Offset Tests
// ========================================================================

#[test]
fn test_columns_are_bytes() {
    let (mut tokenizer, _) = fake_tokenizer();
    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &["€€ let"]);

    assert_eq!(outcome.tokens.len(), 2);
    let euro = &outcome.tokens[0];
    assert_eq!((euro.line, euro.column, euro.length), (1, 1, 6));
    let keyword = &outcome.tokens[1];
    assert_eq!((keyword.line, keyword.column, keyword.length), (1, 8, 3));
    assert_eq!(&"€€ let"[keyword.byte_range()], "let");
}

#[test]
fn test_string_with_multibyte_content() {
    let (mut tokenizer, _) = fake_tokenizer();
    let line = "let s \"日本\" 1";
    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &[line]);

    let string = &outcome.tokens[2];
    assert_eq!(&line[string.byte_range()], "\"日本\"");
    assert_eq!(string.length, 8);
    let number = &outcome.tokens[3];
    assert_eq!(&line[number.byte_range()], "1");
}

// ========================================================================
// Failure and Lifecycle Tests
// ========================================================================

#[test]
fn test_grammar_failure_degrades_and_recovers() {
    let (mut tokenizer, _) = fake_tokenizer();
    let mut lines = sample_lines();
    tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    tokenizer.loader_mut().fail_with = Some(GrammarError::Parse("broken".to_string()));
    lines[6] = "let z 0".to_string();
    let degraded = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
    assert!(degraded.tokens.is_empty());
    assert_eq!(degraded.changed_from, Some(0));

    // Cache keeps only the untouched prefix
    let state = tokenizer.buffer(BUF).unwrap();
    assert!(state.tokens().iter().all(|t| t.line <= 6));
    assert_eq!(state.lines().len(), 6);
    assert_eq!(state.cached_stack_count(), 6);

    tokenizer.loader_mut().fail_with = None;
    let recovered = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
    assert_eq!(recovered.changed_from, Some(6));
    assert_eq!(recovered.tokens, tokenize_from_scratch(&lines).as_slice());
}

#[test]
fn test_undo_after_failed_load_retokenizes_pruned_lines() {
    let (mut tokenizer, _) = fake_tokenizer();
    let original = sample_lines();
    tokenizer.parse(BUF, FAKE_SCOPE, &original);

    let mut edited = original.clone();
    edited[6] = "let z 0".to_string();
    tokenizer.loader_mut().fail_with = Some(GrammarError::Parse("broken".to_string()));
    tokenizer.parse(BUF, FAKE_SCOPE, &edited);

    // Host reverts to the text it had before the failed call
    tokenizer.loader_mut().fail_with = None;
    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &original);
    assert_eq!(outcome.changed_from, Some(6));
    assert_eq!(outcome.tokens, tokenize_from_scratch(&original).as_slice());
}

#[test]
fn test_edit_below_failed_load_resumes_at_cut() {
    let (mut tokenizer, loader) = fake_tokenizer();
    let mut lines = sample_lines();
    tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    lines[6] = "let z 0".to_string();
    tokenizer.loader_mut().fail_with = Some(GrammarError::Parse("broken".to_string()));
    tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    tokenizer.loader_mut().fail_with = None;
    lines[8] = "let q 7".to_string();
    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
    assert_eq!(outcome.changed_from, Some(6));
    assert_eq!(outcome.tokens, tokenize_from_scratch(&lines).as_slice());
    assert_eq!(loader.tokenize_calls(), 14);

    let state = tokenizer.buffer(BUF).unwrap();
    assert_eq!(state.lines(), lines.as_slice());
    assert_eq!(state.cached_stack_count(), 10);
}

#[test]
fn test_try_parse_surfaces_error() {
    let (mut tokenizer, _) = fake_tokenizer();
    let err = tokenizer
        .try_parse(BUF, "source.unknown", &["x"])
        .unwrap_err();
    assert_eq!(err, GrammarError::UnknownScope("source.unknown".to_string()));
}

#[test]
fn test_buffers_are_independent() {
    let (mut tokenizer, loader) = fake_tokenizer();
    let lines = sample_lines();
    tokenizer.parse(BufferId(1), FAKE_SCOPE, &lines);
    tokenizer.parse(BufferId(2), FAKE_SCOPE, &lines[..3]);
    assert_eq!(loader.tokenize_calls(), 13);

    let one = tokenizer.parse(BufferId(1), FAKE_SCOPE, &lines);
    assert!(one.is_unchanged());
    assert_eq!(tokenizer.buffer(BufferId(2)).unwrap().lines().len(), 3);
}

#[test]
fn test_evict_forces_full_parse() {
    let (mut tokenizer, loader) = fake_tokenizer();
    let lines = sample_lines();
    tokenizer.parse(BUF, FAKE_SCOPE, &lines);

    assert!(tokenizer.evict(BUF));
    assert_eq!(tokenizer.buffer_count(), 0);

    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &lines);
    assert_eq!(outcome.changed_from, Some(0));
    assert_eq!(loader.tokenize_calls(), 20);
}

#[test]
fn test_empty_document() {
    let (mut tokenizer, _) = fake_tokenizer();
    let empty: [&str; 0] = [];
    let outcome = tokenizer.parse(BUF, FAKE_SCOPE, &empty);
    assert!(outcome.is_unchanged());
    assert!(outcome.tokens.is_empty());

    tokenizer.parse(BUF, FAKE_SCOPE, &["fn x"]);
    let cleared = tokenizer.parse(BUF, FAKE_SCOPE, &empty);
    assert_eq!(cleared.changed_from, Some(0));
    assert!(cleared.tokens.is_empty());
}

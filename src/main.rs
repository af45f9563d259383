use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use scopeline::cli::CliArgs;
use scopeline::config::HighlightConfig;
use scopeline::syntax::{BufferId, IncrementalTokenizer, LanguageRegistry, Token};

/// A token together with its resolved highlight group
#[derive(Serialize)]
struct ResolvedToken<'a> {
    #[serde(flatten)]
    token: &'a Token,
    group: Option<&'a str>,
}

fn main() -> Result<()> {
    scopeline::tracing::init();

    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => HighlightConfig::load_from(path),
        None => HighlightConfig::load(),
    };

    let grammars = config.grammar_registry();
    let scope = match &args.scope {
        Some(scope) => scope.clone(),
        None => LanguageRegistry::from_grammars(&grammars)
            .scope_for_path(&args.path)?
            .to_string(),
    };

    let text = std::fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let lines: Vec<&str> = text.lines().collect();

    let mut tokenizer = IncrementalTokenizer::new(grammars);
    let outcome = tokenizer.try_parse(BufferId(0), &scope, &lines)?;
    let resolver = config.resolver();

    let resolved: Vec<ResolvedToken> = outcome
        .tokens
        .iter()
        .map(|token| ResolvedToken {
            token,
            group: resolver.resolve(&token.scopes),
        })
        .filter(|r| args.all || r.group.is_some())
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &resolved)?;
        writeln!(out)?;
    } else {
        for r in &resolved {
            writeln!(
                out,
                "{}:{}+{}\t{}\t{}",
                r.token.line,
                r.token.column,
                r.token.length,
                r.group.unwrap_or("-"),
                r.token.scopes.join(" ")
            )?;
        }
    }

    Ok(())
}

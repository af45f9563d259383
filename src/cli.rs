//! Command-line argument parsing
//!
//! Supports:
//! - Tokenizing a file with the grammar matching its extension
//! - Forcing a grammar scope
//! - Alternate config files
//! - Plain text or JSON output

use clap::Parser;
use std::path::PathBuf;

/// Print scoped tokens and highlight groups for a file
#[derive(Parser, Debug)]
#[command(
    name = "scopeline",
    version,
    about = "Print scoped tokens and highlight groups for a file"
)]
pub struct CliArgs {
    /// File to tokenize
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Grammar scope to use instead of detecting it from the extension
    #[arg(short = 's', long, value_name = "SCOPE")]
    pub scope: Option<String>,

    /// Config file to use instead of ~/.config/scopeline/config.yaml
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit tokens as JSON
    #[arg(long)]
    pub json: bool,

    /// Include tokens that resolve to no highlight group
    #[arg(short = 'a', long)]
    pub all: bool,
}

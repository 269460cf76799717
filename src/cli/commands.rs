use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pft", about = concat!("preftree v", env!("CARGO_PKG_VERSION"), " - filter a preference tree as you type"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Show nodes marked advanced
    #[arg(long, global = true)]
    pub advanced: bool,

    /// Run against a different definition directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tree as it would be shown
    Tree(TreeArgs),
    /// Print the tree filtered by search terms
    Search(SearchArgs),
    /// List indexed words, optionally those starting with a prefix
    Words(WordsArgs),
    /// Validate declarations and documents
    Check,
}

#[derive(Args)]
pub struct TreeArgs {
    /// Open every container
    #[arg(long)]
    pub expand_all: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search terms (every term must match a word prefix)
    #[arg(required = true)]
    pub terms: Vec<String>,
}

#[derive(Args)]
pub struct WordsArgs {
    /// Only words starting with this prefix
    pub prefix: Option<String>,
}

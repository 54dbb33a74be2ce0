use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use passageiq::{
    AnalysisOptions,
    Error,
    RankingLimits,
    chunking::DEFAULT_CHUNK_SIZE,
    export::DEFAULT_EXPORT_FILE,
    ranking::{DEFAULT_TOP_K, DEFAULT_WEAK_K, MIN_PASSAGES_FOR_WEAK},
};

#[derive(Debug, Parser)]
#[command(
    name = "passageiq",
    about = "Passage-level retrievability analysis for your content"
)]
pub struct Cli {
    /// Override the sentence embedding model ID or local model path
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split content into passages and score them against a query
    Analyze(AnalyzeArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Analyze --

#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// File to analyze; reads stdin when omitted or `-`
    pub input: Option<PathBuf>,

    /// Search intent to score passages against
    #[arg(long)]
    pub query: Option<String>,

    /// Words per passage
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Number of top passages to show
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top: usize,

    /// Number of weak passages to consider
    #[arg(long, default_value_t = DEFAULT_WEAK_K)]
    pub weak: usize,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the results table as CSV to this path (`-` for stdout,
    /// `passageiq_results.csv` when no path is given)
    #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
    pub csv: Option<PathBuf>,

    /// Skip the score chart in the human-readable report
    #[arg(long)]
    pub no_chart: bool,
}

impl AnalyzeArgs {
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            chunk_size: self.chunk_size,
            limits: RankingLimits {
                top_k: self.top,
                weak_k: self.weak,
                min_passages_for_weak: MIN_PASSAGES_FOR_WEAK,
            },
        }
    }

    /// Whether the CSV export goes to stdout.
    pub fn csv_to_stdout(&self) -> bool {
        self.csv.as_deref().is_some_and(|p| p.as_os_str() == "-")
    }

    /// Reject output combinations that would interleave on stdout.
    pub fn check_outputs(&self) -> passageiq::Result<()> {
        if self.json && self.csv_to_stdout() {
            return Err(Error::Config(
                "--json and --csv - both write to stdout".into(),
            ));
        }
        Ok(())
    }

    /// Whether content comes from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input
            .as_deref()
            .is_none_or(|p| p.as_os_str() == "-")
    }
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "passageiq",
            &mut std::io::stdout(),
        );
    }
}

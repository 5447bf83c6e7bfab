use crate::commands::{
    run_dimension, run_entries, run_evaluate, run_score_entry, DimensionArgs, EntriesArgs,
    EvaluateArgs, ScoreEntryArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use admit_ai::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Admissions Portfolio Evaluator",
    about = "Score student portfolios and activity descriptions from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate a portfolio JSON file across all six dimensions
    Evaluate(EvaluateArgs),
    /// Score a single dimension of a portfolio JSON file
    Dimension(DimensionArgs),
    /// Score one activity description against the writing rubric
    ScoreEntry(ScoreEntryArgs),
    /// Score every activity description in a CSV export
    Entries(EntriesArgs),
    /// Evaluate a built-in sample portfolio end to end
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args).await,
        Command::Dimension(args) => run_dimension(args).await,
        Command::ScoreEntry(args) => run_score_entry(args).await,
        Command::Entries(args) => run_entries(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

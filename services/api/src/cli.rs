use crate::commands::{
    run_case_types, run_history, run_predict, run_stats, HistoryArgs, PredictArgs, StoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use case_forecast::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Case Outcome Forecaster",
    about = "Score legal cases and inspect the recorded forecast history",
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
    /// Score one case, record it, and print the forecast as JSON
    Predict(PredictArgs),
    /// Print the most recent recorded forecasts
    History(HistoryArgs),
    /// Print per-category statistics over the recorded forecasts
    Stats(StoreArgs),
    /// Print the known case categories and their reference profiles
    CaseTypes,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured prediction history database
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::History(args) => run_history(args),
        Command::Stats(args) => run_stats(args),
        Command::CaseTypes => run_case_types(),
    }
}

use crate::demo::{
    run_benchmark_compare, run_benchmark_project, run_demo, run_score, run_stats,
    CompareArgs, DemoArgs, ProjectArgs, ScoreArgs, StatsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use healthiq::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HealthIQ",
    about = "Score audits, summarize assessments, and benchmark facilities from the command line",
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
    /// Score a rating sheet against a weighted criterion set
    Score(ScoreArgs),
    /// Summarize an exported assessment or audit CSV
    Stats(StatsArgs),
    /// Compare metrics against targets and project improvement
    Benchmark {
        #[command(subcommand)]
        command: BenchmarkCommand,
    },
    /// Walk through scoring, statistics, and benchmarking with sample data
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum BenchmarkCommand {
    /// Classify an actual value against its target
    Compare(CompareArgs),
    /// Project linear milestones toward a target
    Project(ProjectArgs),
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
        Command::Score(args) => run_score(args),
        Command::Stats(args) => run_stats(args),
        Command::Benchmark {
            command: BenchmarkCommand::Compare(args),
        } => run_benchmark_compare(args),
        Command::Benchmark {
            command: BenchmarkCommand::Project(args),
        } => run_benchmark_project(args),
        Command::Demo(args) => run_demo(args),
    }
}

use crate::commands::{
    run_analyze, run_compare, run_explain, run_history, run_report, run_status, run_token,
    run_tutorials, AnalyzeArgs, CompareArgs, ExplainArgs, HistoryArgs, ReportArgs, StatusArgs,
    TokenCommand, TutorialsCommand,
};
use crate::infra::{load_config, Context};
use crate::server;
use clap::{Args, Parser, Subcommand};
use cloudready::error::AppError;
use cloudready::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "cloudready",
    about = "Submit repositories for cloud-readiness analysis and review the results",
    version
)]
struct Cli {
    /// Override the analysis backend base URL
    #[arg(long, global = true)]
    backend_url: Option<String>,
    /// Emit debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP gateway (default command)
    Serve(ServeArgs),
    #[command(flatten)]
    Client(ClientCommand),
}

#[derive(Subcommand, Debug)]
enum ClientCommand {
    /// Submit a repository or local directory for analysis
    Analyze(AnalyzeArgs),
    /// Show (or follow) the status of an analysis job
    Status(StatusArgs),
    /// List recent evaluations with reconciled scores
    History(HistoryArgs),
    /// Explain an evaluation's readiness level
    Explain(ExplainArgs),
    /// Compare two evaluations factor by factor
    Compare(CompareArgs),
    /// Print a generated report for a project
    Report(ReportArgs),
    /// List, read or delete generated tutorials
    Tutorials {
        #[command(subcommand)]
        command: TutorialsCommand,
    },
    /// Manage the stored GitHub token
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
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
        Command::Serve(args) => server::run(args, cli.backend_url).await,
        Command::Client(command) => {
            let config = load_config(cli.backend_url)?;
            telemetry::init_cli(cli.verbose)?;
            let context = Context::new(config)?;
            dispatch(&context, command).await
        }
    }
}

async fn dispatch(context: &Context, command: ClientCommand) -> Result<(), AppError> {
    match command {
        ClientCommand::Analyze(args) => run_analyze(context, args).await,
        ClientCommand::Status(args) => run_status(context, args).await,
        ClientCommand::History(args) => run_history(context, args).await,
        ClientCommand::Explain(args) => run_explain(context, args).await,
        ClientCommand::Compare(args) => run_compare(context, args).await,
        ClientCommand::Report(args) => run_report(context, args).await,
        ClientCommand::Tutorials { command } => run_tutorials(context, command).await,
        ClientCommand::Token { command } => run_token(context, command).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["cloudready"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_backend_override_applies_to_subcommands() {
        let cli = Cli::try_parse_from([
            "cloudready",
            "history",
            "--limit",
            "5",
            "--backend-url",
            "http://analysis:8000",
        ])
        .expect("parses");
        assert_eq!(cli.backend_url.as_deref(), Some("http://analysis:8000"));
        match cli.command {
            Some(Command::Client(ClientCommand::History(args))) => assert_eq!(args.limit, 5),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn analyze_collects_repeated_patterns() {
        let cli = Cli::try_parse_from([
            "cloudready",
            "analyze",
            "--repo",
            "https://github.com/acme/storefront",
            "--include",
            "*.py",
            "--include",
            "*.tf",
            "--no-llm",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Client(ClientCommand::Analyze(args))) => {
                assert_eq!(args.include, ["*.py", "*.tf"]);
                assert!(args.no_llm);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn token_and_tutorial_subcommands_parse() {
        assert!(Cli::try_parse_from(["cloudready", "token", "set", "ghp_x"]).is_ok());
        assert!(Cli::try_parse_from(["cloudready", "token", "test"]).is_ok());
        assert!(Cli::try_parse_from(["cloudready", "tutorials", "delete", "storefront"]).is_ok());
        assert!(Cli::try_parse_from([
            "cloudready",
            "tutorials",
            "show",
            "storefront",
            "--file",
            "index.md"
        ])
        .is_ok());
        assert!(Cli::try_parse_from([
            "cloudready",
            "report",
            "storefront",
            "--kind",
            "cloud-dashboard"
        ])
        .is_ok());
        assert!(Cli::try_parse_from(["cloudready", "status"]).is_err());
    }
}

//! ScoutClaw CLI: the main entry point.
//!
//! Commands:
//! - `run`: answer one task and print the result
//! - `gateway`: start the HTTP server
//! - `tools`: list the tool catalog
//! - `onboard`: write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "scoutclaw",
    about = "ScoutClaw: a tool-using research agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one task through the agent loop and print the answer
    Run {
        /// The task to solve
        #[arg(short, long)]
        task: String,

        /// Override the step budget
        #[arg(long)]
        max_steps: Option<usize>,

        /// Skip the search-and-read shortcut for factual questions
        #[arg(long)]
        no_preflight: bool,

        /// Print the full run outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the available tools
    Tools,

    /// Create the default configuration file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the answer.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            task,
            max_steps,
            no_preflight,
            json,
        } => {
            commands::run::run(commands::run::RunArgs {
                task,
                max_steps,
                no_preflight,
                json,
            })
            .await?
        }
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Tools => commands::tools::run()?,
        Commands::Onboard => commands::onboard::run()?,
    }

    Ok(())
}

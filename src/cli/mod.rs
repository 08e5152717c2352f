//! CLI module for Coven
//!
//! - `serve`: start the HTTP/WebSocket server
//! - `ask`: run one request in-process and print the session
//! - `personas`: print the persona catalog
//! - `metrics`: print learning metrics

use clap::{Parser, Subcommand};

pub mod ask;
pub mod personas;

/// Coven persona router CLI
#[derive(Parser, Debug)]
#[command(name = "coven")]
#[command(about = "Persona-routed coding assistant")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve,
    /// Ask one question and print every step
    Ask {
        /// The request
        #[arg(required = true, num_args = 1..)]
        request: Vec<String>,
        /// Skip classification and use this persona
        #[arg(short, long)]
        persona: Option<String>,
        /// Send worker output through the reviewer
        #[arg(short, long)]
        review: bool,
        /// Keep memory in-process instead of on disk
        #[arg(long)]
        ephemeral: bool,
    },
    /// List personas
    Personas,
    /// Show learning metrics for every persona
    Metrics,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run().await,
        Some(Commands::Ask {
            request,
            persona,
            review,
            ephemeral,
        }) => ask::run(request.join(" "), persona, review, ephemeral).await,
        Some(Commands::Personas) => personas::list(),
        Some(Commands::Metrics) => personas::metrics(),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

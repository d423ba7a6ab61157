//! Command-line interface.
//!
//! With no subcommand the binary serves the HTTP API.

mod history;

use clap::{Parser, Subcommand};

pub use history::{HistoryArgs, format_history, run_history_command};

#[derive(Parser, Debug)]
#[command(
    name = "calculadora",
    version,
    about = "Calculator web service with a persisted operation history"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Address to bind
        #[arg(long, env = "CALCULADORA_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "CALCULADORA_PORT")]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate,

    /// Print the operation history
    History(HistoryArgs),
}

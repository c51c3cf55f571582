use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "docchat", version, about = "Chat with your documents from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the config file path globally
    #[arg(short, long, global = true, default_value = "config.yaml")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enter the interactive chat REPL
    Chat {
        /// Thread to open instead of the last selected one
        #[arg(short, long)]
        thread: Option<Uuid>,
    },

    /// Ask a single question and print the answer
    Ask {
        utterance: String,
        /// Start a new thread instead of continuing the selected one
        #[arg(long)]
        new: bool,
        /// Document corpus tag to query
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Upload documents into the selected thread's session
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Document corpus tag to register the files under
        #[arg(short, long)]
        tag: Option<String>,
        /// YouTube video links to index alongside the files
        #[arg(long = "youtube")]
        youtube: Vec<String>,
    },

    /// Manage stored chat threads
    Threads {
        #[command(subcommand)]
        action: ThreadAction,
    },

    /// Create an account with the identity provider
    Signup {
        #[arg(short, long)]
        email: String,
    },

    /// Check credentials with the identity provider
    Login {
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
pub enum ThreadAction {
    /// List all threads
    List,

    /// Delete a thread
    Remove {
        id: Uuid,
    },

    /// Delete every thread and the stored history
    Clear,

    /// Export a thread to a .txt file
    Export {
        /// The UUID of the thread to export
        id: Uuid,
        /// The path to the output file (optional)
        #[arg(short, long)]
        path: Option<String>,
    },
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "taskstream")]
#[command(version)]
#[command(about = "Run backend agent tasks and follow their progress")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.taskstream/taskstream.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Override `api.base_url`
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Bearer token (overrides `auth.token`)
    #[arg(long, global = true, conflicts_with = "visitor")]
    pub token: Option<String>,

    /// Visitor id for a publicly shared session
    #[arg(long, global = true, value_name = "ID")]
    pub visitor: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a task and stream its progress (Ctrl-C cancels)
    Run {
        #[arg(short, long)]
        session: String,

        /// Task text; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,
    },
    /// Generate a report and stream its progress (Ctrl-C cancels)
    Report {
        #[arg(short, long)]
        session: String,

        /// What the report should cover
        #[arg(long)]
        spec: String,

        /// HTML template file to render the report into
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
    },
    /// List your sessions
    Sessions {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "baish-openai")]
#[command(about = "Send requests to an OpenAI-compatible API")]
#[command(version)]
pub struct Cli {
    /// API key (overrides config file and OPENAI_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the API (overrides config file and OPENAI_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Default request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<i64>,

    /// Log request details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a raw request and print the response body
    Request {
        /// Full URL, or a path relative to the base URL (e.g. "models")
        target: String,

        /// HTTP method (GET, POST, or any other verb)
        #[arg(short = 'X', long, default_value = "POST")]
        method: String,

        /// Request body
        #[arg(short, long, conflicts_with = "data_file")]
        data: Option<String>,

        /// Read the request body from a file
        #[arg(long)]
        data_file: Option<PathBuf>,

        /// Timeout for this request only, in seconds
        #[arg(short = 't', long = "max-time", default_value_t = 0)]
        max_time: i64,

        /// Print the HTTP status to stderr
        #[arg(short, long)]
        include_status: bool,
    },

    /// List available models
    Models,

    /// Ask a single question via chat completions
    Chat {
        /// The prompt to send
        prompt: String,

        /// Model name
        #[arg(short, long, default_value = "gpt-4o-mini")]
        model: String,

        /// Optional system message
        #[arg(short, long)]
        system: Option<String>,
    },
}

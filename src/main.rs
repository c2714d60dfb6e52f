//! baish-openai CLI - raw and typed requests against an OpenAI-compatible API
//!
//! This file contains only setup and dispatch logic. Command implementations
//! are in the `commands/` module.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use baish_openai::{Cli, Client, Commands, Settings, cmd_chat, cmd_models, cmd_request};

fn init_logging(verbose: bool) {
    let default = if verbose { "baish_openai=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load()?;
    if let Some(key) = cli.api_key {
        settings.api_key = Some(key);
    }
    if let Some(url) = cli.base_url {
        settings.base_url = Some(url);
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout = timeout;
    }
    tracing::debug!(?settings, "loaded settings");

    let mut client = Client::new();
    settings.configure(&mut client)?;

    let result = match cli.command {
        Commands::Request {
            target,
            method,
            data,
            data_file,
            max_time,
            include_status,
        } => {
            let body = baish_openai::commands::load_body(data, data_file.as_deref())?;
            cmd_request(
                &mut client,
                &target,
                &method,
                body.as_deref(),
                max_time,
                include_status,
            )
        }
        Commands::Models => cmd_models(&mut client),
        Commands::Chat {
            prompt,
            model,
            system,
        } => cmd_chat(&mut client, &prompt, &model, system.as_deref()),
    };

    client.cleanup();
    result
}

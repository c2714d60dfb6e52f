//! Raw request command

use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

use crate::client::Client;
use crate::transport::Connector;

/// Absolute URLs pass through, anything else is joined to the base URL
pub fn resolve_target<C: Connector>(client: &Client<C>, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        client.endpoint(target)
    }
}

/// Request body from `--data`, `--data-file`, or nothing
pub fn load_body(data: Option<String>, data_file: Option<&Path>) -> Result<Option<String>> {
    match (data, data_file) {
        (Some(data), _) => Ok(Some(data)),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request body from {}", path.display()))
            .map(Some),
        (None, None) => Ok(None),
    }
}

/// Send a request and write the body to stdout
///
/// Fails when the transport fails or the status is not 2xx. The body is
/// printed in both cases so API error messages stay visible.
pub fn cmd_request<C: Connector>(
    client: &mut Client<C>,
    target: &str,
    method: &str,
    body: Option<&str>,
    max_time: i64,
    include_status: bool,
) -> Result<()> {
    let url = resolve_target(client, target);
    let response = client
        .request_with_status(Some(method), Some(&url), body, max_time)
        .with_context(|| format!("{method} {url} failed"))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(response.body())?;
    if !response.body().ends_with(b"\n") && !response.body().is_empty() {
        writeln!(stdout)?;
    }
    stdout.flush()?;

    let status = response.status();
    if include_status {
        let label = format!("HTTP {status}");
        if response.is_success() {
            eprintln!("{}", label.green());
        } else {
            eprintln!("{}", label.red());
        }
    }

    if !response.is_success() {
        bail!("{method} {url} returned HTTP {status}");
    }
    Ok(())
}

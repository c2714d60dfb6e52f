//! Typed API commands: model listing and chat

use anyhow::Result;
use colored::Colorize;

use crate::client::Client;
use crate::openai::{self, ChatMessage, ChatRequest};
use crate::transport::Connector;

/// Print the ids of all models the endpoint serves
pub fn cmd_models<C: Connector>(client: &mut Client<C>) -> Result<()> {
    let models = openai::list_models(client)?;
    if models.is_empty() {
        eprintln!("{}", "No models available".yellow());
        return Ok(());
    }
    for model in models {
        match model.owned_by {
            Some(owner) => println!("{} {}", model.id, format!("({owner})").dimmed()),
            None => println!("{}", model.id),
        }
    }
    Ok(())
}

/// Ask one question and print the assistant's reply
pub fn cmd_chat<C: Connector>(
    client: &mut Client<C>,
    prompt: &str,
    model: &str,
    system: Option<&str>,
) -> Result<()> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));

    let completion = openai::chat_completion(client, &ChatRequest::new(model, messages))?;
    println!("{}", completion.content()?);
    Ok(())
}

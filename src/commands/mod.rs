//! Command implementations for the baish-openai CLI
//!
//! Each submodule handles a group of related commands.

pub mod api;
pub mod request;

pub use api::{cmd_chat, cmd_models};
pub use request::{cmd_request, load_body, resolve_target};

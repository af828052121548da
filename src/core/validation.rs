//! Build-time checks run before any subprocess is spawned.

use crate::core::error::{Error, Result};
use crate::core::types::{ConversationRequest, Mode};

/// Characters allowed in a model name. Brackets cover context-window
/// variants such as `sonnet[1m]`.
fn is_model_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ':' | '/' | '@' | '[' | ']')
}

/// Reject text that cannot be passed as a process argument
fn reject_nul(field: &str, text: &str) -> Result<()> {
    if text.contains('\0') {
        return Err(Error::invalid_input(format!(
            "{} must not contain NUL bytes",
            field
        )));
    }
    Ok(())
}

/// Validate a prompt is non-empty
pub fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(Error::invalid_input("prompt must not be empty"));
    }
    reject_nul("prompt", prompt)
}

/// Validate a model name is a simple token
pub fn validate_model(model: &str) -> Result<()> {
    if model.is_empty() {
        return Err(Error::invalid_input("model must not be empty"));
    }
    if let Some(bad) = model.chars().find(|c| !is_model_char(*c)) {
        return Err(Error::invalid_input(format!(
            "model '{}' contains unsupported character {:?}",
            model, bad
        )));
    }
    Ok(())
}

/// Validate a continuation identifier is non-empty
pub fn validate_continuation_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::invalid_input("continuation id must not be empty"));
    }
    reject_nul("continuation id", id)
}

/// Validate every field of a request for the given mode
pub fn validate_request(request: &ConversationRequest, mode: Mode) -> Result<()> {
    validate_prompt(&request.prompt)?;

    if let Some(model) = &request.model {
        validate_model(model)?;
    }

    if let Some(system_prompt) = &request.system_prompt {
        if system_prompt.is_empty() {
            return Err(Error::invalid_input("system prompt must not be empty"));
        }
        reject_nul("system prompt", system_prompt)?;
    }

    if let Some(cwd) = &request.cwd {
        if cwd.as_os_str().is_empty() {
            return Err(Error::invalid_input("cwd must not be empty"));
        }
    }

    if mode == Mode::Continue {
        if let Some(id) = &request.continuation_id {
            validate_continuation_id(id)?;
        }
    }

    Ok(())
}

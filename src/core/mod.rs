//! Core types, configuration, validation and errors

pub mod config;
pub mod error;
pub mod types;
pub mod validation;

pub use config::{
    Config, ConfigBuilder, DEFAULT_BINARY, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_TIMEOUT_SECS,
};
pub use error::{Error, Result};
pub use types::{
    ConversationRequest, ExecutionOutput, InterpretedResponse, Mode, ResponseMetadata, SessionId,
};
pub use validation::{validate_continuation_id, validate_model, validate_prompt, validate_request};

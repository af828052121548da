//! Command building, subprocess execution and output interpretation

pub mod client;
pub mod command;
pub mod process;
pub mod response;

pub use client::{Client, ClientBuilder};
pub use command::{build_command, quote_if_needed, shell_quote, Arg, CommandLine};
pub use process::{resolve_program, CommandExecutor, ExecOptions, ProcessExecutor};
pub use response::{decode, interpret, DecodedOutput};

//! CLI utilities for skyhash.
//!
//! The utilities present in this module can be used to build an interactive
//! shell on top of a [`Connection`](crate::Connection).
use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Possible commands from a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Exit command `.exit`, or end of input
    Exit,
    /// Query text to send to the server
    Query(String),
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unrecognized command '{0}'")]
    UnrecognizedCommand(String),

    #[error("no command provided")]
    Empty,

    #[error("failed to access terminal: {0}")]
    Io(#[from] io::Error),
}

/// Prompt user for a command.
pub fn prompt<R, W>(mut reader: R, mut writer: W) -> Result<Command, CliError>
where
    R: BufRead,
    W: Write,
{
    write!(&mut writer, "> ")?;
    writer.flush()?;

    let mut s = String::default();
    if reader.read_line(&mut s)? == 0 {
        return Ok(Command::Exit);
    }

    match s.trim() {
        "" => Err(CliError::Empty),
        ".exit" => Ok(Command::Exit),
        s if s.starts_with('.') => Err(CliError::UnrecognizedCommand(s.to_string())),
        s => Ok(Command::Query(s.to_string())),
    }
}

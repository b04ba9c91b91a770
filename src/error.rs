/// Error kinds reported by the provisioning pipeline.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Option {0} requires a value")]
    MissingArgument(String),

    #[error("Unknown option: {0}")]
    InvalidOption(String),

    #[error("Domain is required (use -d or --domain)")]
    MissingDomain,

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Unsupported server type: {0} (expected apache, nginx or auto)")]
    UnsupportedServer(String),

    #[error("Could not detect Apache or Nginx. Pass --server apache or --server nginx")]
    AutoDetectionFailed,

    #[error("Template not found: {}", .0.display())]
    MissingTemplate(PathBuf),

    #[error("Required command not found: {0}")]
    MissingDependency(String),

    #[error("Command '{command}' failed (exit code: {status}) - {output}")]
    CommandFailed {
        command: String,
        status: i32,
        output: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

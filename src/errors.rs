//! Errors for the fallible edges of the crate (filesystem scan, config).
//!
//! Building and rendering trees never fails.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreePrintError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("cannot walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("config error: {message}")]
    Config { message: String },
}

pub type TreePrintResult<T> = Result<T, TreePrintError>;

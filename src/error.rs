//! Error types for the export pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::archive::timestamp::TimestampError;
use crate::shape::InvalidLineWidth;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Input folder {0} does not exist or is not a directory")]
    InputDirMissing(PathBuf),

    #[error("Can't open/create output folder {path}: {source}")]
    OutputDirUnusable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Couldn't find the Users folder under {0}")]
    UsersDirMissing(PathBuf),

    #[error("Couldn't find the Groups folder under {0}")]
    GroupsDirMissing(PathBuf),

    #[error("No user subdirectory under {0}")]
    UserSubdirMissing(PathBuf),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bad timestamp: {0}")]
    Timestamp(#[from] TimestampError),

    #[error(transparent)]
    LineWidth(#[from] InvalidLineWidth),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

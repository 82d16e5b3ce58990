use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Error walking directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Error reading EXIF: {0}")]
    Exif(#[from] exif::Error),

    #[error("Error reading tags: {0}")]
    Tags(#[from] lofty::error::LoftyError),

    #[error("Error serializing metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error writing sidecar {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid progress template: {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),

    /// The file does not look like a sidecar this tool wrote.
    #[error("Malformed sidecar {0}")]
    MalformedSidecar(PathBuf),

    #[error("{0} file(s) failed to process")]
    Failures(usize),
}

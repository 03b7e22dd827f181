//! Error types for mybatis-export

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for mybatis-export operations
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors that can occur during a generation run
#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Schema query failed: {0}")]
    SchemaQuery(#[from] mysql_async::Error),

    #[error("The file already exists, but it is a directory: {}", .0.display())]
    PathIsDirectory(PathBuf),

    #[error("Failed to parse template `{role}`: {source}")]
    TemplateParse {
        role: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to render template `{role}`: {source}")]
    TemplateRender {
        role: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Interrupted by operator")]
    Interrupted,
}

impl CodegenError {
    /// Whether this error aborts the whole run rather than one artifact.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CodegenError::Connection(_)
                | CodegenError::SchemaQuery(_)
                | CodegenError::Config(_)
                | CodegenError::Validation(_)
                | CodegenError::Prompt(_)
                | CodegenError::Interrupted
        )
    }
}

impl From<config::ConfigError> for CodegenError {
    fn from(err: config::ConfigError) -> Self {
        CodegenError::Config(err.to_string())
    }
}

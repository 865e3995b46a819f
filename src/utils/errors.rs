use std::path::PathBuf;
use thiserror::Error;

/// Location context attached to errors raised while handling one file
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }
}

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        context: Option<ErrorContext>,
    },

    #[error("Minification error: {0}")]
    Minify(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Minifier service failed to start: {0}")]
    ServiceSetup(String),
}

impl OptimizeError {
    /// Create a simple parse error without context
    pub fn parse(message: String) -> Self {
        Self::Parse {
            message,
            context: None,
        }
    }

    /// Create a parse error with context
    pub fn parse_with_context(message: String, context: ErrorContext) -> Self {
        Self::Parse {
            message,
            context: Some(context),
        }
    }

    pub fn minify(message: String) -> Self {
        Self::Minify(message)
    }

    /// Create a configuration error
    pub fn config(message: String) -> Self {
        Self::Config(message)
    }

    /// Format error with the file it came from, when known
    pub fn format_detailed(&self) -> String {
        match self {
            OptimizeError::Parse {
                message,
                context: Some(ctx),
            } => {
                let mut output = format!("❌ Parse Error: {}", message);
                if let Some(ref file_path) = ctx.file_path {
                    output.push_str(&format!("\n📁 File: {}", file_path.display()));
                }
                output
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizeError>;

impl From<tokio::task::JoinError> for OptimizeError {
    fn from(err: tokio::task::JoinError) -> Self {
        OptimizeError::Task(err.to_string())
    }
}

//! Error handling for sort and pagination operations

use std::io;
use thiserror::Error;

/// Custom error type for sort and pagination operations
#[derive(Error, Debug)]
pub enum SortError {
    #[error(
        "Invalid sorting column name: {column}. Available columns: [{}]",
        .available.join(", ")
    )]
    UnknownSortColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Invalid sort directive: {spec}")]
    InvalidSortDirective { spec: String },

    #[error("Invalid page request: {message}")]
    InvalidPageRequest { message: String },

    #[error("Conflicting options: {message}")]
    ConflictingOptions { message: String },

    #[error("Invalid field separator: {sep}")]
    InvalidFieldSeparator { sep: String },

    #[error("Thread pool error: {message}")]
    ThreadPoolError { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Permission denied: {file}")]
    PermissionDenied { file: String },

    #[error("No such file or directory: {file}")]
    FileNotFound { file: String },

    #[error("Is a directory: {file}")]
    IsDirectory { file: String },

    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {message}")]
    ParseError { message: String },
}

impl SortError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SortError::PermissionDenied { .. }
            | SortError::FileNotFound { .. }
            | SortError::IsDirectory { .. }
            | SortError::Io(_) => crate::SORT_FAILURE,

            _ => crate::EXIT_FAILURE,
        }
    }

    /// Whether the error was caused by a malformed client request rather than
    /// by the environment. Callers behind an HTTP layer map these to 400.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SortError::UnknownSortColumn { .. }
                | SortError::InvalidSortDirective { .. }
                | SortError::InvalidPageRequest { .. }
        )
    }

    /// Create an unknown sort column error listing the columns that do exist
    pub fn unknown_sort_column<I, S>(column: &str, available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SortError::UnknownSortColumn {
            column: column.to_string(),
            available: available.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an invalid sort directive error
    pub fn invalid_sort_directive(spec: &str) -> Self {
        SortError::InvalidSortDirective {
            spec: spec.to_string(),
        }
    }

    /// Create an invalid page request error
    pub fn invalid_page_request(message: &str) -> Self {
        SortError::InvalidPageRequest {
            message: message.to_string(),
        }
    }

    /// Create a conflicting options error
    pub fn conflicting_options(message: &str) -> Self {
        SortError::ConflictingOptions {
            message: message.to_string(),
        }
    }

    /// Create an invalid field separator error
    pub fn invalid_field_separator(sep: &str) -> Self {
        SortError::InvalidFieldSeparator {
            sep: sep.to_string(),
        }
    }

    /// Create a thread pool error
    pub fn thread_pool_error(message: &str) -> Self {
        SortError::ThreadPoolError {
            message: message.to_string(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(file: &str) -> Self {
        SortError::PermissionDenied {
            file: file.to_string(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(file: &str) -> Self {
        SortError::FileNotFound {
            file: file.to_string(),
        }
    }

    /// Create an is directory error
    pub fn is_directory(file: &str) -> Self {
        SortError::IsDirectory {
            file: file.to_string(),
        }
    }

    /// Create a parse error
    pub fn parse_error(message: &str) -> Self {
        SortError::ParseError {
            message: message.to_string(),
        }
    }

    /// The offending column name, if this is an unknown column error
    pub fn column(&self) -> Option<&str> {
        match self {
            SortError::UnknownSortColumn { column, .. } => Some(column),
            _ => None,
        }
    }

    /// The valid column names reported alongside an unknown column error
    pub fn available_columns(&self) -> &[String] {
        match self {
            SortError::UnknownSortColumn { available, .. } => available,
            _ => &[],
        }
    }
}

/// Result type for sort operations
pub type SortResult<T> = Result<T, SortError>;

/// Context trait for attaching file names to I/O failures
pub trait SortContext<T> {
    fn with_file_context(self, filename: &str) -> SortResult<T>;
}

impl<T> SortContext<T> for Result<T, io::Error> {
    fn with_file_context(self, filename: &str) -> SortResult<T> {
        self.map_err(|io_err| match io_err.kind() {
            io::ErrorKind::PermissionDenied => SortError::permission_denied(filename),
            io::ErrorKind::NotFound => SortError::file_not_found(filename),
            _ if std::path::Path::new(filename).is_dir() => SortError::is_directory(filename),
            _ => SortError::Io(io::Error::new(
                io_err.kind(),
                format!("{}: {}", filename, io_err),
            )),
        })
    }
}

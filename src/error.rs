use std::{fmt::Display, io};

use thiserror::Error;

#[derive(Error, Debug)]
/// Encode error
pub enum EncodeError {
    /// The value tree contains a node the walker cannot flatten.
    #[error("structural error at {key_path}: {message}")]
    Structural { key_path: String, message: String },

    /// A row produced a key-path the frozen schema does not contain.
    #[error("schema mismatch at {key_path}: {message}")]
    SchemaMismatch { key_path: String, message: String },

    /// A scalar cannot be rendered under the active strategy.
    #[error("cannot encode value at {key_path}: {message}")]
    Encoding { key_path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Custom(String),
}

pub type EncodeResult<T> = Result<T, EncodeError>;

impl serde::ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        EncodeError::Custom(msg.to_string())
    }
}

impl From<csv::Error> for EncodeError {
    fn from(error: csv::Error) -> Self {
        let message = error.to_string();
        match error.into_kind() {
            csv::ErrorKind::Io(err) => EncodeError::Io(err),
            _ => EncodeError::Custom(message),
        }
    }
}

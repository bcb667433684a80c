use std::{error::Error, fmt};

#[derive(Debug)]
pub enum AnnotatorError {
    ConfigError(String),
    StorageError(String),
    CorruptStore(String),
    PlayerError(String),
}

impl fmt::Display for AnnotatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotatorError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AnnotatorError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AnnotatorError::CorruptStore(msg) => write!(f, "Corrupt store: {}", msg),
            AnnotatorError::PlayerError(msg) => write!(f, "Player error: {}", msg),
        }
    }
}

impl Error for AnnotatorError {}

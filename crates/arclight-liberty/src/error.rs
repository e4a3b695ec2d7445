use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibertyError {
    #[error("cannot read {filename}: {source}")]
    FileNotReadable {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("{filename} line {line}, {message}")]
    Syntax {
        filename: String,
        line: u32,
        message: String,
    },

    #[error("{filename} has no library group")]
    NoLibrary { filename: String },
}

impl LibertyError {
    pub fn syntax(filename: &str, line: u32, message: impl Into<String>) -> Self {
        LibertyError::Syntax {
            filename: filename.to_string(),
            line,
            message: message.into(),
        }
    }
}

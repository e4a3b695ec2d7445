use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdfError {
    #[error("cannot read {filename}: {source}")]
    FileNotReadable {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {filename}: {source}")]
    FileNotWritable {
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

    #[error("{filename}: {message}")]
    Unsupported { filename: String, message: String },
}

impl SdfError {
    pub fn syntax(filename: &str, line: u32, message: impl Into<String>) -> Self {
        SdfError::Syntax {
            filename: filename.to_string(),
            line,
            message: message.into(),
        }
    }

    pub fn unsupported(filename: &str, message: impl Into<String>) -> Self {
        SdfError::Unsupported {
            filename: filename.to_string(),
            message: message.into(),
        }
    }
}

// error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("can't scan {path}: {source}")]
    DeviceScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Allocation failure is never recovered from: report it and exit.
pub fn out_of_memory(what: &str) -> ! {
    tracing::error!(what, "out of memory");
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_request_display() {
        let err = Error::MalformedRequest("bad pid \"x\"".to_string());
        assert_eq!(err.to_string(), "malformed request: bad pid \"x\"");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

use thiserror::Error;

/// Everything a list load can end with
///
/// `Transport` is the only kind the loader retries. `CacheRead` only shows up
/// after the retry budget is spent and the offline snapshot could not be read.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not reach the server: {0}")]
    Transport(String),

    #[error("No offline copy available: {0}")]
    CacheRead(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<iacc_api::ApiError> for Error {
    fn from(err: iacc_api::ApiError) -> Self {
        Error::Transport(err.to_string())
    }
}

impl From<iacc_cache::CacheError> for Error {
    fn from(err: iacc_cache::CacheError) -> Self {
        Error::CacheRead(err.to_string())
    }
}

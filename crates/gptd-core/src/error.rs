use thiserror::Error;

#[derive(Error, Debug)]
pub enum GptdError {
    #[error("no Takeout archive to process")]
    NoArchives,

    #[error("no archive matching {pattern} found in {dir}")]
    NoArchiveFound { pattern: String, dir: String },

    #[error("invalid archive pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

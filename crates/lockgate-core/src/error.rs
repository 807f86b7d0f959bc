use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Token errors
    #[error("Invalid scan token: {0}")]
    InvalidToken(String),

    // Credential errors
    #[error("Invalid security level: {0}")]
    InvalidSecurityLevel(String),

    // Policy errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;

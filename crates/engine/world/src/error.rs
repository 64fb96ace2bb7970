use thiserror::Error;

/// Errors raised by the engine object model
#[derive(Error, Debug)]
pub enum Error {
    #[error("Engine not initialized")]
    NotInitialized,

    #[error("Name already in use: {0}")]
    DuplicateName(String),

    #[error("Package has no scene: {0}")]
    EmptyPackage(String),

    #[error("Unknown {kind}: {name}")]
    Unknown { kind: &'static str, name: String },
}

pub type Result<T> = std::result::Result<T, Error>;

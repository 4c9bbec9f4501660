use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid scroll direction: {0} (expected \"x\", \"y\" or \"xy\")")]
    InvalidDirection(String),

    #[error("Invalid overflow keyword: {0}")]
    InvalidOverflow(String),

    #[error("Scene error: {0}")]
    Scene(String),
}

pub type Result<T> = std::result::Result<T, Error>;
